//! Register Log Loader
//!
//! Loads register logs from disk or memory with format detection by magic
//! bytes.

use std::fmt;
use std::fs;
use std::path::Path;

use log::info;

use super::dro::{DroParser, DRO_MAGIC};
use super::imf::ImfParser;
use super::{FormatParser, RegisterLog};
use crate::Result;

/// Register log container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// DOSBox Raw OPL
    Dro,
    /// id Software Music Format
    Imf,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Dro => "DRO",
            LogFormat::Imf => "IMF",
        })
    }
}

/// Detect format from magic bytes; anything without a DRO header is IMF
pub fn detect_format(data: &[u8]) -> LogFormat {
    if data.starts_with(DRO_MAGIC) {
        LogFormat::Dro
    } else {
        LogFormat::Imf
    }
}

/// Parse an in-memory log; `imf` supplies the tick rate for IMF data
pub fn parse_log(data: &[u8], imf: ImfParser) -> Result<RegisterLog> {
    let format = detect_format(data);
    let parser: &dyn FormatParser = match format {
        LogFormat::Dro => &DroParser,
        LogFormat::Imf => &imf,
    };
    let log = parser.parse(data)?;
    info!(
        "Parsed {} log: {} writes, {:.2}s",
        parser.name(),
        log.write_count(),
        log.duration().as_secs_f64()
    );
    Ok(log)
}

/// Load a register log from disk at the default IMF tick rate
pub fn load_log<P: AsRef<Path>>(path: P) -> Result<RegisterLog> {
    load_log_with(path, ImfParser::default())
}

/// Load a register log from disk with a custom IMF parser
pub fn load_log_with<P: AsRef<Path>>(path: P, imf: ImfParser) -> Result<RegisterLog> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|e| format!("Failed to read file '{}': {}", path.display(), e))?;
    parse_log(&data, imf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reglog::dro::tests::dro_image;
    use std::io::Write;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&dro_image(&[], &[])), LogFormat::Dro);
        assert_eq!(detect_format(&[0, 0, 0, 0]), LogFormat::Imf);
        assert_eq!(detect_format(b"DBRAW"), LogFormat::Imf);
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&dro_image(&[0x00, 0x00, 0xbd], &[(2, 0x20), (0, 99)]))
            .unwrap();
        let log = load_log(file.path()).unwrap();
        assert_eq!(log.write_count(), 1);
        assert_eq!(log.total_ticks(), 100);
    }

    #[test]
    fn test_imf_rate_applies() {
        let log = parse_log(&[0x20, 0x01, 0x07, 0x00], ImfParser::new(280)).unwrap();
        assert_eq!(log.tick_rate, 280);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_log("/nonexistent/capture.dro").is_err());
    }
}
