//! DOSBox Raw OPL (DRO) v2.0 parser
//!
//! Format details:
//! - Header: `DBRAWOPL` magic, version (u16 major, u16 minor), 26 bytes
//!   fixed plus a codemap
//! - Length in register pairs and in milliseconds (u32, little-endian)
//! - Hardware type (0 = OPL2, 1 = dual OPL2, 2 = OPL3), format (0 =
//!   interleaved), compression (0 = none)
//! - Short and long delay codes, then a codemap translating pair codes to
//!   register numbers
//! - Data: `(code, value)` pairs; bit 7 of the code selects the second chip

use log::warn;
use nom::bytes::complete::tag;
use nom::multi::length_data;
use nom::number::complete::{le_u16, le_u32, u8 as byte};
use nom::sequence::tuple;
use nom::IResult;

use super::{nom_error, FormatParser, RegisterLog};
use crate::{Result, Ym3812Error};

/// File magic
pub const DRO_MAGIC: &[u8; 8] = b"DBRAWOPL";

/// DRO ticks are milliseconds
pub const DRO_TICK_RATE: u32 = 1000;

/// Second-chip / high-bank flag in a pair code
const HIGH_BANK: u8 = 0x80;

/// DRO v2 file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroHeader {
    /// Major version (2)
    pub version_major: u16,
    /// Minor version (0)
    pub version_minor: u16,
    /// Number of `(code, value)` pairs
    pub length_pairs: u32,
    /// Song length in milliseconds
    pub length_ms: u32,
    /// 0 = OPL2, 1 = dual OPL2, 2 = OPL3
    pub hardware_type: u8,
    /// 0 = interleaved
    pub format: u8,
    /// 0 = uncompressed
    pub compression: u8,
    /// Code for a 1-256 ms delay
    pub short_delay_code: u8,
    /// Code for a 256 ms granular delay
    pub long_delay_code: u8,
    /// Pair code to register number
    pub codemap: Vec<u8>,
}

fn header(input: &[u8]) -> IResult<&[u8], DroHeader> {
    let (input, _) = tag(&DRO_MAGIC[..])(input)?;
    let (input, (version_major, version_minor, length_pairs, length_ms)) =
        tuple((le_u16, le_u16, le_u32, le_u32))(input)?;
    let (input, (hardware_type, format, compression, short_delay_code, long_delay_code)) =
        tuple((byte, byte, byte, byte, byte))(input)?;
    let (input, codemap) = length_data(byte)(input)?;
    Ok((
        input,
        DroHeader {
            version_major,
            version_minor,
            length_pairs,
            length_ms,
            hardware_type,
            format,
            compression,
            short_delay_code,
            long_delay_code,
            codemap: codemap.to_vec(),
        },
    ))
}

/// DRO v2.0 parser
pub struct DroParser;

impl DroParser {
    /// Parse and validate the header, returning it with the pair data
    pub fn parse_header(data: &[u8]) -> Result<(DroHeader, &[u8])> {
        if data.len() < DRO_MAGIC.len() || &data[..DRO_MAGIC.len()] != DRO_MAGIC {
            return Err(Ym3812Error::ParseError("Invalid DRO magic number".into()));
        }
        let (rest, header) = header(data).map_err(|e| nom_error("DRO header", e))?;

        if (header.version_major, header.version_minor) != (2, 0) {
            return Err(Ym3812Error::ParseError(format!(
                "Unsupported DRO version {}.{}; only 2.0 is supported",
                header.version_major, header.version_minor
            )));
        }
        if header.format != 0 {
            return Err(Ym3812Error::ParseError(format!(
                "Unsupported DRO data format {}",
                header.format
            )));
        }
        if header.compression != 0 {
            return Err(Ym3812Error::ParseError(format!(
                "Unsupported DRO compression {}",
                header.compression
            )));
        }
        if header.codemap.len() > 128 {
            return Err(Ym3812Error::ParseError(format!(
                "DRO codemap has {} entries, at most 128 allowed",
                header.codemap.len()
            )));
        }
        if header.hardware_type != 0 {
            warn!(
                "DRO hardware type {} is not a single OPL2; second-bank writes are skipped",
                header.hardware_type
            );
        }
        Ok((header, rest))
    }
}

impl FormatParser for DroParser {
    fn parse(&self, data: &[u8]) -> Result<RegisterLog> {
        let (header, body) = Self::parse_header(data)?;

        let available = body.len() / 2;
        let pairs = header.length_pairs as usize;
        if available < pairs {
            warn!("DRO data truncated: header promises {pairs} pairs, file holds {available}");
        }

        let mut log = RegisterLog::new(DRO_TICK_RATE);
        let mut skipped = 0usize;
        for pair in body.chunks_exact(2).take(pairs) {
            let (code, value) = (pair[0], pair[1]);
            if code == header.short_delay_code {
                log.push_delay(value as u32 + 1);
            } else if code == header.long_delay_code {
                log.push_delay((value as u32 + 1) << 8);
            } else if code & HIGH_BANK != 0 {
                skipped += 1;
            } else {
                let register = header.codemap.get(code as usize).copied().ok_or_else(|| {
                    Ym3812Error::ParseError(format!(
                        "DRO code {code} outside codemap of {} entries",
                        header.codemap.len()
                    ))
                })?;
                log.push_write(register, value);
            }
        }
        if skipped > 0 {
            warn!("Skipped {skipped} DRO writes addressed to the second chip");
        }
        Ok(log)
    }

    fn name(&self) -> &str {
        "DRO v2.0"
    }
}
