//! id Software Music Format (IMF) parser
//!
//! Records are four bytes: register, value, and a little-endian u16 delay
//! in ticks to wait after the write. Type-1 files prefix the records with a
//! u16 byte length; type-0 files are bare records. The tick rate is not
//! stored in the file (700 Hz for Wolfenstein 3-D, 560 Hz for Duke Nukem II,
//! 280 Hz for Commander Keen).

use log::warn;
use nom::combinator::map;
use nom::multi::many0;
use nom::number::complete::{le_u16, u8 as byte};
use nom::sequence::tuple;
use nom::IResult;

use super::{nom_error, FormatParser, RegisterLog};
use crate::{Result, Ym3812Error};

/// Default tick rate (Wolfenstein 3-D)
pub const IMF_DEFAULT_TICK_RATE: u32 = 700;

const RECORD_LEN: usize = 4;

/// One decoded IMF record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Record {
    register: u8,
    value: u8,
    delay: u16,
}

fn record(input: &[u8]) -> IResult<&[u8], Record> {
    map(tuple((byte, byte, le_u16)), |(register, value, delay)| Record {
        register,
        value,
        delay,
    })(input)
}

/// IMF parser with a fixed tick rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImfParser {
    /// Ticks per second
    pub tick_rate: u32,
}

impl Default for ImfParser {
    fn default() -> Self {
        Self {
            tick_rate: IMF_DEFAULT_TICK_RATE,
        }
    }
}

impl ImfParser {
    /// Parser for a specific tick rate
    pub fn new(tick_rate: u32) -> Self {
        Self { tick_rate }
    }

    /// Record data of a type-0 or type-1 image
    ///
    /// A leading u16 is taken as a type-1 length when it is non-zero, a
    /// multiple of the record size and fits in the file.
    pub fn record_data(data: &[u8]) -> &[u8] {
        if data.len() >= 2 {
            let length = u16::from_le_bytes([data[0], data[1]]) as usize;
            if length != 0 && length % RECORD_LEN == 0 && length + 2 <= data.len() {
                return &data[2..2 + length];
            }
        }
        data
    }
}

impl FormatParser for ImfParser {
    fn parse(&self, data: &[u8]) -> Result<RegisterLog> {
        if self.tick_rate == 0 {
            return Err(Ym3812Error::ConfigError("IMF tick rate must be non-zero".into()));
        }

        let body = Self::record_data(data);
        let (rest, records) = many0(record)(body).map_err(|e| nom_error("IMF", e))?;
        if !rest.is_empty() {
            warn!("IMF data ends with a partial record ({} bytes dropped)", rest.len());
        }

        let mut log = RegisterLog::new(self.tick_rate);
        for rec in records {
            log.push_write(rec.register, rec.value);
            log.push_delay(rec.delay as u32);
        }
        Ok(log)
    }

    fn name(&self) -> &str {
        "IMF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reglog::LogEvent;

    const RECORDS: [u8; 12] = [
        0x00, 0x00, 0x00, 0x00, // leading reset record
        0x20, 0x01, 0x05, 0x00, // write, then 5 ticks
        0xb0, 0x32, 0x00, 0x01, // write, then 256 ticks
    ];

    #[test]
    fn test_type0() {
        let log = ImfParser::default().parse(&RECORDS).unwrap();
        assert_eq!(log.tick_rate, 700);
        assert_eq!(
            log.events,
            vec![
                LogEvent::Write { register: 0x00, value: 0x00 },
                LogEvent::Write { register: 0x20, value: 0x01 },
                LogEvent::Delay { ticks: 5 },
                LogEvent::Write { register: 0xb0, value: 0x32 },
                LogEvent::Delay { ticks: 256 },
            ]
        );
    }

    #[test]
    fn test_type1_length_prefix() {
        let mut data = vec![8, 0];
        data.extend_from_slice(&RECORDS[4..]);
        // trailing tag data after the records is ignored
        data.extend_from_slice(b"TAG");
        let log = ImfParser::new(560).parse(&data).unwrap();
        assert_eq!(log.tick_rate, 560);
        assert_eq!(log.write_count(), 2);
        assert_eq!(log.total_ticks(), 261);
    }

    #[test]
    fn test_partial_record_dropped() {
        let log = ImfParser::default().parse(&RECORDS[..10]).unwrap();
        assert_eq!(log.write_count(), 2);
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        assert!(matches!(
            ImfParser::new(0).parse(&RECORDS),
            Err(Ym3812Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_record_data_detection() {
        assert_eq!(ImfParser::record_data(&RECORDS).len(), 12);
        let data = [4, 0, 0x20, 0x01, 0x00, 0x00];
        assert_eq!(ImfParser::record_data(&data), &data[2..]);
        // length does not fit: treated as type 0
        let data = [0x40, 0, 0x20, 0x01];
        assert_eq!(ImfParser::record_data(&data).len(), 4);
    }
}
