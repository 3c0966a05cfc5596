//! YM3812 register map
//!
//! Decodes an 8-bit register address into the parameter group it controls.
//! Operator groups go through the slot table, which leaves 14 of the 32
//! offsets of every group unmapped; writes there have no effect.

use std::fmt;

/// Register offset (0x00-0x1F within a group) to slot number, -1 if unmapped
///
/// Slot `n` is operator `n & 1` of channel `n / 2`.
#[rustfmt::skip]
pub const SLOT_MAP: [i8; 32] = [
    0, 2, 4, 1, 3, 5, -1, -1,
    6, 8, 10, 7, 9, 11, -1, -1,
    12, 14, 16, 13, 15, 17, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1,
];

/// Number of channels
pub const NUM_CHANNELS: usize = 9;

/// Number of operator slots
pub const NUM_SLOTS: usize = NUM_CHANNELS * 2;

/// Rhythm / LFO depth register
pub const RHYTHM_REGISTER: u8 = 0xbd;

/// Operator addressed by a register
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId {
    /// Channel 0-8
    pub channel: usize,
    /// 0 = modulator, 1 = carrier
    pub operator: usize,
}

impl SlotId {
    /// Look up the slot for the low five address bits
    pub fn from_offset(offset: u8) -> Option<Self> {
        let slot = SLOT_MAP[(offset & 0x1f) as usize];
        if slot < 0 {
            return None;
        }
        let slot = slot as usize;
        Some(Self {
            channel: slot / 2,
            operator: slot & 1,
        })
    }

    /// Linear slot index 0-17
    pub fn index(&self) -> usize {
        self.channel * 2 + self.operator
    }
}

/// Register function addressed by a write
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    /// 0x01: test register, bit 5 enables wave select
    WaveSelectEnable,
    /// 0x02: timer A start value
    TimerA,
    /// 0x03: timer B start value
    TimerB,
    /// 0x04: IRQ reset, timer masks and start bits
    TimerControl,
    /// 0x08: CSM mode (bit 7) and note select (bit 6)
    Mode,
    /// 0x20-0x35: tremolo, vibrato, EG type, KSR, multiplier
    FlagsMultiplier(SlotId),
    /// 0x40-0x55: key scale level, total level
    KslTotalLevel(SlotId),
    /// 0x60-0x75: attack rate, decay rate
    AttackDecay(SlotId),
    /// 0x80-0x95: sustain level, release rate
    SustainRelease(SlotId),
    /// 0xA0-0xA8: fnum low 8 bits
    FnumLow(usize),
    /// 0xB0-0xB8: key on, block, fnum high 2 bits
    KeyBlockFnum(usize),
    /// 0xBD: tremolo depth, vibrato depth, rhythm control
    Rhythm,
    /// 0xC0-0xC8: feedback, connection
    FeedbackConnection(usize),
    /// 0xE0-0xF5: waveform select
    Waveform(SlotId),
    /// Anything else
    Unused,
}

impl Register {
    /// Decode a register address
    ///
    /// Follows the chip's partial decoding: 0xD0-0xD8 alias the feedback
    /// registers and only channel numbers above 8 are dropped.
    pub fn from_addr(addr: u8) -> Self {
        let operator = |build: fn(SlotId) -> Register| {
            SlotId::from_offset(addr & 0x1f).map_or(Register::Unused, build)
        };
        let channel = |build: fn(usize) -> Register| {
            let ch = (addr & 0x0f) as usize;
            if ch < NUM_CHANNELS {
                build(ch)
            } else {
                Register::Unused
            }
        };

        match addr & 0xe0 {
            0x00 => match addr & 0x1f {
                0x01 => Register::WaveSelectEnable,
                0x02 => Register::TimerA,
                0x03 => Register::TimerB,
                0x04 => Register::TimerControl,
                0x08 => Register::Mode,
                _ => Register::Unused,
            },
            0x20 => operator(Register::FlagsMultiplier),
            0x40 => operator(Register::KslTotalLevel),
            0x60 => operator(Register::AttackDecay),
            0x80 => operator(Register::SustainRelease),
            0xa0 => {
                if addr == RHYTHM_REGISTER {
                    Register::Rhythm
                } else if addr & 0x10 == 0 {
                    channel(Register::FnumLow)
                } else {
                    channel(Register::KeyBlockFnum)
                }
            }
            0xc0 => channel(Register::FeedbackConnection),
            _ => operator(Register::Waveform),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::WaveSelectEnable => write!(f, "WSE"),
            Register::TimerA => write!(f, "T1"),
            Register::TimerB => write!(f, "T2"),
            Register::TimerControl => write!(f, "IRQ"),
            Register::Mode => write!(f, "CSM/NTS"),
            Register::FlagsMultiplier(s) => write!(f, "AM/VIB/EG/KSR/MUL ch{} op{}", s.channel, s.operator + 1),
            Register::KslTotalLevel(s) => write!(f, "KSL/TL ch{} op{}", s.channel, s.operator + 1),
            Register::AttackDecay(s) => write!(f, "AR/DR ch{} op{}", s.channel, s.operator + 1),
            Register::SustainRelease(s) => write!(f, "SL/RR ch{} op{}", s.channel, s.operator + 1),
            Register::FnumLow(ch) => write!(f, "FNUM-L ch{ch}"),
            Register::KeyBlockFnum(ch) => write!(f, "KON/BLK/FNUM-H ch{ch}"),
            Register::Rhythm => write!(f, "DEP/RHY"),
            Register::FeedbackConnection(ch) => write!(f, "FB/CON ch{ch}"),
            Register::Waveform(s) => write!(f, "WS ch{} op{}", s.channel, s.operator + 1),
            Register::Unused => write!(f, "unused"),
        }
    }
}
