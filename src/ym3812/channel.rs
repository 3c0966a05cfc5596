//! FM channel: two operators, frequency registers and routing

use super::constants::{ENV_QUIET, KSL_TAB};
use super::operator::{FnumTable, KeySource, Operator};

/// Modulator operator index
pub const MODULATOR: usize = 0;
/// Carrier operator index
pub const CARRIER: usize = 1;

/// Destination of the modulator output (register 0xC0 bit 0)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Connection {
    /// Serial FM: modulator feeds the carrier's phase
    #[default]
    ModulationBus,
    /// Parallel (additive): modulator is heard directly
    ChannelOutput,
}

/// Feedback shift for the three FB bits of register 0xC0
#[inline]
pub fn feedback_shift(value: u8) -> u8 {
    let fb = (value >> 1) & 7;
    if fb != 0 {
        fb + 7
    } else {
        0
    }
}

/// Key code from block/fnum: block in bits 3-1, one fnum bit in bit 0
///
/// With note select set the low bit comes from fnum bit 8, otherwise from
/// fnum bit 9 (the reverse of what the manuals state).
#[inline]
pub fn key_code(block_fnum: u32, note_select: bool) -> u8 {
    let low = if note_select {
        (block_fnum & 0x100) >> 8
    } else {
        (block_fnum & 0x200) >> 9
    };
    (((block_fnum & 0x1c00) >> 9) | low) as u8
}

/// One of the nine FM channels
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Channel {
    operators: [Operator; 2],
    block_fnum: u32,
    fc: u32,
    ksl_base: u32,
    kcode: u8,
    feedback: u8,
    connection: Connection,
}

impl Channel {
    /// Create a channel with cleared registers
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator by index ([`MODULATOR`] or [`CARRIER`])
    #[inline]
    pub fn operator(&self, slot: usize) -> &Operator {
        &self.operators[slot & 1]
    }

    /// Mutable operator by index
    #[inline]
    pub fn operator_mut(&mut self, slot: usize) -> &mut Operator {
        &mut self.operators[slot & 1]
    }

    /// Both operators
    pub fn operators(&self) -> &[Operator; 2] {
        &self.operators
    }

    pub(crate) fn operators_mut(&mut self) -> &mut [Operator; 2] {
        &mut self.operators
    }

    /// Combined block (bits 12-10) and fnum (bits 9-0)
    #[inline]
    pub fn block_fnum(&self) -> u32 {
        self.block_fnum
    }

    /// Block 7 normalised frequency counter
    pub fn frequency_counter(&self) -> u32 {
        self.fc
    }

    /// Key scale level base
    pub fn ksl_base(&self) -> u32 {
        self.ksl_base
    }

    /// Key code driving the key scale rate
    pub fn key_code(&self) -> u8 {
        self.kcode
    }

    /// Feedback shift (0 = off)
    pub fn feedback(&self) -> u8 {
        self.feedback
    }

    /// Modulator routing
    pub fn connection(&self) -> Connection {
        self.connection
    }

    /// Register 0xC0 group: feedback (bits 1-3) and connection (bit 0)
    pub fn set_feedback_connection(&mut self, value: u8) {
        self.feedback = feedback_shift(value);
        self.connection = if value & 1 != 0 {
            Connection::ChannelOutput
        } else {
            Connection::ModulationBus
        };
    }

    /// Register 0x40 group for one operator
    pub fn set_ksl_tl(&mut self, slot: usize, value: u8) {
        let ksl_base = self.ksl_base;
        self.operators[slot & 1].set_ksl_tl(value, ksl_base);
    }

    /// Register 0x20 group for one operator
    pub fn set_flags_multiplier(&mut self, slot: usize, value: u8) {
        let (fc, kcode) = (self.fc, self.kcode);
        let op = &mut self.operators[slot & 1];
        op.set_flags_multiplier(value);
        op.update_frequency(fc, kcode);
    }

    /// New block/fnum value, deriving everything that depends on it
    ///
    /// Returns `false` when the value did not change, in which case nothing
    /// is recomputed.
    pub fn set_block_fnum(&mut self, block_fnum: u32, note_select: bool, fn_tab: &FnumTable) -> bool {
        if self.block_fnum == block_fnum {
            return false;
        }
        let block = block_fnum >> 10;
        self.block_fnum = block_fnum;
        self.ksl_base = KSL_TAB[(block_fnum >> 6) as usize] as u32;
        self.fc = fn_tab[(block_fnum & 0x03ff) as usize] >> (7 - block);
        self.kcode = key_code(block_fnum, note_select);

        let (fc, kcode, ksl_base) = (self.fc, self.kcode, self.ksl_base);
        for op in self.operators.iter_mut() {
            op.refresh_total_level(ksl_base);
            op.update_frequency(fc, kcode);
        }
        true
    }

    /// Key both operators on
    pub fn key_on(&mut self, source: KeySource) {
        for op in self.operators.iter_mut() {
            op.key_on(source);
        }
    }

    /// Key both operators off
    pub fn key_off(&mut self, source: KeySource) {
        for op in self.operators.iter_mut() {
            op.key_off(source);
        }
    }

    /// Compute this channel's contribution for the current sample
    #[inline]
    pub fn synthesize(&mut self, lfo_am: u32) -> i32 {
        let mut bus = 0;
        let mut out = 0;

        let feedback = self.feedback;
        let modulator = &mut self.operators[MODULATOR];
        let env = modulator.volume(lfo_am);
        let routed = modulator.modulate(env, ENV_QUIET, feedback);
        match self.connection {
            Connection::ModulationBus => bus += routed,
            Connection::ChannelOutput => out += routed,
        }

        let carrier = &self.operators[CARRIER];
        let env = carrier.volume(lfo_am);
        if env < ENV_QUIET {
            out += carrier.carrier_output(env, bus);
        }
        out
    }
}
