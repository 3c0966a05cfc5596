//! Status register and IRQ mask

use bitflags::bitflags;

bitflags! {
    /// Status register bits
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u8 {
        /// Global IRQ flag, set while any unmasked flag is raised
        const IRQ = 0x80;
        /// Timer A overflow
        const TIMER_A = 0x40;
        /// Timer B overflow
        const TIMER_B = 0x20;
        /// Delta-T end of sample (unused on YM3812, kept for masking)
        const EOS = 0x10;
        /// Buffer ready (unused on YM3812, never cleared by IRQ reset)
        const BUF_RDY = 0x08;
    }
}

/// Bits 1 and 2 always read back high
pub const STATUS_READ_ONES: u8 = 0x06;

/// Status flags with IRQ gating
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusRegister {
    status: u8,
    mask: u8,
}

impl StatusRegister {
    /// Create with no flags and an empty mask
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw status byte
    #[inline]
    pub fn bits(&self) -> u8 {
        self.status
    }

    /// Current IRQ mask
    #[inline]
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Decoded status
    pub fn flags(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.status)
    }

    /// IRQ line state
    #[inline]
    pub fn irq(&self) -> bool {
        self.status & StatusFlags::IRQ.bits() != 0
    }

    /// Raise flags; the IRQ bit follows if any masked flag is now set
    pub fn set(&mut self, flags: u8) {
        self.status |= flags;
        if self.status & 0x80 == 0 && self.status & self.mask != 0 {
            self.status |= 0x80;
        }
    }

    /// Clear flags; the IRQ bit drops once no masked flag remains
    pub fn reset(&mut self, flags: u8) {
        self.status &= !flags;
        if self.status & 0x80 != 0 && self.status & self.mask == 0 {
            self.status &= 0x7f;
        }
    }

    /// Replace the IRQ mask and re-evaluate the IRQ bit
    pub fn set_mask(&mut self, mask: u8) {
        self.mask = mask;
        self.set(0);
        self.reset(0);
    }

    /// Value seen on the address port
    #[inline]
    pub fn read(&self) -> u8 {
        (self.status & (self.mask | 0x80)) | STATUS_READ_ONES
    }
}
