//! MAX7370 register map and register values.

/// Reading this value from the key FIFO means the FIFO is empty.
pub const FIFO_EMPTY: u8 = 0x3F;

/// Number of key transitions the chip can buffer.
pub const FIFO_DEPTH: usize = 16;

// --- Configuration register bits ---
pub const CFG_SLEEP: u8 = 1 << 7;
pub const CFG_INTERRUPT: u8 = 1 << 5;
pub const CFG_KEY_RELEASE: u8 = 1 << 3;
pub const CFG_WAKEUP: u8 = 1 << 1;
pub const CFG_TIMEOUT: u8 = 1 << 0;

/// Debounce register value for a 16 ms debounce time.
pub const DEBOUNCE_16MS: u8 = 0x77;

/// Interrupt register value asserting nINT on every debounce cycle.
pub const INTERRUPT_EVERY_CYCLE: u8 = 0x01;

/// Array size register value enabling every matrix position.
pub const ARRAY_SIZE_FULL: u8 = 0xFF;

/// The registers of the MAX7370.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Key event FIFO. Each read pops one entry.
    KeyFifo = 0x00,
    /// Configuration bits, see the `CFG_*` constants.
    Configuration = 0x01,
    /// Debounce time and GPO enable.
    Debounce = 0x02,
    /// Number of debounce cycles before nINT asserts.
    Interrupt = 0x03,
    /// GPO ports.
    Ports = 0x04,
    /// Key repeat delay and rate.
    KeyRepeat = 0x05,
    /// Autosleep interval.
    Sleep = 0x06,
    /// Size of the scanned key-switch matrix.
    ArraySize = 0x30,
}

impl Register {
    /// The register's address on the bus.
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Autosleep interval written to the [`Register::Sleep`] register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoSleep {
    /// The chip never enters sleep on its own.
    #[default]
    Disabled,
    Ms8192,
    Ms4096,
    Ms2048,
    Ms1024,
    Ms512,
    Ms256,
}

impl AutoSleep {
    /// The register value selecting this interval.
    pub const fn value(self) -> u8 {
        match self {
            Self::Disabled => 0x00,
            Self::Ms8192 => 0x01,
            Self::Ms4096 => 0x02,
            Self::Ms2048 => 0x03,
            Self::Ms1024 => 0x04,
            Self::Ms512 => 0x05,
            Self::Ms256 => 0x06,
        }
    }

    /// Parses a register value, `None` if it selects no known interval.
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Disabled),
            0x01 => Some(Self::Ms8192),
            0x02 => Some(Self::Ms4096),
            0x03 => Some(Self::Ms2048),
            0x04 => Some(Self::Ms1024),
            0x05 => Some(Self::Ms512),
            0x06 => Some(Self::Ms256),
            _ => None,
        }
    }
}

/// How key releases reach the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseMode {
    /// The chip reports releases as their own scan codes through the FIFO.
    #[default]
    Hardware,
    /// Only presses are reported; the driver emits the release itself right
    /// after each press.
    Synthetic,
}

/// Configuration register value: sleep off, interrupt enabled and cleared on
/// read, key release reporting per `mode`.
pub const fn configuration_value(mode: ReleaseMode) -> u8 {
    let base = CFG_INTERRUPT | CFG_WAKEUP;
    match mode {
        ReleaseMode::Hardware => base | CFG_KEY_RELEASE,
        ReleaseMode::Synthetic => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_release_sets_release_bit() {
        assert_eq!(configuration_value(ReleaseMode::Hardware), 0x2A);
        assert_eq!(configuration_value(ReleaseMode::Synthetic), 0x22);
        assert_eq!(configuration_value(ReleaseMode::Hardware) & CFG_SLEEP, 0);
    }

    #[test]
    fn autosleep_values() {
        assert_eq!(AutoSleep::default().value(), 0x00);
        assert_eq!(AutoSleep::Ms256.value(), 0x06);
        assert_eq!(AutoSleep::from_value(0x03), Some(AutoSleep::Ms2048));
        assert_eq!(AutoSleep::from_value(0x07), None);
    }

    #[test]
    fn register_addresses() {
        assert_eq!(Register::KeyFifo.addr(), 0x00);
        assert_eq!(Register::Sleep.addr(), 0x06);
        assert_eq!(Register::ArraySize.addr(), 0x30);
    }
}
