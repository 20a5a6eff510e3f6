//! Device configuration and its loading from a property source.

use embedded_hal_async::i2c::SevenBitAddress;
use heapless::Vec;

use crate::bus::DEFAULT_ADDRESS;
use crate::err::ConfigError;
use crate::keymap::{
    keys, KeyCode, ScanCodeMap, DEFAULT_KEYCODES, DEFAULT_SCANCODES, NUM_SCANCODES,
};
use crate::reg::{AutoSleep, ReleaseMode, ARRAY_SIZE_FULL, DEBOUNCE_16MS, INTERRUPT_EVERY_CYCLE};

/// Default I2C bus number.
pub const DEFAULT_BUS: u8 = 1;

/// Default GPIO number of the nINT line.
pub const DEFAULT_IRQ_PIN: u16 = 117;

/// Property names read by [`Config::from_node`].
pub mod property {
    pub const BUS: &str = "max_bus_n";
    pub const ADDRESS: &str = "max_addr";
    pub const IRQ_PIN: &str = "max_irq_pin";
    pub const DEBOUNCE: &str = "max_debounce";
    pub const INTERRUPT_CYCLES: &str = "max_int_cycles";
    pub const ARRAY_SIZE: &str = "max_arr_size";
    pub const KEY_RELEASE: &str = "max_key_release";
    pub const AUTOSLEEP: &str = "max_autosleep";
    pub const KEYCODE_MAX: &str = "max_keycode_max";
    pub const SCANCODES: &str = "max_scancodes";
    pub const KEYCODES: &str = "max_keycodes";
}

/// Device-tree style access to the configuration node of the device.
pub trait PropertySource {
    /// Reads a scalar property.
    fn read_u32(&self, name: &str) -> Option<u32>;

    /// Reads entry `index` of an array property.
    fn read_u32_index(&self, name: &str, index: usize) -> Option<u32>;
}

/// A fixed table of named `u32` array properties.
///
/// A scalar property is an array with a single entry.
pub struct StaticProperties<'a> {
    properties: &'a [(&'a str, &'a [u32])],
}

impl<'a> StaticProperties<'a> {
    pub const fn new(properties: &'a [(&'a str, &'a [u32])]) -> Self {
        Self { properties }
    }

    fn find(&self, name: &str) -> Option<&'a [u32]> {
        self.properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, values)| *values)
    }
}

impl PropertySource for StaticProperties<'_> {
    fn read_u32(&self, name: &str) -> Option<u32> {
        self.find(name).and_then(|values| values.first().copied())
    }

    fn read_u32_index(&self, name: &str, index: usize) -> Option<u32> {
        self.find(name).and_then(|values| values.get(index).copied())
    }
}

/// Everything needed to bring up one MAX7370 and decode its key events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of the I2C bus the device sits on.
    pub bus: u8,
    /// 7-bit I2C address of the device.
    pub address: SevenBitAddress,
    /// GPIO number of the nINT line.
    pub irq_pin: u16,
    /// Debounce register value.
    pub debounce: u8,
    /// Interrupt register value: debounce cycles per nINT assertion.
    pub interrupt_cycles: u8,
    /// Key-switch array size register value.
    pub array_size: u8,
    /// How key releases are reported.
    pub release_mode: ReleaseMode,
    /// Autosleep interval.
    pub autosleep: AutoSleep,
    /// Largest accepted logical key code.
    pub max_keycode: KeyCode,
    /// Scan code side of the association list.
    pub scancodes: Vec<u32, NUM_SCANCODES>,
    /// Key code side of the association list, paired with `scancodes` by position.
    pub keycodes: Vec<u32, NUM_SCANCODES>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: DEFAULT_BUS,
            address: DEFAULT_ADDRESS,
            irq_pin: DEFAULT_IRQ_PIN,
            debounce: DEBOUNCE_16MS,
            interrupt_cycles: INTERRUPT_EVERY_CYCLE,
            array_size: ARRAY_SIZE_FULL,
            release_mode: ReleaseMode::default(),
            autosleep: AutoSleep::default(),
            max_keycode: keys::KEY_MAX,
            scancodes: Vec::from_slice(&DEFAULT_SCANCODES).unwrap_or_default(),
            keycodes: Vec::from_slice(&DEFAULT_KEYCODES).unwrap_or_default(),
        }
    }
}

impl Config {
    pub fn with_bus(mut self, bus: u8) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_address(mut self, address: SevenBitAddress) -> Self {
        self.address = address;
        self
    }

    pub fn with_irq_pin(mut self, irq_pin: u16) -> Self {
        self.irq_pin = irq_pin;
        self
    }

    pub fn with_debounce(mut self, debounce: u8) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_release_mode(mut self, release_mode: ReleaseMode) -> Self {
        self.release_mode = release_mode;
        self
    }

    pub fn with_autosleep(mut self, autosleep: AutoSleep) -> Self {
        self.autosleep = autosleep;
        self
    }

    pub fn with_max_keycode(mut self, max_keycode: KeyCode) -> Self {
        self.max_keycode = max_keycode;
        self
    }

    /// Replaces the association list. Lists longer than the scan code space
    /// are cut to [`NUM_SCANCODES`] entries.
    pub fn with_associations(mut self, scancodes: &[u32], keycodes: &[u32]) -> Self {
        self.scancodes = truncated(scancodes);
        self.keycodes = truncated(keycodes);
        self
    }

    /// Builds the scan code map described by the association list.
    pub fn scan_code_map(&self) -> ScanCodeMap {
        ScanCodeMap::from_side_lists(&self.scancodes, &self.keycodes, self.max_keycode)
    }

    /// Loads the configuration from the device's property node.
    ///
    /// A missing node is an error. A property that is missing, or whose value
    /// is out of range, falls back to its default.
    pub fn from_node<P: PropertySource>(node: Option<&P>) -> Result<Self, ConfigError> {
        let Some(node) = node else {
            log::info!("max7370: no configuration node");
            return Err(ConfigError::NodeMissing);
        };
        let defaults = Self::default();

        let release_mode = read_parsed(node, property::KEY_RELEASE, defaults.release_mode, |v| {
            match v {
                0 => Some(ReleaseMode::Synthetic),
                1 => Some(ReleaseMode::Hardware),
                _ => None,
            }
        });
        let autosleep = read_parsed(node, property::AUTOSLEEP, defaults.autosleep, |v| {
            u8::try_from(v).ok().and_then(AutoSleep::from_value)
        });
        let address = read_parsed(node, property::ADDRESS, defaults.address, |v| {
            u8::try_from(v).ok().filter(|addr| *addr <= 0x7F)
        });

        let mut config = Self {
            bus: read_u8_or(node, property::BUS, defaults.bus),
            address,
            irq_pin: read_u16_or(node, property::IRQ_PIN, defaults.irq_pin),
            debounce: read_u8_or(node, property::DEBOUNCE, defaults.debounce),
            interrupt_cycles: read_u8_or(
                node,
                property::INTERRUPT_CYCLES,
                defaults.interrupt_cycles,
            ),
            array_size: read_u8_or(node, property::ARRAY_SIZE, defaults.array_size),
            release_mode,
            autosleep,
            max_keycode: read_u16_or(node, property::KEYCODE_MAX, defaults.max_keycode),
            scancodes: read_list(node, property::SCANCODES),
            keycodes: read_list(node, property::KEYCODES),
        };

        if config.scancodes.is_empty() && config.keycodes.is_empty() {
            log::info!("max7370: no key table found, using the built-in layout");
            config.scancodes = defaults.scancodes;
            config.keycodes = defaults.keycodes;
        }

        Ok(config)
    }
}

fn truncated(values: &[u32]) -> Vec<u32, NUM_SCANCODES> {
    let len = values.len().min(NUM_SCANCODES);
    Vec::from_slice(&values[..len]).unwrap_or_default()
}

/// Reads `name` and converts it with `parse`, falling back to `default` when
/// the property is missing or `parse` rejects its value.
fn read_parsed<P, T, F>(node: &P, name: &'static str, default: T, parse: F) -> T
where
    P: PropertySource,
    T: core::fmt::Debug,
    F: FnOnce(u32) -> Option<T>,
{
    let Some(value) = node.read_u32(name) else {
        log::info!("max7370: {name} not found, use default value: {default:?}");
        return default;
    };
    parse(value).unwrap_or_else(|| {
        log::info!("max7370: {name} value {value} out of range, use default value: {default:?}");
        default
    })
}

fn read_u8_or<P: PropertySource>(node: &P, name: &'static str, default: u8) -> u8 {
    read_parsed(node, name, default, |v| u8::try_from(v).ok())
}

fn read_u16_or<P: PropertySource>(node: &P, name: &'static str, default: u16) -> u16 {
    read_parsed(node, name, default, |v| u16::try_from(v).ok())
}

/// Reads an array property entry by entry until the first missing index.
fn read_list<P: PropertySource>(node: &P, name: &str) -> Vec<u32, NUM_SCANCODES> {
    let mut list = Vec::new();
    while let Some(value) = node.read_u32_index(name, list.len()) {
        if list.push(value).is_err() {
            log::warn!("max7370: {name} has over {NUM_SCANCODES} entries, ignoring the rest");
            break;
        }
    }
    list
}
