//! Translation of raw FIFO scan codes to logical key codes.

/// A logical key code, as understood by the host's input layer.
pub type KeyCode = u16;

/// Number of valid hardware scan codes (`0..NUM_SCANCODES`).
pub const NUM_SCANCODES: usize = 254;

/// Linux evdev key codes used by the built-in layout.
pub mod keys {
    use super::KeyCode;

    pub const KEY_1: KeyCode = 2;
    pub const KEY_2: KeyCode = 3;
    pub const KEY_3: KeyCode = 4;
    pub const KEY_4: KeyCode = 5;
    pub const KEY_5: KeyCode = 6;
    pub const KEY_6: KeyCode = 7;
    pub const KEY_7: KeyCode = 8;
    pub const KEY_8: KeyCode = 9;
    pub const KEY_9: KeyCode = 10;
    pub const KEY_0: KeyCode = 11;
    pub const KEY_E: KeyCode = 18;
    pub const KEY_T: KeyCode = 20;
    pub const KEY_A: KeyCode = 30;
    pub const KEY_D: KeyCode = 32;
    pub const KEY_F: KeyCode = 33;
    pub const KEY_X: KeyCode = 45;
    pub const KEY_C: KeyCode = 46;
    pub const KEY_B: KeyCode = 48;
    pub const KEY_MAX: KeyCode = 0x2FF;
}

/// Scan codes of the reference 18-key board.
pub const DEFAULT_SCANCODES: [u32; 18] = [
    0, 8, 4, 12, 17, 2, 10, 18, 3, 11, 20, 16, 22, 14, 6, 5, 13, 21,
];

/// Key codes of the reference 18-key board, paired by position with
/// [`DEFAULT_SCANCODES`].
pub const DEFAULT_KEYCODES: [u32; 18] = [
    keys::KEY_T as u32,
    keys::KEY_0 as u32,
    keys::KEY_1 as u32,
    keys::KEY_2 as u32,
    keys::KEY_3 as u32,
    keys::KEY_4 as u32,
    keys::KEY_5 as u32,
    keys::KEY_6 as u32,
    keys::KEY_7 as u32,
    keys::KEY_8 as u32,
    keys::KEY_9 as u32,
    keys::KEY_X as u32,
    keys::KEY_A as u32,
    keys::KEY_B as u32,
    keys::KEY_C as u32,
    keys::KEY_D as u32,
    keys::KEY_E as u32,
    keys::KEY_F as u32,
];

/// Fixed table from every valid scan code to a key code, or to nothing.
///
/// Built once from the configured associations and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCodeMap {
    entries: [Option<KeyCode>; NUM_SCANCODES],
}

impl ScanCodeMap {
    /// A map with every scan code unmapped.
    pub const fn empty() -> Self {
        Self {
            entries: [None; NUM_SCANCODES],
        }
    }

    /// Builds a map from `(scancode, keycode)` association pairs.
    ///
    /// A side being `None` marks a malformed pair. Processing stops at the first
    /// malformed pair, and at the first pair whose scan code is out of range or
    /// whose key code exceeds `max_keycode`. Pairs before the stop point stay
    /// mapped, everything from it onward is dropped. Later pairs overwrite
    /// earlier ones for the same scan code.
    pub fn build<I>(associations: I, max_keycode: KeyCode) -> Self
    where
        I: IntoIterator<Item = (Option<u32>, Option<u32>)>,
    {
        let mut map = Self::empty();
        for (index, pair) in associations.into_iter().enumerate() {
            let (scancode, keycode) = match pair {
                (Some(scancode), Some(keycode)) => (scancode, keycode),
                (scancode, keycode) => {
                    log::warn!(
                        "Association {index} is incomplete ({scancode:?} -> {keycode:?}), \
                         ignoring the rest of the list"
                    );
                    break;
                }
            };
            if scancode as usize >= NUM_SCANCODES || keycode > max_keycode as u32 {
                log::warn!(
                    "Association {index} ({scancode} -> {keycode}) is out of range, \
                     ignoring the rest of the list"
                );
                break;
            }
            map.entries[scancode as usize] = Some(keycode as KeyCode);
        }
        log::debug!("Scan code map built with {} mapped keys", map.len());
        map
    }

    /// Builds a map from two parallel lists, pairing entries by position.
    ///
    /// When one list is longer than the other its extra entries are malformed
    /// pairs, so building stops at the end of the shorter list.
    pub fn from_side_lists(scancodes: &[u32], keycodes: &[u32], max_keycode: KeyCode) -> Self {
        let len = scancodes.len().max(keycodes.len());
        Self::build(
            (0..len).map(|i| (scancodes.get(i).copied(), keycodes.get(i).copied())),
            max_keycode,
        )
    }

    /// The key code for `scancode`, `None` if it is unmapped or out of range.
    pub fn lookup(&self, scancode: u8) -> Option<KeyCode> {
        self.entries.get(scancode as usize).copied().flatten()
    }

    /// Number of mapped scan codes.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ScanCodeMap {
    /// The reference 18-key board layout.
    fn default() -> Self {
        Self::from_side_lists(&DEFAULT_SCANCODES, &DEFAULT_KEYCODES, keys::KEY_MAX)
    }
}
