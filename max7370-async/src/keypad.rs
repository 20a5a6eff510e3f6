//! The MAX7370 keypad: bring-up, interrupt handling and FIFO draining.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use heapless::Vec;

use crate::bus::BusSession;
use crate::config::Config;
use crate::err::{Error, InitError};
use crate::init::initialize;
use crate::keymap::{KeyCode, ScanCodeMap};
use crate::reg::{ReleaseMode, Register, FIFO_DEPTH, FIFO_EMPTY};

/// Reads allowed in one drain cycle: a full FIFO plus the empty marker.
const MAX_DRAIN_READS: usize = FIFO_DEPTH + 1;

/// Room for a full drain cycle of presses with synthesized releases.
pub const EVENT_CAPACITY: usize = 2 * MAX_DRAIN_READS;

/// Direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    /// The key was pressed.
    Down,
    /// The key was released.
    Up,
}

/// A decoded key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The logical key code.
    pub code: KeyCode,
    /// Whether the key went down or up.
    pub direction: KeyDirection,
}

impl KeyEvent {
    pub const fn down(code: KeyCode) -> Self {
        Self {
            code,
            direction: KeyDirection::Down,
        }
    }

    pub const fn up(code: KeyCode) -> Self {
        Self {
            code,
            direction: KeyDirection::Up,
        }
    }
}

/// Receives decoded key events, in FIFO order.
pub trait KeySink {
    /// Takes `event`, returning `false` if it had to be dropped.
    fn key_event(&mut self, event: KeyEvent) -> bool;
}

impl<const N: usize> KeySink for Vec<KeyEvent, N> {
    fn key_event(&mut self, event: KeyEvent) -> bool {
        if self.push(event).is_err() {
            log::warn!("Key event buffer full, dropping {event:?}");
            return false;
        }
        true
    }
}

impl<M: RawMutex, const N: usize> KeySink for Sender<'_, M, KeyEvent, N> {
    fn key_event(&mut self, event: KeyEvent) -> bool {
        if self.try_send(event).is_err() {
            log::warn!("Key event channel full, dropping {event:?}");
            return false;
        }
        true
    }
}

/// Where the drain loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    Idle,
    Draining,
}

/// A MAX7370 keypad on an I2C bus with its nINT line.
///
/// The keypad owns its bus session and scan code map. Draining takes
/// `&mut self`, so only one drain can be in flight per device.
pub struct Keypad<
    I2cType: I2c<SevenBitAddress, Error = ErrorType>,
    ErrorType: embedded_hal_async::i2c::Error,
    IrqPin: Wait,
> {
    session: BusSession<I2cType, ErrorType>,
    irq: IrqPin,
    keymap: ScanCodeMap,
    config: Config,
    state: DrainState,
    armed: bool,
}

impl<
        I2cType: I2c<SevenBitAddress, Error = ErrorType>,
        ErrorType: embedded_hal_async::i2c::Error,
        IrqPin: Wait,
    > Keypad<I2cType, ErrorType, IrqPin>
{
    /// Creates a new `Keypad`.
    ///
    /// Builds the scan code map from `config`. The device is not touched until
    /// [`Keypad::start`].
    ///
    /// # Arguments
    ///
    /// * `i2c` - An I2C peripheral that implements `embedded-hal-async::i2c::I2c`.
    /// * `irq` - The nINT input pin, asserted low while the FIFO holds events.
    /// * `config` - The device configuration.
    pub fn new(i2c: I2cType, irq: IrqPin, config: Config) -> Self {
        let keymap = config.scan_code_map();
        Self {
            session: BusSession::new(i2c, config.address),
            irq,
            keymap,
            config,
            state: DrainState::Idle,
            armed: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keymap(&self) -> &ScanCodeMap {
        &self.keymap
    }

    pub fn state(&self) -> DrainState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Probes the device, discards stale FIFO contents, writes the
    /// configuration registers and arms the interrupt.
    ///
    /// A failing probe read means the device is absent. Starting an armed
    /// keypad does nothing.
    pub async fn start(&mut self) -> Result<(), InitError<ErrorType>> {
        if self.armed {
            return Ok(());
        }
        log::info!(
            "max7370 starting on bus {} at {:#04x}, nINT on pin {}",
            self.config.bus,
            self.session.address(),
            self.config.irq_pin
        );

        let mut stale = 0;
        loop {
            let code = self
                .session
                .read_register(Register::KeyFifo)
                .await
                .map_err(InitError::DeviceAbsent)?;
            if code == FIFO_EMPTY {
                break;
            }
            stale += 1;
            if stale >= MAX_DRAIN_READS {
                log::warn!("max7370 FIFO still not empty after {stale} reads, continuing");
                break;
            }
        }
        if stale > 0 {
            log::debug!("Discarded {stale} stale FIFO entries");
        }

        initialize(&mut self.session, &self.config)
            .await
            .map_err(InitError::Configure)?;

        self.state = DrainState::Idle;
        self.armed = true;
        log::info!("max7370 armed with {} mapped keys", self.keymap.len());
        Ok(())
    }

    /// Disarms the interrupt. Calling it again, or on a keypad whose `start`
    /// failed, does nothing.
    pub fn stop(&mut self) {
        if self.armed {
            self.armed = false;
            log::info!("max7370 stopped");
        }
    }

    /// Stops the keypad and returns the I2C peripheral and interrupt pin.
    pub fn release(mut self) -> (I2cType, IrqPin) {
        self.stop();
        (self.session.release(), self.irq)
    }

    /// Waits for nINT to assert.
    pub async fn wait_for_interrupt(&mut self) -> Result<(), Error<ErrorType, IrqPin::Error>> {
        if !self.armed {
            return Err(Error::Disarmed);
        }
        self.irq.wait_for_low().await.map_err(Error::Interrupt)
    }

    /// Drains the key FIFO until the device reports it empty.
    ///
    /// Every mapped scan code is sent to `sink` as a key-down event, followed by
    /// a key-up event in [`ReleaseMode::Synthetic`]. Unmapped scan codes are
    /// dropped. A failed read ends the cycle at once and is returned; the
    /// keypad stays armed. Returns the number of events `sink` accepted.
    pub async fn drain<S: KeySink>(
        &mut self,
        sink: &mut S,
    ) -> Result<usize, Error<ErrorType, IrqPin::Error>> {
        if !self.armed {
            return Err(Error::Disarmed);
        }
        if self.state == DrainState::Draining {
            log::debug!("Previous drain was interrupted, restarting");
        }
        self.state = DrainState::Draining;

        let mut delivered = 0;
        for _ in 0..MAX_DRAIN_READS {
            let code = match self.session.read_register(Register::KeyFifo).await {
                Ok(code) => code,
                Err(err) => {
                    self.state = DrainState::Idle;
                    log::warn!("Drain abandoned after {delivered} events: {err:?}");
                    return Err(Error::Bus(err));
                }
            };
            if code == FIFO_EMPTY {
                self.state = DrainState::Idle;
                log::trace!("FIFO empty, {delivered} events");
                return Ok(delivered);
            }

            let Some(key) = self.keymap.lookup(code) else {
                log::debug!("Ignoring unmapped scan code {code:#04x}");
                continue;
            };
            delivered += sink.key_event(KeyEvent::down(key)) as usize;
            if self.config.release_mode == ReleaseMode::Synthetic {
                delivered += sink.key_event(KeyEvent::up(key)) as usize;
            }
        }

        // More transitions arrived while draining; nINT stays asserted for them.
        self.state = DrainState::Idle;
        log::debug!("FIFO not empty after {MAX_DRAIN_READS} reads, deferring");
        Ok(delivered)
    }

    /// Waits for nINT to assert, then drains the FIFO into `sink`.
    pub async fn wait_and_drain<S: KeySink>(
        &mut self,
        sink: &mut S,
    ) -> Result<usize, Error<ErrorType, IrqPin::Error>> {
        self.wait_for_interrupt().await?;
        self.drain(sink).await
    }

    /// Waits for a key interrupt and returns the decoded events.
    pub async fn read_key_events(
        &mut self,
    ) -> Result<Vec<KeyEvent, EVENT_CAPACITY>, Error<ErrorType, IrqPin::Error>> {
        let mut events = Vec::new();
        self.wait_and_drain(&mut events).await?;
        Ok(events)
    }
}
