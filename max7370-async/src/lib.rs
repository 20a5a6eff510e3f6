//! An asynchronous, `no_std` driver for the MAX7370 key-switch controller.
//!
//! This driver provides a `Keypad` to interact with the MAX7370 over I2C. It
//! brings the chip into its scanning state, waits for the nINT line and drains
//! the key FIFO, turning raw scan codes into logical key events through a
//! configurable scan code map.
//!
//! # Usage
//!
//! To use this driver, you need an I2C peripheral implementation that satisfies the
//! `embedded-hal-async::i2c::I2c` trait, and an interrupt pin implementing
//! `embedded-hal-async::digital::Wait`.
//!
//! ```ignore
//! # #![no_std]
//! # #![no_main]
//! # use esp_hal::i2c::master::I2c;
//! # use esp_hal::gpio::{Input, InputConfig};
//! # use esp_hal::Config;
//! # use esp_hal::clock::CpuClock;
//! # use esp_hal::time::Rate;
//! # use embassy_executor::Spawner;
//! use max7370_async::{Config as KeypadConfig, Keypad};
//!
//! #[esp_hal_embassy::main]
//! async fn main(spawner: Spawner) {
//!     let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));
//!     let keypad_int = Input::new(peripherals.GPIO15, InputConfig::default());
//!     let config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100));
//!     let i2c = I2c::new(peripherals.I2C0, config)
//!         .unwrap()
//!         .with_sda(peripherals.GPIO13)
//!         .with_scl(peripherals.GPIO14)
//!         .into_async();
//!
//!     let mut keypad = Keypad::new(i2c, keypad_int, KeypadConfig::default());
//!     keypad.start().await.unwrap();
//!
//!     loop {
//!         if let Ok(events) = keypad.read_key_events().await {
//!             for event in events {
//!                 // log::info!("Key Event: {:?}", event);
//!             }
//!         }
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod config;
pub mod err;
pub mod init;
pub mod keymap;
pub mod keypad;
pub mod reg;

#[cfg(test)]
mod mock;

pub use config::{Config, PropertySource, StaticProperties};
pub use err::{BusError, ConfigError, Error, InitError};
pub use keymap::{KeyCode, ScanCodeMap};
pub use keypad::{KeyDirection, KeyEvent, KeySink, Keypad};
pub use reg::{AutoSleep, ReleaseMode};
