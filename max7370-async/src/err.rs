//! Error types for the MAX7370 driver.

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

use crate::reg::Register;

/// Direction of a failed register transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// A single register transaction failed on the bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusError<E> {
    /// The register that was being accessed.
    pub register: Register,
    /// Whether the register was being read or written.
    pub access: Access,
    /// The bus failure, classified.
    pub kind: ErrorKind,
    /// The error reported by the I2C peripheral.
    pub source: E,
}

impl<E> BusError<E> {
    /// `true` if the device did not acknowledge its address, i.e. it is absent.
    pub fn is_device_absent(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        )
    }
}

/// Bringing the device up failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitError<E> {
    /// The probe read of the key FIFO failed.
    DeviceAbsent(BusError<E>),
    /// One of the configuration register writes failed.
    Configure(BusError<E>),
}

impl<E> InitError<E> {
    /// The bus failure behind this error.
    pub fn bus_error(&self) -> &BusError<E> {
        match self {
            Self::DeviceAbsent(err) | Self::Configure(err) => err,
        }
    }
}

/// The configuration source could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// There is no configuration node for the device at all.
    NodeMissing,
}

/// Waiting for a key interrupt and draining the FIFO failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error<E, P> {
    /// A FIFO read failed; the drain cycle was abandoned.
    Bus(BusError<E>),
    /// The interrupt pin reported an error.
    Interrupt(P),
    /// The device is not armed, call `start` first.
    Disarmed,
}

impl<E, P> From<BusError<E>> for Error<E, P> {
    fn from(err: BusError<E>) -> Self {
        Error::Bus(err)
    }
}
