//! Single-byte register access to the MAX7370 over I2C.

use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::err::{Access, BusError};
use crate::reg::Register;

/// Default 7-bit address of the MAX7370 (AD0 tied to GND).
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x38;

/// The open connection to one MAX7370 on its bus.
///
/// Every operation is one bus transaction touching one register. Failures are
/// never retried here.
pub struct BusSession<
    I2cType: I2c<SevenBitAddress, Error = ErrorType>,
    ErrorType: embedded_hal_async::i2c::Error,
> {
    i2c: I2cType,
    address: SevenBitAddress,
}

impl<
        I2cType: I2c<SevenBitAddress, Error = ErrorType>,
        ErrorType: embedded_hal_async::i2c::Error,
    > BusSession<I2cType, ErrorType>
{
    /// Binds `i2c` to the device at `address`.
    pub fn new(i2c: I2cType, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    /// The device address this session talks to.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Writes `value` to `register`.
    pub async fn write_register(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), BusError<ErrorType>> {
        log::trace!("max7370 write {register:?} = {value:#04x}");
        self.i2c
            .write(self.address, &[register.addr(), value])
            .await
            .map_err(|err| {
                log::warn!("Error writing {register:?} ({value:#04x}): {err:?}");
                BusError {
                    register,
                    access: Access::Write,
                    kind: err.kind(),
                    source: err,
                }
            })
    }

    /// Reads the current value of `register`.
    pub async fn read_register(&mut self, register: Register) -> Result<u8, BusError<ErrorType>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register.addr()], &mut buf)
            .await
            .map_err(|err| {
                log::warn!("Error reading {register:?}: {err:?}");
                BusError {
                    register,
                    access: Access::Read,
                    kind: err.kind(),
                    source: err,
                }
            })?;
        log::trace!("max7370 read {register:?} = {:#04x}", buf[0]);
        Ok(buf[0])
    }

    #[cfg(test)]
    pub(crate) fn i2c_mut(&mut self) -> &mut I2cType {
        &mut self.i2c
    }

    /// Ends the session, handing the bus back.
    pub fn release(self) -> I2cType {
        self.i2c
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, NoAcknowledgeSource};

    use super::*;
    use crate::mock::{MockI2c, Transaction};

    #[test]
    fn write_register_sends_address_then_value() {
        let mut session = BusSession::new(MockI2c::new(), DEFAULT_ADDRESS);
        block_on(session.write_register(Register::Debounce, 0x77)).unwrap();

        let i2c = session.release();
        assert_eq!(
            i2c.transactions(),
            &[Transaction::Write {
                address: 0x38,
                register: 0x02,
                value: 0x77
            }]
        );
    }

    #[test]
    fn read_register_returns_device_value() {
        let mut i2c = MockI2c::new();
        i2c.queue_fifo(&[0x08]);
        let mut session = BusSession::new(i2c, 0x3A);

        assert_eq!(block_on(session.read_register(Register::KeyFifo)), Ok(0x08));
        assert_eq!(
            session.release().transactions(),
            &[Transaction::Read {
                address: 0x3A,
                register: 0x00
            }]
        );
    }

    #[test]
    fn failure_carries_register_and_kind() {
        let mut i2c = MockI2c::new();
        i2c.fail_all(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        let mut session = BusSession::new(i2c, DEFAULT_ADDRESS);

        let err = block_on(session.read_register(Register::KeyFifo)).unwrap_err();
        assert_eq!(err.register, Register::KeyFifo);
        assert_eq!(err.access, Access::Read);
        assert!(err.is_device_absent());

        let err = block_on(session.write_register(Register::Sleep, 0)).unwrap_err();
        assert_eq!(err.register, Register::Sleep);
        assert_eq!(err.access, Access::Write);
    }

    #[test]
    fn bus_errors_are_not_device_absent() {
        let mut i2c = MockI2c::new();
        i2c.fail_all(ErrorKind::Bus);
        let mut session = BusSession::new(i2c, DEFAULT_ADDRESS);

        let err = block_on(session.read_register(Register::KeyFifo)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Bus);
        assert!(!err.is_device_absent());
    }
}
