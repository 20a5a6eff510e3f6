//! The register sequence that brings the MAX7370 into its scanning state.

use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::bus::BusSession;
use crate::config::Config;
use crate::err::BusError;
use crate::reg::{configuration_value, Register};

/// Writes the configuration, debounce, interrupt, sleep and array size
/// registers, in that order.
///
/// The first failing write aborts the sequence and is returned; nothing is
/// retried.
pub async fn initialize<I2cType, ErrorType>(
    session: &mut BusSession<I2cType, ErrorType>,
    config: &Config,
) -> Result<(), BusError<ErrorType>>
where
    I2cType: I2c<SevenBitAddress, Error = ErrorType>,
    ErrorType: embedded_hal_async::i2c::Error,
{
    log::trace!("max7370::init start");

    // Sleep off, interrupt enabled and cleared on read, release reporting.
    session
        .write_register(Register::Configuration, configuration_value(config.release_mode))
        .await?;
    log::trace!("max7370::init configuration set ({:?})", config.release_mode);

    session
        .write_register(Register::Debounce, config.debounce)
        .await?;
    log::trace!("max7370::init debounce set");

    session
        .write_register(Register::Interrupt, config.interrupt_cycles)
        .await?;
    log::trace!("max7370::init interrupt cadence set");

    session
        .write_register(Register::Sleep, config.autosleep.value())
        .await?;
    log::trace!("max7370::init autosleep set ({:?})", config.autosleep);

    session
        .write_register(Register::ArraySize, config.array_size)
        .await?;
    log::trace!("max7370::init done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::ErrorKind;

    use super::*;
    use crate::bus::DEFAULT_ADDRESS;
    use crate::mock::MockI2c;
    use crate::reg::{AutoSleep, ReleaseMode};

    #[test]
    fn writes_registers_in_fixed_order() {
        let mut session = BusSession::new(MockI2c::new(), DEFAULT_ADDRESS);
        block_on(initialize(&mut session, &Config::default())).unwrap();

        assert_eq!(
            session.release().writes(),
            [(0x01, 0x2A), (0x02, 0x77), (0x03, 0x01), (0x06, 0x00), (0x30, 0xFF)]
        );
    }

    #[test]
    fn follows_configured_modes() {
        let config = Config::default()
            .with_release_mode(ReleaseMode::Synthetic)
            .with_autosleep(AutoSleep::Ms512);
        let mut session = BusSession::new(MockI2c::new(), DEFAULT_ADDRESS);
        block_on(initialize(&mut session, &config)).unwrap();

        let i2c = session.release();
        assert_eq!(i2c.register(0x01), 0x22);
        assert_eq!(i2c.register(0x06), 0x05);
    }

    #[test]
    fn first_failure_aborts_the_sequence() {
        let mut i2c = MockI2c::new();
        i2c.fail_at(2, ErrorKind::Bus);
        let mut session = BusSession::new(i2c, DEFAULT_ADDRESS);

        let err = block_on(initialize(&mut session, &Config::default())).unwrap_err();
        assert_eq!(err.register, Register::Interrupt);
        assert_eq!(err.kind, ErrorKind::Bus);
        // The failed write was attempted, nothing after it.
        assert_eq!(session.release().transactions().len(), 3);
    }
}
