//! Scripted bus and interrupt doubles for the unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::digital;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::{self, ErrorKind, Operation, SevenBitAddress};

use crate::reg::FIFO_EMPTY;

/// One recorded register transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Write {
        address: u8,
        register: u8,
        value: u8,
    },
    Read {
        address: u8,
        register: u8,
    },
}

/// A MAX7370 stand-in: a register file plus a FIFO that reads back
/// `FIFO_EMPTY` once exhausted.
pub struct MockI2c {
    registers: [u8; 256],
    fifo: VecDeque<u8>,
    log: Vec<Transaction>,
    fail_at: Option<(usize, ErrorKind)>,
    fail_all: Option<ErrorKind>,
}

impl MockI2c {
    pub fn new() -> Self {
        Self {
            registers: [0; 256],
            fifo: VecDeque::new(),
            log: Vec::new(),
            fail_at: None,
            fail_all: None,
        }
    }

    /// Appends scan codes to the FIFO.
    pub fn queue_fifo(&mut self, codes: &[u8]) {
        self.fifo.extend(codes.iter().copied());
    }

    /// Makes the `index`-th transaction (counting from zero) fail.
    pub fn fail_at(&mut self, index: usize, kind: ErrorKind) {
        self.fail_at = Some((index, kind));
    }

    /// Makes every transaction fail.
    pub fn fail_all(&mut self, kind: ErrorKind) {
        self.fail_all = Some(kind);
    }

    /// Forgets the recorded transactions.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Only the register writes, in order.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.log
            .iter()
            .filter_map(|t| match *t {
                Transaction::Write {
                    register, value, ..
                } => Some((register, value)),
                Transaction::Read { .. } => None,
            })
            .collect()
    }

    pub fn fifo_reads(&self) -> usize {
        self.log
            .iter()
            .filter(|t| matches!(t, Transaction::Read { register: 0x00, .. }))
            .count()
    }

    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }
}

impl Default for MockI2c {
    fn default() -> Self {
        Self::new()
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl i2c::I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let index = self.log.len();
        match operations {
            [Operation::Write(bytes)] if bytes.len() == 2 => {
                let (register, value) = (bytes[0], bytes[1]);
                self.log.push(Transaction::Write {
                    address,
                    register,
                    value,
                });
                self.check_failure(index)?;
                self.registers[register as usize] = value;
            }
            [Operation::Write(reg), Operation::Read(buf)] if reg.len() == 1 => {
                let register = reg[0];
                self.log.push(Transaction::Read { address, register });
                self.check_failure(index)?;
                buf[0] = if register == 0x00 {
                    self.fifo.pop_front().unwrap_or(FIFO_EMPTY)
                } else {
                    self.registers[register as usize]
                };
            }
            _ => panic!("unexpected transaction shape"),
        }
        Ok(())
    }
}

impl MockI2c {
    fn check_failure(&self, index: usize) -> Result<(), ErrorKind> {
        if let Some(kind) = self.fail_all {
            return Err(kind);
        }
        match self.fail_at {
            Some((at, kind)) if at == index => Err(kind),
            _ => Ok(()),
        }
    }
}

/// An interrupt line that is always asserted.
#[derive(Default)]
pub struct MockIrq {
    pub waits: usize,
    pub broken: bool,
}

impl MockIrq {
    pub fn new() -> Self {
        Self::default()
    }

    fn assert(&mut self) -> Result<(), digital::ErrorKind> {
        self.waits += 1;
        if self.broken {
            Err(digital::ErrorKind::Other)
        } else {
            Ok(())
        }
    }
}

impl digital::ErrorType for MockIrq {
    type Error = digital::ErrorKind;
}

impl Wait for MockIrq {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        self.assert()
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        self.assert()
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.assert()
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.assert()
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.assert()
    }
}
