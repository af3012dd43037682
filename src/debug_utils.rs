use embedded_hal::i2c::{Error, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyError {
    InvalidTest,
}

impl Error for DummyError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match &self {
            DummyError::InvalidTest => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}

/// Scripted bus: serves the queued responses in order and logs every byte
/// written, so tests can assert the exact command sequence afterwards.
pub struct DummyBus<'a> {
    responses: &'a [&'a [u8]],
    position: usize,
    pub writes: Vec<u8>,
}

impl<'a> DummyBus<'a> {
    pub fn new(responses: &'a [&'a [u8]]) -> Self {
        Self {
            responses,
            position: 0,
            writes: Vec::new(),
        }
    }

    fn run(&mut self, operations: &mut [Operation<'_>]) -> Result<(), DummyError> {
        match operations {
            [Operation::Write(cmd), Operation::Read(response)] => {
                self.writes.extend_from_slice(cmd);
                self.respond(response)
            }
            [Operation::Read(response)] => self.respond(response),
            [Operation::Write(cmd)] => {
                self.writes.extend_from_slice(cmd);
                Ok(())
            }
            // Other transactions are invalid
            _ => Err(DummyError::InvalidTest),
        }
    }

    fn respond(&mut self, response: &mut [u8]) -> Result<(), DummyError> {
        let Some(next) = self.responses.get(self.position) else {
            return Err(DummyError::InvalidTest);
        };
        self.position += 1;

        if response.len() != next.len() {
            return Err(DummyError::InvalidTest);
        }
        response.copy_from_slice(next);

        Ok(())
    }
}

impl embedded_hal::i2c::ErrorType for DummyBus<'_> {
    type Error = DummyError;
}

impl embedded_hal::i2c::I2c for DummyBus<'_> {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(operations)
    }
}

impl embedded_hal_async::i2c::I2c for DummyBus<'_> {
    async fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(operations)
    }
}

/// Records every requested wait in microseconds without sleeping.
pub struct DummyDelay {
    pub waits_us: Vec<u32>,
}

impl DummyDelay {
    pub fn new() -> Self {
        Self { waits_us: Vec::new() }
    }
}

impl embedded_hal::delay::DelayNs for DummyDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_us.push(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.waits_us.push(us);
    }
}

impl embedded_hal_async::delay::DelayNs for DummyDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_us.push(ns.div_ceil(1_000));
    }

    async fn delay_us(&mut self, us: u32) {
        self.waits_us.push(us);
    }
}
