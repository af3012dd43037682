//! Async variant of the driver for `embedded-hal-async` targets. Identical
//! sequencing and arithmetic; only the bus and delay traits differ.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use super::commands::{self, Osr};
use super::compensation::{self, Calibration};
use super::{ADDR, Measurement, READOUT_SETTLE_US, RESET_RECOVERY_US};
use crate::measspec::{AsyncSensor, Cmd, Error};

pub struct MS5837<I2C, D> {
    sensor: AsyncSensor<I2C>,
    delay: D,
    oversampling: Osr,
    calibration: Option<Calibration>,
}

impl<I2C, D> MS5837<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            sensor: AsyncSensor::new(i2c, ADDR),
            delay,
            oversampling: Osr::default(),
            calibration: None,
        }
    }

    /// Selects the oversampling ratio used for subsequent conversions.
    pub fn with_oversampling(mut self, oversampling: Osr) -> Self {
        self.oversampling = oversampling;
        self
    }

    /// The calibration constants, if they have been read.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    pub fn release(self) -> I2C {
        self.sensor.release()
    }
}

impl<I2C: I2c, D: DelayNs> MS5837<I2C, D> {
    /// Resets the device and reads the factory calibration. Must complete
    /// successfully before any compensated read.
    pub async fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.reset().await?;
        self.read_calibration().await
    }

    /// Sends the reset command and waits out the PROM reload time.
    pub async fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.command(commands::RESET).await?;
        self.delay.delay_us(RESET_RECOVERY_US).await;

        Ok(())
    }

    /// Reads the seven PROM words and replaces the calibration store. A
    /// failure on any word leaves the store empty, never partially filled.
    pub async fn read_calibration(&mut self) -> Result<(), Error<I2C::Error>> {
        self.calibration = None;

        let mut words = [0u16; 7];
        for (i, cmd) in (commands::PROM_START..commands::PROM_STOP)
            .step_by(2)
            .enumerate()
        {
            words[i] = self.sensor.read_word(cmd).await?;
        }

        self.calibration = Some(Calibration::from_prom(&words)?);

        Ok(())
    }

    /// Raw 24-bit temperature sample (D2) at the configured oversampling.
    pub async fn read_raw_temperature(&mut self) -> Result<u32, Error<I2C::Error>> {
        self.acquire(self.oversampling.temperature_command()).await
    }

    /// Raw 24-bit pressure sample (D1) at the configured oversampling.
    pub async fn read_raw_pressure(&mut self) -> Result<u32, Error<I2C::Error>> {
        self.acquire(self.oversampling.pressure_command()).await
    }

    /// Compensated temperature in centidegrees Celsius, second-order
    /// correction included.
    pub async fn read_temperature(&mut self) -> Result<i32, Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Error::Uncalibrated)?;

        let raw = self.read_raw_temperature().await?;
        let delta = calibration.temperature_difference(raw);
        let first_order = calibration.temperature(delta);

        Ok(first_order - compensation::second_order_correction(first_order, delta))
    }

    /// One full acquisition cycle: temperature conversion, pressure
    /// conversion, then compensation of both outputs.
    pub async fn read_measurement(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Error::Uncalibrated)?;

        let raw_temperature = self.read_raw_temperature().await?;
        let raw_pressure = self.read_raw_pressure().await?;

        Ok(calibration.compensate(raw_pressure, raw_temperature))
    }

    async fn acquire(&mut self, trigger: Cmd) -> Result<u32, Error<I2C::Error>> {
        self.sensor.command(trigger).await?;
        self.delay
            .delay_us(self.oversampling.conversion_time_us())
            .await;

        let sample = self.sensor.read_sample(commands::ADC_READ).await?;
        self.delay.delay_us(READOUT_SETTLE_US).await;

        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_utils::{DummyBus, DummyDelay};

    #[tokio::test]
    async fn test_async_full_measurement() {
        let mut bus = DummyBus::new(&[
            &[0xF4, 0x66],
            &[0xB5, 0x24],
            &[0xAB, 0xCD],
            &[0x71, 0x83],
            &[0x6C, 0xC2],
            &[0x7B, 0x41],
            &[0x6E, 0x05],
            &[0x7B, 0x41, 0x44],
            &[0x62, 0xA7, 0xA4],
        ]);
        let mut delay = DummyDelay::new();
        {
            let mut baro = MS5837::new(&mut bus, &mut delay);
            baro.init().await.unwrap();
            assert_eq!(
                baro.read_measurement().await,
                Ok(Measurement {
                    temperature: 2000,
                    pressure: 110_002,
                })
            );
        }

        assert_eq!(
            bus.writes,
            [0x1E, 0xA0, 0xA2, 0xA4, 0xA6, 0xA8, 0xAA, 0xAC, 0x5A, 0x00, 0x4A, 0x00]
        );
        assert_eq!(delay.waits_us, [2_800, 17_200, 20, 17_200, 20]);
    }

    #[tokio::test]
    async fn test_async_compensated_reads_require_calibration() {
        let mut bus = DummyBus::new(&[]);
        let mut delay = DummyDelay::new();
        let mut baro = MS5837::new(&mut bus, &mut delay);

        assert_eq!(baro.read_temperature().await, Err(Error::Uncalibrated));
    }
}
