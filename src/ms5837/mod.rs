use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::measspec::*;

pub mod asynch;
pub mod commands;
pub mod compensation;

use self::commands::Osr;
use self::compensation::Calibration;

const ADDR: u8 = 0x76;

// Datasheet PROM reload time after reset, and a short settle after the ADC
// readout before the device accepts the next command.
const RESET_RECOVERY_US: u32 = 2_800;
const READOUT_SETTLE_US: u32 = 20;

/// One compensated acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Centidegrees Celsius (2000 = 20.00 °C).
    pub temperature: i32,
    /// Hundredths of a millibar.
    pub pressure: i32,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.2} °C, {:.2} mbar",
            self.temperature as f32 / 100.0,
            self.pressure as f32 / 100.0
        )
    }
}

pub struct MS5837<I2C, D> {
    sensor: Sensor<I2C>,
    delay: D,
    oversampling: Osr,
    calibration: Option<Calibration>,
}

impl<I2C, D> MS5837<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            sensor: Sensor::new(i2c, ADDR),
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
    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.reset()?;
        self.read_calibration()
    }

    /// Sends the reset command and waits out the PROM reload time. After a
    /// failed reset the device state is unknown; the cycle must not
    /// continue.
    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.command(commands::RESET)?;
        self.delay.delay_us(RESET_RECOVERY_US);

        Ok(())
    }

    /// Reads the seven PROM words and replaces the calibration store. A
    /// failure on any word leaves the store empty, never partially filled.
    pub fn read_calibration(&mut self) -> Result<(), Error<I2C::Error>> {
        self.calibration = None;

        let mut words = [0u16; 7];
        for (word, cmd) in words
            .iter_mut()
            .zip((commands::PROM_START..commands::PROM_STOP).step_by(2))
        {
            *word = self.sensor.read_word(cmd)?;
        }

        self.calibration = Some(Calibration::from_prom(&words)?);

        Ok(())
    }

    /// Raw 24-bit temperature sample (D2) at the configured oversampling.
    pub fn read_raw_temperature(&mut self) -> Result<u32, Error<I2C::Error>> {
        self.acquire(self.oversampling.temperature_command())
    }

    /// Raw 24-bit pressure sample (D1) at the configured oversampling.
    pub fn read_raw_pressure(&mut self) -> Result<u32, Error<I2C::Error>> {
        self.acquire(self.oversampling.pressure_command())
    }

    /// Compensated temperature in centidegrees Celsius, second-order
    /// correction included.
    pub fn read_temperature(&mut self) -> Result<i32, Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Error::Uncalibrated)?;

        let raw = self.read_raw_temperature()?;
        let delta = calibration.temperature_difference(raw);
        let first_order = calibration.temperature(delta);

        Ok(first_order - compensation::second_order_correction(first_order, delta))
    }

    /// One full acquisition cycle: temperature conversion, pressure
    /// conversion, then compensation of both outputs.
    pub fn read_measurement(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Error::Uncalibrated)?;

        let raw_temperature = self.read_raw_temperature()?;
        let raw_pressure = self.read_raw_pressure()?;

        Ok(calibration.compensate(raw_pressure, raw_temperature))
    }

    // Trigger a conversion, wait out the maximum conversion time for the
    // configured oversampling, then fetch the 24-bit result.
    fn acquire(&mut self, trigger: Cmd) -> Result<u32, Error<I2C::Error>> {
        self.sensor.command(trigger)?;
        self.delay.delay_us(self.oversampling.conversion_time_us());

        let sample = self.sensor.read_sample(commands::ADC_READ)?;
        self.delay.delay_us(READOUT_SETTLE_US);

        Ok(sample)
    }
}
