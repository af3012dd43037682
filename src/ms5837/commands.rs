use crate::measspec::Cmd;

// Basic commands
pub const RESET: Cmd = 0x1E;
pub const ADC_READ: Cmd = 0x00;

// Calibration PROM, seven 16-bit words at even addresses (stop exclusive)
pub const PROM_START: Cmd = 0xA0;
pub const PROM_STOP: Cmd = 0xAE;

// Conversion trigger bases; the oversampling setting adds its offset
pub const CONVERT_PRESSURE: Cmd = 0x40;
pub const CONVERT_TEMPERATURE: Cmd = 0x50;

/// Oversampling ratio for a single conversion, trading conversion time for
/// resolution.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Osr {
    Osr256 = 0,
    Osr512 = 1,
    Osr1024 = 2,
    Osr2048 = 3,
    Osr4096 = 4,
    #[default]
    Osr8192 = 5,
}

impl Osr {
    /// D1 (pressure) conversion trigger for this setting.
    pub fn pressure_command(self) -> Cmd {
        CONVERT_PRESSURE + 2 * self as Cmd
    }

    /// D2 (temperature) conversion trigger for this setting.
    pub fn temperature_command(self) -> Cmd {
        CONVERT_TEMPERATURE + 2 * self as Cmd
    }

    /// Datasheet maximum ADC conversion time for this setting. The host must
    /// wait at least this long between trigger and readout.
    pub fn conversion_time_us(self) -> u32 {
        match self {
            Osr::Osr256 => 560,
            Osr::Osr512 => 1_100,
            Osr::Osr1024 => 2_170,
            Osr::Osr2048 => 4_320,
            Osr::Osr4096 => 8_610,
            Osr::Osr8192 => 17_200,
        }
    }
}
