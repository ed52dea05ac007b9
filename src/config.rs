//! Device configuration types
//!
//! The enumerants are opaque register values: the driver writes them through
//! unchanged and does not check that a combination of mode, preset and rate is
//! coherent. That is the caller's responsibility.

/// Operation mode (written to the OP_MODE register, 0x4C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationMode {
    /// Normal (continuous) measurement
    Normal = 0x00,
    /// Sleep mode
    Sleep = 0x03,
}

impl OperationMode {
    /// Register value for this mode
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Preset mode (written to the PRESET_MODE register, 0x4E)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresetMode {
    /// High accuracy preset
    HighAccuracy = 0x03,
}

impl PresetMode {
    /// Register value for this preset
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Output data rate (written to the MODE_RATE register, 0x4C)
///
/// The data rate code sits in bits 5:3 of the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    /// 10 Hz (power-on default)
    Hz10 = 0x00,
    /// 2 Hz
    Hz2 = 0x08,
    /// 6 Hz
    Hz6 = 0x10,
    /// 8 Hz
    Hz8 = 0x18,
    /// 15 Hz
    Hz15 = 0x20,
    /// 20 Hz
    Hz20 = 0x28,
    /// 25 Hz
    Hz25 = 0x30,
    /// 30 Hz
    Hz30 = 0x38,
}

impl DataRate {
    /// Register value for this rate
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Output data rate in Hz
    #[must_use]
    pub const fn hz(self) -> u8 {
        match self {
            Self::Hz10 => 10,
            Self::Hz2 => 2,
            Self::Hz6 => 6,
            Self::Hz8 => 8,
            Self::Hz15 => 15,
            Self::Hz20 => 20,
            Self::Hz25 => 25,
            Self::Hz30 => 30,
        }
    }
}

/// Measurement configuration applied by [`Bmm150Driver::configure`](crate::Bmm150Driver::configure)
///
/// Writes happen in field order: operation mode, preset, rate, then axis
/// enable. Because the rate shares a register with the operation mode and the
/// axis enable shares one with the preset, the later write of each pair is the
/// one left in the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bmm150Config {
    /// Operation mode
    pub operation_mode: OperationMode,
    /// Preset mode
    pub preset_mode: PresetMode,
    /// Output data rate
    pub data_rate: DataRate,
    /// Enable X, Y and Z measurement
    pub enable_axes: bool,
}

impl Default for Bmm150Config {
    fn default() -> Self {
        Self {
            operation_mode: OperationMode::Normal,
            preset_mode: PresetMode::HighAccuracy,
            data_rate: DataRate::Hz10,
            enable_axes: true,
        }
    }
}
