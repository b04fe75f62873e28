//! Message kinds and fault flags

use std::fmt;

/// Message kinds carried on the motor controller bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageKind {
    /// Telemetry request sent to the controller
    Request = 0x00,
    /// Frame 0: battery, current, temperature, speed
    MotorStatus = 0x01,
    /// Frame 1: operator inputs and controller mode
    MotorControl = 0x02,
    /// Frame 2: fault and error flags
    MotorFault = 0x03,
}

impl MessageKind {
    /// All kinds in frame order
    pub const ALL: [Self; 4] = [
        Self::Request,
        Self::MotorStatus,
        Self::MotorControl,
        Self::MotorFault,
    ];

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Fixed payload length in bytes
    #[must_use]
    pub const fn encoded_len(self) -> usize {
        match self {
            Self::Request => super::REQUEST_SIZE,
            Self::MotorStatus => super::MOTOR_STATUS_SIZE,
            Self::MotorControl => super::MOTOR_CONTROL_SIZE,
            Self::MotorFault => super::MOTOR_FAULT_SIZE,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Request => "Request",
            Self::MotorStatus => "MotorStatus",
            Self::MotorControl => "MotorControl",
            Self::MotorFault => "MotorFault",
        };
        write!(f, "{name}")
    }
}

/// Fault and error flags reported in frame 2.
///
/// Each constant equals the flag's bit in bytes 0-3 of the payload read as a
/// little-endian `u32`. Reserved positions are never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u32", into = "u32"))]
pub struct FaultFlags(u32);

impl FaultFlags {
    /// Analog sensor error
    pub const AD_SENSOR: u32 = 1 << 0;
    /// Motor current sensor U error
    pub const MOTOR_CURRENT_SENSOR_U: u32 = 1 << 1;
    /// Motor current sensor W error
    pub const MOTOR_CURRENT_SENSOR_W: u32 = 1 << 2;
    /// FET thermistor error
    pub const FET_THERMISTOR: u32 = 1 << 3;
    /// Battery voltage sensor error
    pub const BATTERY_VOLTAGE_SENSOR: u32 = 1 << 5;
    /// Battery current sensor error
    pub const BATTERY_CURRENT_SENSOR: u32 = 1 << 6;
    /// Battery current sensor adjustment error
    pub const BATTERY_CURRENT_SENSOR_ADJ: u32 = 1 << 7;
    /// Motor current sensor adjustment error
    pub const MOTOR_CURRENT_SENSOR_ADJ: u32 = 1 << 8;
    /// Accelerator position error
    pub const ACCELERATOR_POSITION: u32 = 1 << 9;
    /// Controller voltage sensor error
    pub const CONTROLLER_VOLTAGE_SENSOR: u32 = 1 << 11;
    /// Power system error
    pub const POWER_SYSTEM: u32 = 1 << 16;
    /// Over current error
    pub const OVER_CURRENT: u32 = 1 << 17;
    /// Over voltage error
    pub const OVER_VOLTAGE: u32 = 1 << 19;
    /// Over current limit reached
    pub const OVER_CURRENT_LIMIT: u32 = 1 << 21;
    /// Motor system error
    pub const MOTOR_SYSTEM: u32 = 1 << 24;
    /// Motor locked
    pub const MOTOR_LOCK: u32 = 1 << 25;
    /// Hall sensor short circuit
    pub const HALL_SENSOR_SHORT: u32 = 1 << 26;
    /// Hall sensor open circuit
    pub const HALL_SENSOR_OPEN: u32 = 1 << 27;

    /// Valid flag bits mask
    pub const VALID_MASK: u32 = Self::AD_SENSOR
        | Self::MOTOR_CURRENT_SENSOR_U
        | Self::MOTOR_CURRENT_SENSOR_W
        | Self::FET_THERMISTOR
        | Self::BATTERY_VOLTAGE_SENSOR
        | Self::BATTERY_CURRENT_SENSOR
        | Self::BATTERY_CURRENT_SENSOR_ADJ
        | Self::MOTOR_CURRENT_SENSOR_ADJ
        | Self::ACCELERATOR_POSITION
        | Self::CONTROLLER_VOLTAGE_SENSOR
        | Self::POWER_SYSTEM
        | Self::OVER_CURRENT
        | Self::OVER_VOLTAGE
        | Self::OVER_CURRENT_LIMIT
        | Self::MOTOR_SYSTEM
        | Self::MOTOR_LOCK
        | Self::HALL_SENSOR_SHORT
        | Self::HALL_SENSOR_OPEN;

    /// Every flag with its display name, in wire order
    pub const NAMED: [(u32, &'static str); 18] = [
        (Self::AD_SENSOR, "AD_SENSOR"),
        (Self::MOTOR_CURRENT_SENSOR_U, "MOTOR_CURRENT_SENSOR_U"),
        (Self::MOTOR_CURRENT_SENSOR_W, "MOTOR_CURRENT_SENSOR_W"),
        (Self::FET_THERMISTOR, "FET_THERMISTOR"),
        (Self::BATTERY_VOLTAGE_SENSOR, "BATTERY_VOLTAGE_SENSOR"),
        (Self::BATTERY_CURRENT_SENSOR, "BATTERY_CURRENT_SENSOR"),
        (Self::BATTERY_CURRENT_SENSOR_ADJ, "BATTERY_CURRENT_SENSOR_ADJ"),
        (Self::MOTOR_CURRENT_SENSOR_ADJ, "MOTOR_CURRENT_SENSOR_ADJ"),
        (Self::ACCELERATOR_POSITION, "ACCELERATOR_POSITION"),
        (Self::CONTROLLER_VOLTAGE_SENSOR, "CONTROLLER_VOLTAGE_SENSOR"),
        (Self::POWER_SYSTEM, "POWER_SYSTEM"),
        (Self::OVER_CURRENT, "OVER_CURRENT"),
        (Self::OVER_VOLTAGE, "OVER_VOLTAGE"),
        (Self::OVER_CURRENT_LIMIT, "OVER_CURRENT_LIMIT"),
        (Self::MOTOR_SYSTEM, "MOTOR_SYSTEM"),
        (Self::MOTOR_LOCK, "MOTOR_LOCK"),
        (Self::HALL_SENSOR_SHORT, "HALL_SENSOR_SHORT"),
        (Self::HALL_SENSOR_OPEN, "HALL_SENSOR_OPEN"),
    ];

    /// Create empty flags
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create from raw bits, dropping reserved positions
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::VALID_MASK)
    }

    /// Convert to raw bits
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Set a flag; reserved bits in `flag` are dropped
    #[must_use]
    pub const fn with(mut self, flag: u32) -> Self {
        self.0 |= flag & Self::VALID_MASK;
        self
    }

    /// Set or clear a flag; reserved bits in `flag` are dropped
    pub fn set(&mut self, flag: u32, on: bool) {
        if on {
            self.0 |= flag & Self::VALID_MASK;
        } else {
            self.0 &= !flag;
        }
    }

    /// Check if flag is set
    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Check if no flag is set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the flags currently set
    pub fn active(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(bit, _)| self.has(*bit))
            .map(|(_, name)| name)
    }
}

impl From<u32> for FaultFlags {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl From<FaultFlags> for u32 {
    fn from(flags: FaultFlags) -> Self {
        flags.0
    }
}

impl fmt::Display for FaultFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.active().collect();
        if parts.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", parts.join(" | "))
        }
    }
}
