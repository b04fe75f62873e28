//! Motor fault message (frame 2)
//!
//! Bytes 0-3 carry single-bit fault flags at the positions given by
//! [`FaultFlags`]; byte 4 bits 0-1 carry the overheat level. Every other bit is
//! reserved, written as zero and ignored on decode.

use std::fmt;

use super::layout::{BitField, Layout};
use super::{FaultFlags, MOTOR_FAULT_SIZE, MessageKind, Result, WireHeader, WireMessage};

static FIELDS: [BitField; 19] = [
    BitField::flag("ad_sensor_error", 0),
    BitField::flag("motor_current_sensor_u_error", 1),
    BitField::flag("motor_current_sensor_w_error", 2),
    BitField::flag("fet_therm_error", 3),
    BitField::flag("batt_volt_sensor_error", 5),
    BitField::flag("batt_current_sensor_error", 6),
    BitField::flag("batt_current_sensor_adj_error", 7),
    BitField::flag("motor_current_sensor_adj_error", 8),
    BitField::flag("accel_pos_error", 9),
    BitField::flag("cont_volt_sensor_error", 11),
    BitField::flag("power_system_error", 16),
    BitField::flag("over_current_error", 17),
    BitField::flag("over_volt_error", 19),
    BitField::flag("over_current_limit", 21),
    BitField::flag("motor_system_error", 24),
    BitField::flag("motor_lock", 25),
    BitField::flag("hall_sensor_short", 26),
    BitField::flag("hall_sensor_open", 27),
    BitField::new("overheat_level", 32, 2),
];

/// Bit layout of [`MotorFaultMessage`]
pub static MOTOR_FAULT_LAYOUT: Layout = Layout {
    name: "MotorFault",
    len: MOTOR_FAULT_SIZE,
    fields: &FIELDS,
};

const FLAG_COUNT: usize = FaultFlags::NAMED.len();

/// Fault and error flags plus overheat level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorFaultMessage {
    header: WireHeader,
    faults: FaultFlags,
    overheat_level: u8,
}

impl MotorFaultMessage {
    /// Create a fault message with nothing reported
    #[must_use]
    pub const fn new(id: u32, extended: bool) -> Self {
        Self {
            header: WireHeader::new(id, MOTOR_FAULT_SIZE, extended),
            faults: FaultFlags::new(),
            overheat_level: 0,
        }
    }

    /// Get all fault flags
    #[must_use]
    pub const fn faults(&self) -> FaultFlags {
        self.faults
    }

    /// Replace all fault flags
    pub fn set_faults(&mut self, faults: FaultFlags) {
        self.faults = faults;
    }

    /// Set or clear a single flag
    pub fn set_fault(&mut self, flag: u32, on: bool) {
        self.faults.set(flag, on);
    }

    /// Check if any fault flag is set
    #[must_use]
    pub const fn has_faults(&self) -> bool {
        !self.faults.is_empty()
    }

    /// Get overheat level (2 bits)
    #[must_use]
    pub const fn overheat_level(&self) -> u8 {
        self.overheat_level
    }

    /// Set overheat level
    pub fn set_overheat_level(&mut self, value: u8) {
        self.overheat_level = value;
    }

    /// Get analog sensor error
    #[must_use]
    pub const fn ad_sensor_error(&self) -> bool {
        self.faults.has(FaultFlags::AD_SENSOR)
    }

    /// Get motor current sensor U error
    #[must_use]
    pub const fn motor_current_sensor_u_error(&self) -> bool {
        self.faults.has(FaultFlags::MOTOR_CURRENT_SENSOR_U)
    }

    /// Get motor current sensor W error
    #[must_use]
    pub const fn motor_current_sensor_w_error(&self) -> bool {
        self.faults.has(FaultFlags::MOTOR_CURRENT_SENSOR_W)
    }

    /// Get FET thermistor error
    #[must_use]
    pub const fn fet_therm_error(&self) -> bool {
        self.faults.has(FaultFlags::FET_THERMISTOR)
    }

    /// Get battery voltage sensor error
    #[must_use]
    pub const fn batt_volt_sensor_error(&self) -> bool {
        self.faults.has(FaultFlags::BATTERY_VOLTAGE_SENSOR)
    }

    /// Get battery current sensor error
    #[must_use]
    pub const fn batt_current_sensor_error(&self) -> bool {
        self.faults.has(FaultFlags::BATTERY_CURRENT_SENSOR)
    }

    /// Get battery current sensor adjustment error
    #[must_use]
    pub const fn batt_current_sensor_adj_error(&self) -> bool {
        self.faults.has(FaultFlags::BATTERY_CURRENT_SENSOR_ADJ)
    }

    /// Get motor current sensor adjustment error
    #[must_use]
    pub const fn motor_current_sensor_adj_error(&self) -> bool {
        self.faults.has(FaultFlags::MOTOR_CURRENT_SENSOR_ADJ)
    }

    /// Get accelerator position error
    #[must_use]
    pub const fn accel_pos_error(&self) -> bool {
        self.faults.has(FaultFlags::ACCELERATOR_POSITION)
    }

    /// Get controller voltage sensor error
    #[must_use]
    pub const fn cont_volt_sensor_error(&self) -> bool {
        self.faults.has(FaultFlags::CONTROLLER_VOLTAGE_SENSOR)
    }

    /// Get power system error
    #[must_use]
    pub const fn power_system_error(&self) -> bool {
        self.faults.has(FaultFlags::POWER_SYSTEM)
    }

    /// Get over current error
    #[must_use]
    pub const fn over_current_error(&self) -> bool {
        self.faults.has(FaultFlags::OVER_CURRENT)
    }

    /// Get over voltage error
    #[must_use]
    pub const fn over_volt_error(&self) -> bool {
        self.faults.has(FaultFlags::OVER_VOLTAGE)
    }

    /// Get over current limit
    #[must_use]
    pub const fn over_current_limit(&self) -> bool {
        self.faults.has(FaultFlags::OVER_CURRENT_LIMIT)
    }

    /// Get motor system error
    #[must_use]
    pub const fn motor_system_error(&self) -> bool {
        self.faults.has(FaultFlags::MOTOR_SYSTEM)
    }

    /// Get motor lock
    #[must_use]
    pub const fn motor_lock(&self) -> bool {
        self.faults.has(FaultFlags::MOTOR_LOCK)
    }

    /// Get hall sensor short
    #[must_use]
    pub const fn hall_sensor_short(&self) -> bool {
        self.faults.has(FaultFlags::HALL_SENSOR_SHORT)
    }

    /// Get hall sensor open
    #[must_use]
    pub const fn hall_sensor_open(&self) -> bool {
        self.faults.has(FaultFlags::HALL_SENSOR_OPEN)
    }

    fn values(&self) -> [u32; FLAG_COUNT + 1] {
        let mut v = [0u32; FLAG_COUNT + 1];
        for (slot, (bit, _)) in v.iter_mut().zip(FaultFlags::NAMED) {
            *slot = self.faults.has(bit).into();
        }
        v[FLAG_COUNT] = self.overheat_level.into();
        v
    }
}

impl WireMessage for MotorFaultMessage {
    fn header(&self) -> &WireHeader {
        &self.header
    }

    fn kind(&self) -> MessageKind {
        MessageKind::MotorFault
    }

    fn write_payload(&self, buf: &mut [u8]) {
        MOTOR_FAULT_LAYOUT.pack(&self.values(), buf);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read_payload(&mut self, buf: &[u8]) {
        let mut v = [0u32; FLAG_COUNT + 1];
        MOTOR_FAULT_LAYOUT.unpack(buf, &mut v);
        let mut faults = FaultFlags::new();
        for (&on, (bit, _)) in v.iter().zip(FaultFlags::NAMED) {
            faults.set(bit, on != 0);
        }
        self.faults = faults;
        self.overheat_level = v[FLAG_COUNT] as u8;
    }

    fn check_ranges(&self) -> Result<()> {
        MOTOR_FAULT_LAYOUT.check(&self.values())
    }
}

impl fmt::Display for MotorFaultMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fault overheat={} flags={}",
            self.overheat_level, self.faults
        )
    }
}
