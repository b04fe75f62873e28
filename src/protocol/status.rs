//! Motor status message (frame 0)
//!
//! # Wire Format
//!
//! Eight bytes, LSB-first, fields packed back to back:
//!
//! ```text
//! offset  width  field
//!      0     10  battery_voltage
//!     10      9  battery_current
//!     19      1  battery_current_dir
//!     20     10  motor_current_pk_avg
//!     30      5  fet_temp              (legacy encoder writes 8 bits)
//!     35     12  motor_rpm
//!     47     10  pwm_duty
//!     57      7  lead_angle
//! ```
//!
//! Existing controllers encode the FET temperature from its full byte, so
//! bits 5-7 of the temperature land on bits 0-2 of the RPM. Decoders only ever
//! recover five bits of temperature. [`FetTempEncoding`] selects whether to
//! reproduce that on transmit.

use std::fmt;

use tracing::warn;

use super::layout::{BitField, Layout};
use super::metrics::Metrics;
use super::{MOTOR_STATUS_SIZE, MessageKind, Result, WireHeader, WireMessage};

const BATTERY_VOLTAGE: BitField = BitField::new("battery_voltage", 0, 10);
const BATTERY_CURRENT: BitField = BitField::new("battery_current", 10, 9);
const BATTERY_CURRENT_DIR: BitField = BitField::flag("battery_current_dir", 19);
const MOTOR_CURRENT_PK_AVG: BitField = BitField::new("motor_current_pk_avg", 20, 10);
const FET_TEMP: BitField = BitField::new("fet_temp", 30, 5);
const MOTOR_RPM: BitField = BitField::new("motor_rpm", 35, 12);
const PWM_DUTY: BitField = BitField::new("pwm_duty", 47, 10);
const LEAD_ANGLE: BitField = BitField::new("lead_angle", 57, 7);

static LEGACY_FIELDS: [BitField; 8] = [
    BATTERY_VOLTAGE,
    BATTERY_CURRENT,
    BATTERY_CURRENT_DIR,
    MOTOR_CURRENT_PK_AVG,
    FET_TEMP.with_wire_width(8),
    MOTOR_RPM,
    PWM_DUTY,
    LEAD_ANGLE,
];

static MASKED_FIELDS: [BitField; 8] = [
    BATTERY_VOLTAGE,
    BATTERY_CURRENT,
    BATTERY_CURRENT_DIR,
    MOTOR_CURRENT_PK_AVG,
    FET_TEMP,
    MOTOR_RPM,
    PWM_DUTY,
    LEAD_ANGLE,
];

/// Status layout as encoded by existing bus peers
pub static MOTOR_STATUS_LEGACY_LAYOUT: Layout = Layout {
    name: "MotorStatus",
    len: MOTOR_STATUS_SIZE,
    fields: &LEGACY_FIELDS,
};

/// Status layout with the FET temperature confined to its five bits
pub static MOTOR_STATUS_MASKED_LAYOUT: Layout = Layout {
    name: "MotorStatus",
    len: MOTOR_STATUS_SIZE,
    fields: &MASKED_FIELDS,
};

/// How the FET temperature is written on transmit.
///
/// Decoding is identical under both policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FetTempEncoding {
    /// Write the full temperature byte; values above 31 corrupt `motor_rpm`
    #[default]
    Legacy,
    /// Write only the five decodable bits
    Masked,
}

impl FetTempEncoding {
    /// Layout used for encoding under this policy
    #[must_use]
    pub fn layout(self) -> &'static Layout {
        match self {
            Self::Legacy => &MOTOR_STATUS_LEGACY_LAYOUT,
            Self::Masked => &MOTOR_STATUS_MASKED_LAYOUT,
        }
    }
}

/// Battery, current, temperature and speed telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorStatusMessage {
    header: WireHeader,
    fet_encoding: FetTempEncoding,
    battery_voltage: u16,
    battery_current: u16,
    battery_current_dir: bool,
    motor_current_pk_avg: u16,
    fet_temp: u8,
    motor_rpm: u16,
    pwm_duty: u16,
    lead_angle: u8,
}

impl MotorStatusMessage {
    /// Largest FET temperature that survives a round trip
    pub const FET_TEMP_MAX: u8 = 31;

    /// Create a zeroed status message using the legacy encoding
    #[must_use]
    pub const fn new(id: u32, extended: bool) -> Self {
        Self {
            header: WireHeader::new(id, MOTOR_STATUS_SIZE, extended),
            fet_encoding: FetTempEncoding::Legacy,
            battery_voltage: 0,
            battery_current: 0,
            battery_current_dir: false,
            motor_current_pk_avg: 0,
            fet_temp: 0,
            motor_rpm: 0,
            pwm_duty: 0,
            lead_angle: 0,
        }
    }

    /// Select the FET temperature encoding
    #[must_use]
    pub const fn with_fet_encoding(mut self, encoding: FetTempEncoding) -> Self {
        self.fet_encoding = encoding;
        self
    }

    /// Get the FET temperature encoding
    #[must_use]
    pub const fn fet_encoding(&self) -> FetTempEncoding {
        self.fet_encoding
    }

    /// Layout used when encoding this message
    #[must_use]
    pub fn layout(&self) -> &'static Layout {
        self.fet_encoding.layout()
    }

    /// Get battery voltage (10 bits)
    #[must_use]
    pub const fn battery_voltage(&self) -> u16 {
        self.battery_voltage
    }

    /// Set battery voltage
    pub fn set_battery_voltage(&mut self, value: u16) {
        self.battery_voltage = value;
    }

    /// Get battery current (9 bits)
    #[must_use]
    pub const fn battery_current(&self) -> u16 {
        self.battery_current
    }

    /// Set battery current
    pub fn set_battery_current(&mut self, value: u16) {
        self.battery_current = value;
    }

    /// Get battery current direction
    #[must_use]
    pub const fn battery_current_dir(&self) -> bool {
        self.battery_current_dir
    }

    /// Set battery current direction
    pub fn set_battery_current_dir(&mut self, value: bool) {
        self.battery_current_dir = value;
    }

    /// Get motor current peak average (10 bits)
    #[must_use]
    pub const fn motor_current_pk_avg(&self) -> u16 {
        self.motor_current_pk_avg
    }

    /// Set motor current peak average
    pub fn set_motor_current_pk_avg(&mut self, value: u16) {
        self.motor_current_pk_avg = value;
    }

    /// Get FET temperature (5 bits recovered on decode)
    #[must_use]
    pub const fn fet_temp(&self) -> u8 {
        self.fet_temp
    }

    /// Set FET temperature
    pub fn set_fet_temp(&mut self, value: u8) {
        self.fet_temp = value;
    }

    /// Get motor RPM (12 bits)
    #[must_use]
    pub const fn motor_rpm(&self) -> u16 {
        self.motor_rpm
    }

    /// Set motor RPM
    pub fn set_motor_rpm(&mut self, value: u16) {
        self.motor_rpm = value;
    }

    /// Get PWM duty (10 bits)
    #[must_use]
    pub const fn pwm_duty(&self) -> u16 {
        self.pwm_duty
    }

    /// Set PWM duty
    pub fn set_pwm_duty(&mut self, value: u16) {
        self.pwm_duty = value;
    }

    /// Get lead angle (7 bits)
    #[must_use]
    pub const fn lead_angle(&self) -> u8 {
        self.lead_angle
    }

    /// Set lead angle
    pub fn set_lead_angle(&mut self, value: u8) {
        self.lead_angle = value;
    }

    fn values(&self) -> [u32; 8] {
        [
            self.battery_voltage.into(),
            self.battery_current.into(),
            self.battery_current_dir.into(),
            self.motor_current_pk_avg.into(),
            self.fet_temp.into(),
            self.motor_rpm.into(),
            self.pwm_duty.into(),
            self.lead_angle.into(),
        ]
    }
}

impl WireMessage for MotorStatusMessage {
    fn header(&self) -> &WireHeader {
        &self.header
    }

    fn kind(&self) -> MessageKind {
        MessageKind::MotorStatus
    }

    fn write_payload(&self, buf: &mut [u8]) {
        if self.fet_encoding == FetTempEncoding::Legacy && self.fet_temp > Self::FET_TEMP_MAX {
            warn!(
                fet_temp = self.fet_temp,
                motor_rpm = self.motor_rpm,
                "fet temperature exceeds 5 bits; high bits overwrite motor rpm"
            );
            Metrics::record_fet_temp_spill();
        }
        self.layout().pack(&self.values(), buf);
    }

    // Every value is masked to at most 12 bits, so the narrowing casts are lossless.
    #[allow(clippy::cast_possible_truncation)]
    fn read_payload(&mut self, buf: &[u8]) {
        let mut v = [0u32; 8];
        self.layout().unpack(buf, &mut v);
        self.battery_voltage = v[0] as u16;
        self.battery_current = v[1] as u16;
        self.battery_current_dir = v[2] != 0;
        self.motor_current_pk_avg = v[3] as u16;
        self.fet_temp = v[4] as u8;
        self.motor_rpm = v[5] as u16;
        self.pwm_duty = v[6] as u16;
        self.lead_angle = v[7] as u8;
    }

    fn check_ranges(&self) -> Result<()> {
        // Decodable widths are shared by both layouts.
        MOTOR_STATUS_MASKED_LAYOUT.check(&self.values())
    }
}

impl fmt::Display for MotorStatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status batt={} cur={}{} motor_cur={} fet={} rpm={} pwm={} lead={}",
            self.battery_voltage,
            if self.battery_current_dir { "-" } else { "+" },
            self.battery_current,
            self.motor_current_pk_avg,
            self.fet_temp,
            self.motor_rpm,
            self.pwm_duty,
            self.lead_angle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Error;

    fn sample() -> MotorStatusMessage {
        let mut msg = MotorStatusMessage::new(0x0885_0225, true);
        msg.set_battery_voltage(0x2A5);
        msg.set_battery_current(0x13C);
        msg.set_battery_current_dir(true);
        msg.set_motor_current_pk_avg(0x3C3);
        msg.set_fet_temp(0x15);
        msg.set_motor_rpm(0xA5A);
        msg.set_pwm_duty(0x201);
        msg.set_lead_angle(0x55);
        msg
    }

    #[test]
    fn test_roundtrip() {
        let original = sample();
        let mut decoded = MotorStatusMessage::new(0x0885_0225, true);
        decoded.decode(&original.to_bytes()).unwrap();
        assert_eq!(decoded, original);
    }

    fn encode_only(set: impl FnOnce(&mut MotorStatusMessage)) -> [u8; 8] {
        let mut msg = MotorStatusMessage::new(1, true);
        set(&mut msg);
        let mut buf = [0u8; 8];
        msg.encode(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_boundary_bytes() {
        // Each field on its own at its maximum lights up exactly its own bits.
        assert_eq!(
            encode_only(|m| m.set_battery_voltage(1023)),
            [0xFF, 0x03, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            encode_only(|m| m.set_battery_current(511)),
            [0, 0xFC, 0x07, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            encode_only(|m| m.set_battery_current_dir(true)),
            [0, 0, 0x08, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            encode_only(|m| m.set_motor_current_pk_avg(1023)),
            [0, 0, 0xF0, 0x3F, 0, 0, 0, 0]
        );
        assert_eq!(
            encode_only(|m| m.set_fet_temp(31)),
            [0, 0, 0, 0xC0, 0x07, 0, 0, 0]
        );
        assert_eq!(
            encode_only(|m| m.set_motor_rpm(4095)),
            [0, 0, 0, 0, 0xF8, 0x7F, 0, 0]
        );
        assert_eq!(
            encode_only(|m| m.set_pwm_duty(1023)),
            [0, 0, 0, 0, 0, 0x80, 0xFF, 0x01]
        );
        assert_eq!(
            encode_only(|m| m.set_lead_angle(127)),
            [0, 0, 0, 0, 0, 0, 0, 0xFE]
        );
    }

    #[test]
    fn test_legacy_fet_overflow_corrupts_rpm() {
        let mut msg = MotorStatusMessage::new(1, true);
        msg.set_fet_temp(0b1010_0110);
        msg.set_motor_rpm(0b1000_0000_1000);

        let mut decoded = MotorStatusMessage::new(1, true);
        decoded.decode(&msg.to_bytes()).unwrap();
        assert_eq!(decoded.fet_temp(), 0b0_0110);
        // Temperature bits 5-7 (101) are ORed into rpm bits 0-2.
        assert_eq!(decoded.motor_rpm(), 0b1000_0000_1101);
    }

    #[test]
    fn test_masked_fet_overflow_keeps_rpm() {
        let mut msg = MotorStatusMessage::new(1, true).with_fet_encoding(FetTempEncoding::Masked);
        msg.set_fet_temp(0b1010_0110);
        msg.set_motor_rpm(0b1000_0000_1000);

        let mut decoded = MotorStatusMessage::new(1, true);
        decoded.decode(&msg.to_bytes()).unwrap();
        assert_eq!(decoded.fet_temp(), 0b0_0110);
        assert_eq!(decoded.motor_rpm(), 0b1000_0000_1000);
    }

    #[test]
    fn test_encodings_agree_in_range() {
        let legacy = sample();
        let masked = sample().with_fet_encoding(FetTempEncoding::Masked);
        assert_eq!(legacy.to_bytes(), masked.to_bytes());
    }

    #[test]
    fn test_only_legacy_layout_overlaps() {
        assert_eq!(
            MOTOR_STATUS_LEGACY_LAYOUT.overlaps(),
            vec![("fet_temp", "motor_rpm")]
        );
        assert!(MOTOR_STATUS_MASKED_LAYOUT.overlaps().is_empty());
        assert!(MOTOR_STATUS_MASKED_LAYOUT
            .reserved_mask()
            .iter()
            .all(|b| *b == 0));
    }

    #[test]
    fn test_check_ranges() {
        let mut msg = sample();
        assert!(msg.check_ranges().is_ok());
        msg.set_fet_temp(32);
        assert!(matches!(
            msg.check_ranges(),
            Err(Error::FieldOverflow {
                field: "fet_temp",
                max: 31,
                ..
            })
        ));
    }

    #[test]
    fn test_short_buffer() {
        let mut msg = MotorStatusMessage::new(1, true);
        assert!(matches!(
            msg.decode(&[0u8; 7]),
            Err(Error::BufferTooSmall { needed: 8, got: 7 })
        ));
    }
}
