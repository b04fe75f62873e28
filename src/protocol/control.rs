//! Motor control message (frame 1)
//!
//! # Wire Format
//!
//! ```text
//! offset  width  field
//!      0      1  power_mode
//!      1      1  mc_mode
//!      2     10  accelerator_position
//!     12     10  regen_vr_position
//!     22      4  digit_sw_position
//!     26     10  out_target_val
//!     36      2  drive_act_stat
//!     38      1  regen_stat
//!     39      1  reserved
//! ```

use std::fmt;

use super::layout::{BitField, Layout};
use super::{MOTOR_CONTROL_SIZE, MessageKind, Result, WireHeader, WireMessage};

static FIELDS: [BitField; 8] = [
    BitField::flag("power_mode", 0),
    BitField::flag("mc_mode", 1),
    BitField::new("accelerator_position", 2, 10),
    BitField::new("regen_vr_position", 12, 10),
    BitField::new("digit_sw_position", 22, 4),
    BitField::new("out_target_val", 26, 10),
    BitField::new("drive_act_stat", 36, 2),
    BitField::flag("regen_stat", 38),
];

/// Bit layout of [`MotorControlMessage`]
pub static MOTOR_CONTROL_LAYOUT: Layout = Layout {
    name: "MotorControl",
    len: MOTOR_CONTROL_SIZE,
    fields: &FIELDS,
};

/// Operator inputs and controller mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorControlMessage {
    header: WireHeader,
    power_mode: bool,
    mc_mode: bool,
    accelerator_position: u16,
    regen_vr_position: u16,
    digit_sw_position: u8,
    out_target_val: u16,
    drive_act_stat: u8,
    regen_stat: bool,
}

impl MotorControlMessage {
    /// Create a zeroed control message
    #[must_use]
    pub const fn new(id: u32, extended: bool) -> Self {
        Self {
            header: WireHeader::new(id, MOTOR_CONTROL_SIZE, extended),
            power_mode: false,
            mc_mode: false,
            accelerator_position: 0,
            regen_vr_position: 0,
            digit_sw_position: 0,
            out_target_val: 0,
            drive_act_stat: 0,
            regen_stat: false,
        }
    }

    /// Get power mode
    #[must_use]
    pub const fn power_mode(&self) -> bool {
        self.power_mode
    }

    /// Set power mode
    pub fn set_power_mode(&mut self, value: bool) {
        self.power_mode = value;
    }

    /// Get controller mode
    #[must_use]
    pub const fn mc_mode(&self) -> bool {
        self.mc_mode
    }

    /// Set controller mode
    pub fn set_mc_mode(&mut self, value: bool) {
        self.mc_mode = value;
    }

    /// Get accelerator position (10 bits)
    #[must_use]
    pub const fn accelerator_position(&self) -> u16 {
        self.accelerator_position
    }

    /// Set accelerator position
    pub fn set_accelerator_position(&mut self, value: u16) {
        self.accelerator_position = value;
    }

    /// Get regen VR position (10 bits)
    #[must_use]
    pub const fn regen_vr_position(&self) -> u16 {
        self.regen_vr_position
    }

    /// Set regen VR position
    pub fn set_regen_vr_position(&mut self, value: u16) {
        self.regen_vr_position = value;
    }

    /// Get digital switch position (4 bits)
    #[must_use]
    pub const fn digit_sw_position(&self) -> u8 {
        self.digit_sw_position
    }

    /// Set digital switch position
    pub fn set_digit_sw_position(&mut self, value: u8) {
        self.digit_sw_position = value;
    }

    /// Get output target value (10 bits)
    #[must_use]
    pub const fn out_target_val(&self) -> u16 {
        self.out_target_val
    }

    /// Set output target value
    pub fn set_out_target_val(&mut self, value: u16) {
        self.out_target_val = value;
    }

    /// Get drive action status (2 bits)
    #[must_use]
    pub const fn drive_act_stat(&self) -> u8 {
        self.drive_act_stat
    }

    /// Set drive action status
    pub fn set_drive_act_stat(&mut self, value: u8) {
        self.drive_act_stat = value;
    }

    /// Get regen status
    #[must_use]
    pub const fn regen_stat(&self) -> bool {
        self.regen_stat
    }

    /// Set regen status
    pub fn set_regen_stat(&mut self, value: bool) {
        self.regen_stat = value;
    }

    fn values(&self) -> [u32; 8] {
        [
            self.power_mode.into(),
            self.mc_mode.into(),
            self.accelerator_position.into(),
            self.regen_vr_position.into(),
            self.digit_sw_position.into(),
            self.out_target_val.into(),
            self.drive_act_stat.into(),
            self.regen_stat.into(),
        ]
    }
}

impl WireMessage for MotorControlMessage {
    fn header(&self) -> &WireHeader {
        &self.header
    }

    fn kind(&self) -> MessageKind {
        MessageKind::MotorControl
    }

    fn write_payload(&self, buf: &mut [u8]) {
        MOTOR_CONTROL_LAYOUT.pack(&self.values(), buf);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read_payload(&mut self, buf: &[u8]) {
        let mut v = [0u32; 8];
        MOTOR_CONTROL_LAYOUT.unpack(buf, &mut v);
        self.power_mode = v[0] != 0;
        self.mc_mode = v[1] != 0;
        self.accelerator_position = v[2] as u16;
        self.regen_vr_position = v[3] as u16;
        self.digit_sw_position = v[4] as u8;
        self.out_target_val = v[5] as u16;
        self.drive_act_stat = v[6] as u8;
        self.regen_stat = v[7] != 0;
    }

    fn check_ranges(&self) -> Result<()> {
        MOTOR_CONTROL_LAYOUT.check(&self.values())
    }
}

impl fmt::Display for MotorControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "control power={} mc={} accel={} regen_vr={} sw={} target={} drive={} regen={}",
            u8::from(self.power_mode),
            u8::from(self.mc_mode),
            self.accelerator_position,
            self.regen_vr_position,
            self.digit_sw_position,
            self.out_target_val,
            self.drive_act_stat,
            u8::from(self.regen_stat)
        )
    }
}
