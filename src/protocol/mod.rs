//! Motor controller bus protocol
//!
//! This module provides the bit layouts, message types and codec for the
//! controller's fixed-length frames.

mod codec;
mod control;
mod error;
mod fault;
pub mod layout;
mod message;
pub mod metrics;
mod request;
mod status;
mod types;

pub use codec::{decode, encode};
pub use control::{MOTOR_CONTROL_LAYOUT, MotorControlMessage};
pub use error::{Error, Result};
pub use fault::{MOTOR_FAULT_LAYOUT, MotorFaultMessage};
pub use message::{WireHeader, WireMessage};
pub use request::{REQUEST_LAYOUT, RequestMessage};
pub use status::{
    FetTempEncoding, MOTOR_STATUS_LEGACY_LAYOUT, MOTOR_STATUS_MASKED_LAYOUT, MotorStatusMessage,
};
pub use types::{FaultFlags, MessageKind};

/// Request message size in bytes
pub const REQUEST_SIZE: usize = 1;

/// Motor status (frame 0) size in bytes
pub const MOTOR_STATUS_SIZE: usize = 8;

/// Motor control (frame 1) size in bytes
pub const MOTOR_CONTROL_SIZE: usize = 5;

/// Motor fault (frame 2) size in bytes
pub const MOTOR_FAULT_SIZE: usize = 5;

/// Largest payload of any message kind
pub const MAX_PAYLOAD_SIZE: usize = MOTOR_STATUS_SIZE;

/// Stock identifier of the telemetry request
pub const DEFAULT_REQUEST_ID: u32 = 0x08F8_9540;

/// Stock identifier of frame 0
pub const DEFAULT_MOTOR_STATUS_ID: u32 = 0x0885_0225;

/// Stock identifier of frame 1
pub const DEFAULT_MOTOR_CONTROL_ID: u32 = 0x0895_0225;

/// Stock identifier of frame 2
pub const DEFAULT_MOTOR_FAULT_ID: u32 = 0x08A5_0225;
