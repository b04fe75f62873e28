//! Mitsuba motor controller bus codec
//!
//! Bit-exact encoding and decoding of the controller's fixed-length frames:
//! the one-byte telemetry request and the three telemetry frames it answers
//! with. Framing, addressing and delivery belong to the transport; this crate
//! only maps between payload bytes and typed fields.
//!
//! # Quick Start
//!
//! ```rust
//! use mitsuba_bus::{MessageKind, TelemetryRegistry};
//!
//! let mut registry = TelemetryRegistry::default();
//!
//! // Ask the controller for every frame
//! let request = registry.request_frames(true, true, true);
//! assert_eq!(request.as_ref(), &[0b0000_0111]);
//!
//! // Route a received frame 2 by its bus identifier
//! let kind = registry.handle_frame(0x08A5_0225, &[0, 0, 0, 0x02, 0x02])?;
//! assert_eq!(kind, Some(MessageKind::MotorFault));
//! assert!(registry.fault().motor_lock());
//! # Ok::<(), mitsuba_bus::Error>(())
//! ```
//!
//! # Features
//!
//! - **Table-driven layouts** - every field is a `(offset, width)` entry in a
//!   static [`protocol::layout::Layout`]
//! - **Legacy compatibility** - the frame 0 temperature overlap is reproduced
//!   by default, see [`FetTempEncoding`]
//! - **Optional range checks** - out-of-range fields are masked, or rejected
//!   with `strict_ranges`
//! - **Frame capture** - candump logs behind the `debug-tools` feature

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[cfg(feature = "debug-tools")]
pub mod capture;
pub mod protocol;
pub mod registry;

pub use protocol::{
    Error, FaultFlags, FetTempEncoding, MessageKind, MotorControlMessage, MotorFaultMessage,
    MotorStatusMessage, RequestMessage, Result, WireHeader, WireMessage,
};
pub use registry::{RegistryConfig, TelemetryRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
