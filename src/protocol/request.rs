//! Telemetry request message
//!
//! ```text
//! bit:  7 6 5 4 3 2 1 0
//!      +-+-+-+-+-+-+-+-+
//!      |  reserved |2|1|0|   frame request flags
//!      +-+-+-+-+-+-+-+-+
//! ```

use std::fmt;

use super::layout::{BitField, Layout};
use super::{MessageKind, REQUEST_SIZE, WireHeader, WireMessage};

static FIELDS: [BitField; 3] = [
    BitField::flag("request_frame0", 0),
    BitField::flag("request_frame1", 1),
    BitField::flag("request_frame2", 2),
];

/// Bit layout of [`RequestMessage`]
pub static REQUEST_LAYOUT: Layout = Layout {
    name: "Request",
    len: REQUEST_SIZE,
    fields: &FIELDS,
};

/// Asks the controller to transmit any of its three telemetry frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    header: WireHeader,
    frame0: bool,
    frame1: bool,
    frame2: bool,
}

impl RequestMessage {
    /// Create a request with no frames selected
    #[must_use]
    pub const fn new(id: u32, extended: bool) -> Self {
        Self {
            header: WireHeader::new(id, REQUEST_SIZE, extended),
            frame0: false,
            frame1: false,
            frame2: false,
        }
    }

    /// Select exactly the given frames
    pub fn set_requests(&mut self, frame0: bool, frame1: bool, frame2: bool) {
        self.frame0 = frame0;
        self.frame1 = frame1;
        self.frame2 = frame2;
    }

    /// Deselect every frame
    pub fn clear_requests(&mut self) {
        self.set_requests(false, false, false);
    }

    /// Select every frame
    pub fn set_all_frames(&mut self) {
        self.set_requests(true, true, true);
    }

    /// Get frame 0 (motor status) request
    #[must_use]
    pub const fn frame0(&self) -> bool {
        self.frame0
    }

    /// Get frame 1 (motor control) request
    #[must_use]
    pub const fn frame1(&self) -> bool {
        self.frame1
    }

    /// Get frame 2 (motor fault) request
    #[must_use]
    pub const fn frame2(&self) -> bool {
        self.frame2
    }

    /// Telemetry kinds currently requested
    #[must_use]
    pub fn requested_kinds(&self) -> Vec<MessageKind> {
        [
            (self.frame0, MessageKind::MotorStatus),
            (self.frame1, MessageKind::MotorControl),
            (self.frame2, MessageKind::MotorFault),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect()
    }

    fn values(&self) -> [u32; 3] {
        [self.frame0.into(), self.frame1.into(), self.frame2.into()]
    }
}

impl WireMessage for RequestMessage {
    fn header(&self) -> &WireHeader {
        &self.header
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Request
    }

    fn write_payload(&self, buf: &mut [u8]) {
        REQUEST_LAYOUT.pack(&self.values(), buf);
    }

    fn read_payload(&mut self, buf: &[u8]) {
        let mut v = [0u32; 3];
        REQUEST_LAYOUT.unpack(buf, &mut v);
        self.set_requests(v[0] != 0, v[1] != 0, v[2] != 0);
    }
}

impl fmt::Display for RequestMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request frame0={} frame1={} frame2={}",
            self.frame0, self.frame1, self.frame2
        )
    }
}
