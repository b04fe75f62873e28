//! Telemetry registry: one live instance per message kind.
//!
//! The registry owns the four messages, routes incoming frames to the owning
//! instance by bus identifier and encodes outgoing ones. It holds no locks;
//! callers sharing it across threads must serialize access themselves.

use bytes::Bytes;
use tracing::{debug, trace, warn};

#[cfg(feature = "debug-tools")]
use crate::capture::CandumpRecorder;

use crate::protocol::metrics::Metrics;
use crate::protocol::{
    self, DEFAULT_MOTOR_CONTROL_ID, DEFAULT_MOTOR_FAULT_ID, DEFAULT_MOTOR_STATUS_ID,
    DEFAULT_REQUEST_ID, Error, FetTempEncoding, MessageKind, MotorControlMessage,
    MotorFaultMessage, MotorStatusMessage, RequestMessage, Result, WireMessage,
};

/// Identifiers and encoding policy for a [`TelemetryRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    /// Identifier of the telemetry request
    pub request_id: u32,
    /// Identifier of frame 0
    pub status_id: u32,
    /// Identifier of frame 1
    pub control_id: u32,
    /// Identifier of frame 2
    pub fault_id: u32,
    /// Transport capability flag passed to every message
    pub extended: bool,
    /// FET temperature encoding for outgoing status frames
    pub fet_encoding: FetTempEncoding,
    /// When true, [`TelemetryRegistry::encode`] rejects out-of-range fields
    pub strict_ranges: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            request_id: DEFAULT_REQUEST_ID,
            status_id: DEFAULT_MOTOR_STATUS_ID,
            control_id: DEFAULT_MOTOR_CONTROL_ID,
            fault_id: DEFAULT_MOTOR_FAULT_ID,
            extended: true,
            fet_encoding: FetTempEncoding::Legacy,
            strict_ranges: false,
        }
    }
}

impl RegistryConfig {
    /// Identifier assigned to `kind`
    #[must_use]
    pub const fn id_of(&self, kind: MessageKind) -> u32 {
        match kind {
            MessageKind::Request => self.request_id,
            MessageKind::MotorStatus => self.status_id,
            MessageKind::MotorControl => self.control_id,
            MessageKind::MotorFault => self.fault_id,
        }
    }

    /// Kind that owns `id`, if any
    #[must_use]
    pub fn kind_of(&self, id: u32) -> Option<MessageKind> {
        MessageKind::ALL
            .into_iter()
            .find(|kind| self.id_of(*kind) == id)
    }
}

/// Owner of the controller's message instances.
#[derive(Debug)]
pub struct TelemetryRegistry {
    config: RegistryConfig,
    request: RequestMessage,
    status: MotorStatusMessage,
    control: MotorControlMessage,
    fault: MotorFaultMessage,
    #[cfg(feature = "debug-tools")]
    recorder: Option<CandumpRecorder>,
}

impl TelemetryRegistry {
    /// Create a registry with zeroed messages
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        let ext = config.extended;
        let mut ids: Vec<u32> = MessageKind::ALL.map(|k| config.id_of(k)).to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != MessageKind::ALL.len() {
            warn!(?config, "duplicate message ids; the first kind in frame order wins");
        }

        Self {
            config,
            request: RequestMessage::new(config.request_id, ext),
            status: MotorStatusMessage::new(config.status_id, ext)
                .with_fet_encoding(config.fet_encoding),
            control: MotorControlMessage::new(config.control_id, ext),
            fault: MotorFaultMessage::new(config.fault_id, ext),
            #[cfg(feature = "debug-tools")]
            recorder: None,
        }
    }

    /// Capture every routed and encoded frame.
    #[cfg(feature = "debug-tools")]
    pub fn set_recorder(&mut self, recorder: CandumpRecorder) {
        self.recorder = Some(recorder);
    }

    #[cfg(feature = "debug-tools")]
    fn capture(&self, id: u32, data: &[u8]) {
        if let Some(recorder) = &self.recorder {
            if let Err(err) = recorder.record(id, self.config.extended, data) {
                debug!(error = ?err, "failed to record frame");
            }
        }
    }

    #[cfg(not(feature = "debug-tools"))]
    #[allow(clippy::unused_self)]
    fn capture(&self, _id: u32, _data: &[u8]) {}

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Route an incoming frame to its owning message.
    ///
    /// Returns the kind that was updated, or `None` when no message owns `id`.
    pub fn handle_frame(&mut self, id: u32, data: &[u8]) -> Result<Option<MessageKind>> {
        let Some(kind) = self.config.kind_of(id) else {
            debug!(id, len = data.len(), "ignoring frame with unknown id");
            Metrics::record_unknown_id();
            return Ok(None);
        };
        protocol::decode(self.message_mut(kind), data)?;
        self.capture(id, &data[..kind.encoded_len()]);
        trace!(id, %kind, "telemetry updated");
        Ok(Some(kind))
    }

    /// Like [`Self::handle_frame`] but unknown identifiers are an error.
    pub fn handle_known_frame(&mut self, id: u32, data: &[u8]) -> Result<MessageKind> {
        self.handle_frame(id, data)?
            .ok_or(Error::UnknownMessageId { id })
    }

    /// Select frames on the request message and encode it.
    pub fn request_frames(&mut self, frame0: bool, frame1: bool, frame2: bool) -> Bytes {
        self.request.set_requests(frame0, frame1, frame2);
        let bytes = protocol::encode(&self.request);
        self.capture(self.request.id(), &bytes);
        bytes
    }

    /// Encode the current state of `kind`.
    ///
    /// # Errors
    ///
    /// With `strict_ranges` set, returns [`Error::FieldOverflow`] for the first
    /// field wider than its layout.
    pub fn encode(&self, kind: MessageKind) -> Result<Bytes> {
        let message = self.message(kind);
        if self.config.strict_ranges {
            message.check_ranges().inspect_err(|err| {
                debug!(%kind, %err, "refusing to encode");
                Metrics::record_range_violation();
            })?;
        }
        let bytes = protocol::encode(message);
        self.capture(message.id(), &bytes);
        Ok(bytes)
    }

    /// Borrow the message for `kind`
    #[must_use]
    pub fn message(&self, kind: MessageKind) -> &dyn WireMessage {
        match kind {
            MessageKind::Request => &self.request,
            MessageKind::MotorStatus => &self.status,
            MessageKind::MotorControl => &self.control,
            MessageKind::MotorFault => &self.fault,
        }
    }

    fn message_mut(&mut self, kind: MessageKind) -> &mut dyn WireMessage {
        match kind {
            MessageKind::Request => &mut self.request,
            MessageKind::MotorStatus => &mut self.status,
            MessageKind::MotorControl => &mut self.control,
            MessageKind::MotorFault => &mut self.fault,
        }
    }

    /// Get the request message
    #[must_use]
    pub const fn request(&self) -> &RequestMessage {
        &self.request
    }

    /// Get mutable request message
    pub fn request_mut(&mut self) -> &mut RequestMessage {
        &mut self.request
    }

    /// Get the latest motor status
    #[must_use]
    pub const fn status(&self) -> &MotorStatusMessage {
        &self.status
    }

    /// Get mutable motor status
    pub fn status_mut(&mut self) -> &mut MotorStatusMessage {
        &mut self.status
    }

    /// Get the latest motor control state
    #[must_use]
    pub const fn control(&self) -> &MotorControlMessage {
        &self.control
    }

    /// Get mutable motor control state
    pub fn control_mut(&mut self) -> &mut MotorControlMessage {
        &mut self.control
    }

    /// Get the latest fault report
    #[must_use]
    pub const fn fault(&self) -> &MotorFaultMessage {
        &self.fault
    }

    /// Get mutable fault report
    pub fn fault_mut(&mut self) -> &mut MotorFaultMessage {
        &mut self.fault
    }
}

impl Default for TelemetryRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
