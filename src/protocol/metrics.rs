//! Process-wide codec counters

use std::sync::atomic::{AtomicU64, Ordering};

use super::MessageKind;

/// Track codec activity without external dependencies.
pub(crate) struct Metrics;

static ENCODED_FRAMES: AtomicU64 = AtomicU64::new(0);
static DECODED_FRAMES: AtomicU64 = AtomicU64::new(0);
static BUFFER_ERRORS: AtomicU64 = AtomicU64::new(0);
static RANGE_VIOLATIONS: AtomicU64 = AtomicU64::new(0);
static UNKNOWN_IDS: AtomicU64 = AtomicU64::new(0);
static FET_TEMP_SPILLS: AtomicU64 = AtomicU64::new(0);

struct KindCounters {
    request: AtomicU64,
    motor_status: AtomicU64,
    motor_control: AtomicU64,
    motor_fault: AtomicU64,
}

static ENCODED_BY_KIND: KindCounters = KindCounters::new();
static DECODED_BY_KIND: KindCounters = KindCounters::new();

impl KindCounters {
    const fn new() -> Self {
        Self {
            request: AtomicU64::new(0),
            motor_status: AtomicU64::new(0),
            motor_control: AtomicU64::new(0),
            motor_fault: AtomicU64::new(0),
        }
    }

    fn slot(&self, kind: MessageKind) -> &AtomicU64 {
        match kind {
            MessageKind::Request => &self.request,
            MessageKind::MotorStatus => &self.motor_status,
            MessageKind::MotorControl => &self.motor_control,
            MessageKind::MotorFault => &self.motor_fault,
        }
    }

    fn load(&self) -> [u64; 4] {
        MessageKind::ALL.map(|kind| self.slot(kind).load(Ordering::Relaxed))
    }
}

/// Direction of a codec operation.
#[derive(Clone, Copy)]
pub(crate) enum Direction {
    Encoded,
    Decoded,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_frame(direction: Direction, kind: MessageKind) {
        match direction {
            Direction::Encoded => {
                ENCODED_FRAMES.fetch_add(1, Ordering::Relaxed);
                ENCODED_BY_KIND.slot(kind).fetch_add(1, Ordering::Relaxed);
            }
            Direction::Decoded => {
                DECODED_FRAMES.fetch_add(1, Ordering::Relaxed);
                DECODED_BY_KIND.slot(kind).fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    #[inline]
    pub(crate) fn record_buffer_error() {
        BUFFER_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_range_violation() {
        RANGE_VIOLATIONS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_unknown_id() {
        UNKNOWN_IDS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_fet_temp_spill() {
        FET_TEMP_SPILLS.fetch_add(1, Ordering::Relaxed);
    }
}

/// Current values of every counter.
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        encoded_frames: ENCODED_FRAMES.load(Ordering::Relaxed),
        decoded_frames: DECODED_FRAMES.load(Ordering::Relaxed),
        buffer_errors: BUFFER_ERRORS.load(Ordering::Relaxed),
        range_violations: RANGE_VIOLATIONS.load(Ordering::Relaxed),
        unknown_ids: UNKNOWN_IDS.load(Ordering::Relaxed),
        fet_temp_spills: FET_TEMP_SPILLS.load(Ordering::Relaxed),
        encoded_by_kind: ENCODED_BY_KIND.load(),
        decoded_by_kind: DECODED_BY_KIND.load(),
    }
}

/// Lightweight snapshot of codec counters.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MetricsSnapshot {
    /// Frames encoded
    pub encoded_frames: u64,
    /// Frames decoded
    pub decoded_frames: u64,
    /// Encode or decode calls rejected for a short buffer
    pub buffer_errors: u64,
    /// Encodes rejected by range checking
    pub range_violations: u64,
    /// Frames whose identifier no registered message owns
    pub unknown_ids: u64,
    /// Legacy status encodes whose FET temperature spilled into the RPM
    pub fet_temp_spills: u64,
    /// Encoded frames indexed by [`MessageKind::as_u8`]
    pub encoded_by_kind: [u64; 4],
    /// Decoded frames indexed by [`MessageKind::as_u8`]
    pub decoded_by_kind: [u64; 4],
}

impl MetricsSnapshot {
    /// Frames encoded for one kind
    #[must_use]
    pub fn encoded(&self, kind: MessageKind) -> u64 {
        self.encoded_by_kind[usize::from(kind.as_u8())]
    }

    /// Frames decoded for one kind
    #[must_use]
    pub fn decoded(&self, kind: MessageKind) -> u64 {
        self.decoded_by_kind[usize::from(kind.as_u8())]
    }
}
