//! Message codec (encode/decode)
//!
//! Free functions over any [`WireMessage`] that add counters and tracing on
//! top of the trait's raw layout operations.

use bytes::Bytes;
use tracing::{debug, trace};

use super::metrics::{Direction, Metrics};
use super::{Result, WireMessage};

/// Encode a message to a new buffer of exactly `encoded_len()` bytes.
#[must_use]
pub fn encode(message: &dyn WireMessage) -> Bytes {
    let bytes = message.to_bytes();
    trace!(
        id = message.id(),
        kind = %message.kind(),
        len = bytes.len(),
        "encoded frame"
    );
    Metrics::record_frame(Direction::Encoded, message.kind());
    bytes
}

/// Decode `bytes` into `message`, overwriting every field.
///
/// # Errors
///
/// Returns [`super::Error::BufferTooSmall`] if `bytes` is shorter than the
/// message's encoded length; the message is left untouched.
pub fn decode(message: &mut dyn WireMessage, bytes: &[u8]) -> Result<()> {
    if let Err(err) = message.decode(bytes) {
        debug!(id = message.id(), kind = %message.kind(), %err, "rejected frame");
        Metrics::record_buffer_error();
        return Err(err);
    }
    trace!(id = message.id(), kind = %message.kind(), "decoded frame");
    Metrics::record_frame(Direction::Decoded, message.kind());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        Error, FaultFlags, MessageKind, MotorControlMessage, MotorFaultMessage,
        MotorStatusMessage, RequestMessage, metrics,
    };

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut original = MotorControlMessage::new(0x0895_0225, true);
        original.set_accelerator_position(1000);
        original.set_regen_stat(true);

        let encoded = encode(&original);
        assert_eq!(encoded.len(), 5);

        let mut decoded = MotorControlMessage::new(0x0895_0225, true);
        decode(&mut decoded, &encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_buffer_too_small() {
        let before = metrics::snapshot();
        let mut msg = MotorFaultMessage::new(1, true);
        msg.set_fault(FaultFlags::OVER_CURRENT, true);

        let result = decode(&mut msg, &[0xFF; 4]);
        assert!(matches!(
            result,
            Err(Error::BufferTooSmall { needed: 5, got: 4 })
        ));
        // Left untouched on failure.
        assert!(msg.over_current_error());
        assert!(metrics::snapshot().buffer_errors > before.buffer_errors);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut msg = RequestMessage::new(1, true);
        decode(&mut msg, &[0b011, 0xFF, 0xFF]).unwrap();
        assert!(msg.frame0() && msg.frame1() && !msg.frame2());
    }

    #[test]
    fn test_encode_counts_kind() {
        let before = metrics::snapshot();
        let _ = encode(&RequestMessage::new(1, true));
        let after = metrics::snapshot();
        assert!(after.encoded(MessageKind::Request) > before.encoded(MessageKind::Request));
    }

    #[test]
    fn test_encode_performance() {
        use std::time::Instant;

        let mut message = MotorStatusMessage::new(1, true);
        message.set_motor_rpm(3000);

        let start = Instant::now();
        for _ in 0..1000 {
            let _ = encode(&message);
        }
        let elapsed = start.elapsed();

        let avg_micros = elapsed.as_micros() / 1000;
        println!("Average encode time: {avg_micros}μs");

        // Should be reasonably fast (< 100μs on CI)
        assert!(avg_micros < 100, "Encode too slow: {avg_micros}μs");
    }

    // Property-based tests
    mod proptests {
        use super::*;
        use crate::protocol::{FetTempEncoding, MOTOR_CONTROL_LAYOUT};
        use proptest::prelude::*;

        fn status_strategy() -> impl Strategy<Value = MotorStatusMessage> {
            (
                (0u16..=1023, 0u16..=511, any::<bool>(), 0u16..=1023),
                (0u8..=31, 0u16..=4095, 0u16..=1023, 0u8..=127),
            )
                .prop_map(|((volt, cur, dir, pk), (fet, rpm, pwm, lead))| {
                    let mut m = MotorStatusMessage::new(1, true);
                    m.set_battery_voltage(volt);
                    m.set_battery_current(cur);
                    m.set_battery_current_dir(dir);
                    m.set_motor_current_pk_avg(pk);
                    m.set_fet_temp(fet);
                    m.set_motor_rpm(rpm);
                    m.set_pwm_duty(pwm);
                    m.set_lead_angle(lead);
                    m
                })
        }

        fn control_strategy() -> impl Strategy<Value = MotorControlMessage> {
            (
                (any::<bool>(), any::<bool>(), 0u16..=1023, 0u16..=1023),
                (0u8..=15, 0u16..=1023, 0u8..=3, any::<bool>()),
            )
                .prop_map(|((power, mc, accel, regen_vr), (sw, target, drive, regen))| {
                    let mut m = MotorControlMessage::new(1, true);
                    m.set_power_mode(power);
                    m.set_mc_mode(mc);
                    m.set_accelerator_position(accel);
                    m.set_regen_vr_position(regen_vr);
                    m.set_digit_sw_position(sw);
                    m.set_out_target_val(target);
                    m.set_drive_act_stat(drive);
                    m.set_regen_stat(regen);
                    m
                })
        }

        #[allow(clippy::cast_possible_truncation)]
        fn set_control_field(msg: &mut MotorControlMessage, index: usize, value: u32) {
            match index {
                0 => msg.set_power_mode(value != 0),
                1 => msg.set_mc_mode(value != 0),
                2 => msg.set_accelerator_position(value as u16),
                3 => msg.set_regen_vr_position(value as u16),
                4 => msg.set_digit_sw_position(value as u8),
                5 => msg.set_out_target_val(value as u16),
                6 => msg.set_drive_act_stat(value as u8),
                _ => msg.set_regen_stat(value != 0),
            }
        }

        fn fault_strategy() -> impl Strategy<Value = MotorFaultMessage> {
            (any::<u32>(), 0u8..=3).prop_map(|(bits, level)| {
                let mut m = MotorFaultMessage::new(1, true);
                m.set_faults(FaultFlags::from_bits_truncate(bits));
                m.set_overheat_level(level);
                m
            })
        }

        proptest! {
            /// Property: in-range status messages roundtrip
            #[test]
            fn prop_status_roundtrip(original in status_strategy()) {
                let mut decoded = MotorStatusMessage::new(1, true);
                decode(&mut decoded, &encode(&original)).unwrap();
                prop_assert_eq!(decoded, original);
            }

            /// Property: in-range control messages roundtrip
            #[test]
            fn prop_control_roundtrip(original in control_strategy()) {
                let mut decoded = MotorControlMessage::new(1, true);
                decode(&mut decoded, &encode(&original)).unwrap();
                prop_assert_eq!(decoded, original);
            }

            /// Property: fault messages roundtrip for every flag combination
            #[test]
            fn prop_fault_roundtrip(original in fault_strategy()) {
                let mut decoded = MotorFaultMessage::new(1, true);
                decode(&mut decoded, &encode(&original)).unwrap();
                prop_assert_eq!(decoded, original);
            }

            /// Property: any 8-byte buffer decodes and re-encodes to itself
            #[test]
            fn prop_status_bytes_stable(bytes in any::<[u8; 8]>()) {
                let mut msg = MotorStatusMessage::new(1, true);
                decode(&mut msg, &bytes).unwrap();
                let encoded = encode(&msg);
                prop_assert_eq!(encoded.as_ref(), &bytes[..]);
            }

            /// Property: any control buffer re-encodes with the reserved bit cleared
            #[test]
            fn prop_control_bytes_stable(bytes in any::<[u8; 5]>()) {
                let mut msg = MotorControlMessage::new(1, true);
                decode(&mut msg, &bytes).unwrap();
                let mut expected = bytes;
                expected[4] &= 0x7F;
                let encoded = encode(&msg);
                prop_assert_eq!(encoded.as_ref(), &expected[..]);
            }

            /// Property: changing any one control field leaves every other bit alone
            #[test]
            fn prop_control_fields_independent(
                original in control_strategy(),
                index in 0usize..8,
                raw in any::<u16>(),
            ) {
                let field = &MOTOR_CONTROL_LAYOUT.fields[index];
                let value = u32::from(raw) & field.max_value();
                let mut changed = original.clone();
                set_control_field(&mut changed, index, value);

                let own = u64::from(field.max_value()) << field.offset;
                let outside = |buf: &[u8]| {
                    let raw = u64::from_le_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], 0, 0, 0]);
                    raw & !own
                };
                let a = encode(&original);
                let b = encode(&changed);
                prop_assert_eq!(outside(&a), outside(&b));
                prop_assert_eq!(field.extract(&b), value);
            }

            /// Property: masked encoding never disturbs the rpm, whatever the temperature
            #[test]
            fn prop_masked_fet_isolated(
                original in status_strategy(),
                fet in any::<u8>(),
            ) {
                let mut msg = original.clone().with_fet_encoding(FetTempEncoding::Masked);
                msg.set_fet_temp(fet);
                let mut decoded = MotorStatusMessage::new(1, true);
                decode(&mut decoded, &encode(&msg)).unwrap();
                prop_assert_eq!(decoded.motor_rpm(), original.motor_rpm());
                prop_assert_eq!(decoded.fet_temp(), fet & 0x1F);
            }

            /// Property: legacy encoding ORs temperature bits 5-7 into rpm bits 0-2
            #[test]
            fn prop_legacy_fet_spills(
                original in status_strategy(),
                fet in 32u8..=255,
            ) {
                let mut msg = original.clone();
                msg.set_fet_temp(fet);
                let mut decoded = MotorStatusMessage::new(1, true);
                decode(&mut decoded, &encode(&msg)).unwrap();
                prop_assert_eq!(decoded.fet_temp(), fet & 0x1F);
                prop_assert_eq!(
                    decoded.motor_rpm(),
                    original.motor_rpm() | u16::from(fet >> 5)
                );
            }
        }
    }
}
