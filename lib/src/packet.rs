//! Controller wire format.
//!
//! The motion controller sends one ASCII datagram per sample:
//! `qx qy qz qw reload trigger`, whitespace-separated. `qx..qw` are the
//! orientation quaternion, `reload` and `trigger` are integer flags (a flag
//! is set iff the value is exactly 1). A sample is decoded whole or not at
//! all — a malformed datagram never partially applies.

use thiserror::Error;

/// Number of whitespace-separated fields in a controller datagram.
const FIELD_COUNT: usize = 6;

/// One decoded controller sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    /// Orientation quaternion `[x, y, z, w]`. Not unit-length validated —
    /// orientation is passed through, not interpreted, by the scoring core.
    pub rotation: [f64; 4],
    pub reload_requested: bool,
    pub trigger_pressed: bool,
}

/// Decode failure for a controller datagram.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {FIELD_COUNT} fields, got {0}")]
    FieldCount(usize),
    #[error("field {index} ({value:?}) is not numeric")]
    InvalidField { index: usize, value: String },
    #[error("datagram is not valid UTF-8")]
    NotText,
}

impl InputSample {
    /// Decode a raw datagram payload.
    pub fn parse(raw: &[u8]) -> Result<InputSample, DecodeError> {
        let text = std::str::from_utf8(raw).map_err(|_| DecodeError::NotText)?;
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != FIELD_COUNT {
            return Err(DecodeError::FieldCount(fields.len()));
        }

        let mut rotation = [0.0; 4];
        for (index, slot) in rotation.iter_mut().enumerate() {
            *slot = parse_field::<f64>(&fields, index)?;
        }
        let reload = parse_field::<i32>(&fields, 4)?;
        let trigger = parse_field::<i32>(&fields, 5)?;

        Ok(InputSample {
            rotation,
            reload_requested: reload == 1,
            trigger_pressed: trigger == 1,
        })
    }
}

fn parse_field<T: std::str::FromStr>(fields: &[&str], index: usize) -> Result<T, DecodeError> {
    fields[index].parse().map_err(|_| DecodeError::InvalidField {
        index,
        value: fields[index].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_identity_sample() {
        let sample = InputSample::parse(b"0 0 0 1 0 1").unwrap();
        assert_eq!(sample.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert!(!sample.reload_requested);
        assert!(sample.trigger_pressed);
    }

    #[test]
    fn decodes_fractional_quaternion() {
        let sample = InputSample::parse(b"0.5 -0.5 0.5 0.5 1 0").unwrap();
        assert_eq!(sample.rotation, [0.5, -0.5, 0.5, 0.5]);
        assert!(sample.reload_requested);
        assert!(!sample.trigger_pressed);
    }

    #[test]
    fn tolerates_extra_whitespace() {
        let sample = InputSample::parse(b"  0  0\t0 1   0 1 ").unwrap();
        assert!(sample.trigger_pressed);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(
            InputSample::parse(b"0 0 0 1 0"),
            Err(DecodeError::FieldCount(5))
        );
        assert_eq!(
            InputSample::parse(b"0 0 0 1 0 1 9"),
            Err(DecodeError::FieldCount(7))
        );
        assert_eq!(InputSample::parse(b""), Err(DecodeError::FieldCount(0)));
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let err = InputSample::parse(b"0 0 x 1 0 1").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField {
                index: 2,
                value: "x".into()
            }
        );
        // Flags must be integers, not floats.
        let err = InputSample::parse(b"0 0 0 1 0 0.5").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { index: 5, .. }));
    }

    #[test]
    fn flag_is_set_only_on_exactly_one() {
        let sample = InputSample::parse(b"0 0 0 1 2 3").unwrap();
        assert!(!sample.reload_requested);
        assert!(!sample.trigger_pressed);
    }
}
