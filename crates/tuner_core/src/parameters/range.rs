use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RangeSpecError;

/// Number of decimal places every sampled value is rounded to.
pub const VALUE_PRECISION: i32 = 2;

/// Largest magnitude accepted for any bound or step.
pub const MAX_MAGNITUDE: f64 = 1e12;

/// Most samples a single dimension may expand to.
pub const MAX_SAMPLES: usize = 100_000;

const STEP_TOLERANCE: f64 = 1e-9;

fn check_bounds(value: f64) -> Result<(), RangeSpecError> {
    if value.is_finite() && value.abs() <= MAX_MAGNITUDE {
        Ok(())
    } else {
        Err(RangeSpecError::OutOfBounds(value))
    }
}

/// Number of points in `start, start + step, ...` up to `stop`. Bounds must
/// already be checked and the step must point towards `stop`.
fn step_samples(start: f64, stop: f64, step: f64) -> Result<usize, RangeSpecError> {
    let span = ((stop - start) / step + STEP_TOLERANCE).floor();
    // Also catches NaN.
    if !(span < MAX_SAMPLES as f64) {
        return Err(RangeSpecError::TooManySamples { max: MAX_SAMPLES });
    }
    Ok(span.max(0.0) as usize + 1)
}

/// How one sweep dimension is sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeSpec {
    /// `count` evenly spaced samples, both ends included.
    Linspace { start: f64, end: f64, count: usize },
    /// Arithmetic progression from `start`, including `stop` when it lands on it.
    Step { start: f64, stop: f64, step: f64 },
    /// A single literal value.
    Value(f64),
}

impl RangeSpec {
    pub fn linspace(start: f64, end: f64, count: usize) -> Self {
        Self::Linspace { start, end, count }
    }

    pub fn step(start: f64, stop: f64, step: f64) -> Self {
        Self::Step { start, stop, step }
    }

    pub fn value(value: f64) -> Self {
        Self::Value(value)
    }

    pub fn validate(&self) -> Result<(), RangeSpecError> {
        match *self {
            Self::Linspace { start, end, count } => {
                check_bounds(start)?;
                check_bounds(end)?;
                if count == 0 {
                    return Err(RangeSpecError::ZeroCount);
                }
                if count > MAX_SAMPLES {
                    return Err(RangeSpecError::TooManySamples { max: MAX_SAMPLES });
                }
                Ok(())
            }
            Self::Step { start, stop, step } => {
                check_bounds(start)?;
                check_bounds(stop)?;
                check_bounds(step)?;
                if step == 0.0 {
                    return Err(RangeSpecError::ZeroStep);
                }
                if (stop - start) * step < 0.0 {
                    return Err(RangeSpecError::WrongDirection { start, stop, step });
                }
                step_samples(start, stop, step).map(|_| ())
            }
            Self::Value(value) => check_bounds(value),
        }
    }

    /// Sampled values rounded to [`VALUE_PRECISION`], duplicates removed,
    /// first occurrence order kept.
    pub fn values(&self) -> Result<Vec<f64>, RangeSpecError> {
        self.validate()?;
        let raw = match *self {
            Self::Linspace { start, end, count } => {
                if count == 1 {
                    vec![start]
                } else {
                    let delta = (end - start) / (count - 1) as f64;
                    (0..count)
                        .map(|i| {
                            if i == count - 1 {
                                end
                            } else {
                                start + delta * i as f64
                            }
                        })
                        .collect()
                }
            }
            Self::Step { start, stop, step } => {
                let samples = step_samples(start, stop, step)?;
                (0..samples).map(|i| start + step * i as f64).collect()
            }
            Self::Value(value) => vec![value],
        };

        let mut seen = HashSet::with_capacity(raw.len());
        let mut values = Vec::with_capacity(raw.len());
        for value in raw {
            if seen.insert(to_centi(value)) {
                values.push(round_value(value));
            }
        }
        Ok(values)
    }
}

/// Round to [`VALUE_PRECISION`] decimal places.
pub fn round_value(value: f64) -> f64 {
    to_centi(value) as f64 / 10f64.powi(VALUE_PRECISION)
}

/// Integer key in hundredths, used for equality and hashing of rounded values.
pub(crate) fn to_centi(value: f64) -> i64 {
    (value * 10f64.powi(VALUE_PRECISION)).round() as i64
}

fn parse_number(text: &str) -> Result<f64, RangeSpecError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| RangeSpecError::NotANumber(text.trim().to_string()))
}

impl FromStr for RangeSpec {
    type Err = RangeSpecError;

    /// Accepts `start,end,count`, `start:stop:step` or a single number.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let spec = if text.contains(',') {
            let parts: Vec<&str> = text.split(',').collect();
            let [start, end, count] = parts.as_slice() else {
                return Err(RangeSpecError::Syntax(text.to_string()));
            };
            let count = count
                .trim()
                .parse::<usize>()
                .map_err(|_| RangeSpecError::NotANumber(count.trim().to_string()))?;
            Self::linspace(parse_number(start)?, parse_number(end)?, count)
        } else if text.contains(':') {
            let parts: Vec<&str> = text.split(':').collect();
            let [start, stop, step] = parts.as_slice() else {
                return Err(RangeSpecError::Syntax(text.to_string()));
            };
            Self::step(parse_number(start)?, parse_number(stop)?, parse_number(step)?)
        } else if text.is_empty() {
            return Err(RangeSpecError::Syntax(text.to_string()));
        } else {
            Self::value(parse_number(text)?)
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linspace { start, end, count } => write!(f, "{start},{end},{count}"),
            Self::Step { start, stop, step } => write!(f, "{start}:{stop}:{step}"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

impl Serialize for RangeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RangeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(RangeSpec::Value(value)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let values = RangeSpec::linspace(1.0, 10.0, 4).values().unwrap();
        assert_eq!(values, vec![1.0, 4.0, 7.0, 10.0]);
    }

    #[test]
    fn linspace_rounds_to_two_places() {
        let values = RangeSpec::linspace(0.0, 1.0, 4).values().unwrap();
        assert_eq!(values, vec![0.0, 0.33, 0.67, 1.0]);
    }

    #[test]
    fn collapsing_range_yields_single_value() {
        let values = RangeSpec::linspace(2.5, 2.5, 10).values().unwrap();
        assert_eq!(values, vec![2.5]);
    }

    #[test]
    fn near_duplicates_collapse_after_rounding() {
        // 0.000, 0.001, ..., 0.004 all round to 0.0
        let values = RangeSpec::linspace(0.0, 0.004, 5).values().unwrap();
        assert_eq!(values, vec![0.0]);
    }

    #[test]
    fn step_is_inclusive_of_stop() {
        let values = RangeSpec::step(0.0, 0.2, 0.05).values().unwrap();
        assert_eq!(values, vec![0.0, 0.05, 0.1, 0.15, 0.2]);
    }

    #[test]
    fn step_stops_before_overshooting() {
        let values = RangeSpec::step(1.0, 2.0, 0.3).values().unwrap();
        assert_eq!(values, vec![1.0, 1.3, 1.6, 1.9]);
    }

    #[test]
    fn descending_step() {
        let values = RangeSpec::step(1.0, 0.0, -0.5).values().unwrap();
        assert_eq!(values, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn invalid_specs_are_rejected() {
        assert_eq!(
            RangeSpec::linspace(0.0, 1.0, 0).values(),
            Err(RangeSpecError::ZeroCount)
        );
        assert_eq!(
            RangeSpec::step(0.0, 1.0, 0.0).values(),
            Err(RangeSpecError::ZeroStep)
        );
        assert!(matches!(
            RangeSpec::step(0.0, 1.0, -0.1).values(),
            Err(RangeSpecError::WrongDirection { .. })
        ));
    }

    #[test]
    fn non_finite_values_are_rejected_in_every_form() {
        for text in ["nan", "inf", "-inf", "nan,1,3", "0,inf,3", "nan:1:0.5", "0:inf:1", "0:1:nan"] {
            assert!(
                matches!(text.parse::<RangeSpec>(), Err(RangeSpecError::OutOfBounds(_))),
                "{text} should be rejected"
            );
        }
        assert!(matches!(
            RangeSpec::value(f64::NAN).values(),
            Err(RangeSpecError::OutOfBounds(_))
        ));
    }

    #[test]
    fn oversized_ranges_are_rejected() {
        assert!(matches!(
            "0:1e300:1".parse::<RangeSpec>(),
            Err(RangeSpecError::OutOfBounds(_))
        ));
        assert_eq!(
            "0:1e9:1".parse::<RangeSpec>(),
            Err(RangeSpecError::TooManySamples { max: MAX_SAMPLES })
        );
        assert_eq!(
            RangeSpec::step(0.0, 1.0, 1e-12).values(),
            Err(RangeSpecError::TooManySamples { max: MAX_SAMPLES })
        );
        assert_eq!(
            RangeSpec::linspace(0.0, 1.0, MAX_SAMPLES + 1).values(),
            Err(RangeSpecError::TooManySamples { max: MAX_SAMPLES })
        );
        assert_eq!(RangeSpec::step(0.0, 99_999.0, 1.0).values().unwrap().len(), MAX_SAMPLES);
    }

    #[test]
    fn parses_all_three_forms() {
        assert_eq!(
            "1,10,4".parse::<RangeSpec>().unwrap(),
            RangeSpec::linspace(1.0, 10.0, 4)
        );
        assert_eq!(
            "0:0.2:0.05".parse::<RangeSpec>().unwrap(),
            RangeSpec::step(0.0, 0.2, 0.05)
        );
        assert_eq!("0.1".parse::<RangeSpec>().unwrap(), RangeSpec::value(0.1));
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(matches!(
            "1,2".parse::<RangeSpec>(),
            Err(RangeSpecError::Syntax(_))
        ));
        assert!(matches!(
            "1,2,2.5".parse::<RangeSpec>(),
            Err(RangeSpecError::NotANumber(_))
        ));
        assert!(matches!(
            "abc".parse::<RangeSpec>(),
            Err(RangeSpecError::NotANumber(_))
        ));
        assert!("".parse::<RangeSpec>().is_err());
    }
}
