//! Parameter grid generation for solver sweeps.
//!
//! A [`ParameterSpace`] holds one [`RangeSpec`] per swept dimension and expands
//! them into the Cartesian product of unique, rounded values. The product is
//! always enumerated with `w` outermost, then `b`, then `mu`; that order is the
//! canonical grid order used for tie-breaking and default report ordering.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

mod range;

pub use range::{round_value, RangeSpec, MAX_MAGNITUDE, MAX_SAMPLES, VALUE_PRECISION};
pub(crate) use range::to_centi;

/// Depth parameter handed to the solver when none is configured.
pub const DEFAULT_DEPTH: u32 = 10;

/// Extra solver option carried verbatim into the config artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value:?}"),
            Scalar::Text(value) => write!(f, "{value}"),
        }
    }
}

/// One grid point. Never mutated after generation.
///
/// Equality and hashing compare `w`, `b` and `mu` after rounding to
/// [`VALUE_PRECISION`] decimals, so near-identical floats collapse.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterConfig {
    pub w: f64,
    pub b: f64,
    pub mu: f64,
    #[serde(rename = "D")]
    pub d: u32,
    pub extra: BTreeMap<String, Scalar>,
}

impl ParameterConfig {
    pub fn new(w: f64, b: f64, mu: f64) -> Self {
        Self {
            w: round_value(w),
            b: round_value(b),
            mu: round_value(mu),
            d: DEFAULT_DEPTH,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_depth(mut self, d: u32) -> Self {
        self.d = d;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Scalar) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    fn key(&self) -> (i64, i64, i64) {
        (to_centi(self.w), to_centi(self.b), to_centi(self.mu))
    }

    /// `key = value` lines in the order the solver expects: w, b, mu, D, extras.
    pub fn config_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("w = {:?}", self.w),
            format!("b = {:?}", self.b),
            format!("mu = {:?}", self.mu),
            format!("D = {}", self.d),
        ];
        lines.extend(
            self.extra
                .iter()
                .map(|(key, value)| format!("{key} = {value}")),
        );
        lines
    }
}

impl PartialEq for ParameterConfig {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.d == other.d && self.extra == other.extra
    }
}

impl Eq for ParameterConfig {}

impl Hash for ParameterConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
        self.d.hash(state);
    }
}

/// Defines the grid to sweep. Fields left out of a config file take their
/// [`Default`] values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSpace {
    pub w: RangeSpec,
    pub b: RangeSpec,
    pub mu: RangeSpec,
    #[serde(rename = "D")]
    pub d: u32,
    pub extra: BTreeMap<String, Scalar>,
}

impl Default for ParameterSpace {
    /// w and b over 1..10, mu over 0..0.2.
    fn default() -> Self {
        Self {
            w: RangeSpec::linspace(1.0, 10.0, 10),
            b: RangeSpec::linspace(1.0, 10.0, 10),
            mu: RangeSpec::linspace(0.0, 0.2, 10),
            d: DEFAULT_DEPTH,
            extra: BTreeMap::new(),
        }
    }
}

impl ParameterSpace {
    /// A space with a single point at `w = b = 1`, `mu = 0`.
    pub fn grid() -> Self {
        Self {
            w: RangeSpec::Value(1.0),
            b: RangeSpec::Value(1.0),
            mu: RangeSpec::Value(0.0),
            d: DEFAULT_DEPTH,
            extra: BTreeMap::new(),
        }
    }

    pub fn w(mut self, spec: RangeSpec) -> Self {
        self.w = spec;
        self
    }

    pub fn b(mut self, spec: RangeSpec) -> Self {
        self.b = spec;
        self
    }

    pub fn mu(mut self, spec: RangeSpec) -> Self {
        self.mu = spec;
        self
    }

    pub fn depth(mut self, d: u32) -> Self {
        self.d = d;
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Scalar) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Number of grid points `generate` will return.
    pub fn len(&self) -> Result<usize, SweepError> {
        let (ws, bs, mus) = self.dimensions()?;
        Ok(ws.len() * bs.len() * mus.len())
    }

    pub fn is_empty(&self) -> Result<bool, SweepError> {
        Ok(self.len()? == 0)
    }

    fn dimensions(&self) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), SweepError> {
        let sample = |parameter: &'static str, spec: &RangeSpec| {
            spec.values()
                .map_err(|source| SweepError::Range { parameter, source })
        };
        Ok((sample("w", &self.w)?, sample("b", &self.b)?, sample("mu", &self.mu)?))
    }

    /// Expand the grid in canonical order: outer `w`, middle `b`, inner `mu`.
    pub fn generate(&self) -> Result<Vec<ParameterConfig>, SweepError> {
        let (ws, bs, mus) = self.dimensions()?;

        let configs = ws
            .iter()
            .flat_map(|&w| bs.iter().map(move |&b| (w, b)))
            .flat_map(|(w, b)| mus.iter().map(move |&mu| (w, b, mu)))
            .map(|(w, b, mu)| {
                let mut config = ParameterConfig::new(w, b, mu).with_depth(self.d);
                config.extra = self.extra.clone();
                config
            })
            .collect();

        Ok(configs)
    }
}

#[cfg(test)]
mod tests;
