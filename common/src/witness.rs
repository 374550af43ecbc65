use std::collections::BTreeMap;

use num::BigUint;
use num::Num;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WitnessError {
    #[error("signal `{signal}` is not a non-negative decimal integer: {value:?}")]
    NotDecimal { signal: String, value: String },
}

/// A single signal assignment: one field element or an ordered sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Scalar(String),
    Array(Vec<String>),
}

/// Assignment of concrete values to a circuit's input signals.
///
/// Values are canonical decimal strings (arbitrary precision, no sign, no
/// leading zeros). Witnesses are supplied per proof request and never
/// persisted by the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Witness(BTreeMap<String, SignalValue>);

impl Witness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a scalar signal from a decimal string, canonicalizing it.
    pub fn insert(&mut self, signal: &str, value: &str) -> Result<(), WitnessError> {
        let canonical = canonical_decimal(signal, value)?;
        self.0
            .insert(signal.to_string(), SignalValue::Scalar(canonical));
        Ok(())
    }

    /// Assigns an ordered sequence of values to one signal.
    pub fn insert_array(&mut self, signal: &str, values: &[&str]) -> Result<(), WitnessError> {
        let canonical = values
            .iter()
            .map(|v| canonical_decimal(signal, v))
            .collect::<Result<Vec<_>, _>>()?;
        self.0
            .insert(signal.to_string(), SignalValue::Array(canonical));
        Ok(())
    }

    /// Builder-style assignment for values that are already integers.
    pub fn with_uint(mut self, signal: &str, value: u64) -> Self {
        self.0
            .insert(signal.to_string(), SignalValue::Scalar(value.to_string()));
        self
    }

    pub fn get(&self, signal: &str) -> Option<&SignalValue> {
        self.0.get(signal)
    }

    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn canonical_decimal(signal: &str, value: &str) -> Result<String, WitnessError> {
    BigUint::from_str_radix(value, 10)
        .map(|v| v.to_string())
        .map_err(|_| WitnessError::NotDecimal {
            signal: signal.to_string(),
            value: value.to_string(),
        })
}
