use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{CURVE, PROTOCOL};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProofFormatError {
    #[error("field `{0}` is missing from the proof object")]
    MissingField(&'static str),
    #[error("field `{field}` should be {expected}")]
    BadShape {
        field: &'static str,
        expected: &'static str,
    },
}

/// Groth16 proof in the proving library's native representation: three
/// group elements with A and C as flat coordinate pairs and B as a 2x2
/// nested pair, every coordinate a decimal string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub pi_a: [String; 2],
    pub pi_b: [[String; 2]; 2],
    pub pi_c: [String; 2],
    pub protocol: String,
    pub curve: String,
}

/// A proof plus the public signals it was produced with. Serializes to the
/// off-chain result shape (`publicSignals` key included).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub proof: Groth16Proof,
    #[serde(rename = "publicSignals")]
    pub public_signals: Vec<String>,
}

impl Groth16Proof {
    /// Builds a proof from the proving tool's JSON output.
    ///
    /// The tool emits projective coordinates (a third entry on A and C, a
    /// third row on B); only the affine pairs are kept. Coordinate strings
    /// are preserved byte-for-byte.
    pub fn from_tool_json(value: &Value) -> Result<Self, ProofFormatError> {
        let pi_a = affine_pair(value, "pi_a")?;
        let pi_c = affine_pair(value, "pi_c")?;

        let rows = value
            .get("pi_b")
            .ok_or(ProofFormatError::MissingField("pi_b"))?
            .as_array()
            .filter(|rows| rows.len() >= 2)
            .ok_or(ProofFormatError::BadShape {
                field: "pi_b",
                expected: "an array of at least two coordinate pairs",
            })?;
        let pi_b = [pair_from(&rows[0], "pi_b")?, pair_from(&rows[1], "pi_b")?];

        let protocol = tag(value, "protocol", PROTOCOL);
        let curve = tag(value, "curve", CURVE);

        Ok(Self {
            pi_a,
            pi_b,
            pi_c,
            protocol,
            curve,
        })
    }
}

fn affine_pair(value: &Value, field: &'static str) -> Result<[String; 2], ProofFormatError> {
    let coords = value
        .get(field)
        .ok_or(ProofFormatError::MissingField(field))?;
    pair_from(coords, field)
}

fn pair_from(coords: &Value, field: &'static str) -> Result<[String; 2], ProofFormatError> {
    let bad = ProofFormatError::BadShape {
        field,
        expected: "an array of at least two decimal strings",
    };
    let coords = coords.as_array().filter(|c| c.len() >= 2).ok_or(bad)?;
    let coord = |i: usize| {
        coords[i].as_str().map(str::to_string).ok_or(
            ProofFormatError::BadShape {
                field,
                expected: "decimal-string coordinates",
            },
        )
    };
    Ok([coord(0)?, coord(1)?])
}

fn tag(value: &Value, field: &str, default: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool_proof() -> Value {
        json!({
            "pi_a": ["11", "12", "1"],
            "pi_b": [["21", "22"], ["23", "24"], ["1", "0"]],
            "pi_c": ["31", "32", "1"],
            "protocol": "groth16",
            "curve": "bn128"
        })
    }

    #[test]
    fn trims_projective_tails_from_tool_output() {
        let proof = Groth16Proof::from_tool_json(&tool_proof()).unwrap();
        assert_eq!(proof.pi_a, ["11".to_string(), "12".to_string()]);
        assert_eq!(proof.pi_b[0], ["21".to_string(), "22".to_string()]);
        assert_eq!(proof.pi_b[1], ["23".to_string(), "24".to_string()]);
        assert_eq!(proof.pi_c, ["31".to_string(), "32".to_string()]);
        assert_eq!(proof.protocol, "groth16");
        assert_eq!(proof.curve, "bn128");
    }

    #[test]
    fn rejects_truncated_b_matrix() {
        let mut value = tool_proof();
        value["pi_b"] = json!([["21", "22"]]);
        assert!(Groth16Proof::from_tool_json(&value).is_err());
    }

    #[test]
    fn rejects_missing_group_element() {
        let mut value = tool_proof();
        value.as_object_mut().unwrap().remove("pi_c");
        assert_eq!(
            Groth16Proof::from_tool_json(&value),
            Err(ProofFormatError::MissingField("pi_c"))
        );
    }

    #[test]
    fn bundle_serializes_with_public_signals_key() {
        let proof = Groth16Proof::from_tool_json(&tool_proof()).unwrap();
        let bundle = ProofBundle {
            proof,
            public_signals: vec!["33".to_string()],
        };
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["publicSignals"], json!(["33"]));
        assert_eq!(json["proof"]["pi_a"], json!(["11", "12"]));
    }
}
