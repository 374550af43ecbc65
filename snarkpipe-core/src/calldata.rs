//! Native-to-calldata proof re-encoding.
//!
//! The verifier contract takes `(uint[2], uint[2][2], uint[2], uint[])`.
//! Its pairing-check library consumes G2 points with the imaginary
//! coefficient first, opposite to the proving library's native element
//! order, so each inner row of B swaps its two coordinates while A and C
//! pass through untouched. A wrong axis here still passes native
//! verification and only surfaces as a silent on-chain rejection; the
//! transform must ultimately be validated against a live verifier call.

use serde::{Deserialize, Serialize};

use common::proof::{Groth16Proof, ProofBundle};

/// Proof tuple in the on-chain verifier's calldata layout, decimal-string
/// encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainProof {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
}

/// On-chain proof plus the public-signal list the contract call takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainBundle {
    pub proof: OnchainProof,
    #[serde(rename = "publicSignals")]
    pub public_signals: Vec<String>,
}

/// Re-encodes a native proof for the on-chain pairing check.
pub fn to_onchain(proof: &Groth16Proof) -> OnchainProof {
    OnchainProof {
        a: proof.pi_a.clone(),
        b: [
            [proof.pi_b[0][1].clone(), proof.pi_b[0][0].clone()],
            [proof.pi_b[1][1].clone(), proof.pi_b[1][0].clone()],
        ],
        c: proof.pi_c.clone(),
    }
}

pub fn to_onchain_bundle(bundle: &ProofBundle) -> OnchainBundle {
    OnchainBundle {
        proof: to_onchain(&bundle.proof),
        public_signals: bundle.public_signals.clone(),
    }
}
