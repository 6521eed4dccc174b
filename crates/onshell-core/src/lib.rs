#![deny(missing_docs)]
#![doc = "Core model, process and amplitude types shared by the on-shell resonance search and the aggregate binder."]

use std::fmt;

use ::serde::{Deserialize, Serialize};

pub mod amplitude;
pub mod diagnostics;
pub mod errors;
pub mod hash;
pub mod model;
pub mod process;
pub mod serde;

pub use amplitude::{Amplitude, AmplitudeGenerator, DecayChainAmplitude, Diagram, Vertex};
pub use diagnostics::{Diagnostics, VerbosityGuard};
pub use errors::{ErrorInfo, OnShellError};
pub use hash::stable_hash_string;
pub use model::{Interaction, MassClass, ModelCard, ModelQuery, Particle, StaticModel};
pub use process::{Leg, LegState, Process, ProcessSignature};

/// Signed particle identifier (PDG code). Antiparticles carry the opposite sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleId(i32);

impl ParticleId {
    /// Creates a new identifier from its raw integer representation.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> i32 {
        self.0
    }

    /// Returns the identifier with its sign dropped.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Returns the identifier with its sign flipped.
    pub fn flipped(&self) -> Self {
        Self(-self.0)
    }
}

impl From<i32> for ParticleId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
