//! Generated amplitudes and the generator trait that produces them.

use std::collections::BTreeSet;

use ::serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::errors::OnShellError;
use crate::process::{Leg, Process};

/// Vertex of a Feynman diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// Legs joined at the vertex.
    pub legs: Vec<Leg>,
    /// Model interaction realised by the vertex, or [`Vertex::IDENTITY`].
    pub interaction: usize,
}

impl Vertex {
    /// Interaction id of the identity vertex gluing a decay chain onto its parent.
    pub const IDENTITY: usize = 0;

    /// Creates a vertex.
    pub fn new(legs: Vec<Leg>, interaction: usize) -> Self {
        Self { legs, interaction }
    }

    /// Returns whether this is an identity vertex.
    pub fn is_identity(&self) -> bool {
        self.interaction == Self::IDENTITY
    }
}

/// A single Feynman diagram.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Diagram {
    /// Vertices of the diagram.
    pub vertices: Vec<Vertex>,
}

impl Diagram {
    /// Creates a diagram from its vertices.
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }
}

/// Diagrams generated for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amplitude {
    /// Process the diagrams belong to.
    pub process: Process,
    /// Generated diagrams, possibly none.
    #[serde(default)]
    pub diagrams: Vec<Diagram>,
}

impl Amplitude {
    /// Creates an amplitude.
    pub fn new(process: Process, diagrams: Vec<Diagram>) -> Self {
        Self { process, diagrams }
    }

    /// Returns whether at least one diagram was generated.
    pub fn has_diagrams(&self) -> bool {
        !self.diagrams.is_empty()
    }
}

/// Generated form of a process with decay chains: core amplitudes plus one subtree per chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecayChainAmplitude {
    /// Amplitudes of the core process.
    pub amplitudes: Vec<Amplitude>,
    /// Amplitudes of the attached decay chains.
    #[serde(default)]
    pub decay_chains: Vec<DecayChainAmplitude>,
}

impl DecayChainAmplitude {
    /// Wraps a plain amplitude.
    pub fn from_amplitude(amplitude: Amplitude) -> Self {
        Self {
            amplitudes: vec![amplitude],
            decay_chains: Vec::new(),
        }
    }

    /// Returns whether every amplitude at every level has at least one diagram.
    pub fn is_complete(&self) -> bool {
        !self.amplitudes.is_empty()
            && self.amplitudes.iter().all(Amplitude::has_diagrams)
            && self.decay_chains.iter().all(DecayChainAmplitude::is_complete)
    }

    /// Process of the leading core amplitude.
    pub fn process(&self) -> Option<&Process> {
        self.amplitudes.first().map(|amp| &amp.process)
    }

    /// Iterates depth first over every amplitude of the tree.
    pub fn all_amplitudes(&self) -> Box<dyn Iterator<Item = &Amplitude> + '_> {
        Box::new(
            self.amplitudes
                .iter()
                .chain(self.decay_chains.iter().flat_map(|chain| chain.all_amplitudes())),
        )
    }

    /// Model interactions used by any diagram of the tree, identity vertices excluded.
    pub fn interaction_ids(&self) -> BTreeSet<usize> {
        self.all_amplitudes()
            .flat_map(|amp| amp.diagrams.iter())
            .flat_map(|diag| diag.vertices.iter())
            .filter(|vertex| !vertex.is_identity())
            .map(|vertex| vertex.interaction)
            .collect()
    }
}

/// Diagram generation engine.
pub trait AmplitudeGenerator {
    /// Generates the diagrams of a process and its decay chains.
    ///
    /// Fails with [`OnShellError::InvalidProcess`] when the definition violates a conservation
    /// law or another structural constraint of the engine.
    fn generate(
        &self,
        process: &Process,
        diagnostics: &Diagnostics,
    ) -> Result<DecayChainAmplitude, OnShellError>;
}
