use std::collections::BTreeSet;

use onshell_core::{stable_hash_string, DecayChainAmplitude, OnShellError, ParticleId, Process};
use serde::{Deserialize, Serialize};

/// Particle ids of an accepted `mother -> daughter daughter` splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResonanceIds {
    /// Resonant particle, oriented as an outgoing leg of the production process.
    pub mother: ParticleId,
    /// The two decay products in real-emission leg order.
    pub daughters: [ParticleId; 2],
}

impl ResonanceIds {
    /// Creates the id triple.
    pub fn new(mother: ParticleId, first: ParticleId, second: ParticleId) -> Self {
        Self {
            mother,
            daughters: [first, second],
        }
    }

    /// Returns `[mother, daughter, daughter]`.
    pub fn as_array(&self) -> [ParticleId; 3] {
        [self.mother, self.daughters[0], self.daughters[1]]
    }
}

/// Accepted on-shell resonance together with its production x decay amplitude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResonanceCandidate {
    /// Splitting ids.
    pub ids: ResonanceIds,
    /// Reduced production process with its decay chains attached.
    pub process: Process,
    /// Amplitude generated for `process`.
    pub amplitude: DecayChainAmplitude,
    /// Diagrams of the full real-emission amplitude holding the splitting vertex.
    pub diagrams: Vec<usize>,
}

/// Ordered list of accepted candidates of one real-emission process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtractionRegistry {
    candidates: Vec<ResonanceCandidate>,
}

impl SubtractionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a candidate.
    pub fn push(&mut self, candidate: ResonanceCandidate) {
        self.candidates.push(candidate);
    }

    /// Drops every candidate.
    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns whether no candidate was accepted.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates in acceptance order.
    pub fn candidates(&self) -> &[ResonanceCandidate] {
        &self.candidates
    }

    /// Iterates over the candidates.
    pub fn iter(&self) -> std::slice::Iter<'_, ResonanceCandidate> {
        self.candidates.iter()
    }

    /// Id triples, indexed like [`Self::os_diagrams`] and [`Self::os_amplitudes`].
    pub fn os_ids(&self) -> impl Iterator<Item = &ResonanceIds> {
        self.candidates.iter().map(|cand| &cand.ids)
    }

    /// Matched diagram indices per candidate.
    pub fn os_diagrams(&self) -> impl Iterator<Item = &[usize]> {
        self.candidates.iter().map(|cand| cand.diagrams.as_slice())
    }

    /// Generated amplitudes per candidate.
    pub fn os_amplitudes(&self) -> impl Iterator<Item = &DecayChainAmplitude> {
        self.candidates.iter().map(|cand| &cand.amplitude)
    }

    /// Distinct resonant particles.
    pub fn mother_ids(&self) -> BTreeSet<ParticleId> {
        self.os_ids().map(|ids| ids.mother).collect()
    }

    /// Stable digest of the ids and diagram lists.
    pub fn digest(&self) -> Result<String, OnShellError> {
        let content: Vec<(&ResonanceIds, &[usize])> = self.os_ids().zip(self.os_diagrams()).collect();
        stable_hash_string(&content)
    }
}

impl<'a> IntoIterator for &'a SubtractionRegistry {
    type Item = &'a ResonanceCandidate;
    type IntoIter = std::slice::Iter<'a, ResonanceCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
