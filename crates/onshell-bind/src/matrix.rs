use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use onshell_core::{
    Amplitude, DecayChainAmplitude, ErrorInfo, ModelQuery, OnShellError, ParticleId, Process,
    ProcessSignature,
};
use onshell_search::ResonanceIds;
use serde::{Deserialize, Serialize};

/// Lorentz structures and couplings used by a set of model interactions.
fn collect_symbols(
    interactions: impl IntoIterator<Item = usize>,
    model: &dyn ModelQuery,
) -> Result<(BTreeSet<String>, BTreeSet<String>), OnShellError> {
    let mut lorentz = BTreeSet::new();
    let mut couplings = BTreeSet::new();
    for id in interactions {
        let interaction = model.interaction(id)?;
        lorentz.extend(interaction.lorentz.iter().cloned());
        couplings.extend(interaction.couplings.iter().cloned());
    }
    Ok((lorentz, couplings))
}

/// Interaction ids of every vertex, per diagram, over a list of amplitudes.
fn diagram_structure<'a>(amplitudes: impl IntoIterator<Item = &'a Amplitude>) -> Vec<Vec<usize>> {
    amplitudes
        .into_iter()
        .flat_map(|amp| amp.diagrams.iter())
        .map(|diag| diag.vertices.iter().map(|vertex| vertex.interaction).collect())
        .collect()
}

/// Processes sharing one set of helicity amplitudes, with the symbols they need.
///
/// Two matrix elements with the same `structure` compute the same amplitudes whatever the
/// flavours of their processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixElement {
    processes: Vec<Process>,
    #[serde(default)]
    structure: Vec<Vec<usize>>,
    #[serde(default)]
    lorentz: BTreeSet<String>,
    #[serde(default)]
    couplings: BTreeSet<String>,
}

impl MatrixElement {
    /// Builds the matrix element of a single amplitude.
    pub fn from_amplitude(amplitude: &Amplitude, model: &dyn ModelQuery) -> Result<Self, OnShellError> {
        let ids = amplitude
            .diagrams
            .iter()
            .flat_map(|diag| diag.vertices.iter())
            .filter(|vertex| !vertex.is_identity())
            .map(|vertex| vertex.interaction);
        let (lorentz, couplings) = collect_symbols(ids, model)?;
        Ok(Self {
            processes: vec![amplitude.process.clone()],
            structure: diagram_structure([amplitude]),
            lorentz,
            couplings,
        })
    }

    /// Builds the combined matrix element of a production x decay amplitude tree.
    pub fn from_decay_chain(
        amplitude: &DecayChainAmplitude,
        model: &dyn ModelQuery,
    ) -> Result<Self, OnShellError> {
        let process = amplitude.process().cloned().ok_or_else(|| {
            OnShellError::Structure(ErrorInfo::new(
                "empty-decay-chain-amplitude",
                "decay chain amplitude has no core amplitude",
            ))
        })?;
        let (lorentz, couplings) = collect_symbols(amplitude.interaction_ids(), model)?;
        Ok(Self {
            processes: vec![process],
            structure: diagram_structure(amplitude.all_amplitudes()),
            lorentz,
            couplings,
        })
    }

    /// Processes in insertion order; the first one identifies the matrix element.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Interaction ids of every vertex, diagram by diagram, depth first through decay chains.
    pub fn structure(&self) -> &[Vec<usize>] {
        &self.structure
    }

    /// Signature of the leading process, empty when there is none.
    pub fn leading_signature(&self) -> ProcessSignature {
        self.processes
            .first()
            .map(Process::signature)
            .unwrap_or_default()
    }

    /// Returns whether a process with this signature is part of the matrix element.
    pub fn contains_signature(&self, signature: &ProcessSignature) -> bool {
        self.processes.iter().any(|proc| &proc.signature() == signature)
    }

    /// Returns whether both matrix elements hold a process with the same signature.
    pub fn shares_process(&self, other: &MatrixElement) -> bool {
        other
            .processes
            .iter()
            .any(|proc| self.contains_signature(&proc.signature()))
    }

    /// Lorentz structures used by the diagrams.
    pub fn lorentz(&self) -> &BTreeSet<String> {
        &self.lorentz
    }

    /// Couplings used by the diagrams.
    pub fn couplings(&self) -> &BTreeSet<String> {
        &self.couplings
    }

    /// Appends the processes of `other` not already present by signature and returns how many
    /// were added.
    pub fn absorb(&mut self, other: MatrixElement) -> usize {
        let mut known: IndexSet<ProcessSignature> =
            self.processes.iter().map(Process::signature).collect();
        let before = self.processes.len();
        for process in other.processes {
            if known.insert(process.signature()) {
                self.processes.push(process);
            }
        }
        self.lorentz.extend(other.lorentz);
        self.couplings.extend(other.couplings);
        self.processes.len() - before
    }
}

/// Identity of an on-shell term, see [`OnShellTerm::key`].
pub type TermKey = (ResonanceIds, Vec<usize>, Vec<Vec<usize>>);

/// Matrix element of one on-shell resonance of a real emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnShellTerm {
    /// Splitting ids.
    pub ids: ResonanceIds,
    /// Real-emission diagrams holding the splitting vertex.
    pub diagrams: Vec<usize>,
    /// Matrix element of the production x decay process.
    pub matrix_element: MatrixElement,
}

impl OnShellTerm {
    /// Key identifying the term across result sets: ids, matched diagrams and the
    /// structure of its matrix element. Flavours of the underlying processes do not enter.
    pub fn key(&self) -> TermKey {
        (
            self.ids,
            self.diagrams.clone(),
            self.matrix_element.structure.clone(),
        )
    }
}

/// Real-emission matrix element with its on-shell subtraction terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealMatrixElement {
    /// Matrix element of the real emission itself.
    pub matrix_element: MatrixElement,
    /// On-shell terms in registry order.
    #[serde(default)]
    pub on_shell: Vec<OnShellTerm>,
}

impl RealMatrixElement {
    /// Wraps a matrix element without on-shell terms.
    pub fn new(matrix_element: MatrixElement) -> Self {
        Self {
            matrix_element,
            on_shell: Vec::new(),
        }
    }

    /// Id triples of the on-shell terms.
    pub fn os_ids(&self) -> impl Iterator<Item = &ResonanceIds> {
        self.on_shell.iter().map(|term| &term.ids)
    }

    /// Matched diagrams of the on-shell terms.
    pub fn os_diagrams(&self) -> impl Iterator<Item = &[usize]> {
        self.on_shell.iter().map(|term| term.diagrams.as_slice())
    }

    /// Matrix elements of the on-shell terms.
    pub fn os_matrix_elements(&self) -> impl Iterator<Item = &MatrixElement> {
        self.on_shell.iter().map(|term| &term.matrix_element)
    }

    /// Resonant particles of the on-shell terms.
    pub fn mother_ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.on_shell.iter().map(|term| term.ids.mother)
    }

    pub(crate) fn merge(&mut self, other: RealMatrixElement) {
        self.matrix_element.absorb(other.matrix_element);
        self.merge_terms(other.on_shell);
    }

    /// Adds on-shell terms, folding each into a known term with the same key.
    pub(crate) fn merge_terms(&mut self, terms: Vec<OnShellTerm>) {
        let mut index: IndexMap<TermKey, usize> = self
            .on_shell
            .iter()
            .enumerate()
            .map(|(pos, term)| (term.key(), pos))
            .collect();
        for term in terms {
            let key = term.key();
            match index.get(&key) {
                Some(&pos) => {
                    self.on_shell[pos].matrix_element.absorb(term.matrix_element);
                }
                None => {
                    index.insert(key, self.on_shell.len());
                    self.on_shell.push(term);
                }
            }
        }
    }
}

/// Born matrix element with the real emissions attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BornMatrixElement {
    /// Matrix element of the born process.
    pub born_matrix_element: MatrixElement,
    /// Real-emission matrix elements.
    #[serde(default)]
    pub real_processes: Vec<RealMatrixElement>,
}

impl BornMatrixElement {
    /// Wraps a born matrix element without real emissions.
    pub fn new(born_matrix_element: MatrixElement) -> Self {
        Self {
            born_matrix_element,
            real_processes: Vec::new(),
        }
    }

    pub(crate) fn merge(&mut self, other: BornMatrixElement) {
        self.born_matrix_element.absorb(other.born_matrix_element);
        for real in other.real_processes {
            self.merge_real(real);
        }
    }

    /// Adds a real matrix element, merging it into a known one sharing any of its processes.
    pub(crate) fn merge_real(&mut self, real: RealMatrixElement) {
        match self
            .real_processes
            .iter_mut()
            .find(|known| known.matrix_element.shares_process(&real.matrix_element))
        {
            Some(known) => known.merge(real),
            None => self.real_processes.push(real),
        }
    }
}
