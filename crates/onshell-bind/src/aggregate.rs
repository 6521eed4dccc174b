use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use onshell_core::{stable_hash_string, ErrorInfo, ModelQuery, OnShellError, ParticleId, ProcessSignature};
use onshell_search::{FksMultiProcess, SubtractionRegistry};
use serde::{Deserialize, Serialize};

use crate::matrix::{BornMatrixElement, MatrixElement, OnShellTerm, RealMatrixElement};

fn binding_error(code: &str, message: impl Into<String>) -> OnShellError {
    OnShellError::Binding(ErrorInfo::new(code, message.into()))
}

/// Summary of an on-shell binding pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BindingReport {
    /// Real matrix elements that received on-shell terms.
    pub bound_reals: usize,
    /// On-shell terms attached in total.
    pub on_shell_terms: usize,
    /// Stable digest of the bound registries.
    pub digest: String,
}

/// Grouped matrix elements of a batch of born processes and their real emissions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateResultSet {
    matrix_elements: Vec<BornMatrixElement>,
}

impl AggregateResultSet {
    /// Wraps already grouped born matrix elements.
    pub fn new(matrix_elements: Vec<BornMatrixElement>) -> Self {
        Self { matrix_elements }
    }

    /// Groups the borns and reals of `multi` by signature without on-shell terms.
    pub fn from_multi_process(
        multi: &FksMultiProcess,
        model: &dyn ModelQuery,
    ) -> Result<Self, OnShellError> {
        let mut borns: IndexMap<ProcessSignature, BornMatrixElement> = IndexMap::new();
        for born in &multi.born_processes {
            let mut entry = BornMatrixElement::new(MatrixElement::from_amplitude(
                &born.born_amplitude,
                model,
            )?);
            for real in &born.real_amps {
                entry.merge_real(RealMatrixElement::new(MatrixElement::from_amplitude(
                    &real.amplitude,
                    model,
                )?));
            }
            match borns.get_mut(&born.born_proc.signature()) {
                Some(existing) => existing.merge(entry),
                None => {
                    borns.insert(born.born_proc.signature(), entry);
                }
            }
        }
        Ok(Self::new(borns.into_values().collect()))
    }

    /// Groups `multi` and binds its registries in one go.
    pub fn with_on_shell(
        multi: &FksMultiProcess,
        model: &dyn ModelQuery,
    ) -> Result<(Self, BindingReport), OnShellError> {
        let mut set = Self::from_multi_process(multi, model)?;
        let report = set.bind_on_shell(multi, model)?;
        Ok((set, report))
    }

    /// Attaches the on-shell registry of every real emission of `multi` to the real matrix
    /// element holding the same born and real signatures.
    ///
    /// Terms with the key of an already attached term are folded into it, so binding twice
    /// changes nothing. A real emission with candidates but no matching matrix element is an
    /// error.
    pub fn bind_on_shell(
        &mut self,
        multi: &FksMultiProcess,
        model: &dyn ModelQuery,
    ) -> Result<BindingReport, OnShellError> {
        let index = self.real_index();
        let mut report = BindingReport::default();
        let mut digests = Vec::new();
        for born in &multi.born_processes {
            let born_sig = born.born_proc.signature();
            for real in born.real_amps.iter().filter(|real| real.has_on_shell()) {
                let real_sig = real.process.signature();
                let Some(slots) = index.get(&(born_sig.clone(), real_sig.clone())) else {
                    return Err(OnShellError::Binding(
                        ErrorInfo::new(
                            "unbound-real-emission",
                            "no real matrix element matches a process with on-shell candidates",
                        )
                        .with_context("born", born_sig.to_string())
                        .with_context("real", real_sig.to_string())
                        .with_hint("build the result set from the same batch the search ran on"),
                    ));
                };
                let terms = on_shell_terms(&real.registry, model)?;
                for &(born_pos, real_pos) in slots {
                    let real_me = self
                        .matrix_elements
                        .get_mut(born_pos)
                        .and_then(|born_me| born_me.real_processes.get_mut(real_pos))
                        .ok_or_else(|| binding_error("stale-index", "real matrix element moved"))?;
                    real_me.merge_terms(terms.clone());
                    report.bound_reals += 1;
                    report.on_shell_terms += terms.len();
                }
                log::debug!(
                    "bound {} on-shell terms to real emission {real_sig}",
                    terms.len()
                );
                digests.push((born_sig.clone(), real_sig, real.registry.digest()?));
            }
        }
        report.digest = stable_hash_string(&digests)?;
        Ok(report)
    }

    /// Born matrix elements in insertion order.
    pub fn matrix_elements(&self) -> &[BornMatrixElement] {
        &self.matrix_elements
    }

    /// Iterates over every real matrix element.
    pub fn real_processes(&self) -> impl Iterator<Item = &RealMatrixElement> {
        self.matrix_elements
            .iter()
            .flat_map(|born| born.real_processes.iter())
    }

    fn all_matrix_elements(&self) -> impl Iterator<Item = &MatrixElement> {
        self.matrix_elements.iter().flat_map(|born| {
            std::iter::once(&born.born_matrix_element).chain(born.real_processes.iter().flat_map(
                |real| std::iter::once(&real.matrix_element).chain(real.os_matrix_elements()),
            ))
        })
    }

    /// Lorentz structures needed by borns, reals and on-shell terms.
    pub fn used_lorentz(&self) -> BTreeSet<String> {
        self.all_matrix_elements()
            .flat_map(|me| me.lorentz().iter().cloned())
            .collect()
    }

    /// Couplings needed by borns, reals and on-shell terms.
    pub fn used_couplings(&self) -> BTreeSet<String> {
        self.all_matrix_elements()
            .flat_map(|me| me.couplings().iter().cloned())
            .collect()
    }

    /// Resonant particles of every on-shell term.
    pub fn os_ids(&self) -> BTreeSet<ParticleId> {
        self.real_processes()
            .flat_map(RealMatrixElement::mother_ids)
            .collect()
    }

    /// Merges `other` into `self`.
    ///
    /// Borns and reals are matched when they share a process signature, on-shell terms by
    /// [`OnShellTerm::key`]. Matched entries union their processes; unmatched ones are appended.
    pub fn add_process(&mut self, other: AggregateResultSet) {
        let mut index: IndexMap<ProcessSignature, usize> = IndexMap::new();
        for (pos, born) in self.matrix_elements.iter().enumerate() {
            for proc in born.born_matrix_element.processes() {
                index.entry(proc.signature()).or_insert(pos);
            }
        }
        for born in other.matrix_elements {
            let signatures: Vec<ProcessSignature> = born
                .born_matrix_element
                .processes()
                .iter()
                .map(|proc| proc.signature())
                .collect();
            let pos = match signatures.iter().find_map(|sig| index.get(sig).copied()) {
                Some(pos) => {
                    self.matrix_elements[pos].merge(born);
                    pos
                }
                None => {
                    self.matrix_elements.push(born);
                    self.matrix_elements.len() - 1
                }
            };
            for sig in signatures {
                index.entry(sig).or_insert(pos);
            }
        }
    }

    /// Maps every (born, real) signature pair to the matrix-element slots holding it.
    fn real_index(&self) -> HashMap<(ProcessSignature, ProcessSignature), Vec<(usize, usize)>> {
        let mut index: HashMap<_, Vec<(usize, usize)>> = HashMap::new();
        for (born_pos, born) in self.matrix_elements.iter().enumerate() {
            for born_proc in born.born_matrix_element.processes() {
                for (real_pos, real) in born.real_processes.iter().enumerate() {
                    for real_proc in real.matrix_element.processes() {
                        let slots = index
                            .entry((born_proc.signature(), real_proc.signature()))
                            .or_default();
                        if !slots.contains(&(born_pos, real_pos)) {
                            slots.push((born_pos, real_pos));
                        }
                    }
                }
            }
        }
        index
    }
}

fn on_shell_terms(
    registry: &SubtractionRegistry,
    model: &dyn ModelQuery,
) -> Result<Vec<OnShellTerm>, OnShellError> {
    registry
        .iter()
        .map(|cand| {
            Ok(OnShellTerm {
                ids: cand.ids,
                diagrams: cand.diagrams.clone(),
                matrix_element: MatrixElement::from_decay_chain(&cand.amplitude, model)?,
            })
        })
        .collect()
}
