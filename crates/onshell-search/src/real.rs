use onshell_core::{Amplitude, AmplitudeGenerator, Diagnostics, ModelQuery, OnShellError, Process};
use serde::{Deserialize, Serialize};

use crate::finder::{find_os_divergences, FinderOpts};
use crate::registry::SubtractionRegistry;

/// Real-emission process with its generated amplitude and on-shell registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealEmission {
    /// Real-emission process definition.
    pub process: Process,
    /// Amplitude generated for `process`.
    pub amplitude: Amplitude,
    /// On-shell candidates found for this process.
    #[serde(default)]
    pub registry: SubtractionRegistry,
}

impl RealEmission {
    /// Wraps an amplitude; the process is taken from the amplitude.
    pub fn new(amplitude: Amplitude) -> Self {
        Self {
            process: amplitude.process.clone(),
            amplitude,
            registry: SubtractionRegistry::new(),
        }
    }

    /// Returns whether any on-shell candidate was accepted.
    pub fn has_on_shell(&self) -> bool {
        !self.registry.is_empty()
    }
}

/// Born process with the real emissions generated from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BornProcess {
    /// Born process definition.
    pub born_proc: Process,
    /// Amplitude generated for the born process.
    pub born_amplitude: Amplitude,
    /// Real emissions of this born.
    #[serde(default)]
    pub real_amps: Vec<RealEmission>,
}

impl BornProcess {
    /// Creates a born without real emissions; the process is taken from the amplitude.
    pub fn new(born_amplitude: Amplitude) -> Self {
        Self {
            born_proc: born_amplitude.process.clone(),
            born_amplitude,
            real_amps: Vec::new(),
        }
    }

    /// Adds a real emission.
    pub fn with_real(mut self, real: RealEmission) -> Self {
        self.real_amps.push(real);
        self
    }
}

/// Batch of born processes processed together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FksMultiProcess {
    /// Born processes in input order.
    pub born_processes: Vec<BornProcess>,
}

impl FksMultiProcess {
    /// Creates a batch from born processes.
    pub fn new(born_processes: Vec<BornProcess>) -> Self {
        Self { born_processes }
    }

    /// Iterates over every real emission of every born.
    pub fn real_emissions(&self) -> impl Iterator<Item = &RealEmission> {
        self.born_processes.iter().flat_map(|born| born.real_amps.iter())
    }

    /// Runs the resonance search on every real emission and returns the total number of candidates.
    pub fn find_os_divergences(
        &mut self,
        model: &dyn ModelQuery,
        generator: &dyn AmplitudeGenerator,
        diagnostics: &mut Diagnostics,
        opts: &FinderOpts,
    ) -> Result<usize, OnShellError> {
        let mut total = 0;
        for born in &mut self.born_processes {
            for real in &mut born.real_amps {
                total += find_os_divergences(real, model, generator, diagnostics, opts)?;
            }
        }
        Ok(total)
    }
}
