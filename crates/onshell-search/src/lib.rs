#![deny(missing_docs)]
#![doc = "On-shell resonance search for real-emission processes: candidate enumeration, diagram matching and the per-process subtraction registry."]

/// Resonance candidate enumeration and generation.
pub mod finder;
/// Diagram matching against the full real-emission amplitude.
pub mod matcher;
/// Real-emission and born-process containers.
pub mod real;
/// Per-process registry of accepted candidates.
pub mod registry;

pub use finder::{find_os_divergences, FinderOpts};
pub use matcher::find_os_diagrams;
pub use real::{BornProcess, FksMultiProcess, RealEmission};
pub use registry::{ResonanceCandidate, ResonanceIds, SubtractionRegistry};
