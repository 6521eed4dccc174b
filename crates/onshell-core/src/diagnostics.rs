//! Generator verbosity, passed explicitly and overridden through a scope guard.

use std::ops::Deref;

use log::{Level, LevelFilter};

/// Verbosity handed to an [`crate::AmplitudeGenerator`] for its own diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    level: LevelFilter,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
        }
    }
}

impl Diagnostics {
    /// Creates diagnostics at the given level.
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Current maximum level.
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Replaces the maximum level.
    pub fn set_level(&mut self, level: LevelFilter) {
        self.level = level;
    }

    /// Returns whether records at `level` should be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    /// Lowers (or raises) the level until the returned guard is dropped.
    pub fn override_level(&mut self, level: LevelFilter) -> VerbosityGuard<'_> {
        let previous = self.level;
        self.level = level;
        VerbosityGuard {
            diagnostics: self,
            previous,
        }
    }
}

/// Restores the previous verbosity when dropped, including on early return and unwind.
#[derive(Debug)]
pub struct VerbosityGuard<'a> {
    diagnostics: &'a mut Diagnostics,
    previous: LevelFilter,
}

impl VerbosityGuard<'_> {
    /// Level that will be restored.
    pub fn previous(&self) -> LevelFilter {
        self.previous
    }
}

impl Deref for VerbosityGuard<'_> {
    type Target = Diagnostics;

    fn deref(&self) -> &Diagnostics {
        self.diagnostics
    }
}

impl Drop for VerbosityGuard<'_> {
    fn drop(&mut self) {
        self.diagnostics.level = self.previous;
    }
}
