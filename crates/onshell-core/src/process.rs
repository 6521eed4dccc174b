//! Legs, processes and the id signatures used to identify them.

use std::collections::BTreeMap;
use std::fmt;

use ::serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OnShellError};
use crate::model::ModelQuery;
use crate::ParticleId;

/// Whether a leg enters or leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegState {
    /// Incoming leg.
    Initial,
    /// Outgoing leg.
    Final,
}

/// External leg of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leg {
    /// Particle carried by the leg.
    pub id: ParticleId,
    /// Incoming or outgoing.
    pub state: LegState,
    /// One-based position of the leg within its process.
    pub number: usize,
}

impl Leg {
    /// Creates an incoming leg.
    pub fn initial(id: impl Into<ParticleId>, number: usize) -> Self {
        Self {
            id: id.into(),
            state: LegState::Initial,
            number,
        }
    }

    /// Creates an outgoing leg.
    pub fn outgoing(id: impl Into<ParticleId>, number: usize) -> Self {
        Self {
            id: id.into(),
            state: LegState::Final,
            number,
        }
    }

    /// Returns whether the leg is outgoing.
    pub fn is_final(&self) -> bool {
        self.state == LegState::Final
    }
}

/// Ordered list of the top-level leg ids of a process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessSignature(Vec<ParticleId>);

impl ProcessSignature {
    /// Builds a signature from raw particle ids.
    pub fn from_raw(ids: &[i32]) -> Self {
        Self(ids.iter().copied().map(ParticleId::from_raw).collect())
    }

    /// Returns the ids making up the signature.
    pub fn ids(&self) -> &[ParticleId] {
        &self.0
    }
}

impl fmt::Display for ProcessSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, id) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "]")
    }
}

/// Process definition, optionally composed with decay chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// External legs in their canonical order.
    pub legs: Vec<Leg>,
    /// Coupling order constraints, e.g. `WEIGHTED`.
    #[serde(default)]
    pub orders: BTreeMap<String, i64>,
    /// Decay chains attached to the outgoing legs of this process.
    #[serde(default)]
    pub decay_chains: Vec<Process>,
    /// Whether this process is itself a decay chain.
    #[serde(default)]
    pub is_decay_chain: bool,
}

impl Process {
    /// Creates a production process without order constraints.
    pub fn new(legs: Vec<Leg>) -> Self {
        Self {
            legs,
            orders: BTreeMap::new(),
            decay_chains: Vec::new(),
            is_decay_chain: false,
        }
    }

    /// Creates a decay chain process.
    pub fn decay(legs: Vec<Leg>) -> Self {
        Self {
            is_decay_chain: true,
            ..Self::new(legs)
        }
    }

    /// Adds an order constraint.
    pub fn with_order(mut self, order: impl Into<String>, value: i64) -> Self {
        self.orders.insert(order.into(), value);
        self
    }

    /// Attaches decay chains.
    pub fn with_decay_chains(mut self, chains: Vec<Process>) -> Self {
        self.decay_chains = chains;
        self
    }

    /// Returns the id signature of the top-level legs.
    pub fn signature(&self) -> ProcessSignature {
        ProcessSignature(self.legs.iter().map(|leg| leg.id).collect())
    }

    /// Iterates over the outgoing legs.
    pub fn final_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter().filter(|leg| leg.is_final())
    }

    /// Checks that every decay chain is rooted on an outgoing leg of its parent.
    pub fn check_decay_roots(&self) -> Result<(), OnShellError> {
        for chain in &self.decay_chains {
            let root = chain
                .legs
                .first()
                .filter(|leg| leg.state == LegState::Initial)
                .ok_or_else(|| {
                    OnShellError::Structure(ErrorInfo::new(
                        "decay-without-root",
                        "decay chain must start with an incoming leg",
                    ))
                })?;
            if !self.final_legs().any(|leg| leg.id == root.id) {
                return Err(OnShellError::Structure(
                    ErrorInfo::new(
                        "orphan-decay-chain",
                        "decay chain root does not appear among the outgoing legs",
                    )
                    .with_context("root", root.id.to_string())
                    .with_process(&self.signature()),
                ));
            }
            chain.check_decay_roots()?;
        }
        Ok(())
    }

    /// Renders the process in the usual `a b > c d, (c > e f)` notation.
    pub fn input_string(&self, model: &dyn ModelQuery) -> Result<String, OnShellError> {
        let mut initial = Vec::new();
        let mut outgoing = Vec::new();
        for leg in &self.legs {
            let name = model.particle(leg.id)?.name;
            match leg.state {
                LegState::Initial => initial.push(name),
                LegState::Final => outgoing.push(name),
            }
        }
        let mut out = format!("{} > {}", initial.join(" "), outgoing.join(" "));
        for (order, value) in &self.orders {
            out.push_str(&format!(" {order}<={value}"));
        }
        for chain in &self.decay_chains {
            out.push_str(&format!(", ({})", chain.input_string(model)?));
        }
        Ok(out)
    }
}
