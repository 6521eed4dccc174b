//! Particle and interaction model: the query trait consumed by the search and an in-memory implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use ::serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OnShellError};
use crate::serde::{from_json_slice, from_yaml_str};
use crate::ParticleId;

fn model_error(code: &str, message: impl Into<String>) -> OnShellError {
    OnShellError::Model(ErrorInfo::new(code, message.into()))
}

/// Mass class of a particle: either exactly zero or a symbolic parameter label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MassClass {
    /// Massless particle.
    Zero,
    /// Massive particle whose mass is the named model parameter.
    Named(String),
}

impl MassClass {
    /// Returns whether the mass class is zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, MassClass::Zero)
    }
}

impl From<String> for MassClass {
    fn from(label: String) -> Self {
        if label.eq_ignore_ascii_case("zero") {
            MassClass::Zero
        } else {
            MassClass::Named(label)
        }
    }
}

impl From<&str> for MassClass {
    fn from(label: &str) -> Self {
        MassClass::from(label.to_string())
    }
}

impl From<MassClass> for String {
    fn from(mass: MassClass) -> Self {
        match mass {
            MassClass::Zero => "ZERO".to_string(),
            MassClass::Named(label) => label,
        }
    }
}

impl fmt::Display for MassClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MassClass::Zero => write!(f, "ZERO"),
            MassClass::Named(label) => write!(f, "{label}"),
        }
    }
}

/// Immutable particle description owned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Particle {
    /// Signed particle identifier.
    pub id: ParticleId,
    /// Name of the particle.
    pub name: String,
    /// Name of the antiparticle.
    pub antiname: String,
    /// Mass class used for resonance selection.
    pub mass: MassClass,
    /// Whether the particle is its own antiparticle.
    #[serde(default)]
    pub self_conjugate: bool,
}

impl Particle {
    /// Identifier of the antiparticle.
    pub fn anti_id(&self) -> ParticleId {
        if self.self_conjugate {
            self.id
        } else {
            self.id.flipped()
        }
    }

    /// Returns whether the particle is massless.
    pub fn is_massless(&self) -> bool {
        self.mass.is_zero()
    }

    /// Returns the antiparticle description.
    pub fn antiparticle(&self) -> Particle {
        Particle {
            id: self.anti_id(),
            name: self.antiname.clone(),
            antiname: self.name.clone(),
            mass: self.mass.clone(),
            self_conjugate: self.self_conjugate,
        }
    }
}

/// Interaction vertex of the model. All particles are listed as incoming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction identifier. Zero is reserved for the identity vertex.
    pub id: usize,
    /// Particles meeting at the vertex.
    pub particles: Vec<ParticleId>,
    /// Coupling orders carried by the vertex.
    #[serde(default)]
    pub orders: BTreeMap<String, u32>,
    /// Lorentz structures used by the vertex.
    #[serde(default)]
    pub lorentz: Vec<String>,
    /// Coupling symbols used by the vertex.
    #[serde(default)]
    pub couplings: Vec<String>,
}

impl Interaction {
    /// Returns whether the particle appears at least once at the vertex.
    pub fn contains(&self, id: ParticleId) -> bool {
        self.particles.contains(&id)
    }
}

/// Read access to a particle and interaction model.
pub trait ModelQuery: Send + Sync {
    /// Returns the model name.
    fn name(&self) -> &str;

    /// Returns the particle (or antiparticle) with the given identifier.
    fn particle(&self, id: ParticleId) -> Result<Particle, OnShellError>;

    /// Returns the interaction with the given identifier.
    fn interaction(&self, id: usize) -> Result<&Interaction, OnShellError>;

    /// Returns every three-point interaction listing both particles.
    fn interactions_containing(&self, a: ParticleId, b: ParticleId) -> Vec<&Interaction>;

    /// Returns the weight of a coupling order in the weighted order budget.
    fn coupling_order_weight(&self, order: &str) -> Result<i64, OnShellError>;
}

/// Serialisable description of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCard {
    /// Model name.
    pub name: String,
    /// Particles, listed once with their positive identifier.
    pub particles: Vec<Particle>,
    /// Interactions of the model.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    /// Weights of each coupling order.
    #[serde(default)]
    pub order_hierarchy: BTreeMap<String, i64>,
}

/// In-memory model built from a [`ModelCard`].
#[derive(Debug, Clone)]
pub struct StaticModel {
    name: String,
    particles: BTreeMap<ParticleId, Particle>,
    interactions: BTreeMap<usize, Interaction>,
    order_hierarchy: BTreeMap<String, i64>,
}

impl StaticModel {
    /// Validates a card and indexes its contents.
    pub fn from_card(card: ModelCard) -> Result<Self, OnShellError> {
        let mut particles = BTreeMap::new();
        for particle in card.particles {
            if particle.id.as_raw() <= 0 {
                return Err(OnShellError::Model(
                    ErrorInfo::new("non-positive-id", "model cards list particles by positive id")
                        .with_context("particle", particle.name.clone())
                        .with_context("id", particle.id.to_string()),
                ));
            }
            let id = particle.id;
            if particles.insert(id, particle).is_some() {
                return Err(OnShellError::Model(
                    ErrorInfo::new("duplicate-particle", "particle listed twice")
                        .with_context("id", id.to_string()),
                ));
            }
        }

        let mut model = Self {
            name: card.name,
            particles,
            interactions: BTreeMap::new(),
            order_hierarchy: card.order_hierarchy,
        };
        for interaction in card.interactions {
            if interaction.id == 0 {
                return Err(model_error(
                    "reserved-interaction-id",
                    "interaction id 0 is reserved for identity vertices",
                ));
            }
            for &id in &interaction.particles {
                model.particle(id)?;
            }
            for order in interaction.orders.keys() {
                model.coupling_order_weight(order)?;
            }
            let id = interaction.id;
            if model.interactions.insert(id, interaction).is_some() {
                return Err(OnShellError::Model(
                    ErrorInfo::new("duplicate-interaction", "interaction listed twice")
                        .with_context("id", id.to_string()),
                ));
            }
        }
        Ok(model)
    }

    /// Builds a model from a YAML model card.
    pub fn from_yaml_str(data: &str) -> Result<Self, OnShellError> {
        Self::from_card(from_yaml_str(data)?)
    }

    /// Builds a model from a JSON model card.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, OnShellError> {
        Self::from_card(from_json_slice(data)?)
    }

    /// Loads a model card from disk. Files ending in `.json` are read as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OnShellError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            OnShellError::Serde(
                ErrorInfo::new("model-read", "failed to read model card")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_slice(&bytes),
            _ => {
                let text = String::from_utf8(bytes).map_err(|err| {
                    OnShellError::Serde(
                        ErrorInfo::new("model-utf8", "model card is not valid UTF-8")
                            .with_context("path", path.display().to_string())
                            .with_hint(err.to_string()),
                    )
                })?;
                Self::from_yaml_str(&text)
            }
        }
    }

    /// Iterates over all interactions in identifier order.
    pub fn interactions(&self) -> impl Iterator<Item = &Interaction> {
        self.interactions.values()
    }
}

impl ModelQuery for StaticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn particle(&self, id: ParticleId) -> Result<Particle, OnShellError> {
        let unknown = || {
            OnShellError::Model(
                ErrorInfo::new("unknown-particle", "particle is not part of the model")
                    .with_context("model", self.name.clone())
                    .with_context("id", id.to_string()),
            )
        };
        let particle = self.particles.get(&id.abs()).ok_or_else(unknown)?;
        if id.as_raw() > 0 {
            Ok(particle.clone())
        } else if particle.self_conjugate {
            Err(unknown())
        } else {
            Ok(particle.antiparticle())
        }
    }

    fn interaction(&self, id: usize) -> Result<&Interaction, OnShellError> {
        self.interactions.get(&id).ok_or_else(|| {
            OnShellError::Model(
                ErrorInfo::new("unknown-interaction", "interaction is not part of the model")
                    .with_context("model", self.name.clone())
                    .with_context("id", id.to_string()),
            )
        })
    }

    fn interactions_containing(&self, a: ParticleId, b: ParticleId) -> Vec<&Interaction> {
        self.interactions
            .values()
            .filter(|inter| inter.particles.len() == 3 && inter.contains(a) && inter.contains(b))
            .collect()
    }

    fn coupling_order_weight(&self, order: &str) -> Result<i64, OnShellError> {
        self.order_hierarchy.get(order).copied().ok_or_else(|| {
            OnShellError::Model(
                ErrorInfo::new("unknown-order", "coupling order has no weight in the hierarchy")
                    .with_context("model", self.name.clone())
                    .with_context("order", order.to_string()),
            )
        })
    }
}
