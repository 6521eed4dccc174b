#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;

use log::LevelFilter;
use onshell_core::{
    Amplitude, AmplitudeGenerator, DecayChainAmplitude, Diagnostics, Diagram, ErrorInfo, Leg,
    LegState, ModelQuery, OnShellError, ParticleId, Process, ProcessSignature, StaticModel, Vertex,
};
use onshell_search::RealEmission;

pub const TOY_MODEL: &str = r#"
name: toy_sm
particles:
  - { id: 21, name: g, antiname: g, mass: ZERO, self_conjugate: true }
  - { id: 22, name: a, antiname: a, mass: ZERO, self_conjugate: true }
  - { id: 23, name: z, antiname: z, mass: MZ, self_conjugate: true }
  - { id: 25, name: h, antiname: h, mass: MH, self_conjugate: true }
  - { id: 5, name: b, antiname: b~, mass: ZERO }
  - { id: 6, name: t, antiname: t~, mass: MT }
  - { id: 11, name: e-, antiname: e+, mass: ZERO }
  - { id: 24, name: w+, antiname: w-, mass: MW }
interactions:
  - { id: 1, particles: [-6, 5, 24], orders: { QED: 1 }, lorentz: [FFV2], couplings: [GC_100] }
  - { id: 2, particles: [-5, 6, -24], orders: { QED: 1 }, lorentz: [FFV2], couplings: [GC_100] }
  - { id: 3, particles: [-6, 6, 21], orders: { QCD: 1 }, lorentz: [FFV1], couplings: [GC_11] }
  - { id: 4, particles: [-5, 5, 21], orders: { QCD: 1 }, lorentz: [FFV1], couplings: [GC_11] }
  - { id: 5, particles: [23, 22, 22], orders: { QED: 2 }, lorentz: [VVV9], couplings: [GC_ZAA] }
  - { id: 6, particles: [-11, 11, 22], orders: { QED: 1 }, lorentz: [FFV1], couplings: [GC_3] }
  - { id: 7, particles: [-11, 11, 23], orders: { QED: 1 }, lorentz: [FFV2, FFV5], couplings: [GC_50, GC_59] }
  - { id: 8, particles: [25, 23, 23], orders: { QED: 1 }, lorentz: [VVS1], couplings: [GC_81] }
  - { id: 9, particles: [21, 21, 21], orders: { QCD: 1 }, lorentz: [VVV1], couplings: [GC_10] }
order_hierarchy: { QCD: 1, QED: 2 }
"#;

pub fn toy_model() -> StaticModel {
    StaticModel::from_yaml_str(TOY_MODEL).expect("toy model")
}

pub fn id(raw: i32) -> ParticleId {
    ParticleId::from_raw(raw)
}

/// Three times the electric charge, enough to reject non-conserving definitions.
fn charge3(id: ParticleId) -> i32 {
    let raw = id.as_raw();
    let magnitude = match raw.abs() {
        5 => -1,
        6 => 2,
        11 => -3,
        24 => 3,
        _ => 0,
    };
    magnitude * raw.signum()
}

fn conserves_charge(process: &Process) -> bool {
    let balance: i32 = process
        .legs
        .iter()
        .map(|leg| match leg.state {
            LegState::Initial => charge3(leg.id),
            LegState::Final => -charge3(leg.id),
        })
        .sum();
    balance == 0 && process.decay_chains.iter().all(conserves_charge)
}

/// Rule-based generator: one diagram per (sub)process, charge conservation enforced.
pub struct ToyGenerator {
    model: StaticModel,
    core_interaction: usize,
    rejected: HashSet<ProcessSignature>,
    empty: HashSet<ProcessSignature>,
    pub seen_levels: RefCell<Vec<LevelFilter>>,
    pub seen_processes: RefCell<Vec<Process>>,
}

impl ToyGenerator {
    pub fn new(model: StaticModel, core_interaction: usize) -> Self {
        Self {
            model,
            core_interaction,
            rejected: HashSet::new(),
            empty: HashSet::new(),
            seen_levels: RefCell::new(Vec::new()),
            seen_processes: RefCell::new(Vec::new()),
        }
    }

    pub fn rejecting(mut self, ids: &[i32]) -> Self {
        self.rejected.insert(ProcessSignature::from_raw(ids));
        self
    }

    pub fn without_diagrams_for(mut self, ids: &[i32]) -> Self {
        self.empty.insert(ProcessSignature::from_raw(ids));
        self
    }

    pub fn calls(&self) -> usize {
        self.seen_processes.borrow().len()
    }

    fn decay_interaction(&self, chain: &Process) -> usize {
        if chain.legs.len() == 2 {
            return Vertex::IDENTITY;
        }
        let mut wanted: Vec<ParticleId> = chain
            .legs
            .iter()
            .map(|leg| match leg.state {
                LegState::Initial => leg.id,
                LegState::Final => self
                    .model
                    .particle(leg.id)
                    .map(|part| part.anti_id())
                    .unwrap_or(leg.id),
            })
            .collect();
        wanted.sort();
        self.model
            .interactions()
            .find(|inter| {
                let mut have = inter.particles.clone();
                have.sort();
                have == wanted
            })
            .map(|inter| inter.id)
            .unwrap_or(Vertex::IDENTITY)
    }

    fn chain_amplitude(&self, chain: &Process) -> DecayChainAmplitude {
        let diagram = Diagram::new(vec![Vertex::new(
            chain.legs.clone(),
            self.decay_interaction(chain),
        )]);
        DecayChainAmplitude {
            amplitudes: vec![Amplitude::new(chain.clone(), vec![diagram])],
            decay_chains: chain
                .decay_chains
                .iter()
                .map(|sub| self.chain_amplitude(sub))
                .collect(),
        }
    }
}

impl AmplitudeGenerator for ToyGenerator {
    fn generate(
        &self,
        process: &Process,
        diagnostics: &Diagnostics,
    ) -> Result<DecayChainAmplitude, OnShellError> {
        self.seen_levels.borrow_mut().push(diagnostics.level());
        self.seen_processes.borrow_mut().push(process.clone());
        let signature = process.signature();
        if self.rejected.contains(&signature) || !conserves_charge(process) {
            return Err(OnShellError::InvalidProcess(
                ErrorInfo::new("no-diagrams-possible", "process violates a conservation law")
                    .with_context("process", signature.to_string()),
            ));
        }
        let diagrams = if self.empty.contains(&signature) {
            Vec::new()
        } else {
            vec![Diagram::new(vec![Vertex::new(
                process.legs.clone(),
                self.core_interaction,
            )])]
        };
        Ok(DecayChainAmplitude {
            amplitudes: vec![Amplitude::new(process.clone(), diagrams)],
            decay_chains: process
                .decay_chains
                .iter()
                .map(|chain| self.chain_amplitude(chain))
                .collect(),
        })
    }
}

pub fn weighted(process: Process, budget: i64) -> Process {
    process.with_order("WEIGHTED", budget)
}

/// `g g > w- t b~` with one diagram per resonant topology.
///
/// Diagram 0 has the `t~* > w- b~` vertex, diagram 1 the `w+* > t b~` vertex and diagram 2
/// neither.
pub fn single_top_real() -> RealEmission {
    let w = Leg::outgoing(-24, 3);
    let t = Leg::outgoing(6, 4);
    let bbar = Leg::outgoing(-5, 5);
    let g1 = Leg::initial(21, 1);
    let g2 = Leg::initial(21, 2);
    let process = weighted(Process::new(vec![g1, g2, w, t, bbar]), 4);

    let top_prop = Leg::outgoing(-6, 3);
    let w_prop = Leg::outgoing(24, 4);
    let diagrams = vec![
        Diagram::new(vec![
            Vertex::new(vec![w, bbar, top_prop], 1),
            Vertex::new(vec![g1, g2, Leg::outgoing(21, 1)], 9),
            Vertex::new(vec![Leg::outgoing(21, 1), t, top_prop], 3),
        ]),
        Diagram::new(vec![
            Vertex::new(vec![t, bbar, w_prop], 2),
            Vertex::new(vec![g1, g2, Leg::outgoing(21, 1)], 9),
            Vertex::new(vec![Leg::outgoing(21, 1), w, w_prop], 2),
        ]),
        Diagram::new(vec![
            Vertex::new(vec![g1, bbar, Leg::outgoing(-5, 1)], 4),
            Vertex::new(vec![Leg::outgoing(-5, 1), g2, Leg::outgoing(-5, 1)], 4),
            Vertex::new(vec![Leg::outgoing(-5, 1), w, t], 2),
        ]),
    ];
    RealEmission::new(Amplitude::new(process, diagrams))
}

/// `e+ e- > a a z z`: the photon pair can come from an on-shell z.
pub fn photon_pair_real() -> RealEmission {
    let legs = vec![
        Leg::initial(-11, 1),
        Leg::initial(11, 2),
        Leg::outgoing(22, 3),
        Leg::outgoing(22, 4),
        Leg::outgoing(23, 5),
        Leg::outgoing(23, 6),
    ];
    let diagrams = vec![Diagram::new(vec![
        Vertex::new(vec![legs[2], legs[3], Leg::outgoing(23, 3)], 5),
        Vertex::new(vec![legs[0], legs[1], Leg::outgoing(23, 1)], 7),
    ])];
    RealEmission::new(Amplitude::new(weighted(Process::new(legs), 8), diagrams))
}

/// `e+ e- > z z h`: no massless outgoing particle.
pub fn massive_real() -> RealEmission {
    let legs = vec![
        Leg::initial(-11, 1),
        Leg::initial(11, 2),
        Leg::outgoing(23, 3),
        Leg::outgoing(23, 4),
        Leg::outgoing(25, 5),
    ];
    RealEmission::new(Amplitude::new(weighted(Process::new(legs), 8), Vec::new()))
}

/// `e+ e- > z` through the `eez` vertex.
pub fn drell_yan_born() -> Amplitude {
    let legs = vec![Leg::initial(-11, 1), Leg::initial(11, 2), Leg::outgoing(23, 3)];
    let diagram = Diagram::new(vec![Vertex::new(legs.clone(), 7)]);
    Amplitude::new(weighted(Process::new(legs), 2), vec![diagram])
}

/// `e+ e- > z a`: only two outgoing legs.
pub fn drell_yan_photon_real() -> RealEmission {
    let legs = vec![
        Leg::initial(-11, 1),
        Leg::initial(11, 2),
        Leg::outgoing(23, 3),
        Leg::outgoing(22, 4),
    ];
    let diagram = Diagram::new(vec![
        Vertex::new(vec![legs[0], legs[3], Leg::outgoing(-11, 1)], 6),
        Vertex::new(vec![Leg::outgoing(-11, 1), legs[1], legs[2]], 7),
    ]);
    RealEmission::new(Amplitude::new(weighted(Process::new(legs), 4), vec![diagram]))
}

/// `z e- > e- a a z`: the resonant z also enters the process.
pub fn incoming_z_real() -> RealEmission {
    let legs = vec![
        Leg::initial(23, 1),
        Leg::initial(11, 2),
        Leg::outgoing(11, 3),
        Leg::outgoing(22, 4),
        Leg::outgoing(22, 5),
        Leg::outgoing(23, 6),
    ];
    let diagrams = vec![Diagram::new(vec![
        Vertex::new(vec![legs[3], legs[4], Leg::outgoing(23, 4)], 5),
        Vertex::new(vec![legs[1], legs[2], Leg::outgoing(23, 2)], 7),
    ])];
    RealEmission::new(Amplitude::new(weighted(Process::new(legs), 7), diagrams))
}
