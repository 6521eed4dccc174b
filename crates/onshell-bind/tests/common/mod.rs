#![allow(dead_code)]

use onshell_core::{
    Amplitude, AmplitudeGenerator, DecayChainAmplitude, Diagnostics, Diagram, ErrorInfo, Leg,
    LegState, ModelQuery, OnShellError, ParticleId, Process, StaticModel, Vertex,
};
use onshell_search::{BornProcess, FinderOpts, FksMultiProcess, RealEmission};

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

/// One diagram per (sub)process: gluon-initiated cores use the `ttg` vertex, the rest `eez`.
pub struct ToyGenerator {
    model: StaticModel,
}

impl ToyGenerator {
    pub fn new() -> Self {
        Self { model: toy_model() }
    }

    fn decay_interaction(&self, chain: &Process) -> Result<usize, OnShellError> {
        if chain.legs.len() == 2 {
            return Ok(Vertex::IDENTITY);
        }
        let mut wanted = Vec::new();
        for leg in &chain.legs {
            wanted.push(match leg.state {
                LegState::Initial => leg.id,
                LegState::Final => self.model.particle(leg.id)?.anti_id(),
            });
        }
        wanted.sort();
        self.model
            .interactions()
            .find(|inter| {
                let mut have = inter.particles.clone();
                have.sort();
                have == wanted
            })
            .map(|inter| inter.id)
            .ok_or_else(|| {
                OnShellError::InvalidProcess(ErrorInfo::new(
                    "no-decay-vertex",
                    "decay chain has no matching vertex",
                ))
            })
    }

    fn chain_amplitude(&self, chain: &Process) -> Result<DecayChainAmplitude, OnShellError> {
        let diagram = Diagram::new(vec![Vertex::new(
            chain.legs.clone(),
            self.decay_interaction(chain)?,
        )]);
        Ok(DecayChainAmplitude {
            amplitudes: vec![Amplitude::new(chain.clone(), vec![diagram])],
            decay_chains: chain
                .decay_chains
                .iter()
                .map(|sub| self.chain_amplitude(sub))
                .collect::<Result<_, _>>()?,
        })
    }
}

impl AmplitudeGenerator for ToyGenerator {
    fn generate(
        &self,
        process: &Process,
        _diagnostics: &Diagnostics,
    ) -> Result<DecayChainAmplitude, OnShellError> {
        let core = if process.legs[0].id == id(21) { 3 } else { 7 };
        Ok(DecayChainAmplitude {
            amplitudes: vec![Amplitude::new(
                process.clone(),
                vec![Diagram::new(vec![Vertex::new(process.legs.clone(), core)])],
            )],
            decay_chains: process
                .decay_chains
                .iter()
                .map(|chain| self.chain_amplitude(chain))
                .collect::<Result<_, _>>()?,
        })
    }
}

fn legs(initial: &[i32], outgoing: &[i32]) -> Vec<Leg> {
    let incoming = initial.iter().map(|&raw| (raw, LegState::Initial));
    let leaving = outgoing.iter().map(|&raw| (raw, LegState::Final));
    incoming
        .chain(leaving)
        .enumerate()
        .map(|(idx, (raw, state))| match state {
            LegState::Initial => Leg::initial(raw, idx + 1),
            LegState::Final => Leg::outgoing(raw, idx + 1),
        })
        .collect()
}

/// `g g > t t~` through a single `ttg` vertex.
pub fn top_pair_born() -> BornProcess {
    let legs = legs(&[21, 21], &[6, -6]);
    let diagram = Diagram::new(vec![
        Vertex::new(vec![legs[0], legs[1], Leg::outgoing(21, 1)], 9),
        Vertex::new(vec![Leg::outgoing(21, 1), legs[2], legs[3]], 3),
    ]);
    BornProcess::new(Amplitude::new(
        Process::new(legs).with_order("WEIGHTED", 2),
        vec![diagram],
    ))
}

/// `e+ e- > a z z` through the `eea` vertex.
pub fn photon_born() -> BornProcess {
    let legs = legs(&[-11, 11], &[22, 23, 23]);
    let diagram = Diagram::new(vec![Vertex::new(legs.clone(), 6)]);
    BornProcess::new(Amplitude::new(
        Process::new(legs).with_order("WEIGHTED", 6),
        vec![diagram],
    ))
}

/// `g g > w- t b~`: diagram 0 holds the `t~` splitting, diagram 1 the `w+` one.
pub fn single_top_real() -> RealEmission {
    let legs = legs(&[21, 21], &[-24, 6, -5]);
    let (w, t, bbar) = (legs[2], legs[3], legs[4]);
    let top_prop = Leg::outgoing(-6, 3);
    let w_prop = Leg::outgoing(24, 4);
    let diagrams = vec![
        Diagram::new(vec![
            Vertex::new(vec![w, bbar, top_prop], 1),
            Vertex::new(vec![legs[0], legs[1], Leg::outgoing(21, 1)], 9),
            Vertex::new(vec![Leg::outgoing(21, 1), t, top_prop], 3),
        ]),
        Diagram::new(vec![
            Vertex::new(vec![t, bbar, w_prop], 2),
            Vertex::new(vec![legs[0], legs[1], Leg::outgoing(21, 1)], 9),
            Vertex::new(vec![Leg::outgoing(21, 1), w, w_prop], 2),
        ]),
    ];
    RealEmission::new(Amplitude::new(
        Process::new(legs).with_order("WEIGHTED", 4),
        diagrams,
    ))
}

/// `e+ e- > a a z z` with the photon pair from a `z`.
pub fn photon_pair_real() -> RealEmission {
    let legs = legs(&[-11, 11], &[22, 22, 23, 23]);
    let diagrams = vec![Diagram::new(vec![
        Vertex::new(vec![legs[2], legs[3], Leg::outgoing(23, 3)], 5),
        Vertex::new(vec![legs[0], legs[1], Leg::outgoing(23, 1)], 7),
    ])];
    RealEmission::new(Amplitude::new(
        Process::new(legs).with_order("WEIGHTED", 8),
        diagrams,
    ))
}

/// `e+ e- > z z h`: nothing can go on shell.
pub fn massive_real() -> RealEmission {
    let legs = legs(&[-11, 11], &[23, 23, 25]);
    let diagram = Diagram::new(vec![Vertex::new(legs.clone(), 8)]);
    RealEmission::new(Amplitude::new(
        Process::new(legs).with_order("WEIGHTED", 8),
        vec![diagram],
    ))
}

/// Top-pair born with the single-top real, photon born with the photon-pair and massive reals.
pub fn batch() -> FksMultiProcess {
    FksMultiProcess::new(vec![
        top_pair_born().with_real(single_top_real()),
        photon_born()
            .with_real(photon_pair_real())
            .with_real(massive_real()),
    ])
}

/// Runs the resonance search over a batch.
pub fn searched(mut multi: FksMultiProcess) -> FksMultiProcess {
    multi
        .find_os_divergences(
            &toy_model(),
            &ToyGenerator::new(),
            &mut Diagnostics::default(),
            &FinderOpts::default(),
        )
        .expect("search");
    multi
}

/// `e- e+ > a a z z`: same diagrams as [`photon_pair_real`] with the beams swapped.
pub fn swapped_photon_pair_real() -> RealEmission {
    let legs = legs(&[11, -11], &[22, 22, 23, 23]);
    let diagrams = vec![Diagram::new(vec![
        Vertex::new(vec![legs[2], legs[3], Leg::outgoing(23, 3)], 5),
        Vertex::new(vec![legs[0], legs[1], Leg::outgoing(23, 1)], 7),
    ])];
    RealEmission::new(Amplitude::new(
        Process::new(legs).with_order("WEIGHTED", 8),
        diagrams,
    ))
}
