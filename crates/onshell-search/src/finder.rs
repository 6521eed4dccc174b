use log::LevelFilter;
use onshell_core::serde::from_yaml_str;
use onshell_core::{
    AmplitudeGenerator, DecayChainAmplitude, Diagnostics, ErrorInfo, Interaction, Leg,
    ModelQuery, OnShellError, ParticleId, Process,
};
use serde::{Deserialize, Serialize};

use crate::matcher::find_os_diagrams;
use crate::real::RealEmission;
use crate::registry::{ResonanceCandidate, ResonanceIds};

fn finder_error(code: &str, message: impl Into<String>) -> OnShellError {
    OnShellError::Structure(ErrorInfo::new(code, message.into()))
}

fn default_order_key() -> String {
    "WEIGHTED".to_string()
}

fn default_quiet_generation() -> bool {
    true
}

fn default_generation_level() -> LevelFilter {
    LevelFilter::Error
}

/// Options controlling the resonance search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderOpts {
    /// Order key holding the weighted coupling budget of the real-emission process.
    #[serde(default = "default_order_key")]
    pub order_key: String,
    /// Whether to lower the generator verbosity while generating candidates.
    #[serde(default = "default_quiet_generation")]
    pub quiet_generation: bool,
    /// Verbosity handed to the generator when `quiet_generation` is set.
    #[serde(default = "default_generation_level")]
    pub generation_level: LevelFilter,
}

impl Default for FinderOpts {
    fn default() -> Self {
        Self {
            order_key: default_order_key(),
            quiet_generation: default_quiet_generation(),
            generation_level: default_generation_level(),
        }
    }
}

impl FinderOpts {
    /// Parses options from YAML, filling missing keys with defaults.
    pub fn from_yaml_str(data: &str) -> Result<Self, OnShellError> {
        from_yaml_str(data)
    }
}

fn weighted_budget(process: &Process, order_key: &str) -> Result<i64, OnShellError> {
    process.orders.get(order_key).copied().ok_or_else(|| {
        OnShellError::Structure(
            ErrorInfo::new(
                "missing-order-budget",
                "real-emission process carries no weighted order budget",
            )
            .with_context("order", order_key.to_string())
            .with_process(&process.signature()),
        )
    })
}

fn splitting_weight(model: &dyn ModelQuery, interaction: &Interaction) -> Result<i64, OnShellError> {
    interaction
        .orders
        .iter()
        .map(|(order, value)| Ok(i64::from(*value) * model.coupling_order_weight(order)?))
        .sum()
}

/// Removes one occurrence of each daughter from the vertex and returns the single particle left.
fn splitting_mother(
    interaction: &Interaction,
    first: ParticleId,
    second: ParticleId,
) -> Option<ParticleId> {
    let mut rest = interaction.particles.clone();
    for daughter in [first, second] {
        let pos = rest.iter().position(|&id| id == daughter)?;
        rest.remove(pos);
    }
    match rest.as_slice() {
        [mother] => Some(*mother),
        _ => None,
    }
}

fn legs_without_pair(process: &Process, first: &Leg, second: &Leg) -> Result<Vec<Leg>, OnShellError> {
    let others: Vec<Leg> = process
        .legs
        .iter()
        .filter(|leg| *leg != first && *leg != second)
        .copied()
        .collect();
    if others.len() + 2 != process.legs.len() {
        return Err(OnShellError::Structure(
            ErrorInfo::new("leg-count-mismatch", "splitting pair must remove exactly two legs")
                .with_process(&process.signature())
                .with_context("remaining", others.len().to_string()),
        ));
    }
    Ok(others)
}

/// Builds the production process with `mother` in place of the pair, decaying into the pair.
///
/// Every further outgoing occurrence of the mother id gets a trivial `mother > mother` chain so
/// that only one of them is decayed.
fn reduced_process(
    others: &[Leg],
    mother: Leg,
    daughters: [&Leg; 2],
    order_key: &str,
    budget: i64,
) -> Result<Process, OnShellError> {
    let expected = others.len() + 1;
    let mut legs = others.to_vec();
    let at = mother
        .number
        .checked_sub(1)
        .filter(|&at| at <= legs.len())
        .ok_or_else(|| finder_error("mother-position", "mother leg position is out of range"))?;
    legs.insert(at, mother);
    if legs.len() != expected {
        return Err(finder_error(
            "leg-count-mismatch",
            "reduced process must have one leg less than the real emission",
        ));
    }
    let occurrences = legs
        .iter()
        .filter(|leg| leg.is_final() && leg.id == mother.id)
        .count();
    for (idx, leg) in legs.iter_mut().enumerate() {
        leg.number = idx + 1;
    }

    let [first, second] = daughters;
    let decay = Process::decay(vec![
        Leg::initial(mother.id, 1),
        Leg::outgoing(first.id, 2),
        Leg::outgoing(second.id, 3),
    ]);
    let trivial = Process::decay(vec![Leg::initial(mother.id, 1), Leg::outgoing(mother.id, 2)]);
    let mut chains = vec![decay];
    chains.extend(std::iter::repeat(trivial).take(occurrences.saturating_sub(1)));

    let process = Process::new(legs)
        .with_order(order_key, budget)
        .with_decay_chains(chains);
    process.check_decay_roots()?;
    Ok(process)
}

fn generate_candidate(
    generator: &dyn AmplitudeGenerator,
    process: &Process,
    diagnostics: &mut Diagnostics,
    opts: &FinderOpts,
) -> Result<Option<DecayChainAmplitude>, OnShellError> {
    // 1 -> 1 trivial chains make the generator warn; silence it for the duration of the call.
    let outcome = if opts.quiet_generation {
        let guard = diagnostics.override_level(opts.generation_level);
        generator.generate(process, &guard)
    } else {
        generator.generate(process, diagnostics)
    };
    match outcome {
        Ok(amplitude) if amplitude.is_complete() => Ok(Some(amplitude)),
        Ok(_) => {
            log::debug!(
                "no diagrams for on-shell candidate {}",
                process.signature()
            );
            Ok(None)
        }
        Err(err) if err.is_expected_negative() => {
            log::debug!("on-shell candidate {} rejected: {err}", process.signature());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Looks for 1 -> 2 splittings of `real` that can go on shell and fills its registry.
///
/// All pairs of outgoing legs with at least one massless particle are tried against every
/// three-point interaction containing both. A splitting is kept when the remaining particle is
/// massive with a mass different from both daughters and the generator returns diagrams for
/// the reduced production x decay process. Returns the number of accepted candidates.
pub fn find_os_divergences(
    real: &mut RealEmission,
    model: &dyn ModelQuery,
    generator: &dyn AmplitudeGenerator,
    diagnostics: &mut Diagnostics,
    opts: &FinderOpts,
) -> Result<usize, OnShellError> {
    real.registry.clear();
    let process = &real.process;
    let final_legs: Vec<Leg> = process.final_legs().copied().collect();
    let budget = weighted_budget(process, &opts.order_key)?;

    let mut accepted = Vec::new();
    for leg_2 in &final_legs {
        for leg_3 in final_legs.iter().filter(|leg| leg.number > leg_2.number) {
            let part_2 = model.particle(leg_2.id)?;
            let part_3 = model.particle(leg_3.id)?;
            if !part_2.is_massless() && !part_3.is_massless() {
                continue;
            }
            let others = legs_without_pair(process, leg_2, leg_3)?;

            for interaction in model.interactions_containing(leg_2.id, leg_3.id) {
                let Some(mother_id) = splitting_mother(interaction, leg_2.id, leg_3.id) else {
                    continue;
                };
                let part_1 = model.particle(mother_id)?;
                if part_1.is_massless() || part_1.mass == part_2.mass || part_1.mass == part_3.mass {
                    continue;
                }
                // the vertex lists incoming particles, the mother leaves the production process
                let leg_1 = Leg::outgoing(part_1.anti_id(), leg_2.number);
                let prod_budget = budget - splitting_weight(model, interaction)?;
                let os_process =
                    reduced_process(&others, leg_1, [leg_2, leg_3], &opts.order_key, prod_budget)?;

                let Some(amplitude) = generate_candidate(generator, &os_process, diagnostics, opts)?
                else {
                    continue;
                };
                log::info!(
                    "Process {} has been generated for on-shell subtraction",
                    os_process.input_string(model)?
                );
                let diagrams = find_os_diagrams(&real.amplitude, &leg_1, [leg_2, leg_3]);
                accepted.push(ResonanceCandidate {
                    ids: ResonanceIds::new(leg_1.id, leg_2.id, leg_3.id),
                    process: os_process,
                    amplitude,
                    diagrams,
                });
            }
        }
    }

    for candidate in accepted {
        real.registry.push(candidate);
    }
    Ok(real.registry.len())
}
