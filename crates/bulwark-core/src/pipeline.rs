//! The phase pipeline: composes mechanic processors into one deterministic
//! state transition per battle phase.
//!
//! For each of the six phases the pipeline invokes, in catalog order, the
//! [`Processor`] of every enabled mechanic, threading the state value
//! through each call, a pure fold. A processor with nothing to do for a
//! phase returns its input unchanged; it never throws.
//!
//! # Determinism
//!
//! Given the same processor list, input state, and context (seed included),
//! the output is byte-identical on every invocation. That is the replay and
//! backward-compatibility guarantee, and the reason processors may not
//! consult wall-clock time, I/O, or unseeded randomness.

use tracing::{debug, trace};

use crate::catalog::{self, MechanicId};
use crate::config::BattleConfig;
use crate::error::ConfigError;
use crate::phase::{Phase, PhaseContext};
use crate::processors;
use crate::state::BattleState;

/// One mechanic's behavior, plugged into the phase pipeline.
///
/// Implementations own their domain algorithm and their unit extension
/// record. They must be pure over their declared inputs: same phase, state,
/// and context always produce the same output state.
pub trait Processor: Send + Sync {
    /// Which mechanic this processor implements.
    fn mechanic(&self) -> MechanicId;

    /// The phases this processor acts in.
    ///
    /// Metadata only: the pipeline still calls `apply` for every phase, and
    /// the contract is that `apply` returns its input unchanged for any
    /// phase not listed here. Tests verify that contract per processor.
    fn phases(&self) -> &'static [Phase];

    /// Advances the battle state for one phase of one unit turn.
    ///
    /// Takes the state by value and returns the successor state; the input
    /// value is consumed, never aliased.
    fn apply(&self, phase: Phase, state: BattleState, ctx: &PhaseContext) -> BattleState;
}

/// An ordered list of enabled processors.
///
/// Built once per battle from a normalized configuration; immutable
/// afterward.
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    /// Builds the pipeline for a normalized configuration.
    ///
    /// Instantiates a processor for every enabled mechanic, in catalog
    /// order, after re-checking the catalog DAG and the configuration
    /// invariants. Disabled mechanics get no processor at all; they are
    /// never invoked, not merely inert.
    ///
    /// # Errors
    ///
    /// - everything [`catalog::validate`] and [`BattleConfig::validate`]
    ///   can return;
    /// - [`ConfigError::MissingProcessor`] if an enabled mechanic has no
    ///   entry in the processor table, so an unimplemented mechanic can
    ///   never masquerade as a no-op.
    pub fn from_config(config: &BattleConfig) -> Result<Self, ConfigError> {
        Self::with_order(&MechanicId::ALL, config)
    }

    /// Order-explicit construction core.
    ///
    /// Production always passes the catalog order. Tests pass permutations
    /// to verify that reordering *independent* mechanics cannot change
    /// outcomes.
    pub(crate) fn with_order(
        order: &[MechanicId],
        config: &BattleConfig,
    ) -> Result<Self, ConfigError> {
        catalog::validate()?;
        config.validate()?;

        let mut built = Vec::new();
        for &mechanic in order {
            if !config.enabled(mechanic) {
                continue;
            }
            let processor =
                processors::build(mechanic, config).ok_or(ConfigError::MissingProcessor(mechanic))?;
            built.push(processor);
        }

        debug!(
            processors = built.len(),
            "pipeline built from normalized config"
        );
        Ok(Self { processors: built })
    }

    /// Runs one phase for the acting unit: the pure fold over processors.
    #[must_use]
    pub fn run(&self, phase: Phase, state: BattleState, ctx: &PhaseContext) -> BattleState {
        self.processors.iter().fold(state, |acc, processor| {
            trace!(
                mechanic = %processor.mechanic(),
                %phase,
                actor = %ctx.actor,
                "applying processor"
            );
            processor.apply(phase, acc, ctx)
        })
    }

    /// The mechanics this pipeline runs, in execution order.
    #[must_use]
    pub fn mechanics(&self) -> Vec<MechanicId> {
        self.processors.iter().map(|p| p.mechanic()).collect()
    }

    /// Number of processors in the pipeline.
    #[must_use]
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// True when no mechanic is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("mechanics", &self.mechanics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{normalize, resolve_dependencies, MechanicSetting, Preset, Selection};

    fn config_for(enabled: &[MechanicId]) -> BattleConfig {
        let partial: Selection = enabled
            .iter()
            .map(|&m| (m, MechanicSetting::Enabled))
            .collect();
        normalize(&resolve_dependencies(&partial)).unwrap()
    }

    #[test]
    fn empty_config_builds_empty_pipeline() {
        let pipeline = Pipeline::from_config(&BattleConfig::default()).unwrap();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn disabled_mechanics_get_no_processor() {
        let pipeline = Pipeline::from_config(&config_for(&[MechanicId::Riposte])).unwrap();
        // riposte plus its transitive chain, nothing else.
        assert_eq!(
            pipeline.mechanics(),
            vec![MechanicId::Facing, MechanicId::Flanking, MechanicId::Riposte]
        );
    }

    #[test]
    fn processors_run_in_catalog_order() {
        let config = normalize(&resolve_dependencies(&Preset::Full.selection())).unwrap();
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.mechanics(), MechanicId::ALL.to_vec());
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = BattleConfig {
            riposte: Some(crate::config::RiposteConfig::default()),
            ..BattleConfig::default()
        };
        let err = Pipeline::from_config(&config).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingPrerequisite {
                mechanic: MechanicId::Riposte,
                prerequisite: MechanicId::Flanking,
            }
        );
    }
}
