//! Mechanic processors: one module per catalog mechanic.
//!
//! Each processor implements the shared [`Processor`](crate::pipeline::Processor)
//! contract and owns its domain algorithm and its unit extension record.
//! Cross-mechanic reads go through the unit's public attribute surface; no
//! processor assumes another processor's state exists.
//!
//! # Processor table
//!
//! [`build`] is the static mechanic-to-processor table the pipeline
//! constructor consults. A lookup miss there is a fatal construction error
//! upstream, never a silent skip.

mod ammunition;
mod armor_shred;
mod aura;
mod charge;
mod contagion;
mod engagement;
mod facing;
mod flanking;
mod intercept;
mod line_of_sight;
mod overwatch;
mod phalanx;
mod resolve;
mod riposte;

pub use ammunition::AmmunitionProcessor;
pub use armor_shred::ArmorShredProcessor;
pub use aura::AuraProcessor;
pub use charge::ChargeProcessor;
pub use contagion::ContagionProcessor;
pub use engagement::{classify, zoc_controllers, EngagementProcessor};
pub use facing::{attack_arc, FacingProcessor};
pub use flanking::FlankingProcessor;
pub use intercept::InterceptProcessor;
pub use line_of_sight::LineOfSightProcessor;
pub use overwatch::OverwatchProcessor;
pub use phalanx::PhalanxProcessor;
pub use resolve::ResolveProcessor;
pub use riposte::RiposteProcessor;

use crate::catalog::MechanicId;
use crate::config::BattleConfig;
use crate::pipeline::Processor;

/// Instantiates the processor for one enabled mechanic.
///
/// Returns `None` when the mechanic's config record is absent; the
/// pipeline constructor turns that into a fatal
/// [`MissingProcessor`](crate::error::ConfigError::MissingProcessor) error.
#[must_use]
pub(crate) fn build(mechanic: MechanicId, config: &BattleConfig) -> Option<Box<dyn Processor>> {
    let processor: Box<dyn Processor> = match mechanic {
        MechanicId::Facing => Box::new(FacingProcessor::new()),
        MechanicId::ArmorShred => Box::new(ArmorShredProcessor::new(config.armor_shred?)),
        MechanicId::Resolve => Box::new(ResolveProcessor::new(config.resolve?)),
        MechanicId::Engagement => Box::new(EngagementProcessor::new(config.engagement?)),
        MechanicId::Flanking => Box::new(FlankingProcessor::new(config.flanking?)),
        MechanicId::Riposte => Box::new(RiposteProcessor::new(config.riposte?)),
        MechanicId::Intercept => Box::new(InterceptProcessor::new()),
        MechanicId::Aura => Box::new(AuraProcessor::new(config.aura?)),
        MechanicId::Charge => Box::new(ChargeProcessor::new(config.charge?)),
        MechanicId::Overwatch => Box::new(OverwatchProcessor::new()),
        MechanicId::Phalanx => Box::new(PhalanxProcessor::new(config.phalanx?)),
        MechanicId::LineOfSight => Box::new(LineOfSightProcessor::new()),
        MechanicId::Ammunition => Box::new(AmmunitionProcessor::new(config.ammunition?)),
        MechanicId::Contagion => Box::new(ContagionProcessor::new(config.contagion?)),
    };
    Some(processor)
}
