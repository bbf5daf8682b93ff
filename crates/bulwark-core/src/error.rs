//! Error taxonomy for battle setup.
//!
//! Every error in this crate is a construction-time error: an inconsistent
//! configuration is unsafe and undiagnosable once phases start executing, so
//! everything fails fast before the first phase runs. There is no retry
//! policy anywhere in the engine; the only recoverable condition is
//! "mechanic disabled", which every processor handles by doing nothing.

use thiserror::Error;

use crate::catalog::MechanicId;

/// A configuration or catalog problem detected at battle setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A mechanic name outside the fixed catalog was supplied.
    #[error("unknown mechanic identifier `{0}`")]
    UnknownMechanic(String),

    /// An override payload was keyed under the wrong mechanic.
    #[error("override payload for `{mechanic}` carries settings for `{payload}`")]
    PatchMismatch {
        /// The mechanic the setting was keyed under.
        mechanic: MechanicId,
        /// The mechanic the payload actually belongs to.
        payload: MechanicId,
    },

    /// A fractional field fell outside the unit interval.
    #[error("`{mechanic}.{field}` is {value} but must lie in [0, 1]")]
    OutOfRange {
        /// The mechanic owning the field.
        mechanic: MechanicId,
        /// The offending field name.
        field: &'static str,
        /// The supplied value.
        value: f64,
    },

    /// A mechanic is enabled while one of its prerequisites is not.
    ///
    /// After dependency resolution this can only happen when the caller
    /// explicitly disabled a prerequisite of something they enabled; seeing
    /// it on a resolver-produced selection means the resolver is broken.
    #[error("`{mechanic}` is enabled without its prerequisite `{prerequisite}`")]
    MissingPrerequisite {
        /// The enabled mechanic.
        mechanic: MechanicId,
        /// The prerequisite that is not enabled.
        prerequisite: MechanicId,
    },

    /// The static catalog contains a dependency cycle.
    ///
    /// A data-entry mistake in the catalog, checked defensively at setup;
    /// never an expected runtime path.
    #[error("dependency cycle in the mechanic catalog through `{0}`")]
    DependencyCycle(MechanicId),

    /// An enabled mechanic has no processor in the static table.
    ///
    /// Guards against an incomplete mechanic masquerading as a no-op.
    #[error("no processor registered for enabled mechanic `{0}`")]
    MissingProcessor(MechanicId),
}
