//! Diagnostics hook: which constraints each match site produced.
//!
//! An inference driver tags matches with a [`MatchSite`] through
//! [`ConstraintMatcher::try_match_at`](crate::ConstraintMatcher::try_match_at).
//! When the match holds, the constraints it committed are handed to the
//! attached [`ConstraintObserver`]. Observers see results only; they cannot
//! change them.

use crate::constraints::{Constraint, ConstraintKind};
use crate::ops::TypeSystemOps;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::json;

/// Opaque token naming a constraint site, chosen by the driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MatchSite(pub u32);

/// Receives the constraints committed at a match site.
pub trait ConstraintObserver {
    fn constraints_generated(&mut self, site: MatchSite, constraints: &[Constraint]);
}

/// Observer that keeps every reported constraint, grouped by site in the
/// order sites were first reported.
#[derive(Clone, Debug, Default)]
pub struct ConstraintRecorder {
    by_site: IndexMap<MatchSite, Vec<Constraint>>,
}

impl ConstraintRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraints reported for `site`; empty for unknown sites.
    pub fn constraints_at(&self, site: MatchSite) -> &[Constraint] {
        self.by_site.get(&site).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sites(&self) -> impl Iterator<Item = MatchSite> + '_ {
        self.by_site.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_site.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_site.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_site.clear();
    }

    /// Export the recorded constraints with types rendered by `ops`.
    ///
    /// ```json
    /// {"sites": [{"site": 1, "constraints": [
    ///     {"variable": "T", "kind": "lower", "bound": "String"}
    /// ]}]}
    /// ```
    pub fn to_json<O: TypeSystemOps + ?Sized>(&self, ops: &O) -> serde_json::Value {
        let db = ops.db();
        let sites: Vec<serde_json::Value> = self
            .by_site
            .iter()
            .map(|(site, constraints)| {
                let constraints: Vec<serde_json::Value> = constraints
                    .iter()
                    .map(|constraint| {
                        let name = db.type_param_info(constraint.variable).name;
                        json!({
                            "variable": db.resolve_atom(name),
                            "kind": match constraint.kind {
                                ConstraintKind::Lower => "lower",
                                ConstraintKind::Upper => "upper",
                            },
                            "bound": ops.format_type(constraint.bound),
                        })
                    })
                    .collect();
                json!({ "site": site.0, "constraints": constraints })
            })
            .collect();
        json!({ "sites": sites })
    }
}

impl ConstraintObserver for ConstraintRecorder {
    fn constraints_generated(&mut self, site: MatchSite, constraints: &[Constraint]) {
        self.by_site
            .entry(site)
            .or_default()
            .extend_from_slice(constraints);
    }
}

#[cfg(test)]
#[path = "../tests/trace_tests.rs"]
mod tests;
