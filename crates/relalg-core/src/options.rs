//! Translation-wide configuration, threaded through all three entry
//! points, in the style of `flowscope_core::types::AnalysisOptions`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Row-count estimate above which a `CrossJoin` raises a warning
/// (spec.md §4.2, "cross joins whose estimated row product exceeds
/// `10^6`").
pub const DEFAULT_CROSS_JOIN_WARNING_THRESHOLD: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TranslateOptions {
    /// Estimated row product above which a `CrossJoin` produced by the SQL
    /// translator emits a non-fatal warning instead of failing.
    pub cross_join_warning_threshold: u64,

    /// Whether a `SELECT` without `DISTINCT` should emit the "bag
    /// semantics cannot be preserved" warning (spec.md §4.2).
    pub warn_on_non_distinct_select: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            cross_join_warning_threshold: DEFAULT_CROSS_JOIN_WARNING_THRESHOLD,
            warn_on_non_distinct_select: true,
        }
    }
}
