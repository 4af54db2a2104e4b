#![deny(warnings)]

//! Narrative insights for simulated months.
//!
//! The narrative collaborator turns computed numbers into prose. It is
//! optional and best-effort: calls are bounded by a timeout and a retry
//! policy, and any failure falls back to deterministic template text. No
//! numeric result ever depends on it.

mod narrative;
mod retry;

pub use narrative::{
    fallback_narrative, MonthSummary, Narrative, NarrativeError, NarrativeService,
    TemplateNarrator,
};
pub use retry::{narrate_with_fallback, NarrativeOutcome, NarrativeSource, RetryPolicy};
