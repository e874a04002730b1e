// ABOUTME: Update-check scheduling, execution and merging.
// ABOUTME: Picks the stalest records, asks the registry, and folds results back.

mod check;
mod merge;
mod policy;
mod scheduler;

pub use check::{
    MSG_DIGEST_CHANGED, MSG_LOCAL_DIGEST_MISSING, MSG_UNKNOWN, MSG_UP_TO_DATE, apply_check,
    check_record,
};
pub use merge::merge_updates;
pub use policy::{CheckPolicy, run_checks};
pub use scheduler::select_batch;
