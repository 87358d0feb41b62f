//! Stayclock Engine
//!
//! Platform-agnostic 90/180 rolling-window accounting for stays in a
//! regulated travel zone. This crate owns the visit list, computes the
//! quota balance for any reference date, projects the balance after planned
//! trips and encodes the list into share tokens. It has no UI or
//! platform-specific dependencies; hosts plug in persistence through
//! [`VisitStorage`].

pub mod constants;
pub mod error;
pub mod planner;
pub mod projection;
pub mod rules;
pub mod share;
pub mod store;
pub mod visit;
pub mod window;

// Re-export commonly used types
pub use error::{RulesError, ShareError, StorageUnavailable, VisitError};
pub use planner::TravelPlanner;
pub use projection::{
    ProjectionResult, compute_future_impact, compute_future_impact_with, future_visits,
};
pub use rules::WindowRules;
pub use share::{decode_share_token, encode_share_token};
pub use store::{
    MemoryVisitStorage, PersistOutcome, VisitStorage, VisitStore, visits_from_json,
    visits_to_json,
};
pub use visit::{Visit, VisitId, inclusive_days};
pub use window::{
    AccountingResult, VisitContribution, compute_accounting, compute_accounting_with,
};
