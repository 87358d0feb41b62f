//! Centralized tuning constants for the stay accounting engine.
//!
//! The quota and window length are the defaults for [`crate::WindowRules`];
//! hosts that need a different regime pass their own rules instead of
//! editing these values.

// Rolling window ------------------------------------------------------------
pub const DEFAULT_QUOTA_DAYS: u32 = 90;
pub const DEFAULT_WINDOW_LENGTH_DAYS: u32 = 180;

// Visit records -------------------------------------------------------------
pub const DEFAULT_LOCATION: &str = "Schengen Area";

// Persistence and sharing ---------------------------------------------------
/// Key under which the full visit list is persisted.
pub const STORAGE_KEY: &str = "stayclock.visits";
/// Query parameter carrying a share token.
pub const SHARE_QUERY_PARAM: &str = "data";
