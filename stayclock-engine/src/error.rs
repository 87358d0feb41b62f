//! Error taxonomy shared by the store, codec and rules.
use chrono::NaiveDate;
use thiserror::Error;

use crate::visit::VisitId;

/// Errors raised by visit mutations. None of them leave the list changed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VisitError {
    #[error("entry date {entry} is after exit date {exit}")]
    InvalidRange { entry: NaiveDate, exit: NaiveDate },
    #[error("no visit with id {0}")]
    NotFound(VisitId),
    #[error("visit {0} has no edit in progress")]
    NoEditInProgress(VisitId),
}

/// A share token that could not be turned back into a visit list.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("share token is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("share token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("share token does not hold a visit list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("share token contains duplicate visit id {0}")]
    DuplicateId(VisitId),
}

/// Rolling-window rules that cannot be evaluated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("quota of {quota} days exceeds window length of {window} days")]
    QuotaExceedsWindow { quota: u32, window: u32 },
    #[error("rules document is malformed: {0}")]
    Parse(String),
}

/// Persistence failed; the in-memory list stays authoritative.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("storage unavailable: {0}")]
pub struct StorageUnavailable(pub String);
