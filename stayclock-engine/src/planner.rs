//! Operations surface consumed by the presentation layer.
use chrono::NaiveDate;

use crate::error::{RulesError, ShareError, VisitError};
use crate::projection::{ProjectionResult, compute_future_impact_with};
use crate::rules::WindowRules;
use crate::share::{decode_share_token, encode_share_token};
use crate::store::{PersistOutcome, VisitStorage, VisitStore};
use crate::visit::{Visit, VisitId};
use crate::window::{AccountingResult, compute_accounting_with};

/// A visit store paired with the rules used to evaluate it.
pub struct TravelPlanner<S: VisitStorage> {
    store: VisitStore<S>,
    rules: WindowRules,
}

impl<S: VisitStorage> TravelPlanner<S> {
    /// Open a planner over `storage` with the given rules.
    ///
    /// # Errors
    ///
    /// Returns an error if `rules` fail validation.
    pub fn new(storage: S, rules: WindowRules) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self {
            store: VisitStore::open(storage),
            rules,
        })
    }

    /// Open a planner with the default 90/180 rules.
    pub fn with_default_rules(storage: S) -> Self {
        Self {
            store: VisitStore::open(storage),
            rules: WindowRules::default(),
        }
    }

    /// Open a planner and, when a share token is present, show its visits in
    /// shared mode. A bad token leaves the locally saved list in place and is
    /// handed back so the caller can show a notice.
    pub fn open_with_share(storage: S, token: Option<&str>) -> (Self, Option<ShareError>) {
        let mut planner = Self::with_default_rules(storage);
        let notice = planner.import_optional_token(token);
        (planner, notice)
    }

    /// [`TravelPlanner::open_with_share`] with custom rules.
    ///
    /// # Errors
    ///
    /// Returns an error if `rules` fail validation; the token is not read.
    pub fn open_with_share_and_rules(
        storage: S,
        token: Option<&str>,
        rules: WindowRules,
    ) -> Result<(Self, Option<ShareError>), RulesError> {
        let mut planner = Self::new(storage, rules)?;
        let notice = planner.import_optional_token(token);
        Ok((planner, notice))
    }

    fn import_optional_token(&mut self, token: Option<&str>) -> Option<ShareError> {
        token.and_then(|token| self.import_share_token(token).err())
    }

    #[must_use]
    pub const fn rules(&self) -> &WindowRules {
        &self.rules
    }

    #[must_use]
    pub const fn store(&self) -> &VisitStore<S> {
        &self.store
    }

    #[must_use]
    pub fn visits(&self) -> &[Visit] {
        self.store.visits()
    }

    #[must_use]
    pub const fn is_shared(&self) -> bool {
        self.store.is_shared()
    }

    /// # Errors
    ///
    /// Returns [`VisitError::InvalidRange`] when `entry > exit`.
    pub fn add_visit(
        &mut self,
        entry: NaiveDate,
        exit: NaiveDate,
        location: &str,
    ) -> Result<Visit, VisitError> {
        self.store.add_visit(entry, exit, location)
    }

    /// # Errors
    ///
    /// Returns [`VisitError::NotFound`] if no visit has this id.
    pub fn remove_visit(&mut self, id: VisitId) -> Result<Visit, VisitError> {
        self.store.remove_visit(id)
    }

    /// # Errors
    ///
    /// Returns [`VisitError::NotFound`] if no visit has this id.
    pub fn begin_edit(&mut self, id: VisitId) -> Result<Visit, VisitError> {
        self.store.begin_edit(id).cloned()
    }

    /// # Errors
    ///
    /// See [`VisitStore::commit_edit`].
    pub fn commit_edit(
        &mut self,
        id: VisitId,
        entry: NaiveDate,
        exit: NaiveDate,
        location: &str,
    ) -> Result<Visit, VisitError> {
        self.store.commit_edit(id, entry, exit, location)
    }

    /// # Errors
    ///
    /// See [`VisitStore::cancel_edit`].
    pub fn cancel_edit(&mut self, id: VisitId) -> Result<Visit, VisitError> {
        self.store.cancel_edit(id)
    }

    /// Balance for the window ending `today`.
    #[must_use]
    pub fn recompute(&self, today: NaiveDate) -> AccountingResult {
        compute_accounting_with(self.store.visits(), today, &self.rules)
    }

    /// Balance after the furthest planned visit, if any are planned.
    #[must_use]
    pub fn project_future(&self, today: NaiveDate) -> Option<ProjectionResult> {
        compute_future_impact_with(self.store.visits(), today, &self.rules)
    }

    /// # Errors
    ///
    /// Returns an error if the visit list cannot be serialized.
    pub fn generate_share_token(&self) -> Result<String, ShareError> {
        encode_share_token(self.store.visits())
    }

    /// Replace the displayed list with the visits in `token`, entering shared
    /// mode. Returns the number of imported visits.
    ///
    /// # Errors
    ///
    /// Returns the decode failure; the current list is left as it was.
    pub fn import_share_token(&mut self, token: &str) -> Result<usize, ShareError> {
        match decode_share_token(token) {
            Ok(visits) => {
                let count = visits.len();
                self.store.load_shared(visits);
                Ok(count)
            }
            Err(err) => {
                log::warn!("ignoring share token, keeping saved visits: {err}");
                Err(err)
            }
        }
    }

    /// Take ownership of a shared list and save it.
    pub fn adopt_shared_data(&mut self) -> PersistOutcome {
        self.store.adopt_shared()
    }
}
