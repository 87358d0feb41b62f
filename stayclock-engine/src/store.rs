//! Visit ownership, transactional edits and persistence.
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{StorageUnavailable, VisitError};
use crate::visit::{Visit, VisitFields, VisitId, first_duplicate_id, normalize_location};

/// Key-value persistence for the full visit list.
/// Platform-specific implementations should provide this.
pub trait VisitStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the persisted list, `None` when nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or parsed.
    fn load(&self) -> Result<Option<Vec<Visit>>, Self::Error>;

    /// Replace the persisted list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn save(&self, visits: &[Visit]) -> Result<(), Self::Error>;
}

/// Serialize visits to the persisted JSON array format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn visits_to_json(visits: &[Visit]) -> Result<String, serde_json::Error> {
    serde_json::to_string(visits)
}

/// Parse the persisted JSON array format.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or a record violates the
/// visit invariants.
pub fn visits_from_json(json: &str) -> Result<Vec<Visit>, serde_json::Error> {
    serde_json::from_str(json)
}

/// In-memory storage holding the same JSON a browser key-value store would.
///
/// Clones share the underlying slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryVisitStorage {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryVisitStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with raw JSON.
    #[must_use]
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(json.into()))),
        }
    }

    /// The raw persisted JSON, if anything has been saved.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl VisitStorage for MemoryVisitStorage {
    type Error = serde_json::Error;

    fn load(&self) -> Result<Option<Vec<Visit>>, Self::Error> {
        self.slot
            .borrow()
            .as_deref()
            .map(visits_from_json)
            .transpose()
    }

    fn save(&self, visits: &[Visit]) -> Result<(), Self::Error> {
        let json = visits_to_json(visits)?;
        *self.slot.borrow_mut() = Some(json);
        Ok(())
    }
}

/// What happened to persistence after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved,
    /// The list came from a share token and has not been adopted.
    SkippedShared,
    Failed(StorageUnavailable),
}

/// Sole owner of the visit list.
///
/// Visits are kept in ascending entry-date order. Every successful mutation
/// is written through to storage unless the list is a shared snapshot.
pub struct VisitStore<S: VisitStorage> {
    storage: S,
    visits: Vec<Visit>,
    next_id: u64,
    shared: bool,
    /// Visits with an edit in progress. The stored record is the snapshot.
    edits: HashSet<VisitId>,
    last_persist: Option<PersistOutcome>,
}

impl<S: VisitStorage> VisitStore<S> {
    /// Open a store over `storage`, loading whatever it holds.
    ///
    /// A failed load is not fatal: the store starts empty and reports the
    /// failure through [`VisitStore::last_persist`].
    pub fn open(storage: S) -> Self {
        let (visits, last_persist) = match storage.load() {
            Ok(loaded) => (loaded.unwrap_or_default(), None),
            Err(err) => {
                log::warn!("could not load saved visits, starting empty: {err}");
                (
                    Vec::new(),
                    Some(PersistOutcome::Failed(StorageUnavailable(err.to_string()))),
                )
            }
        };
        let mut store = Self {
            storage,
            visits: Vec::new(),
            next_id: 1,
            shared: false,
            edits: HashSet::new(),
            last_persist,
        };
        store.replace_all(visits);
        store
    }

    /// Current visits in ascending entry-date order.
    #[must_use]
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    #[must_use]
    pub fn get(&self, id: VisitId) -> Option<&Visit> {
        self.visits.iter().find(|visit| visit.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Whether the list is an unadopted shared snapshot.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        self.shared
    }

    /// Outcome of the most recent persistence attempt.
    #[must_use]
    pub const fn last_persist(&self) -> Option<&PersistOutcome> {
        self.last_persist.as_ref()
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Visits that start after `today`.
    pub fn future_visits(&self, today: NaiveDate) -> impl Iterator<Item = &Visit> {
        crate::projection::future_visits(&self.visits, today)
    }

    /// Record a new visit.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::InvalidRange`] when `entry > exit`; the list is
    /// left unchanged.
    pub fn add_visit(
        &mut self,
        entry: NaiveDate,
        exit: NaiveDate,
        location: &str,
    ) -> Result<Visit, VisitError> {
        if entry > exit {
            return Err(VisitError::InvalidRange { entry, exit });
        }
        let id = self.allocate_id();
        let visit = Visit::new(id, entry, exit, location)?;
        self.insert_sorted(visit.clone());
        self.persist();
        Ok(visit)
    }

    /// Delete a visit, discarding any edit in progress for it.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::NotFound`] if no visit has this id.
    pub fn remove_visit(&mut self, id: VisitId) -> Result<Visit, VisitError> {
        let index = self.index_of(id)?;
        let removed = self.visits.remove(index);
        self.edits.remove(&id);
        self.persist();
        Ok(removed)
    }

    /// Open an edit on a visit. The committed record stays as it is until
    /// [`VisitStore::commit_edit`]; beginning twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::NotFound`] if no visit has this id.
    pub fn begin_edit(&mut self, id: VisitId) -> Result<&Visit, VisitError> {
        let index = self.index_of(id)?;
        self.edits.insert(id);
        Ok(&self.visits[index])
    }

    #[must_use]
    pub fn is_editing(&self, id: VisitId) -> bool {
        self.edits.contains(&id)
    }

    /// Validate and apply an edit begun with [`VisitStore::begin_edit`].
    ///
    /// On `InvalidRange` the committed record is untouched and the edit stays
    /// open so it can be corrected or cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::NotFound`], [`VisitError::NoEditInProgress`] or
    /// [`VisitError::InvalidRange`].
    pub fn commit_edit(
        &mut self,
        id: VisitId,
        entry: NaiveDate,
        exit: NaiveDate,
        location: &str,
    ) -> Result<Visit, VisitError> {
        let index = self.index_of(id)?;
        if !self.edits.contains(&id) {
            return Err(VisitError::NoEditInProgress(id));
        }
        if entry > exit {
            return Err(VisitError::InvalidRange { entry, exit });
        }

        self.edits.remove(&id);
        let mut visit = self.visits.remove(index);
        visit.apply(VisitFields {
            entry_date: entry,
            exit_date: exit,
            location: normalize_location(location),
        });
        self.insert_sorted(visit.clone());
        self.persist();
        Ok(visit)
    }

    /// Abandon an edit, returning the committed visit.
    ///
    /// Edits never touch the stored record before
    /// [`VisitStore::commit_edit`], so cancelling only closes the edit.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::NoEditInProgress`] if no edit was begun.
    pub fn cancel_edit(&mut self, id: VisitId) -> Result<Visit, VisitError> {
        if !self.edits.remove(&id) {
            return Err(VisitError::NoEditInProgress(id));
        }
        self.get(id).cloned().ok_or(VisitError::NotFound(id))
    }

    /// Remove every visit.
    pub fn clear(&mut self) {
        self.visits.clear();
        self.edits.clear();
        self.persist();
    }

    /// Replace the list with a shared snapshot. Nothing is saved until
    /// [`VisitStore::adopt_shared`] is called.
    pub fn load_shared(&mut self, visits: Vec<Visit>) {
        log::info!("entering shared mode with {} visits", visits.len());
        self.replace_all(visits);
        self.shared = true;
    }

    /// Make a shared snapshot the user's own list and save it immediately.
    pub fn adopt_shared(&mut self) -> PersistOutcome {
        if self.shared {
            log::info!("adopting shared visit list");
        }
        self.shared = false;
        self.persist()
    }

    fn replace_all(&mut self, mut visits: Vec<Visit>) {
        visits.sort_by_key(Visit::entry_date);
        self.visits = visits;
        self.edits.clear();

        if let Some(dup) = first_duplicate_id(&self.visits) {
            log::warn!("visit id {dup} appears more than once, renumbering visits");
            self.renumber();
            return;
        }
        let next = self
            .visits
            .iter()
            .map(|visit| visit.id().0)
            .max()
            .map_or(Some(1), |max| max.checked_add(1));
        match next {
            Some(next) => self.next_id = next,
            None => self.renumber(),
        }
    }

    /// Hand out the next free id, compacting ids once the space runs out.
    fn allocate_id(&mut self) -> VisitId {
        if self.next_id == u64::MAX {
            self.renumber();
        }
        let id = VisitId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Reassign ids `1..=n` in list order. Open edits refer to the old ids
    /// and are dropped.
    fn renumber(&mut self) {
        let mut next = 1_u64;
        for visit in &mut self.visits {
            visit.reassign_id(VisitId(next));
            next += 1;
        }
        self.next_id = next;
        self.edits.clear();
    }

    fn index_of(&self, id: VisitId) -> Result<usize, VisitError> {
        self.visits
            .iter()
            .position(|visit| visit.id() == id)
            .ok_or(VisitError::NotFound(id))
    }

    fn insert_sorted(&mut self, visit: Visit) {
        let at = self
            .visits
            .partition_point(|existing| existing.entry_date() <= visit.entry_date());
        self.visits.insert(at, visit);
    }

    fn persist(&mut self) -> PersistOutcome {
        let outcome = if self.shared {
            PersistOutcome::SkippedShared
        } else {
            match self.storage.save(&self.visits) {
                Ok(()) => PersistOutcome::Saved,
                Err(err) => {
                    log::warn!("visits kept in memory only, save failed: {err}");
                    PersistOutcome::Failed(StorageUnavailable(err.to_string()))
                }
            }
        };
        self.last_persist = Some(outcome.clone());
        outcome
    }
}
