//! Per-entity normalized state.
//!
//! A container owns the fetched list of brief records, an optional full
//! "current" record, and one [`RequestStatus`] per request kind. All
//! transitions are synchronous; the coordinator drives them around the
//! awaited backend call.

use collab_core::types::{BriefOf, EntityId, Record};

use crate::request::RequestStatus;

#[derive(Debug, Clone)]
pub struct EntityContainer<B, F = B> {
    pub(crate) items: Vec<B>,
    pub(crate) current: Option<F>,
    pub(crate) status: RequestStatus,
    pub(crate) current_status: RequestStatus,
    pub(crate) mutation_status: RequestStatus,
}

impl<B, F> Default for EntityContainer<B, F> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            status: RequestStatus::Idle,
            current_status: RequestStatus::Idle,
            mutation_status: RequestStatus::Idle,
        }
    }
}

impl<B, F> EntityContainer<B, F> {
    /// A container whose list has already been loaded.
    pub fn with_items(items: Vec<B>) -> Self {
        Self {
            items,
            status: RequestStatus::Succeeded,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[B] {
        &self.items
    }

    pub fn current(&self) -> Option<&F> {
        self.current.as_ref()
    }

    /// State of the list request.
    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    /// State of the load-one request feeding the current slot.
    pub fn current_status(&self) -> &RequestStatus {
        &self.current_status
    }

    /// State of the last create, update or delete.
    pub fn mutation_status(&self) -> &RequestStatus {
        &self.mutation_status
    }

    /// The most recent error across all three request kinds.
    pub fn error(&self) -> Option<&str> {
        self.mutation_status
            .error()
            .or_else(|| self.current_status.error())
            .or_else(|| self.status.error())
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
            || self.current_status.is_loading()
            || self.mutation_status.is_loading()
    }

    // ---- list ----

    pub fn begin_load(&mut self) {
        self.status = RequestStatus::Loading;
    }

    /// Replace the list wholesale. No merge with previous entries.
    ///
    /// The fresh list supersedes an earlier failed mutation, so its error is
    /// dropped too.
    pub fn load_succeeded(&mut self, items: Vec<B>) {
        self.items = items;
        self.status = RequestStatus::Succeeded;
        if self.mutation_status.error().is_some() {
            self.mutation_status = RequestStatus::Idle;
        }
    }

    /// Record the error and keep the last known list.
    pub fn load_failed(&mut self, error: impl Into<String>) {
        self.status = RequestStatus::Failed(error.into());
    }

    // ---- mutations ----

    pub fn begin_mutation(&mut self) {
        self.mutation_status = RequestStatus::Loading;
    }

    /// Acknowledge a mutation that was already applied locally.
    pub fn mutation_succeeded(&mut self) {
        self.mutation_status = RequestStatus::Succeeded;
    }

    pub fn mutation_failed(&mut self, error: impl Into<String>) {
        self.mutation_status = RequestStatus::Failed(error.into());
    }
}

impl<B, F> EntityContainer<B, F>
where
    B: Record + BriefOf<F>,
    F: Record,
{
    pub fn find(&self, id: EntityId) -> Option<&B> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn item_mut(&mut self, id: EntityId) -> Option<&mut B> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// The current record, if it is the one with `id`.
    pub fn current_mut(&mut self, id: EntityId) -> Option<&mut F> {
        self.current.as_mut().filter(|current| current.id() == id)
    }

    /// Start loading `id` into the current slot. A current record with a
    /// different id is dropped so a stale record is never shown as `id`.
    pub fn begin_select(&mut self, id: EntityId) {
        if self.current.as_ref().is_some_and(|c| c.id() != id) {
            self.current = None;
        }
        self.current_status = RequestStatus::Loading;
    }

    pub fn select_succeeded(&mut self, record: F) {
        self.current = Some(record);
        self.current_status = RequestStatus::Succeeded;
    }

    /// Record a failed load-one and keep whatever the current slot holds.
    pub fn select_failed(&mut self, error: impl Into<String>) {
        self.current_status = RequestStatus::Failed(error.into());
    }

    /// The requested record does not exist, so the current slot is cleared.
    pub fn select_missing(&mut self, error: impl Into<String>) {
        self.current = None;
        self.current_status = RequestStatus::Failed(error.into());
    }

    /// Append a newly created record to the list.
    pub fn created(&mut self, record: F) {
        self.items.push(B::brief_of(&record));
        self.mutation_status = RequestStatus::Succeeded;
    }

    /// Replace the matching list entry in place, and the current slot if it
    /// holds the same id.
    ///
    /// Returns `false` when neither matched; state is then unchanged apart
    /// from the mutation status.
    pub fn updated(&mut self, record: F) -> bool {
        let id = record.id();
        let mut matched = false;
        if let Some(item) = self.item_mut(id) {
            *item = B::brief_of(&record);
            matched = true;
        }
        if let Some(current) = self.current_mut(id) {
            *current = record;
            matched = true;
        }
        self.mutation_status = RequestStatus::Succeeded;
        matched
    }

    /// Remove `id` from the list and clear the current slot if it holds it.
    pub fn removed(&mut self, id: EntityId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let mut matched = self.items.len() != before;
        if self.current.as_ref().is_some_and(|c| c.id() == id) {
            self.current = None;
            matched = true;
        }
        self.mutation_status = RequestStatus::Succeeded;
        matched
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use collab_core::meeting::Meeting;

    use super::*;

    fn meeting(id: EntityId, notes: &str) -> Meeting {
        Meeting {
            id,
            project_id: 1,
            scheduled_at: Utc.with_ymd_and_hms(2024, 9, 20, 10, 0, 0).unwrap(),
            notes: notes.to_string(),
            is_completed: false,
            mark: 0,
            tasks: vec![],
        }
    }

    #[test]
    fn load_replaces_rather_than_merges() {
        let mut c: EntityContainer<Meeting> = EntityContainer::with_items(vec![meeting(1, "a")]);
        c.begin_load();
        assert!(c.is_loading());
        c.load_succeeded(vec![meeting(2, "b")]);
        assert_eq!(c.items().len(), 1);
        assert_eq!(c.items()[0].id, 2);
        assert_eq!(c.status(), &RequestStatus::Succeeded);
    }

    #[test]
    fn failed_load_keeps_last_known_list() {
        let mut c: EntityContainer<Meeting> = EntityContainer::with_items(vec![meeting(1, "a")]);
        c.begin_load();
        c.load_failed("network down");
        assert_eq!(c.items().len(), 1);
        assert_eq!(c.error(), Some("network down"));
    }

    #[test]
    fn update_replaces_list_entry_and_current() {
        let mut c: EntityContainer<Meeting> =
            EntityContainer::with_items(vec![meeting(1, "a"), meeting(2, "b")]);
        c.select_succeeded(meeting(2, "b"));

        assert!(c.updated(meeting(2, "edited")));
        assert_eq!(c.items()[1].notes, "edited");
        assert_eq!(c.current().unwrap().notes, "edited");
        assert_eq!(c.items()[0].notes, "a");
    }

    #[test]
    fn update_without_match_is_a_no_op() {
        let mut c: EntityContainer<Meeting> = EntityContainer::with_items(vec![meeting(1, "a")]);
        assert!(!c.updated(meeting(9, "ghost")));
        assert_eq!(c.items().len(), 1);
        assert_eq!(c.items()[0].notes, "a");
        assert!(c.current().is_none());
    }

    #[test]
    fn remove_clears_matching_current() {
        let mut c: EntityContainer<Meeting> = EntityContainer::with_items(vec![meeting(1, "a")]);
        c.select_succeeded(meeting(1, "a"));
        assert!(c.removed(1));
        assert!(c.items().is_empty());
        assert!(c.current().is_none());
    }

    #[test]
    fn selecting_another_id_drops_stale_current() {
        let mut c: EntityContainer<Meeting> = EntityContainer::default();
        c.select_succeeded(meeting(1, "a"));

        c.begin_select(1);
        assert!(c.current().is_some());

        c.begin_select(2);
        assert!(c.current().is_none());
        assert!(c.current_status().is_loading());
    }

    #[test]
    fn missing_record_clears_current() {
        let mut c: EntityContainer<Meeting> = EntityContainer::default();
        c.select_succeeded(meeting(1, "a"));
        c.begin_select(1);
        c.select_missing("Meeting with id 1 not found");
        assert!(c.current().is_none());
        assert_eq!(c.current_status().error(), Some("Meeting with id 1 not found"));
    }

    #[test]
    fn failed_reselect_keeps_current() {
        let mut c: EntityContainer<Meeting> = EntityContainer::default();
        c.select_succeeded(meeting(1, "a"));
        c.begin_select(1);
        c.select_failed("API error (503): maintenance");
        assert_eq!(c.current().map(|m| m.id), Some(1));
        assert_eq!(c.error(), Some("API error (503): maintenance"));
    }

    #[test]
    fn successful_load_clears_stale_mutation_error() {
        let mut c: EntityContainer<Meeting> = EntityContainer::with_items(vec![meeting(1, "a")]);
        c.begin_mutation();
        c.mutation_failed("API error (409): conflict");
        assert_eq!(c.error(), Some("API error (409): conflict"));

        c.begin_load();
        c.load_succeeded(vec![meeting(1, "a")]);
        assert_eq!(c.error(), None);
        assert_eq!(c.mutation_status(), &RequestStatus::Idle);
    }
}
