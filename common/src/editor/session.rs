//! Edit session state machine.
//!
//! The session exclusively owns the baseline and working documents. The
//! working document is replaced wholesale by every accepted edit and the
//! catalog is dropped with it, to be rebuilt the next time someone asks.
//!
//! Selection states: `Viewing` (no selection) and `Selecting` (panel open on
//! one element). Save status is an orthogonal dimension with a single
//! in-flight request at most.

use log::{debug, info};
use thiserror::Error;

use super::extract::{extract, Catalog};
use super::mutate::{apply_edit, strip_edit_markers, Edit};
use super::recovery::{
    read_snapshot, recovery_key, write_snapshot, RecoverySnapshot, RecoveryStore,
};
use crate::model::editable::EditableElement;
use crate::model::site::GeneratedSite;
use crate::requests::{SaveSiteRequest, SaveSiteResponse};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Success,
    /// Reason reported by the persistence collaborator.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The edit resolved to nothing or changed nothing.
    Unchanged,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("no save is in progress")]
    NoSaveInFlight,
    #[error("a recovery snapshot must be restored or discarded first")]
    RecoveryPending,
    #[error("there is no recovery snapshot to restore")]
    NoRecoveryPending,
    #[error("unknown element {0}")]
    UnknownElement(String),
}

pub struct EditSession<S: RecoveryStore> {
    original: String,
    working: String,
    file_path: String,
    catalog: Option<Catalog>,
    selected: Option<String>,
    panel_open: bool,
    save_status: SaveStatus,
    in_flight: Option<String>,
    /// Bumped by every finished save; a settle request from an older save
    /// must not clear a newer status.
    save_generation: u64,
    history: Vec<String>,
    history_index: usize,
    revision: u64,
    pending_recovery: Option<RecoverySnapshot>,
    store: S,
}

impl<S: RecoveryStore> EditSession<S> {
    /// Starts a session on a freshly generated or loaded page.
    ///
    /// The page is annotated with edit markers once, here, and the annotated
    /// text becomes both baseline and working copy. A recovery snapshot that
    /// differs from both is held back until restored or discarded.
    pub fn mount(site: GeneratedSite, mut store: S) -> Self {
        let extraction = extract(&site.html_content);
        let baseline = extraction.document;

        let key = recovery_key(&baseline);
        let pending_recovery = read_snapshot(&mut store, &key)
            .filter(|snapshot| snapshot.working_document != baseline);
        if pending_recovery.is_some() {
            info!("found unsaved work for {}", site.file_path);
        }

        Self {
            original: baseline.clone(),
            working: baseline.clone(),
            file_path: site.file_path,
            catalog: Some(extraction.catalog),
            selected: None,
            panel_open: false,
            save_status: SaveStatus::Idle,
            in_flight: None,
            save_generation: 0,
            history: vec![baseline],
            history_index: 0,
            revision: 0,
            pending_recovery,
            store,
        }
    }

    pub fn working_document(&self) -> &str {
        &self.working
    }

    pub fn original_document(&self) -> &str {
        &self.original
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn selected_element_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.original
    }

    /// Bumped on every change of the working document.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Identifies the status set by the latest finished save.
    pub fn save_generation(&self) -> u64 {
        self.save_generation
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The catalog of the current working document.
    pub fn catalog(&mut self) -> &Catalog {
        self.view().1
    }

    /// Working document and its catalog, rebuilding the catalog if needed.
    pub fn view(&mut self) -> (&str, &Catalog) {
        if self.catalog.is_none() {
            let extraction = extract(&self.working);
            if extraction.markers_injected > 0 {
                // Annotation is not an edit: it replaces the current history slot.
                self.history[self.history_index] = extraction.document.clone();
                self.set_working(extraction.document);
            }
            self.catalog = Some(extraction.catalog);
        }
        (&self.working, self.catalog.get_or_insert_with(Catalog::default))
    }

    pub fn selected_element(&mut self) -> Option<EditableElement> {
        let id = self.selected.clone()?;
        self.catalog().get(&id).cloned()
    }

    /// Viewing -> Selecting.
    pub fn select_element(&mut self, id: &str) -> Result<(), SessionError> {
        self.ensure_no_pending_recovery()?;
        if self.catalog().get(id).is_none() {
            return Err(SessionError::UnknownElement(id.to_string()));
        }
        self.selected = Some(id.to_string());
        self.panel_open = true;
        Ok(())
    }

    /// Selecting -> Viewing, on Done or Cancel.
    pub fn close_panel(&mut self) {
        self.selected = None;
        self.panel_open = false;
    }

    /// Applies one edit. The selection is kept so follow-up edits on the same
    /// element stay cheap.
    pub fn submit_edit(&mut self, id: &str, edit: Edit) -> Result<EditOutcome, SessionError> {
        self.ensure_no_pending_recovery()?;

        let updated = {
            let (working, catalog) = self.view();
            if catalog.get(id).is_none() {
                return Err(SessionError::UnknownElement(id.to_string()));
            }
            apply_edit(working, catalog, id, &edit)
        };

        if updated == self.working {
            return Ok(EditOutcome::Unchanged);
        }
        self.push_working(updated);
        Ok(EditOutcome::Applied)
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() || self.pending_recovery.is_some() {
            return false;
        }
        self.history_index -= 1;
        self.set_working(self.history[self.history_index].clone());
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() || self.pending_recovery.is_some() {
            return false;
        }
        self.history_index += 1;
        self.set_working(self.history[self.history_index].clone());
        true
    }

    /// Restores the baseline. `confirm` is only asked when there is unsaved
    /// work; returns whether the reset happened.
    pub fn reset(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if self.is_dirty() && !confirm() {
            return false;
        }
        self.close_panel();
        self.history = vec![self.original.clone()];
        self.history_index = 0;
        self.set_working(self.original.clone());
        true
    }

    /// Idle/Success/Error -> Saving. Returns the payload for the persistence
    /// collaborator.
    pub fn begin_save(&mut self) -> Result<SaveSiteRequest, SessionError> {
        if self.save_status == SaveStatus::Saving {
            return Err(SessionError::SaveInProgress);
        }
        self.ensure_no_pending_recovery()?;

        self.save_status = SaveStatus::Saving;
        self.in_flight = Some(self.working.clone());
        Ok(SaveSiteRequest {
            html_content: self.working.clone(),
            file_path: self.file_path.clone(),
        })
    }

    /// Completes the in-flight save.
    ///
    /// On success the saved payload becomes the new baseline; edits made while
    /// the request was in flight stay unsaved. On failure only the status
    /// changes.
    pub fn finish_save(
        &mut self,
        result: Result<SaveSiteResponse, String>,
    ) -> Result<(), SessionError> {
        let saved = self.in_flight.take().ok_or(SessionError::NoSaveInFlight)?;
        self.save_generation += 1;

        match result {
            Ok(response) => {
                let old_key = recovery_key(&self.original);
                self.store.remove(&old_key);

                self.original = saved;
                if !response.file_path.is_empty() {
                    self.file_path = response.file_path;
                }
                self.save_status = SaveStatus::Success;
                self.sync_recovery();
                info!("saved {}", self.file_path);
            }
            Err(reason) => {
                info!("save of {} failed: {}", self.file_path, reason);
                self.save_status = SaveStatus::Error(reason);
            }
        }
        Ok(())
    }

    /// Runs a whole save against a synchronous collaborator.
    pub fn save_with<F>(&mut self, persist: F) -> Result<(), SessionError>
    where
        F: FnOnce(&SaveSiteRequest) -> Result<SaveSiteResponse, String>,
    {
        let request = self.begin_save()?;
        self.finish_save(persist(&request))
    }

    /// Success/Error -> Idle, once the status of save `generation` has been
    /// shown. Returns whether the status changed.
    pub fn settle_save_status(&mut self, generation: u64) -> bool {
        if generation != self.save_generation
            || !matches!(self.save_status, SaveStatus::Success | SaveStatus::Error(_))
        {
            return false;
        }
        self.save_status = SaveStatus::Idle;
        true
    }

    pub fn pending_recovery(&self) -> Option<&RecoverySnapshot> {
        self.pending_recovery.as_ref()
    }

    /// Adopts the pending snapshot as the working document.
    pub fn restore_recovery(&mut self) -> Result<(), SessionError> {
        let snapshot = self
            .pending_recovery
            .take()
            .ok_or(SessionError::NoRecoveryPending)?;
        if !snapshot.file_path.is_empty() {
            self.file_path = snapshot.file_path;
        }
        self.push_working(snapshot.working_document);
        Ok(())
    }

    /// Drops the pending snapshot for good.
    pub fn discard_recovery(&mut self) -> Result<(), SessionError> {
        self.pending_recovery
            .take()
            .ok_or(SessionError::NoRecoveryPending)?;
        let key = recovery_key(&self.original);
        self.store.remove(&key);
        Ok(())
    }

    /// The working document without edit markers.
    pub fn export_document(&self) -> String {
        strip_edit_markers(&self.working)
    }

    fn ensure_no_pending_recovery(&self) -> Result<(), SessionError> {
        match self.pending_recovery {
            Some(_) => Err(SessionError::RecoveryPending),
            None => Ok(()),
        }
    }

    fn push_working(&mut self, document: String) {
        self.history.truncate(self.history_index + 1);
        self.history.push(document.clone());
        self.history_index = self.history.len() - 1;
        self.set_working(document);
    }

    fn set_working(&mut self, document: String) {
        self.working = document;
        self.catalog = None;
        self.revision += 1;
        self.sync_recovery();
    }

    fn sync_recovery(&mut self) {
        let key = recovery_key(&self.original);
        if self.is_dirty() {
            let snapshot = RecoverySnapshot {
                working_document: self.working.clone(),
                file_path: self.file_path.clone(),
            };
            write_snapshot(&mut self.store, &key, &snapshot);
        } else {
            debug!("working document matches baseline, clearing {}", key);
            self.store.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::recovery::MemoryRecoveryStore;
    use crate::model::editable::ElementKind;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "<html><head></head><body><h1>Welcome</h1><p>Open daily</p></body></html>";

    fn site() -> GeneratedSite {
        GeneratedSite {
            html_content: PAGE.to_string(),
            file_path: "sites/acme.html".to_string(),
        }
    }

    fn id_of(session: &mut EditSession<MemoryRecoveryStore>, content: &str) -> String {
        session
            .catalog()
            .iter()
            .find(|entry| entry.content == content)
            .map(|entry| entry.id.clone())
            .expect("catalog entry")
    }

    #[test]
    fn selection_opens_and_closes_the_panel() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        let id = id_of(&mut session, "Welcome");

        session.select_element(&id).expect("select");
        assert!(session.is_panel_open());
        assert_eq!(session.selected_element().map(|e| e.kind), Some(ElementKind::Text));

        session.close_panel();
        assert_eq!(session.selected_element_id(), None);
        assert_eq!(
            session.select_element("text-nope"),
            Err(SessionError::UnknownElement("text-nope".into()))
        );
    }

    #[test]
    fn edits_keep_selection_and_ids() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        let id = id_of(&mut session, "Welcome");
        session.select_element(&id).expect("select");

        let outcome = session.submit_edit(&id, Edit::Text("Hello".into()));
        assert_eq!(outcome, Ok(EditOutcome::Applied));
        assert_eq!(session.selected_element().map(|e| e.content), Some("Hello".into()));

        let outcome = session.submit_edit(&id, Edit::Text("Hello again".into()));
        assert_eq!(outcome, Ok(EditOutcome::Applied));
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn unchanged_edits_do_not_touch_history() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        let id = id_of(&mut session, "Welcome");

        let outcome = session.submit_edit(&id, Edit::Text("Welcome".into()));
        assert_eq!(outcome, Ok(EditOutcome::Unchanged));
        assert!(!session.can_undo());
        assert!(!session.is_dirty());
    }

    #[test]
    fn undo_and_redo_walk_history() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        let id = id_of(&mut session, "Welcome");
        session.submit_edit(&id, Edit::Text("One".into())).expect("edit");

        assert!(session.undo());
        assert!(!session.is_dirty());
        assert!(session.redo());
        assert!(session.working_document().contains("<h1>One</h1>"));
        assert!(!session.redo());
    }

    #[test]
    fn reset_asks_only_when_dirty() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        assert!(session.reset(|| panic!("clean sessions reset without asking")));

        let id = id_of(&mut session, "Welcome");
        session.submit_edit(&id, Edit::Text("Changed".into())).expect("edit");
        assert!(!session.reset(|| false));
        assert!(session.is_dirty());

        assert!(session.reset(|| true));
        assert_eq!(session.working_document(), session.original_document());
        assert!(session.store().is_empty());
    }

    #[test]
    fn save_adopts_baseline_and_handle() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        let id = id_of(&mut session, "Welcome");
        session.submit_edit(&id, Edit::Text("Saved".into())).expect("edit");
        assert_eq!(session.store().len(), 1);

        session
            .save_with(|request| {
                assert_eq!(request.file_path, "sites/acme.html");
                Ok(SaveSiteResponse {
                    file_path: "sites/acme-v2.html".into(),
                })
            })
            .expect("save");

        assert_eq!(session.save_status(), &SaveStatus::Success);
        assert_eq!(session.file_path(), "sites/acme-v2.html");
        assert!(!session.is_dirty());
        assert!(session.store().is_empty());

        assert!(session.settle_save_status(session.save_generation()));
        assert_eq!(session.save_status(), &SaveStatus::Idle);
    }

    #[test]
    fn stale_settle_keeps_the_newer_status() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        session
            .save_with(|_| Ok(SaveSiteResponse { file_path: String::new() }))
            .expect("first save");
        let first = session.save_generation();

        session
            .save_with(|_| Err("offline".into()))
            .expect("second save");
        assert!(!session.settle_save_status(first));
        assert_eq!(session.save_status(), &SaveStatus::Error("offline".into()));

        assert!(session.settle_save_status(session.save_generation()));
        assert_eq!(session.save_status(), &SaveStatus::Idle);
    }

    #[test]
    fn only_one_save_in_flight() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        session.begin_save().expect("first save");
        assert_eq!(session.begin_save(), Err(SessionError::SaveInProgress));
        assert_eq!(
            session.save_with(|_| Ok(SaveSiteResponse { file_path: String::new() })),
            Err(SessionError::SaveInProgress)
        );
        session.finish_save(Err("offline".into())).expect("finish");
        assert_eq!(session.finish_save(Err("again".into())), Err(SessionError::NoSaveInFlight));
    }

    #[test]
    fn edits_during_save_stay_unsaved() {
        let mut session = EditSession::mount(site(), MemoryRecoveryStore::new());
        let id = id_of(&mut session, "Welcome");
        session.submit_edit(&id, Edit::Text("First".into())).expect("edit");

        session.begin_save().expect("save");
        session.submit_edit(&id, Edit::Text("Second".into())).expect("edit");
        session
            .finish_save(Ok(SaveSiteResponse { file_path: String::new() }))
            .expect("finish");

        assert!(session.original_document().contains("<h1>First</h1>"));
        assert!(session.is_dirty());
        assert_eq!(session.file_path(), "sites/acme.html");
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn recovery_snapshot_is_offered_after_reload() {
        let mut first = EditSession::mount(site(), MemoryRecoveryStore::new());
        let id = id_of(&mut first, "Welcome");
        first.submit_edit(&id, Edit::Text("Draft".into())).expect("edit");
        let store = first.store().clone();

        let mut reloaded = EditSession::mount(site(), store);
        assert!(reloaded.pending_recovery().is_some());
        assert_eq!(reloaded.select_element(&id), Err(SessionError::RecoveryPending));
        assert_eq!(reloaded.begin_save(), Err(SessionError::RecoveryPending));

        reloaded.restore_recovery().expect("restore");
        assert!(reloaded.working_document().contains("<h1>Draft</h1>"));
        assert!(reloaded.is_dirty());
        assert!(reloaded.undo());
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn discarded_recovery_is_forgotten() {
        let mut first = EditSession::mount(site(), MemoryRecoveryStore::new());
        let id = id_of(&mut first, "Welcome");
        first.submit_edit(&id, Edit::Text("Draft".into())).expect("edit");

        let mut reloaded = EditSession::mount(site(), first.store().clone());
        reloaded.discard_recovery().expect("discard");
        assert!(reloaded.store().is_empty());
        assert_eq!(reloaded.discard_recovery(), Err(SessionError::NoRecoveryPending));

        let again = EditSession::mount(site(), reloaded.store().clone());
        assert!(again.pending_recovery().is_none());
    }

    #[test]
    fn background_markers_are_part_of_the_baseline() {
        let html = "<body><header style=\"background-image: url(/hero.jpg)\"></header></body>";
        let mut session = EditSession::mount(
            GeneratedSite {
                html_content: html.to_string(),
                file_path: String::new(),
            },
            MemoryRecoveryStore::new(),
        );
        assert!(session.original_document().contains("data-edit-id"));
        assert!(!session.is_dirty());

        let id = session.catalog().entries()[0].id.clone();
        session
            .submit_edit(&id, Edit::BackgroundImage("/new.jpg".into()))
            .expect("edit");
        assert!(session.working_document().contains("url(/new.jpg)"));
        assert!(!session.export_document().contains("data-edit-id"));
    }

    #[test]
    fn late_markers_replace_the_current_history_entry() {
        let first = EditSession::mount(site(), MemoryRecoveryStore::new());
        let key = recovery_key(first.original_document());
        let mut store = first.store().clone();
        write_snapshot(
            &mut store,
            &key,
            &RecoverySnapshot {
                working_document: "<html><head></head><body><h1>Welcome</h1><header style=\"background-image: url(/hero.jpg)\"></header></body></html>".into(),
                file_path: "sites/acme.html".into(),
            },
        );

        let mut session = EditSession::mount(site(), store);
        session.restore_recovery().expect("restore");
        let revision = session.revision();

        assert_eq!(session.catalog().len(), 2);
        assert!(session.revision() > revision);
        let annotated = session.working_document().to_string();
        assert!(annotated.contains("data-edit-id"));

        let mut store = session.store().clone();
        let stored = read_snapshot(&mut store, &key).expect("snapshot");
        assert_eq!(stored.working_document, annotated);

        assert!(session.undo());
        assert!(session.redo());
        assert_eq!(session.working_document(), annotated);
    }
}
