//! Editable view of one assignment row.
//!
//! Edits show up immediately on the row (optimistic), are collected into a
//! single pending patch, and are reconciled with whatever the store returns.

use crate::error::AppError;
use crate::models::{Assignment, UpdateAssignmentRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStatus {
    Clean,
    Dirty,
    Saving,
    Failed,
}

#[derive(Debug, Clone)]
pub struct RowDraft {
    saved: Assignment,
    shown: Assignment,
    pending: UpdateAssignmentRequest,
    status: DraftStatus,
    last_error: Option<String>,
}

impl RowDraft {
    pub fn new(saved: Assignment) -> Self {
        Self {
            shown: saved.clone(),
            saved,
            pending: UpdateAssignmentRequest::default(),
            status: DraftStatus::Clean,
            last_error: None,
        }
    }

    /// The row as it should be displayed, pending edits included.
    pub fn row(&self) -> &Assignment {
        &self.shown
    }

    pub fn saved(&self) -> &Assignment {
        &self.saved
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn edit(&mut self, patch: UpdateAssignmentRequest) -> Result<(), AppError> {
        if self.status == DraftStatus::Saving {
            return Err(AppError::BadRequest("row is being saved".to_string()));
        }
        patch.validate()?;
        patch.apply_to(&mut self.shown)?;
        merge(&mut self.pending, patch);

        self.status = if self.pending.is_empty() {
            DraftStatus::Clean
        } else {
            DraftStatus::Dirty
        };
        Ok(())
    }

    /// Hands out the pending patch and marks the row as saving.
    pub fn begin_save(&mut self) -> Option<UpdateAssignmentRequest> {
        if self.status != DraftStatus::Dirty || self.pending.is_empty() {
            return None;
        }
        self.status = DraftStatus::Saving;
        Some(self.pending.clone())
    }

    /// On success the store's copy wins; on failure the row reverts.
    pub fn reconcile(&mut self, outcome: Result<Assignment, String>) {
        match outcome {
            Ok(stored) => {
                self.saved = stored.clone();
                self.shown = stored;
                self.status = DraftStatus::Clean;
                self.last_error = None;
            }
            Err(message) => {
                self.shown = self.saved.clone();
                self.status = DraftStatus::Failed;
                self.last_error = Some(message);
            }
        }
        self.pending = UpdateAssignmentRequest::default();
    }

    pub fn discard(&mut self) {
        self.shown = self.saved.clone();
        self.pending = UpdateAssignmentRequest::default();
        self.status = DraftStatus::Clean;
        self.last_error = None;
    }

    /// Takes a fresh copy from the store, keeping unsaved edits on top.
    pub fn refresh(&mut self, latest: Assignment) {
        self.saved = latest.clone();
        self.shown = latest;
        if self.pending.apply_to(&mut self.shown).is_err() {
            self.shown = self.saved.clone();
            self.pending = UpdateAssignmentRequest::default();
            self.status = DraftStatus::Clean;
        }
    }
}

fn merge(into: &mut UpdateAssignmentRequest, patch: UpdateAssignmentRequest) {
    if patch.assignment.is_some() {
        into.assignment = patch.assignment;
    }
    if patch.kind.is_some() {
        into.kind = patch.kind;
    }
    if patch.status.is_some() {
        into.status = patch.status;
    }
    if patch.target.is_some() {
        into.target = patch.target;
    }
    if patch.received.is_some() {
        into.received = patch.received;
    }
    if patch.class.is_some() {
        into.class = patch.class;
    }
    if patch.due_date.is_some() {
        into.due_date = patch.due_date;
    }
    if patch.submitted_date.is_some() {
        into.submitted_date = patch.submitted_date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentStatus;
    use chrono::{TimeZone, Utc};

    fn stored() -> Assignment {
        let due = Utc.with_ymd_and_hms(2024, 4, 2, 23, 59, 0).unwrap();
        Assignment {
            id: "a1".to_string(),
            user_id: "alice".to_string(),
            assignment: "Worksheet".to_string(),
            kind: "Homework".to_string(),
            status: AssignmentStatus::NotStarted,
            target: 90.0,
            received: None,
            class: "Geometry".to_string(),
            due_date: due,
            submitted_date: None,
            created_at: due,
        }
    }

    #[test]
    fn test_edits_accumulate_into_one_patch() {
        let mut draft = RowDraft::new(stored());
        draft
            .edit(UpdateAssignmentRequest {
                status: Some(AssignmentStatus::InProgress),
                ..Default::default()
            })
            .unwrap();
        draft
            .edit(UpdateAssignmentRequest {
                received: Some(Some(95.0)),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(draft.row().status, AssignmentStatus::InProgress);
        assert_eq!(draft.row().received, Some(95.0));
        assert_eq!(draft.saved().received, None);

        let patch = draft.begin_save().expect("dirty row has a patch");
        assert_eq!(patch.status, Some(AssignmentStatus::InProgress));
        assert_eq!(patch.received, Some(Some(95.0)));
        assert_eq!(draft.status(), DraftStatus::Saving);
        assert!(draft.begin_save().is_none());
    }

    #[test]
    fn test_invalid_edit_leaves_row_untouched() {
        let mut draft = RowDraft::new(stored());
        let result = draft.edit(UpdateAssignmentRequest {
            target: Some(140.0),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(draft.row(), &stored());
        assert_eq!(draft.status(), DraftStatus::Clean);
    }

    #[test]
    fn test_edits_are_refused_while_saving() {
        let mut draft = RowDraft::new(stored());
        draft
            .edit(UpdateAssignmentRequest {
                target: Some(80.0),
                ..Default::default()
            })
            .unwrap();
        draft.begin_save();
        assert!(draft
            .edit(UpdateAssignmentRequest {
                target: Some(70.0),
                ..Default::default()
            })
            .is_err());
    }

    #[test]
    fn test_failed_save_reverts_row() {
        let mut draft = RowDraft::new(stored());
        draft
            .edit(UpdateAssignmentRequest {
                class: Some("Trigonometry".to_string()),
                ..Default::default()
            })
            .unwrap();
        draft.begin_save();
        draft.reconcile(Err("offline".to_string()));

        assert_eq!(draft.status(), DraftStatus::Failed);
        assert_eq!(draft.row().class, "Geometry");
        assert_eq!(draft.last_error(), Some("offline"));
    }

    #[test]
    fn test_refresh_keeps_unsaved_edits_on_top() {
        let mut draft = RowDraft::new(stored());
        draft
            .edit(UpdateAssignmentRequest {
                assignment: Some("Worksheet B".to_string()),
                ..Default::default()
            })
            .unwrap();

        let mut latest = stored();
        latest.received = Some(70.0);
        draft.refresh(latest);

        assert_eq!(draft.row().assignment, "Worksheet B");
        assert_eq!(draft.row().received, Some(70.0));
        assert_eq!(draft.status(), DraftStatus::Dirty);

        draft.discard();
        assert_eq!(draft.row().assignment, "Worksheet");
    }
}
