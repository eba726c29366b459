use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::assignment::millis_field;
use crate::models::{Assignment, NewAssignmentRequest, PreferenceKind, UpdateAssignmentRequest};
use crate::services::draft::RowDraft;
use crate::services::registry::{NameRegistry, normalize};

pub struct AssignmentService {
    db: SqlitePool,
}

impl AssignmentService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Inserts the assignment and registers any class or type name the
    /// user has not used before, all in one transaction.
    pub async fn add(&self, user_id: &str, req: NewAssignmentRequest) -> Result<Assignment, AppError> {
        req.validate()?;

        let assignment = Assignment {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            assignment: req.assignment.trim().to_string(),
            kind: normalize(&req.kind).to_string(),
            status: req.status,
            target: req.target,
            received: req.received,
            class: normalize(&req.class).to_string(),
            due_date: millis_field("due_date", req.due_date)?,
            submitted_date: req
                .submitted_date
                .map(|ms| millis_field("submitted_date", ms))
                .transpose()?,
            created_at: Utc::now(),
        };

        let mut tx = self.db.begin().await?;

        let mut classes = NameRegistry::load(&mut tx, PreferenceKind::Class, user_id).await?;
        if let Some(created) = classes.register_if_absent(&mut tx, &assignment.class).await? {
            info!("new class {:?} registered from assignment", created.name);
        }
        let mut types = NameRegistry::load(&mut tx, PreferenceKind::Type, user_id).await?;
        if let Some(created) = types.register_if_absent(&mut tx, &assignment.kind).await? {
            info!("new type {:?} registered from assignment", created.name);
        }

        repository::insert_assignment(&mut *tx, &assignment).await?;
        tx.commit().await?;

        info!("assignment {} created for user {}", assignment.id, user_id);
        Ok(assignment)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Assignment>, AppError> {
        repository::fetch_assignments(&self.db, user_id).await
    }

    /// Changes only the fields present in `req`.
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        req: &UpdateAssignmentRequest,
    ) -> Result<Assignment, AppError> {
        req.validate()?;

        let mut current = repository::find_assignment(&self.db, user_id, id)
            .await?
            .ok_or(AppError::NotFound)?;
        req.apply_to(&mut current)?;

        if !repository::update_assignment(&self.db, &current).await? {
            return Err(AppError::NotFound);
        }
        Ok(current)
    }

    pub async fn remove(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        if repository::delete_assignment(&self.db, user_id, id).await? {
            info!("assignment {} removed for user {}", id, user_id);
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    /// Sends a row's pending edits and reconciles the row with the outcome.
    pub async fn save_draft(&self, user_id: &str, draft: &mut RowDraft) -> Result<(), AppError> {
        let Some(patch) = draft.begin_save() else {
            return Ok(());
        };
        let id = draft.row().id.clone();

        match self.update(user_id, &id, &patch).await {
            Ok(saved) => {
                draft.reconcile(Ok(saved));
                Ok(())
            }
            Err(e) => {
                warn!("saving assignment {} failed: {}", id, e);
                let message = e.to_string();
                draft.reconcile(Err(message));
                Err(e)
            }
        }
    }
}
