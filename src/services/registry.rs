use std::collections::HashMap;

use sqlx::SqliteConnection;
use tracing::debug;

use crate::db::repository;
use crate::models::{Preference, PreferenceKind};

/// Maps a user's class or type names to their preference ids.
///
/// Lookups trim surrounding whitespace and are otherwise case-sensitive.
pub struct NameRegistry {
    kind: PreferenceKind,
    user_id: String,
    ids_by_name: HashMap<String, String>,
}

impl NameRegistry {
    pub async fn load(
        conn: &mut SqliteConnection,
        kind: PreferenceKind,
        user_id: &str,
    ) -> Result<Self, sqlx::Error> {
        let entries = repository::fetch_preferences(&mut *conn, kind, user_id).await?;
        Ok(Self::from_entries(kind, user_id, entries))
    }

    pub fn from_entries(kind: PreferenceKind, user_id: &str, entries: Vec<Preference>) -> Self {
        let ids_by_name = entries
            .into_iter()
            .map(|p| (normalize(&p.name).to_string(), p.id))
            .collect();
        Self {
            kind,
            user_id: user_id.to_string(),
            ids_by_name,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.ids_by_name.get(normalize(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_name.is_empty()
    }

    /// Inserts a preference row for `name` unless one is already known.
    ///
    /// Returns the new row, or `None` when nothing was created. Blank names
    /// are never registered.
    pub async fn register_if_absent(
        &mut self,
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<Option<Preference>, sqlx::Error> {
        let name = normalize(name);
        if name.is_empty() || self.ids_by_name.contains_key(name) {
            return Ok(None);
        }

        let created = repository::insert_preference(&mut *conn, self.kind, &self.user_id, name).await?;
        debug!(
            "registered {} {:?} for user {}",
            self.kind.label(),
            created.name,
            self.user_id
        );
        self.ids_by_name.insert(name.to_string(), created.id.clone());
        Ok(Some(created))
    }
}

pub fn normalize(name: &str) -> &str {
    name.trim()
}
