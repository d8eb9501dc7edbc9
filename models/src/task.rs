//! Task wire types — the CRUD half of the backend contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest description the backend accepts, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// A task as returned from the API.
///
/// Identity and timestamps are server-owned; the client only ever holds a
/// cached copy of this representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `POST /api/tasks` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreate {
    pub description: String,
}

/// `PUT /api/tasks/{id}` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub description: String,
}
