use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quick note: free text, or a whiteboard drawing stored as a data URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub label: Option<String>,
    pub project_id: Option<i64>,
}

impl Note {
    /// Whiteboard notes carry their image inline as a `data:image/...` URL.
    pub fn is_drawing(&self) -> bool {
        self.content.starts_with("data:image")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteInput {
    pub content: String,
    pub label: Option<String>,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateNoteInput {
    pub content: Option<String>,
    pub label: Option<String>,
    pub project_id: Option<i64>,
}
