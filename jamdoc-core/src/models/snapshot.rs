use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Note, Project, Task};

/// Format version written into every backup file.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The whole data set as one JSON document, for backup and restore.
///
/// Ids are preserved verbatim so task/note project links survive the round
/// trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,
}
