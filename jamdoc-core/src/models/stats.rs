use serde::{Deserialize, Serialize};

/// Dashboard counters. Derived from the tables on demand, never stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    /// Total number of projects.
    pub active_projects: u32,
    /// Jam projects whose deadline is still in the future.
    pub active_jams: u32,
    /// Tasks not yet completed.
    pub pending_tasks: u32,
}
