use serde::{Deserialize, Serialize};

/// A to-do item, optionally tied to a project.
///
/// `project_id` is a soft link: deleting the project sets it back to `None`
/// instead of removing the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTaskInput {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub project_id: Option<i64>,
}
