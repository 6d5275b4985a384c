use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use jamdoc::api;
use jamdoc_core::models::{Note, Project, Snapshot, Statistics, Task};
use jamdoc_core::Database;

fn server() -> TestServer {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    TestServer::new(api::create_router(db)).unwrap()
}

async fn create_project(server: &TestServer, title: &str) -> Project {
    let res = server
        .post("/api/projects")
        .json(&json!({ "concept": { "title": title } }))
        .await;
    res.assert_status(StatusCode::CREATED);
    res.json()
}

async fn create_task(server: &TestServer, text: &str, project_id: Option<i64>) -> Task {
    let res = server
        .post("/api/tasks")
        .json(&json!({ "text": text, "project_id": project_id }))
        .await;
    res.assert_status(StatusCode::CREATED);
    res.json()
}

#[tokio::test]
async fn health_answers() {
    let server = server();
    let res = server.get("/health").await;
    res.assert_status_ok();
    res.assert_text("ok");
}

#[tokio::test]
async fn project_crud_round_trip() {
    let server = server();
    let created = create_project(&server, "Moss Runner").await;

    let fetched: Project = server
        .get(&format!("/api/projects/{}", created.id))
        .await
        .json();
    assert_eq!(fetched.concept.title, "Moss Runner");

    let res = server
        .put(&format!("/api/projects/{}", created.id))
        .json(&json!({ "status": "in_progress" }))
        .await;
    res.assert_status_ok();
    let updated: Project = res.json();
    assert_eq!(updated.status.as_str(), "in_progress");
    assert_eq!(updated.concept.title, "Moss Runner");

    let listed: Vec<Project> = server.get("/api/projects").await.json();
    assert_eq!(listed.len(), 1);

    server
        .get("/api/projects/999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_project_unlinks_its_tasks_and_notes() {
    let server = server();
    let project = create_project(&server, "doomed").await;
    let task = create_task(&server, "draw tileset", Some(project.id)).await;
    let note_res = server
        .post("/api/notes")
        .json(&json!({ "content": "palette ideas", "project_id": project.id }))
        .await;
    note_res.assert_status(StatusCode::CREATED);
    let note: Note = note_res.json();

    server
        .delete(&format!("/api/projects/{}", project.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let tasks: Vec<Task> = server.get("/api/tasks").await.json();
    let survivor = tasks.iter().find(|t| t.id == task.id).unwrap();
    assert_eq!(survivor.project_id, None);

    let notes: Vec<Note> = server.get("/api/notes").await.json();
    let survivor = notes.iter().find(|n| n.id == note.id).unwrap();
    assert_eq!(survivor.project_id, None);

    server
        .delete(&format!("/api/projects/{}", project.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggling_a_task_updates_the_pending_count() {
    let server = server();
    let task = create_task(&server, "export build", None).await;

    let stats: Statistics = server.get("/api/stats").await.json();
    assert_eq!(stats.pending_tasks, 1);

    let toggled: Task = server
        .post(&format!("/api/tasks/{}/toggle", task.id))
        .await
        .json();
    assert!(toggled.completed);

    let stats: Statistics = server.get("/api/stats").await.json();
    assert_eq!(stats.pending_tasks, 0);

    server
        .post("/api/tasks/999/toggle")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_list_filters_by_project_and_pending() {
    let server = server();
    let project = create_project(&server, "p").await;
    let done = create_task(&server, "done", Some(project.id)).await;
    server
        .post(&format!("/api/tasks/{}/toggle", done.id))
        .await
        .assert_status_ok();
    create_task(&server, "open", Some(project.id)).await;
    create_task(&server, "loose", None).await;

    let all: Vec<Task> = server.get("/api/tasks").await.json();
    assert_eq!(all.len(), 3);

    let scoped: Vec<Task> = server
        .get(&format!("/api/tasks?project_id={}", project.id))
        .await
        .json();
    assert_eq!(scoped.len(), 2);

    let pending: Vec<Task> = server
        .get(&format!("/api/tasks?project_id={}&pending=true", project.id))
        .await
        .json();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].text, "open");
}

#[tokio::test]
async fn notes_filter_by_project() {
    let server = server();
    let project = create_project(&server, "p").await;
    server
        .post("/api/notes")
        .json(&json!({ "content": "scoped", "project_id": project.id, "label": "idea" }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/notes")
        .json(&json!({ "content": "loose" }))
        .await
        .assert_status(StatusCode::CREATED);

    let scoped: Vec<Note> = server
        .get(&format!("/api/notes?project_id={}", project.id))
        .await
        .json();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].label.as_deref(), Some("idea"));

    let all: Vec<Note> = server.get("/api/notes").await.json();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn upcoming_jams_are_sorted_by_deadline() {
    let server = server();
    server
        .post("/api/projects")
        .json(&json!({
            "concept": { "title": "later" },
            "kind": "jam",
            "jam_deadline": "2031-06-01T00:00:00Z"
        }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/projects")
        .json(&json!({
            "concept": { "title": "sooner" },
            "kind": "jam",
            "jam_deadline": "2030-06-01T00:00:00Z"
        }))
        .await
        .assert_status(StatusCode::CREATED);
    create_project(&server, "not a jam").await;

    let jams: Vec<Project> = server.get("/api/jams/upcoming").await.json();
    let titles: Vec<&str> = jams.iter().map(|p| p.concept.title.as_str()).collect();
    assert_eq!(titles, vec!["sooner", "later"]);

    let stats: Statistics = server.get("/api/stats").await.json();
    assert_eq!(stats.active_jams, 2);
    assert_eq!(stats.active_projects, 3);
}

#[tokio::test]
async fn backup_restore_round_trip() {
    let server = server();
    let project = create_project(&server, "kept").await;
    create_task(&server, "t", Some(project.id)).await;

    let backup_res = server.get("/api/backup").await;
    backup_res.assert_status_ok();
    let snapshot: Snapshot = backup_res.json();
    assert_eq!(snapshot.projects.len(), 1);

    server
        .post("/api/reset")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let stats: Statistics = server.get("/api/stats").await.json();
    assert_eq!(stats, Statistics::default());

    server
        .post("/api/backup")
        .json(&snapshot)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let projects: Vec<Project> = server.get("/api/projects").await.json();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, project.id);
    let stats: Statistics = server.get("/api/stats").await.json();
    assert_eq!(stats.pending_tasks, 1);
}

#[tokio::test]
async fn restore_rejects_dangling_references() {
    let server = server();
    create_project(&server, "kept").await;

    let mut snapshot: Value = server.get("/api/backup").await.json();
    snapshot["tasks"] = json!([
        { "id": 1, "text": "orphan", "completed": false, "project_id": 42 }
    ]);

    let res = server.post("/api/backup").json(&snapshot).await;
    res.assert_status(StatusCode::BAD_REQUEST);

    // Nothing was lost.
    let projects: Vec<Project> = server.get("/api/projects").await.json();
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn export_returns_a_pdf_download() {
    let server = server();
    let project = create_project(&server, "Moss Runner").await;

    let res = server
        .post(&format!("/api/projects/{}/export", project.id))
        .json(&json!({ "company": "Tiny Forge", "authors": "R. Vega" }))
        .await;
    res.assert_status_ok();
    assert_eq!(res.header("content-type"), "application/pdf");
    assert!(res
        .header("content-disposition")
        .to_str()
        .unwrap()
        .contains("Moss_Runner.pdf"));
    assert!(res.as_bytes().starts_with(b"%PDF"));

    server
        .post("/api/projects/999/export")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
