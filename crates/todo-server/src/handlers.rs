//! `/todos` route handlers.
//!
//! Each handler pulls the store out of [`AppState`], calls exactly the store
//! operation its route maps to, and turns the outcome into a status + body.

use ::metrics::counter;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use todo_core::{Task, TaskId, validate_new_task};
use tracing::{debug, info};

use crate::metrics::{TODO_VALIDATION_FAILURES_TOTAL, TODOS_CREATED_TOTAL};
use crate::problem::ApiError;
use crate::server::AppState;

/// GET /todos
pub async fn list_todos(State(state): State<AppState>) -> Json<Vec<Task>> {
    let todos = state.store.get_all_tasks();
    debug!(count = todos.len(), "listing todos");
    Json(todos)
}

/// GET /todos/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<TaskId>, PathRejection>,
) -> Result<Json<Task>, ApiError> {
    let Path(id) = id?;
    state
        .store
        .get_task_by_id(id)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// POST /todos
///
/// Validation runs before the store is touched; a rejected task is never
/// stored. Ids already in use answer 409.
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<Task>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(task) = payload?;

    if let Err(errors) = validate_new_task(&task, state.clock.as_ref()) {
        info!(id = task.id, fields = ?errors.fields().collect::<Vec<_>>(), "todo rejected by validation");
        counter!(TODO_VALIDATION_FAILURES_TOTAL).increment(1);
        return Err(ApiError::Validation(errors));
    }

    let created = state.store.try_add_task(task)?;
    counter!(TODOS_CREATED_TOTAL).increment(1);
    info!(id = created.id, "todo created");

    let location = created.location();
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// DELETE /todos/{id}
///
/// Always 204, whether or not anything matched.
pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<TaskId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let removed = state.store.delete_task_by_id(id);
    info!(id, removed, "todo delete");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use axum::response::Response;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::{Value, json};
    use mockable::MockClock;
    use todo_core::{InMemoryTaskStore, TaskStore};
    use tower::ServiceExt;

    use crate::config::ServerConfig;
    use crate::server::TodoServer;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap()
    }

    fn tomorrow() -> DateTime<Utc> {
        now() + Duration::days(1)
    }

    fn yesterday() -> DateTime<Utc> {
        now() - Duration::days(1)
    }

    fn frozen_clock() -> MockClock {
        let mut clock = MockClock::new();
        let _ = clock.expect_utc().return_const(now());
        clock
    }

    fn app() -> (Router, Arc<InMemoryTaskStore>) {
        let store = Arc::new(InMemoryTaskStore::new());
        let server = TodoServer::new(
            ServerConfig::default(),
            store.clone(),
            Arc::new(frozen_clock()),
            crate::metrics::detached_handle(),
        );
        (server.router(), store)
    }

    fn todo_json(id: TaskId, due: DateTime<Utc>, completed: bool) -> Value {
        json!({
            "id": id,
            "name": format!("todo {id}"),
            "dueDate": due.to_rfc3339(),
            "isCompleted": completed,
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(req).await.unwrap()
    }

    async fn body_bytes(resp: Response) -> axum::body::Bytes {
        axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[tokio::test]
    async fn list_empty_store() {
        let (app, _) = app();
        let resp = send(&app, Method::GET, "/todos", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([]));
    }

    #[tokio::test]
    async fn create_valid_todo() {
        let (app, store) = app();
        let resp = send(&app, Method::POST, "/todos", Some(todo_json(1, tomorrow(), false))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[header::LOCATION], "/todos/1");
        let body = body_json(resp).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["name"], "todo 1");
        assert_eq!(body["isCompleted"], false);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_past_and_completed_reports_both_fields() {
        let (app, store) = app();
        let resp = send(&app, Method::POST, "/todos", Some(todo_json(2, yesterday(), true))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/problem+json");
        let body = body_json(resp).await;
        assert_eq!(body["errors"]["DueDate"], json!(["Cannot have due date in past"]));
        assert_eq!(body["errors"]["IsCompleted"], json!(["Cannot add completed Todo"]));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_completed_only_reports_one_field() {
        let (app, store) = app();
        let resp = send(&app, Method::POST, "/todos", Some(todo_json(3, tomorrow(), true))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        let errors = body["errors"].as_object().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("IsCompleted"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_duplicate_id_conflicts() {
        let (app, store) = app();
        let first = send(&app, Method::POST, "/todos", Some(todo_json(5, tomorrow(), false))).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let second = send(&app, Method::POST, "/todos", Some(todo_json(5, tomorrow(), false))).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_accepts_short_and_basic_offset_timestamps() {
        let (app, store) = app();
        for (id, due) in [(1, "2025-03-11T08:00"), (2, "2025-03-11T08:00Z"), (3, "2025-03-11T08:00:00+0200")] {
            let body = json!({"id": id, "name": "x", "dueDate": due, "isCompleted": false});
            let resp = send(&app, Method::POST, "/todos", Some(body)).await;
            assert_eq!(resp.status(), StatusCode::CREATED, "dueDate {due}");
        }
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn create_accepts_pascal_case_body() {
        let (app, _) = app();
        let body = json!({"Id": 4, "Name": "legacy", "DueDate": "2025-03-12", "IsCompleted": false});
        let resp = send(&app, Method::POST, "/todos", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["name"], "legacy");
        assert_eq!(body["dueDate"], "2025-03-12T00:00:00Z");
    }

    #[tokio::test]
    async fn create_malformed_json_is_bad_request() {
        let (app, store) = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/todos")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"id\": 1,"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["status"], 400);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_missing_fields_is_bad_request() {
        let (app, _) = app();
        let resp = send(&app, Method::POST, "/todos", Some(json!({"id": 1}))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_without_content_type_is_unsupported() {
        let (app, _) = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/todos")
            .body(Body::from(todo_json(1, tomorrow(), false).to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn get_existing_todo() {
        let (app, _) = app();
        let _ = send(&app, Method::POST, "/todos", Some(todo_json(7, tomorrow(), false))).await;
        let resp = send(&app, Method::GET, "/todos/7", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["id"], 7);
        assert_eq!(body["dueDate"], "2025-03-11T09:30:00Z");
    }

    #[tokio::test]
    async fn get_missing_todo_is_empty_404() {
        let (app, _) = app();
        let resp = send(&app, Method::GET, "/todos/99", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn get_non_numeric_id_is_bad_request() {
        let (app, _) = app();
        let resp = send(&app, Method::GET, "/todos/abc", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_duplicated_id_is_server_error() {
        let (app, store) = app();
        let task = Task::new(8, "dup", tomorrow(), false);
        let _ = store.add_task(task.clone());
        let _ = store.add_task(task);
        let resp = send(&app, Method::GET, "/todos/8", None).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn delete_then_get_is_404() {
        let (app, store) = app();
        let _ = send(&app, Method::POST, "/todos", Some(todo_json(1, tomorrow(), false))).await;
        let resp = send(&app, Method::DELETE, "/todos/1", None).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(resp).await.is_empty());
        assert!(store.is_empty());

        let resp = send(&app, Method::GET, "/todos/1", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_still_204() {
        let (app, store) = app();
        let _ = store.add_task(Task::new(1, "keep", tomorrow(), false));
        let resp = send(&app, Method::DELETE, "/todos/42", None).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let (app, _) = app();
        for id in [3, 1, 2] {
            let resp = send(&app, Method::POST, "/todos", Some(todo_json(id, tomorrow(), false))).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }
        let body = body_json(send(&app, Method::GET, "/todos", None).await).await;
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
