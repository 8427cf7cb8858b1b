//! In-memory implementation of the external todo service.
//!
//! Ids come from a counter starting at 1 and the list is returned in creation
//! order. Every error is `{ "error": "..." }` with 400 for bad input and 404
//! for unknown ids.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const MAX_TITLE_LEN: usize = 1000;
pub const MAX_DESCRIPTION_LEN: usize = 5000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Deserialize)]
struct StatusQuery {
    completed: bool,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Default)]
pub struct TodoDb {
    next_id: u64,
    todos: BTreeMap<u64, Todo>,
}

pub type Db = Arc<RwLock<TodoDb>>;

/// Error body returned by every failing handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(id: u64) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("Todo with ID {id} not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(status = %self.status, message = %self.message, "request rejected");
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

/// Blank descriptions are stored as absent.
fn validate_description(description: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(description) = description else {
        return Ok(None);
    };
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::bad_request(format!(
            "Description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok((!description.is_empty()).then(|| description.to_string()))
}

pub fn app() -> Router {
    router(Db::default())
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/status", get(todos_by_status))
        .route("/todos/search", get(search_todos))
        .route("/todos/statistics", get(statistics))
        .route("/todos/{id}", get(get_todo).patch(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let db = db.read().await;
    Json(db.todos.values().cloned().collect())
}

async fn create_todo(
    State(db): State<Db>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = payload?;
    let title = validate_title(&input.title)?;
    let description = validate_description(input.description)?;

    let mut db = db.write().await;
    db.next_id += 1;
    let now = Utc::now();
    let todo = Todo {
        id: db.next_id,
        title,
        description,
        completed: input.completed,
        created_at: now,
        updated_at: now,
    };
    db.todos.insert(todo.id, todo.clone());
    debug!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(db): State<Db>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    let db = db.read().await;
    db.todos.get(&id).cloned().map(Json).ok_or_else(|| ApiError::not_found(id))
}

async fn update_todo(
    State(db): State<Db>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let title = input.title.as_deref().map(validate_title).transpose()?;
    let clear_description = input.description.as_deref().is_some_and(|d| d.trim().is_empty());
    let description = validate_description(input.description)?;

    let mut db = db.write().await;
    let todo = db.todos.get_mut(&id).ok_or_else(|| ApiError::not_found(id))?;
    if let Some(title) = title {
        todo.title = title;
    }
    if description.is_some() || clear_description {
        todo.description = description;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    todo.updated_at = Utc::now();
    debug!(id, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    let mut db = db.write().await;
    let todo = db.todos.remove(&id).ok_or_else(|| ApiError::not_found(id))?;
    debug!(id, "deleted todo");
    Ok(Json(todo))
}

async fn todos_by_status(
    State(db): State<Db>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(query) = query?;
    let db = db.read().await;
    Ok(Json(
        db.todos
            .values()
            .filter(|t| t.completed == query.completed)
            .cloned()
            .collect(),
    ))
}

/// Case-insensitive match on the title.
async fn search_todos(
    State(db): State<Db>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(query) = query?;
    let needle = query.q.trim().to_lowercase();
    let db = db.read().await;
    Ok(Json(
        db.todos
            .values()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .cloned()
            .collect(),
    ))
}

async fn statistics(State(db): State<Db>) -> Json<Statistics> {
    let db = db.read().await;
    let total = db.todos.len();
    let completed = db.todos.values().filter(|t| t.completed).count();
    Json(Statistics {
        total,
        completed,
        pending: total - completed,
    })
}
