//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Executing the round-trip is somebody else's job (see `transport`), which
//! keeps this module deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, TodoStatistics, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.bodyless(HttpMethod::Get, "/todos".to_string())
    }

    pub fn build_get_todo(&self, id: u64) -> HttpRequest {
        self.bodyless(HttpMethod::Get, format!("/todos/{id}"))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/todos".to_string(), input)
    }

    pub fn build_update_todo(&self, id: u64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Patch, format!("/todos/{id}"), input)
    }

    pub fn build_delete_todo(&self, id: u64) -> HttpRequest {
        self.bodyless(HttpMethod::Delete, format!("/todos/{id}"))
    }

    pub fn build_list_by_status(&self, completed: bool) -> HttpRequest {
        self.bodyless(HttpMethod::Get, format!("/todos/status?completed={completed}"))
    }

    pub fn build_search(&self, term: &str) -> HttpRequest {
        let q = urlencoding::encode(term);
        self.bodyless(HttpMethod::Get, format!("/todos/search?q={q}"))
    }

    pub fn build_statistics(&self) -> HttpRequest {
        self.bodyless(HttpMethod::Get, "/todos/statistics".to_string())
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// The service either echoes the removed todo or sends no content.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Option<Todo>, ApiError> {
        check_status(&response)?;
        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(None);
        }
        decode(&response.body).map(Some)
    }

    pub fn parse_list_by_status(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        self.parse_list_todos(response)
    }

    pub fn parse_search(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        self.parse_list_todos(response)
    }

    pub fn parse_statistics(&self, response: HttpResponse) -> Result<TodoStatistics, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    fn bodyless(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant. Any 2xx
/// passes, whichever one the service is documented to send.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    let message = service_message(&response.body)
        .unwrap_or_else(|| format!("request failed with status {}", response.status));
    Err(match response.status {
        400 | 422 => ApiError::validation(message),
        404 => ApiError::not_found(message),
        status => ApiError::http(status, message),
    })
}

/// Pull the human-readable message out of an error body.
///
/// The service answers `{ "error": "..." }`; some deployments answer
/// `{ "message": "..." }` or a list of messages instead.
fn service_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["error", "message"] {
        match value.get(key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(serde_json::Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const TODO_JSON: &str = r#"{"id":1,"title":"Test","completed":false,"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_todo_produces_correct_request() {
        let req = client().build_get_todo(42);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/todos/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo::new("Buy milk", None).unwrap();
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Buy milk", "completed": false}));
    }

    #[test]
    fn build_update_todo_uses_patch_with_partial_body() {
        let input = UpdateTodo::default().with_title("Updated").unwrap();
        let req = client().build_update_todo(7, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:3000/todos/7");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Updated");
        assert!(body.get("completed").is_none());
        assert!(body.get("description").is_none());
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo(3);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/todos/3");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_query_requests() {
        let c = client();
        assert_eq!(
            c.build_list_by_status(true).path,
            "http://localhost:3000/todos/status?completed=true"
        );
        assert_eq!(
            c.build_search("milk & eggs").path,
            "http://localhost:3000/todos/search?q=milk%20%26%20eggs"
        );
        assert_eq!(c.build_statistics().path, "http://localhost:3000/todos/statistics");
    }

    #[test]
    fn parse_list_todos_success() {
        let response = HttpResponse::new(200, format!("[{TODO_JSON}]"));
        let todos = client().parse_list_todos(response).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Test");
    }

    #[test]
    fn parse_get_todo_not_found_surfaces_service_message() {
        let response = HttpResponse::new(404, r#"{"error":"Todo with ID 9 not found"}"#);
        let err = client().parse_get_todo(response).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Todo with ID 9 not found");
    }

    #[test]
    fn parse_create_todo_success() {
        let response = HttpResponse::new(201, TODO_JSON);
        let todo = client().parse_create_todo(response).unwrap();
        assert_eq!(todo.id, 1);
    }

    #[test]
    fn any_success_status_is_accepted() {
        let todo = client().parse_create_todo(HttpResponse::new(200, TODO_JSON)).unwrap();
        assert_eq!(todo.id, 1);

        let echoed = client().parse_delete_todo(HttpResponse::new(202, TODO_JSON)).unwrap();
        assert_eq!(echoed.map(|t| t.id), Some(1));

        let err = client().parse_list_todos(HttpResponse::new(302, "")).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 302, .. }));
    }

    #[test]
    fn parse_create_todo_validation_error() {
        let response = HttpResponse::new(400, r#"{"error":"Title is required"}"#);
        let err = client().parse_create_todo(response).unwrap_err();
        assert_eq!(err, ApiError::validation("Title is required"));
    }

    #[test]
    fn parse_error_falls_back_to_message_field_then_status() {
        let response = HttpResponse::new(400, r#"{"message":["title should not be empty"]}"#);
        let err = client().parse_create_todo(response).unwrap_err();
        assert_eq!(err.to_string(), "title should not be empty");

        let response = HttpResponse::new(500, "internal error");
        let err = client().parse_create_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
        assert_eq!(err.to_string(), "request failed with status 500");
    }

    #[test]
    fn parse_update_todo_success() {
        let body = TODO_JSON.replace(r#""completed":false"#, r#""completed":true"#);
        let todo = client().parse_update_todo(HttpResponse::new(200, body)).unwrap();
        assert!(todo.completed);
    }

    #[test]
    fn parse_delete_todo_echo_or_empty() {
        let echoed = client().parse_delete_todo(HttpResponse::new(200, TODO_JSON)).unwrap();
        assert_eq!(echoed.map(|t| t.id), Some(1));
        assert!(client().parse_delete_todo(HttpResponse::new(204, "")).unwrap().is_none());
        assert!(client().parse_delete_todo(HttpResponse::new(200, "")).unwrap().is_none());
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let err = client()
            .parse_delete_todo(HttpResponse::new(404, ""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "request failed with status 404");
    }

    #[test]
    fn parse_statistics_success() {
        let response = HttpResponse::new(200, r#"{"total":3,"completed":1,"pending":2}"#);
        let stats = client().parse_statistics(response).unwrap();
        assert_eq!(stats, TodoStatistics { total: 3, completed: 1, pending: 2 });
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/api/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:3000/api/todos");
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client()
            .parse_list_todos(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
