//! Async transports that put `TodoClient` on the wire.
//!
//! # Design
//! Two seams keep the I/O replaceable:
//! - `HttpExecutor` runs one `HttpRequest` and hands back the raw
//!   `HttpResponse`, whatever its status. Only failures to get a response at
//!   all are errors here; status interpretation stays in `TodoClient`.
//! - `TodoTransport` is the operation-level contract the store depends on.
//!   `RestTransport` implements it by pairing `build_*`, an executor call and
//!   `parse_*`. Tests substitute their own `TodoTransport` instead.
//!
//! Neither layer holds mutable state, so one instance can be shared behind an
//! `Arc` by any number of stores.

use async_trait::async_trait;
use tracing::debug;

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, TodoStatistics, UpdateTodo};

/// Executes plain-data HTTP requests.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Operation-level access to the external todo service.
#[async_trait]
pub trait TodoTransport: Send + Sync {
    async fn list(&self) -> Result<Vec<Todo>, ApiError>;
    async fn create(&self, input: &CreateTodo) -> Result<Todo, ApiError>;
    async fn get_by_id(&self, id: u64) -> Result<Todo, ApiError>;
    async fn update(&self, id: u64, patch: &UpdateTodo) -> Result<Todo, ApiError>;
    /// Returns the removed todo when the service echoes it back.
    async fn delete(&self, id: u64) -> Result<Option<Todo>, ApiError>;
}

/// `HttpExecutor` backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    http: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        debug!(method = %request.method, url = %request.path, "sending request");

        let mut builder = self.http.request(method, &request.path);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;
        debug!(status, url = %request.path, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::transport(err.to_string())
    }
}

/// REST implementation of `TodoTransport`.
#[derive(Debug, Clone)]
pub struct RestTransport<E = ReqwestExecutor> {
    client: TodoClient,
    executor: E,
}

impl RestTransport<ReqwestExecutor> {
    /// Transport over `reqwest` using `config.base_url` and `config.timeout`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(TodoClient::new(&config.base_url), ReqwestExecutor::new(config)?))
    }
}

impl<E: HttpExecutor> RestTransport<E> {
    pub fn new(client: TodoClient, executor: E) -> Self {
        Self { client, executor }
    }

    /// Server-side filter on completion status.
    pub async fn list_by_status(&self, completed: bool) -> Result<Vec<Todo>, ApiError> {
        let response = self.executor.execute(self.client.build_list_by_status(completed)).await?;
        self.client.parse_list_by_status(response)
    }

    /// Server-side case-insensitive title search.
    pub async fn search(&self, term: &str) -> Result<Vec<Todo>, ApiError> {
        let response = self.executor.execute(self.client.build_search(term)).await?;
        self.client.parse_search(response)
    }

    pub async fn statistics(&self) -> Result<TodoStatistics, ApiError> {
        let response = self.executor.execute(self.client.build_statistics()).await?;
        self.client.parse_statistics(response)
    }
}

#[async_trait]
impl<E: HttpExecutor> TodoTransport for RestTransport<E> {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.executor.execute(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    async fn create(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.executor.execute(request).await?;
        self.client.parse_create_todo(response)
    }

    async fn get_by_id(&self, id: u64) -> Result<Todo, ApiError> {
        let response = self.executor.execute(self.client.build_get_todo(id)).await?;
        self.client.parse_get_todo(response)
    }

    async fn update(&self, id: u64, patch: &UpdateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, patch)?;
        let response = self.executor.execute(request).await?;
        self.client.parse_update_todo(response)
    }

    async fn delete(&self, id: u64) -> Result<Option<Todo>, ApiError> {
        let response = self.executor.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses and records what was sent.
    struct Scripted {
        responses: Mutex<Vec<Result<HttpResponse, ApiError>>>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<HttpResponse, ApiError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpExecutor for Scripted {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.lock().unwrap().push(request);
            self.responses.lock().unwrap().pop().expect("no scripted response left")
        }
    }

    const TODO_JSON: &str = r#"{"id":5,"title":"Walk dog","completed":true,"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-03T00:00:00Z"}"#;

    fn transport(responses: Vec<Result<HttpResponse, ApiError>>) -> RestTransport<Scripted> {
        RestTransport::new(TodoClient::new("http://svc"), Scripted::new(responses))
    }

    #[tokio::test]
    async fn update_sends_patch_and_parses_body() {
        let t = transport(vec![Ok(HttpResponse::new(200, TODO_JSON))]);
        let todo = t.update(5, &UpdateTodo::completed(true)).await.unwrap();
        assert!(todo.completed);

        let sent = t.executor.sent.lock().unwrap();
        assert_eq!(sent[0].method, HttpMethod::Patch);
        assert_eq!(sent[0].path, "http://svc/todos/5");
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"completed":true}"#));
    }

    #[tokio::test]
    async fn executor_failures_pass_through() {
        let t = transport(vec![Err(ApiError::Timeout)]);
        assert_eq!(t.list().await.unwrap_err(), ApiError::Timeout);
    }

    #[tokio::test]
    async fn service_errors_are_normalized() {
        let t = transport(vec![Ok(HttpResponse::new(404, r#"{"error":"Todo with ID 999 not found"}"#))]);
        let err = t.delete(999).await.unwrap_err();
        assert_eq!(err, ApiError::not_found("Todo with ID 999 not found"));
    }

    #[tokio::test]
    async fn search_encodes_term() {
        let t = transport(vec![Ok(HttpResponse::new(200, format!("[{TODO_JSON}]")))]);
        let found = t.search("walk dog").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(
            t.executor.sent.lock().unwrap()[0].path,
            "http://svc/todos/search?q=walk%20dog"
        );
    }

    #[tokio::test]
    async fn connection_refused_maps_to_transport_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let config = ClientConfig::default()
            .with_base_url(&format!("http://{addr}"))
            .unwrap();
        let t = RestTransport::from_config(&config).unwrap();
        let err = t.list().await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Transport);
        assert!(!err.to_string().is_empty());
    }
}
