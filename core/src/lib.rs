//! Client-side data layer for the todo service.
//!
//! # Overview
//! Two cooperating pieces:
//! - the transport side (`TodoClient` + `RestTransport`) turns intents into
//!   REST calls and normalizes every failure into `ApiError`;
//! - `TodoStore` owns the session's todo list, applies each operation's
//!   outcome atomically and exposes a snapshot plus a change feed to the
//!   view layer.
//!
//! # Design
//! - `TodoClient` is stateless and sans-IO: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `HttpExecutor` and `TodoTransport` are the async seams; the store only
//!   sees `TodoTransport`, so tests swap in fakes without touching HTTP.
//! - Filtering, search and statistics are pure functions in `view`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod transport;
pub mod types;
pub mod validation;
pub mod view;

pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::{StoreSnapshot, TodoStore};
pub use transport::{HttpExecutor, ReqwestExecutor, RestTransport, TodoTransport};
pub use types::{CreateTodo, Todo, TodoStatistics, UpdateTodo};
pub use validation::ValidationError;
pub use view::StatusFilter;
