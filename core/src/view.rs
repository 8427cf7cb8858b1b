//! Derived views over a list of todos.
//!
//! Everything here is a pure function of its inputs and is recomputed on each
//! read; nothing is cached next to the store's state.

use std::fmt;
use std::str::FromStr;

use crate::types::{Todo, TodoStatistics};

/// Completion-status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !todo.completed,
            StatusFilter::Completed => todo.completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        })
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" | "pending" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            other => Err(format!(
                "unknown filter '{other}' (expected all, active or completed)"
            )),
        }
    }
}

pub fn filter_by_status(todos: &[Todo], filter: StatusFilter) -> Vec<&Todo> {
    todos.iter().filter(|t| filter.matches(t)).collect()
}

/// Case-insensitive substring search over title and description. A blank
/// term matches everything.
pub fn search<'a>(todos: impl IntoIterator<Item = &'a Todo>, term: &str) -> Vec<&'a Todo> {
    let needle = term.trim().to_lowercase();
    todos
        .into_iter()
        .filter(|t| needle.is_empty() || t.matches_lowercase(&needle))
        .collect()
}

/// Status filter followed by search, preserving list order.
pub fn filter_and_search<'a>(todos: &'a [Todo], filter: StatusFilter, term: &str) -> Vec<&'a Todo> {
    search(filter_by_status(todos, filter), term)
}

impl TodoStatistics {
    pub fn from_todos(todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|t| t.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}
