//! Plain-text formatting for todos.

use std::fmt::Write;

use todo_core::{Todo, TodoStatistics};

pub fn line(todo: &Todo) -> String {
    let mark = if todo.completed { 'x' } else { ' ' };
    format!("[{mark}] #{} {}", todo.id, todo.title)
}

pub fn list(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return "No todos found.\n".to_string();
    }
    todos.iter().fold(String::new(), |mut out, todo| {
        let _ = writeln!(out, "{}", line(todo));
        out
    })
}

pub fn detail(todo: &Todo) -> String {
    let mut out = format!("{}\n", line(todo));
    if let Some(description) = &todo.description {
        let _ = writeln!(out, "    {description}");
    }
    let _ = writeln!(out, "    created {}", todo.created_at.to_rfc3339());
    let _ = writeln!(out, "    updated {}", todo.updated_at.to_rfc3339());
    out
}

pub fn statistics(stats: &TodoStatistics) -> String {
    format!(
        "total: {}  completed: {}  pending: {}",
        stats.total, stats.completed, stats.pending
    )
}
