use crate::error::{PrakterError, Result};
use crate::types::Timestamp;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub related_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_solution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_tasks: Option<Vec<TodoItem>>,
}

impl TodoItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            category: category.into(),
            created_at: now.clone(),
            updated_at: now,
            completed_at: None,
            related_files: Vec::new(),
            possible_solution: None,
            sub_tasks: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn subtasks(&self) -> &[TodoItem] {
        self.sub_tasks.as_deref().unwrap_or(&[])
    }
}

/// Fields supplied by the caller when adding an item; id and timestamps are
/// assigned by `add_todo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub category: String,
    pub related_files: Vec<String>,
    pub possible_solution: Option<String>,
}

// ---------------------------------------------------------------------------
// List operations (operate on the full in-memory collection)
// ---------------------------------------------------------------------------

/// Append a new item and return its id.
///
/// The id is the current time in epoch milliseconds, bumped until it is
/// unique across the whole collection, subtasks included.
pub fn add_todo(todos: &mut Vec<TodoItem>, new: NewTodo) -> String {
    let id = fresh_id(todos, Utc::now().timestamp_millis());
    let mut item = TodoItem::new(id.clone(), new.title, new.description, new.category);
    item.related_files = new.related_files;
    item.possible_solution = new.possible_solution;
    todos.push(item);
    id
}

pub fn find<'a>(todos: &'a [TodoItem], id: &str) -> Option<&'a TodoItem> {
    for item in todos {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find(item.subtasks(), id) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut<'a>(todos: &'a mut [TodoItem], id: &str) -> Option<&'a mut TodoItem> {
    for item in todos.iter_mut() {
        if item.id == id {
            return Some(item);
        }
        if let Some(subs) = item.sub_tasks.as_deref_mut() {
            if let Some(found) = find_mut(subs, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Remove the single item whose id matches. Embedded subtasks leave with
/// their parent; every other item keeps its relative order.
pub fn delete_todo(todos: &mut Vec<TodoItem>, id: &str) -> Result<TodoItem> {
    remove_recursive(todos, id).ok_or_else(|| PrakterError::TaskNotFound(id.to_string()))
}

pub fn rename_todo(todos: &mut [TodoItem], id: &str, title: impl Into<String>) -> Result<()> {
    let item = require_mut(todos, id)?;
    item.title = title.into();
    item.updated_at = Timestamp::now();
    Ok(())
}

pub fn complete_todo(todos: &mut [TodoItem], id: &str) -> Result<()> {
    let item = require_mut(todos, id)?;
    let now = Timestamp::now();
    item.completed_at = Some(now.clone());
    item.updated_at = now;
    Ok(())
}

/// Top-level items filed under `category` (exact match).
pub fn in_category<'a>(todos: &'a [TodoItem], category: &str) -> Vec<&'a TodoItem> {
    todos.iter().filter(|t| t.category == category).collect()
}

/// Human-readable summary: "2/5 completed"
pub fn summarize(todos: &[TodoItem]) -> String {
    let done = todos.iter().filter(|t| t.is_completed()).count();
    format!("{done}/{} completed", todos.len())
}

fn require_mut<'a>(todos: &'a mut [TodoItem], id: &str) -> Result<&'a mut TodoItem> {
    find_mut(todos, id).ok_or_else(|| PrakterError::TaskNotFound(id.to_string()))
}

fn remove_recursive(todos: &mut Vec<TodoItem>, id: &str) -> Option<TodoItem> {
    if let Some(pos) = todos.iter().position(|t| t.id == id) {
        return Some(todos.remove(pos));
    }
    todos
        .iter_mut()
        .filter_map(|t| t.sub_tasks.as_mut())
        .find_map(|subs| remove_recursive(subs, id))
}

fn collect_ids<'a>(todos: &'a [TodoItem], ids: &mut HashSet<&'a str>) {
    for item in todos {
        ids.insert(item.id.as_str());
        collect_ids(item.subtasks(), ids);
    }
}

fn fresh_id(todos: &[TodoItem], millis: i64) -> String {
    let mut ids = HashSet::new();
    collect_ids(todos, &mut ids);
    let mut candidate = millis;
    while ids.contains(candidate.to_string().as_str()) {
        candidate += 1;
    }
    candidate.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
