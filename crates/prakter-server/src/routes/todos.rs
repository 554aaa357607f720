use axum::extract::{Path, Query, State};
use axum::Json;
use prakter_core::commands::TodoDraft;
use prakter_core::todo::TodoItem;

use super::outcome_json;
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(serde::Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub related_files: Vec<String>,
    pub possible_solution: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct RenameBody {
    pub title: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// GET /api/todos?category=C — top-level tasks.
pub async fn list_todos(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TodoItem>>, AppError> {
    let items = app
        .run_command(move |ctx| ctx.view_task_list(query.category.as_deref()))
        .await?;
    Ok(Json(items))
}

/// GET /api/todos/{id}
pub async fn get_todo(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoItem>, AppError> {
    let item = app
        .run_command(move |ctx| ctx.view_task_details(&id))
        .await?;
    Ok(Json(item))
}

/// POST /api/todos — add a task.
pub async fn create_todo(
    State(app): State<AppState>,
    Json(body): Json<CreateTodoBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let draft = TodoDraft {
        title: body.title,
        description: body.description,
        category: body.category,
        related_files: body.related_files,
        possible_solution: body.possible_solution,
    };
    let outcome = app.run_command(move |ctx| ctx.add_todo(draft)).await?;
    outcome_json(outcome)
}

/// POST /api/todos/{id}/rename
pub async fn rename_todo(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RenameBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = app
        .run_command(move |ctx| ctx.rename_task(&id, body.title))
        .await?;
    outcome_json(outcome)
}

/// POST /api/todos/{id}/complete
pub async fn complete_todo(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoItem>, AppError> {
    let item = app.run_command(move |ctx| ctx.complete_task(&id)).await?;
    Ok(Json(item))
}

/// DELETE /api/todos/{id}?confirm=true — without `confirm` nothing is deleted.
pub async fn delete_todo(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = app
        .run_command(move |ctx| ctx.delete_task(&id, query.confirm))
        .await?;
    outcome_json(outcome.map(|item| serde_json::json!({ "deleted": item.id })))
}
