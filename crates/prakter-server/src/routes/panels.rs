use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use prakter_core::panel;
use prakter_core::scaffold::ScaffoldState;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct TodoPanelQuery {
    pub category: Option<String>,
}

/// GET / — welcome panel until any project file exists, then the todo panel.
pub async fn index(State(app): State<AppState>) -> Result<Response, AppError> {
    let state = app
        .blocking(|store, _| Ok(ScaffoldState::detect(store)))
        .await?;
    Ok(match state {
        ScaffoldState::NoFiles => Html(panel::welcome_panel()).into_response(),
        _ => Redirect::to("/panel/todo").into_response(),
    })
}

/// GET /panel/todo?category=C
pub async fn todo_panel(
    State(app): State<AppState>,
    Query(query): Query<TodoPanelQuery>,
) -> Result<Html<String>, AppError> {
    let html = app
        .blocking(move |store, _| Ok(panel::todo_panel(store, query.category.as_deref())))
        .await?;
    Ok(Html(html))
}

/// GET /panel/changelog
pub async fn changelog_panel(State(app): State<AppState>) -> Result<Html<String>, AppError> {
    let html = app
        .blocking(|store, _| Ok(panel::changelog_panel(store)))
        .await?;
    Ok(Html(html))
}

/// GET /panel/readme
pub async fn readme_panel(State(app): State<AppState>) -> Result<Html<String>, AppError> {
    let html = app.blocking(|store, _| Ok(panel::readme_panel(store))).await?;
    Ok(Html(html))
}

/// GET /panel/task/{id}
pub async fn task_panel(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let item = app
        .run_command(move |ctx| ctx.view_task_details(&id))
        .await?;
    Ok(Html(panel::task_details_panel(&item)))
}
