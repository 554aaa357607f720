use axum::extract::State;
use axum::Json;
use prakter_core::scaffold::ScaffoldChoice;

use super::outcome_json;
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct InitBody {
    #[serde(default)]
    pub generate: bool,
    /// Required when any file already exists; otherwise the request is
    /// cancelled.
    pub choice: Option<ScaffoldChoice>,
}

/// POST /api/init — scaffold README.md, CHANGELOG.json and TODO.json.
pub async fn init_project(
    State(app): State<AppState>,
    Json(body): Json<InitBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let generate = body.generate || app.config.use_generation;
    let outcome = app
        .run_command(move |ctx| ctx.create_files(generate, body.choice))
        .await?;
    outcome_json(outcome)
}
