use axum::extract::State;
use axum::Json;
use prakter_core::changelog::ChangelogItem;
use prakter_core::commands::ChangeDraft;
use prakter_core::types::ChangeType;

use super::outcome_json;
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct AddChangeBody {
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub change_type: Option<String>,
    pub description: Option<String>,
}

/// GET /api/changelog
pub async fn list_changelog(
    State(app): State<AppState>,
) -> Result<Json<Vec<ChangelogItem>>, AppError> {
    let log = app.blocking(|store, _| store.load_changelog()).await?;
    Ok(Json(log))
}

/// POST /api/changelog — record a change, merging into an existing version.
pub async fn add_change(
    State(app): State<AppState>,
    Json(body): Json<AddChangeBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let change_type = body
        .change_type
        .map(|t| t.parse::<ChangeType>())
        .transpose()?;
    let draft = ChangeDraft {
        version: body.version,
        change_type,
        description: body.description,
    };
    let outcome = app
        .run_command(move |ctx| ctx.add_changelog_item(draft))
        .await?;
    outcome_json(outcome)
}
