use axum::extract::State;
use axum::Json;
use prakter_core::panel::{PanelMessage, PanelReply};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/messages — a message posted by a panel script.
pub async fn post_message(
    State(app): State<AppState>,
    Json(message): Json<PanelMessage>,
) -> Result<Json<PanelReply>, AppError> {
    tracing::debug!(?message, "panel message");
    let reply = app.run_command(move |ctx| message.dispatch(ctx)).await?;
    Ok(Json(reply))
}

/// POST /api/refresh — ask every open view to re-render.
pub async fn refresh(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    app.run_command(|ctx| {
        ctx.refresh_views();
        Ok(())
    })
    .await?;
    Ok(Json(serde_json::json!({ "refreshed": true })))
}
