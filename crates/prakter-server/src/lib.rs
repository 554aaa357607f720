pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all panel and API routes.
/// Used by `serve()` and available for integration testing. Fails when the
/// workspace config cannot be parsed.
pub fn build_router(root: PathBuf) -> prakter_core::Result<Router> {
    Ok(router_with_state(state::AppState::new(root)?))
}

pub fn router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Panels
        .route("/", get(routes::panels::index))
        .route("/panel/todo", get(routes::panels::todo_panel))
        .route("/panel/changelog", get(routes::panels::changelog_panel))
        .route("/panel/readme", get(routes::panels::readme_panel))
        .route("/panel/task/{id}", get(routes::panels::task_panel))
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Tree views
        .route("/api/tree/{kind}", get(routes::tree::children))
        // Todos
        .route(
            "/api/todos",
            get(routes::todos::list_todos).post(routes::todos::create_todo),
        )
        .route(
            "/api/todos/{id}",
            get(routes::todos::get_todo).delete(routes::todos::delete_todo),
        )
        .route(
            "/api/todos/{id}/rename",
            post(routes::todos::rename_todo),
        )
        .route(
            "/api/todos/{id}/complete",
            post(routes::todos::complete_todo),
        )
        // Changelog
        .route(
            "/api/changelog",
            get(routes::changelog::list_changelog).post(routes::changelog::add_change),
        )
        // Scaffold, refresh and panel messages
        .route("/api/init", post(routes::init::init_project))
        .route("/api/refresh", post(routes::messages::refresh))
        .route("/api/messages", post(routes::messages::post_message))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the web UI server on `port` (0 = OS-assigned).
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the web UI server on a pre-bound listener.
///
/// The caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root)?;
    let url = format!("http://localhost:{actual_port}");

    tracing::info!("prakter UI server listening on {url}");

    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
