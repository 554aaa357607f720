use axum::extract::{Path, Query, State};
use axum::Json;
use prakter_core::tree::{ChangelogTree, NodeId, TodoTree, TreeNode, TreeProvider};
use prakter_core::types::FileKind;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct TreeQuery {
    /// Node id as rendered in a previous response; absent for the root.
    pub parent: Option<String>,
}

/// GET /api/tree/{todo|changelog}?parent=ID — children of one node.
pub async fn children(
    State(app): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<Vec<TreeNode>>, AppError> {
    let kind: FileKind = kind.parse()?;
    let parent = query
        .parent
        .map(|p| p.parse::<NodeId>())
        .transpose()
        .map_err(AppError::bad_request)?;

    let nodes = app
        .blocking(move |store, config| {
            let provider: Box<dyn TreeProvider> = match kind {
                FileKind::Todo => Box::new(TodoTree::new(store, config.todo_categories.clone())),
                FileKind::Changelog => Box::new(ChangelogTree::new(store)),
                FileKind::Readme => {
                    return Err(prakter_core::PrakterError::InvalidFileKind(
                        kind.as_str().to_string(),
                    ))
                }
            };
            Ok(provider.children(parent.as_ref()))
        })
        .await?;
    Ok(Json(nodes))
}
