use super::Session;
use crate::output::print_json;
use prakter_core::todo;
use prakter_core::types::FileKind;
use std::path::Path;

/// Re-read every backing file and report what the views would show.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    session.ctx().refresh_views();
    let store = &session.store;

    let todos = if store.exists(FileKind::Todo) {
        match store.load_todos() {
            Ok(items) => todo::summarize(&items),
            Err(e) => format!("error: {e}"),
        }
    } else {
        "missing".to_string()
    };
    let changelog = if store.exists(FileKind::Changelog) {
        match store.load_changelog() {
            Ok(log) => format!("{} versions", log.len()),
            Err(e) => format!("error: {e}"),
        }
    } else {
        "missing".to_string()
    };
    let readme = if store.exists(FileKind::Readme) {
        "present"
    } else {
        "missing"
    };

    if json {
        return print_json(&serde_json::json!({
            "todo": todos,
            "changelog": changelog,
            "readme": readme,
        }));
    }
    println!("{:<16}{todos}", FileKind::Todo.file_name());
    println!("{:<16}{changelog}", FileKind::Changelog.file_name());
    println!("{:<16}{readme}", FileKind::Readme.file_name());
    Ok(())
}
