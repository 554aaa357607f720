//! HTML panels for the web UI.
//!
//! Every page is self-contained: inline style, one inline script carrying a
//! fresh nonce, and a CSP that only admits that script. Interactive elements
//! carry a `data-command` attribute; the script turns clicks into
//! `PanelMessage`s posted to `/api/messages` and reloads on store events.

use crate::changelog::ChangelogItem;
use crate::commands::CommandContext;
use crate::error::{PrakterError, Result};
use crate::scaffold::{ScaffoldChoice, ScaffoldState};
use crate::store::Store;
use crate::todo::{self, TodoItem};
use crate::types::{FileKind, Outcome};
use pulldown_cmark::{html::push_html, Event, Options, Parser};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A message posted by a panel script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PanelMessage {
    #[serde(rename_all = "camelCase")]
    EditTask {
        task_id: String,
        #[serde(default)]
        title: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ViewTaskDetails { task_id: String },
    CreateFiles {
        #[serde(default)]
        choice: Option<ScaffoldChoice>,
    },
    CreateFilesWithGeneration {
        #[serde(default)]
        choice: Option<ScaffoldChoice>,
    },
    Refresh,
}

/// What the panel script should do after its message was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelReply {
    Done,
    Cancelled,
    Navigate { location: String },
}

impl<T> From<Outcome<T>> for PanelReply {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Done(_) => PanelReply::Done,
            Outcome::Cancelled => PanelReply::Cancelled,
        }
    }
}

impl PanelMessage {
    /// Run the host command behind this message.
    pub fn dispatch(self, ctx: &mut CommandContext<'_>) -> Result<PanelReply> {
        match self {
            PanelMessage::EditTask { task_id, title } => {
                Ok(ctx.rename_task(&task_id, title)?.into())
            }
            PanelMessage::ViewTaskDetails { task_id } => {
                let item = ctx.view_task_details(&task_id)?;
                Ok(PanelReply::Navigate {
                    location: format!("/panel/task/{}", item.id),
                })
            }
            PanelMessage::CreateFiles { choice } => {
                let generate = ctx.config.use_generation;
                Ok(ctx.create_files(generate, choice)?.into())
            }
            PanelMessage::CreateFilesWithGeneration { choice } => {
                Ok(ctx.create_files(true, choice)?.into())
            }
            PanelMessage::Refresh => {
                ctx.refresh_views();
                Ok(PanelReply::Done)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Page shell
// ---------------------------------------------------------------------------

pub fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body { padding: 20px; font-family: system-ui, sans-serif; }
.container { display: flex; flex-direction: column; gap: 10px; }
button { padding: 12px; border: none; border-radius: 2px; cursor: pointer; }
h2 { margin-bottom: 15px; font-weight: normal; }
.description { margin-bottom: 20px; font-size: 0.9em; opacity: 0.8; }
.task-table { width: 100%; border-collapse: collapse; margin-top: 10px; }
.task-table th, .task-table td { padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }
.task-title { cursor: pointer; }
.icon-button { background: none; padding: 2px 6px; }
.tag { font-size: 0.8em; padding: 1px 6px; border-radius: 8px; background: #eee; }
.error { color: #b00020; }
"#;

const SCRIPT: &str = r#"
async function post(message) {
  const res = await fetch('/api/messages', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(message),
  });
  const reply = await res.json();
  if (reply.status === 'navigate') { window.location = reply.location; }
  else if (reply.error) { alert(reply.error); }
  else { window.location.reload(); }
}
document.querySelectorAll('[data-command]').forEach((el) => {
  el.addEventListener('click', () => {
    const message = { command: el.dataset.command };
    if (el.dataset.taskId) { message.taskId = el.dataset.taskId; }
    if (el.dataset.choice) { message.choice = el.dataset.choice; }
    if (message.command === 'editTask') {
      const title = window.prompt('Enter new title', el.dataset.title || '');
      if (title === null) { return; }
      message.title = title;
    }
    post(message);
  });
});
new EventSource('/api/events').addEventListener('update', () => window.location.reload());
"#;

fn page(title: &str, body: &str) -> String {
    let nonce = nonce();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta http-equiv="Content-Security-Policy" content="default-src 'none'; style-src 'unsafe-inline'; connect-src 'self'; script-src 'nonce-{nonce}';">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
{body}
<script nonce="{nonce}">{SCRIPT}</script>
</body>
</html>"#,
        title = escape_html(title),
    )
}

/// Scaffold buttons. When some project files already exist the panel has no
/// prompt to fall back on, so every button carries its `ScaffoldChoice`.
fn create_buttons(
    state: &ScaffoldState,
    heading: &str,
    description: &str,
    basic: &str,
    generated: &str,
) -> String {
    let mut body = format!(
        r#"<div class="container">
<h2>{}</h2>
<p class="description">{}</p>
"#,
        escape_html(heading),
        escape_html(description),
    );
    let actions = [("createFiles", basic), ("createFilesWithGeneration", generated)];
    if state.needs_choice() {
        body.push_str(
            r#"<p class="description">Some files already exist. What would you like to do?</p>
"#,
        );
        for (command, label) in actions {
            for choice in [ScaffoldChoice::CreateMissing, ScaffoldChoice::ReplaceAll] {
                let _ = writeln!(
                    body,
                    r#"<button data-command="{command}" data-choice="{}">{} ({})</button>"#,
                    choice.as_str(),
                    escape_html(label),
                    choice.label(),
                );
            }
        }
    } else {
        for (command, label) in actions {
            let _ = writeln!(
                body,
                r#"<button data-command="{command}">{}</button>"#,
                escape_html(label),
            );
        }
    }
    body.push_str("</div>");
    body
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        &format!(r#"<p class="error">{}</p>"#, escape_html(message)),
    )
}

fn read_error(kind: FileKind, err: &PrakterError) -> String {
    tracing::warn!(file = kind.file_name(), error = %err, "panel could not read file");
    error_page(&format!("Error reading {}", kind.file_name()))
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

pub fn welcome_panel() -> String {
    page(
        "prakter",
        &create_buttons(
            &ScaffoldState::NoFiles,
            "Create Project Files",
            "Start by creating the basic project structure files (README.md, TODO.json, and CHANGELOG.json)",
            "Create Basic Files",
            "Create Files with Generation",
        ),
    )
}

/// Task table, optionally limited to one category.
pub fn todo_panel(store: &Store, category: Option<&str>) -> String {
    if !store.exists(FileKind::Todo) {
        return page(
            "TODO",
            &create_buttons(
                &ScaffoldState::detect(store),
                "Create TODO List",
                "Start by creating a TODO.json file to track your tasks",
                "Create Basic TODO File",
                "Create TODO with Generation",
            ),
        );
    }
    let todos = match store.load_todos() {
        Ok(t) => t,
        Err(e) => return read_error(FileKind::Todo, &e),
    };
    let tasks: Vec<&TodoItem> = match category {
        Some(c) => todo::in_category(&todos, c),
        None => todos.iter().collect(),
    };

    let mut body = String::from(r#"<div class="container">"#);
    if let Some(c) = category {
        let _ = write!(body, "<h2>{}</h2>", escape_html(c));
    }
    if tasks.is_empty() {
        body.push_str("<p>No tasks found in this category</p>");
    } else {
        body.push_str(
            r#"<table class="task-table"><thead><tr><th>Title</th><th>Status</th><th>Created</th><th>Actions</th></tr></thead><tbody>"#,
        );
        for task in tasks {
            let id = escape_html(&task.id);
            let title = escape_html(&task.title);
            let _ = write!(
                body,
                r#"<tr><td class="task-title" data-command="viewTaskDetails" data-task-id="{id}">{title}</td><td>{status}</td><td>{created}</td><td><button class="icon-button" data-command="editTask" data-task-id="{id}" data-title="{title}" title="Edit">✏️</button></td></tr>"#,
                status = if task.is_completed() { "✅" } else { "🔄" },
                created = escape_html(&task.created_at.format("%Y-%m-%d")),
            );
        }
        body.push_str("</tbody></table>");
    }
    body.push_str("</div>");
    page("TODO", &body)
}

pub fn changelog_panel(store: &Store) -> String {
    if !store.exists(FileKind::Changelog) {
        return page(
            "Changelog",
            &create_buttons(
                &ScaffoldState::detect(store),
                "Create Changelog",
                "Start by creating a CHANGELOG.json file to track your project changes",
                "Create Basic Changelog",
                "Create Changelog with Generation",
            ),
        );
    }
    let log = match store.load_changelog() {
        Ok(l) => l,
        Err(e) => return read_error(FileKind::Changelog, &e),
    };

    let mut body = String::from(r#"<div class="container"><h2>Changelog</h2>"#);
    if log.is_empty() {
        body.push_str("<p>No changelog entries yet</p>");
    }
    for entry in &log {
        push_version(&mut body, entry);
    }
    body.push_str("</div>");
    page("Changelog", &body)
}

fn push_version(body: &mut String, entry: &ChangelogItem) {
    let _ = write!(
        body,
        "<section><h3>{} <small>({})</small></h3>",
        escape_html(&entry.version),
        escape_html(&entry.date),
    );
    if !entry.changes.is_empty() {
        body.push_str("<ul>");
        for change in &entry.changes {
            let _ = write!(
                body,
                r#"<li><span class="tag">{}</span> {}</li>"#,
                escape_html(change.change_type.as_str()),
                escape_html(&change.description),
            );
        }
        body.push_str("</ul>");
    }
    for sub in entry.sub_entries() {
        push_version(body, sub);
    }
    body.push_str("</section>");
}

/// README.md rendered from Markdown. Raw HTML in the source is shown as text.
pub fn readme_panel(store: &Store) -> String {
    match store.load_readme() {
        Ok(Some(markdown)) => page("README", &render_markdown(&markdown)),
        Ok(None) => error_page("README.md not found"),
        Err(e) => read_error(FileKind::Readme, &e),
    }
}

pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html = String::new();
    push_html(&mut html, events);
    html
}

pub fn task_details_panel(item: &TodoItem) -> String {
    let mut body = String::from(r#"<div class="container">"#);
    let _ = write!(
        body,
        r#"<h2>{title}</h2>
<p><strong>Category:</strong> {category}</p>
<p><strong>Status:</strong> {status}</p>
<p><strong>Created:</strong> {created}</p>
<p><strong>Updated:</strong> {updated}</p>"#,
        title = escape_html(&item.title),
        category = escape_html(&item.category),
        status = if item.is_completed() { "✅ Completed" } else { "🔄 Open" },
        created = escape_html(&item.created_at.format("%Y-%m-%d %H:%M")),
        updated = escape_html(&item.updated_at.format("%Y-%m-%d %H:%M")),
    );
    if let Some(done) = &item.completed_at {
        let _ = write!(
            body,
            "<p><strong>Completed:</strong> {}</p>",
            escape_html(&done.format("%Y-%m-%d %H:%M"))
        );
    }
    let _ = write!(
        body,
        "<h3>Description</h3><p>{}</p>",
        escape_html(&item.description)
    );
    if let Some(solution) = &item.possible_solution {
        let _ = write!(
            body,
            "<h3>Possible Solution</h3><p>{}</p>",
            escape_html(solution)
        );
    }
    if !item.related_files.is_empty() {
        body.push_str("<h3>Related Files</h3><ul>");
        for file in &item.related_files {
            let _ = write!(body, "<li><code>{}</code></li>", escape_html(file));
        }
        body.push_str("</ul>");
    }
    if !item.subtasks().is_empty() {
        body.push_str("<h3>Subtasks</h3><ul>");
        for sub in item.subtasks() {
            let _ = write!(
                body,
                r#"<li class="task-title" data-command="viewTaskDetails" data-task-id="{}">{} {}</li>"#,
                escape_html(&sub.id),
                if sub.is_completed() { "✅" } else { "🔄" },
                escape_html(&sub.title),
            );
        }
        body.push_str("</ul>");
    }
    let _ = write!(
        body,
        r#"<button data-command="editTask" data-task-id="{}" data-title="{}">Rename</button></div>"#,
        escape_html(&item.id),
        escape_html(&item.title),
    );
    page(&item.title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::generate::StaticGenerator;
    use crate::prompt::NoPrompt;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        (dir, store)
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn nonce_is_fresh_and_on_script() {
        assert_ne!(nonce(), nonce());
        let html = welcome_panel();
        let start = html.find("nonce-").unwrap() + "nonce-".len();
        let value = &html[start..start + 32];
        assert!(html.contains(&format!(r#"<script nonce="{value}">"#)));
    }

    #[test]
    fn todo_panel_offers_creation_when_missing() {
        let (_d, store) = store();
        let html = todo_panel(&store, None);
        assert!(html.contains(r#"data-command="createFiles""#));
        assert!(html.contains(r#"data-command="createFilesWithGeneration""#));
    }

    #[test]
    fn create_buttons_carry_choice_when_other_files_exist() {
        let (_d, store) = store();
        store.save_readme("# Mine\n").unwrap();
        let html = changelog_panel(&store);
        assert!(html.contains(
            r#"<button data-command="createFiles" data-choice="create_missing">Create Basic Changelog (Create Missing Only)</button>"#
        ));
        assert!(html.contains(r#"data-command="createFilesWithGeneration" data-choice="replace_all""#));
        assert!(!html.contains(r#"<button data-command="createFiles">"#));
    }

    #[test]
    fn todo_panel_lists_and_escapes_tasks() {
        let (_d, store) = store();
        let mut done = TodoItem::new("2", "Ship", "", "Features");
        done.completed_at = Some(crate::types::Timestamp::now());
        store
            .save_todos(&[TodoItem::new("1", "<script>x</script>", "", "Bugs"), done])
            .unwrap();

        let all = todo_panel(&store, None);
        assert!(all.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!all.contains("<script>x"));
        assert!(all.contains("✅"));
        assert!(all.contains("🔄"));

        let bugs = todo_panel(&store, Some("Bugs"));
        assert!(bugs.contains("<h2>Bugs</h2>"));
        assert!(!bugs.contains("Ship"));
    }

    #[test]
    fn todo_panel_empty_category() {
        let (_d, store) = store();
        store.save_todos(&[]).unwrap();
        assert!(todo_panel(&store, Some("Ideas")).contains("No tasks found in this category"));
    }

    #[test]
    fn todo_panel_reports_invalid_file() {
        let (d, store) = store();
        std::fs::write(d.path().join("TODO.json"), "{").unwrap();
        assert!(todo_panel(&store, None).contains("Error reading TODO.json"));
    }

    #[test]
    fn changelog_panel_lists_versions() {
        let (_d, store) = store();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        store
            .save_changelog(&[ChangelogItem::new(
                "1.0.0",
                date,
                vec![crate::changelog::Change::new(
                    crate::types::ChangeType::Fix,
                    "a & b",
                )],
            )])
            .unwrap();
        let html = changelog_panel(&store);
        assert!(html.contains("1.0.0 <small>(2024-01-02)</small>"));
        assert!(html.contains(r#"<span class="tag">fix</span> a &amp; b"#));
    }

    #[test]
    fn readme_panel_renders_markdown() {
        let (_d, store) = store();
        assert!(readme_panel(&store).contains("README.md not found"));
        store
            .save_readme("# Title\n\n<script>alert(1)</script>\n")
            .unwrap();
        let html = readme_panel(&store);
        assert!(html.contains("<h1>Title</h1>"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn task_details_show_optional_fields() {
        let mut item = TodoItem::new("1", "Fix", "Broken", "Bugs");
        item.possible_solution = Some("Patch it".into());
        item.related_files = vec!["src/main.rs".into()];
        let html = task_details_panel(&item);
        assert!(html.contains("Possible Solution"));
        assert!(html.contains("<code>src/main.rs</code>"));
        assert!(!html.contains("Completed:"));
    }

    #[test]
    fn messages_parse_from_panel_json() {
        let msg: PanelMessage =
            serde_json::from_str(r#"{"command":"editTask","taskId":"7"}"#).unwrap();
        assert_eq!(
            msg,
            PanelMessage::EditTask {
                task_id: "7".into(),
                title: None
            }
        );
        let msg: PanelMessage = serde_json::from_str(r#"{"command":"refresh"}"#).unwrap();
        assert_eq!(msg, PanelMessage::Refresh);
        let msg: PanelMessage =
            serde_json::from_str(r#"{"command":"createFiles","choice":"create_missing"}"#).unwrap();
        assert_eq!(
            msg,
            PanelMessage::CreateFiles {
                choice: Some(ScaffoldChoice::CreateMissing)
            }
        );
    }

    #[test]
    fn dispatch_routes_to_commands() {
        let (_d, store) = store();
        store.save_todos(&[TodoItem::new("1", "Old", "", "Bugs")]).unwrap();
        let config = Config::default();
        let generator = StaticGenerator::today();
        let mut prompter = NoPrompt;
        let mut ctx = CommandContext::new(&store, &config, &generator, &mut prompter);

        let reply = PanelMessage::EditTask {
            task_id: "1".into(),
            title: None,
        }
        .dispatch(&mut ctx)
        .unwrap();
        assert_eq!(reply, PanelReply::Cancelled);

        let reply = PanelMessage::EditTask {
            task_id: "1".into(),
            title: Some("New".into()),
        }
        .dispatch(&mut ctx)
        .unwrap();
        assert_eq!(reply, PanelReply::Done);
        assert_eq!(store.load_todos().unwrap()[0].title, "New");

        let reply = PanelMessage::ViewTaskDetails {
            task_id: "1".into(),
        }
        .dispatch(&mut ctx)
        .unwrap();
        assert_eq!(
            reply,
            PanelReply::Navigate {
                location: "/panel/task/1".into()
            }
        );
    }
}
