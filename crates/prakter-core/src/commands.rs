//! Host command handlers.
//!
//! Each mutating handler collects its input (from the caller or the
//! prompter), then loads the full collection, mutates it in memory and saves
//! it back in one write. A dismissed prompt returns `Outcome::Cancelled`
//! before anything is written.

use crate::changelog::{self, Change, ChangeMerge};
use crate::config::Config;
use crate::error::{PrakterError, Result};
use crate::generate::{analyze_project, ContentGenerator};
use crate::paths;
use crate::prompt::{non_empty, Prompter};
use crate::scaffold::{scaffold, ContentSource, ScaffoldChoice, ScaffoldReport, ScaffoldState};
use crate::store::Store;
use crate::todo::{self, NewTodo, TodoItem};
use crate::tree::NodeAction;
use crate::types::{ChangeType, Outcome};
use serde::Serialize;

/// Values known before the add-todo prompts run; missing ones are asked for.
#[derive(Debug, Clone, Default)]
pub struct TodoDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub related_files: Vec<String>,
    pub possible_solution: Option<String>,
}

/// Values known before the add-changelog prompts run.
#[derive(Debug, Clone, Default)]
pub struct ChangeDraft {
    pub version: Option<String>,
    pub change_type: Option<ChangeType>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecorded {
    pub version: String,
    pub merge: ChangeMerge,
    pub change: Change,
}

pub struct CommandContext<'a> {
    pub store: &'a Store,
    pub config: &'a Config,
    pub generator: &'a dyn ContentGenerator,
    pub prompter: &'a mut dyn Prompter,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        store: &'a Store,
        config: &'a Config,
        generator: &'a dyn ContentGenerator,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            store,
            config,
            generator,
            prompter,
        }
    }

    // -----------------------------------------------------------------------
    // create-files / create-files-with-generation
    // -----------------------------------------------------------------------

    /// Scaffold the three project files. When any already exists, `choice`
    /// is used if given, otherwise the user is asked.
    pub fn create_files(
        &mut self,
        generate: bool,
        choice: Option<ScaffoldChoice>,
    ) -> Result<Outcome<ScaffoldReport>> {
        paths::require_workspace(self.store.root())?;

        let state = ScaffoldState::detect(self.store);
        let choice = if state.needs_choice() {
            match choice {
                Some(c) => c,
                None => self.ask_scaffold_choice(),
            }
        } else {
            ScaffoldChoice::ReplaceAll
        };
        if choice == ScaffoldChoice::Cancel {
            return Ok(Outcome::Cancelled);
        }

        let source = if generate {
            ContentSource::Generated {
                generator: self.generator,
                context: analyze_project(self.store.root()),
            }
        } else {
            ContentSource::Defaults
        };
        let report = scaffold(self.store, choice, &source, today())?;
        Ok(Outcome::Done(report))
    }

    fn ask_scaffold_choice(&mut self) -> ScaffoldChoice {
        let labels: Vec<String> = ScaffoldChoice::all()
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        self.prompter
            .select("Some files already exist. What would you like to do?", &labels)
            .and_then(|i| ScaffoldChoice::all().get(i).copied())
            .unwrap_or(ScaffoldChoice::Cancel)
    }

    /// Activate a tree node's action.
    pub fn run_node_action(&mut self, action: NodeAction) -> Result<Outcome<ScaffoldReport>> {
        match action {
            NodeAction::CreateFiles => self.create_files(false, None),
        }
    }

    // -----------------------------------------------------------------------
    // add-todo-item / create-task-in-category
    // -----------------------------------------------------------------------

    pub fn add_todo(&mut self, draft: TodoDraft) -> Result<Outcome<TodoItem>> {
        paths::require_workspace(self.store.root())?;

        let Some(title) = self.ask_text(draft.title, "Enter task title") else {
            return Ok(Outcome::Cancelled);
        };
        let Some(description) = self.ask_text(draft.description, "Enter task description") else {
            return Ok(Outcome::Cancelled);
        };
        let category = match non_empty(draft.category) {
            Some(c) => {
                self.config.require_category(&c)?;
                c
            }
            None => {
                let categories = &self.config.todo_categories;
                match self
                    .prompter
                    .select("Select category", categories)
                    .and_then(|i| categories.get(i).cloned())
                {
                    Some(c) => c,
                    None => return Ok(Outcome::Cancelled),
                }
            }
        };

        let mut todos = self.store.load_todos()?;
        let id = todo::add_todo(
            &mut todos,
            NewTodo {
                title,
                description,
                category,
                related_files: draft.related_files,
                possible_solution: non_empty(draft.possible_solution),
            },
        );
        self.store.save_todos(&todos)?;
        tracing::info!(id = %id, "added task");

        let added = todo::find(&todos, &id)
            .cloned()
            .ok_or_else(|| PrakterError::TaskNotFound(id.clone()))?;
        Ok(Outcome::Done(added))
    }

    pub fn create_task_in_category(
        &mut self,
        category: &str,
        draft: TodoDraft,
    ) -> Result<Outcome<TodoItem>> {
        self.add_todo(TodoDraft {
            category: Some(category.to_string()),
            ..draft
        })
    }

    // -----------------------------------------------------------------------
    // delete-task / rename-task / complete-task
    // -----------------------------------------------------------------------

    /// Delete one task after confirmation. `confirmed` skips the question.
    pub fn delete_task(&mut self, id: &str, confirmed: bool) -> Result<Outcome<TodoItem>> {
        paths::require_workspace(self.store.root())?;

        let mut todos = self.store.load_todos()?;
        let title = todo::find(&todos, id)
            .map(|t| t.title.clone())
            .ok_or_else(|| PrakterError::TaskNotFound(id.to_string()))?;
        if !confirmed
            && !self
                .prompter
                .confirm(&format!("Are you sure you want to delete '{title}'?"))
        {
            return Ok(Outcome::Cancelled);
        }

        let removed = todo::delete_todo(&mut todos, id)?;
        self.store.save_todos(&todos)?;
        tracing::info!(id, "deleted task");
        Ok(Outcome::Done(removed))
    }

    pub fn rename_task(&mut self, id: &str, title: Option<String>) -> Result<Outcome<TodoItem>> {
        paths::require_workspace(self.store.root())?;

        let mut todos = self.store.load_todos()?;
        let current = todo::find(&todos, id)
            .map(|t| t.title.clone())
            .ok_or_else(|| PrakterError::TaskNotFound(id.to_string()))?;
        let Some(title) = self.ask_text(title, &format!("Enter new title (currently '{current}')"))
        else {
            return Ok(Outcome::Cancelled);
        };

        todo::rename_todo(&mut todos, id, title)?;
        self.store.save_todos(&todos)?;
        Ok(Outcome::Done(self.expect_task(&todos, id)?))
    }

    pub fn complete_task(&mut self, id: &str) -> Result<TodoItem> {
        paths::require_workspace(self.store.root())?;

        let mut todos = self.store.load_todos()?;
        todo::complete_todo(&mut todos, id)?;
        self.store.save_todos(&todos)?;
        self.expect_task(&todos, id)
    }

    // -----------------------------------------------------------------------
    // view-task-details / view-task-list
    // -----------------------------------------------------------------------

    pub fn view_task_details(&self, id: &str) -> Result<TodoItem> {
        paths::require_workspace(self.store.root())?;
        let todos = self.store.load_todos()?;
        self.expect_task(&todos, id)
    }

    /// Top-level tasks, optionally restricted to one category.
    pub fn view_task_list(&self, category: Option<&str>) -> Result<Vec<TodoItem>> {
        paths::require_workspace(self.store.root())?;
        let todos = self.store.load_todos()?;
        Ok(match category {
            Some(c) => todo::in_category(&todos, c).into_iter().cloned().collect(),
            None => todos,
        })
    }

    // -----------------------------------------------------------------------
    // add-changelog-item
    // -----------------------------------------------------------------------

    pub fn add_changelog_item(&mut self, draft: ChangeDraft) -> Result<Outcome<ChangeRecorded>> {
        paths::require_workspace(self.store.root())?;

        let Some(version) = self.ask_text(draft.version, "Enter version number") else {
            return Ok(Outcome::Cancelled);
        };
        let change_type = match draft.change_type {
            Some(t) => t,
            None => {
                let labels: Vec<String> =
                    ChangeType::all().iter().map(|t| t.to_string()).collect();
                match self
                    .prompter
                    .select("Select change type", &labels)
                    .and_then(|i| ChangeType::all().get(i).cloned())
                {
                    Some(t) => t,
                    None => return Ok(Outcome::Cancelled),
                }
            }
        };
        let Some(description) = self.ask_text(draft.description, "Enter change description") else {
            return Ok(Outcome::Cancelled);
        };

        let change = Change::new(change_type, description);
        let mut log = self.store.load_changelog()?;
        let merge = changelog::add_change(&mut log, &version, change.clone(), today());
        self.store.save_changelog(&log)?;
        tracing::info!(version = %version, merge = ?merge, "recorded change");

        Ok(Outcome::Done(ChangeRecorded {
            version,
            merge,
            change,
        }))
    }

    // -----------------------------------------------------------------------
    // refresh-views
    // -----------------------------------------------------------------------

    pub fn refresh_views(&self) {
        self.store.refresh();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn ask_text(&mut self, given: Option<String>, prompt: &str) -> Option<String> {
        match non_empty(given) {
            Some(v) => Some(v),
            None => non_empty(self.prompter.input(prompt)),
        }
    }

    fn expect_task(&self, todos: &[TodoItem], id: &str) -> Result<TodoItem> {
        todo::find(todos, id)
            .cloned()
            .ok_or_else(|| PrakterError::TaskNotFound(id.to_string()))
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::StaticGenerator;
    use crate::prompt::NoPrompt;
    use crate::tree::{NodeKind, TodoTree, TreeProvider};
    use crate::types::FileKind;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Answers prompts from a queue; an exhausted queue dismisses.
    #[derive(Default)]
    struct Scripted {
        inputs: VecDeque<String>,
        selections: VecDeque<usize>,
        confirms: VecDeque<bool>,
        asked: Vec<String>,
    }

    impl Prompter for Scripted {
        fn input(&mut self, prompt: &str) -> Option<String> {
            self.asked.push(prompt.to_string());
            self.inputs.pop_front()
        }

        fn select(&mut self, prompt: &str, _options: &[String]) -> Option<usize> {
            self.asked.push(prompt.to_string());
            self.selections.pop_front()
        }

        fn confirm(&mut self, prompt: &str) -> bool {
            self.asked.push(prompt.to_string());
            self.confirms.pop_front().unwrap_or(false)
        }
    }

    struct Fixture {
        dir: TempDir,
        store: Store,
        config: Config,
        generator: StaticGenerator,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = Store::new(dir.path());
            Self {
                dir,
                store,
                config: Config {
                    todo_categories: vec!["Bugs".into(), "Ideas".into()],
                    ..Config::default()
                },
                generator: StaticGenerator::today(),
            }
        }

        fn ctx<'a>(&'a self, prompter: &'a mut dyn Prompter) -> CommandContext<'a> {
            CommandContext::new(&self.store, &self.config, &self.generator, prompter)
        }

        fn seed(&self, todos: &[TodoItem]) {
            self.store.save_todos(todos).unwrap();
        }
    }

    fn full_draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: Some(title.into()),
            description: Some("desc".into()),
            category: Some("Ideas".into()),
            ..Default::default()
        }
    }

    #[test]
    fn add_todo_prompts_for_missing_fields() {
        let fx = Fixture::new();
        let mut p = Scripted {
            inputs: VecDeque::from(["Fix login".to_string(), "It breaks".to_string()]),
            selections: VecDeque::from([0]),
            ..Default::default()
        };
        let item = fx
            .ctx(&mut p)
            .add_todo(TodoDraft::default())
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(item.title, "Fix login");
        assert_eq!(item.category, "Bugs");
        assert_eq!(
            p.asked,
            ["Enter task title", "Enter task description", "Select category"]
        );
        assert_eq!(fx.store.load_todos().unwrap().len(), 1);
    }

    #[test]
    fn add_todo_cancelled_title_writes_nothing() {
        let fx = Fixture::new();
        let outcome = fx.ctx(&mut NoPrompt).add_todo(TodoDraft::default()).unwrap();
        assert!(outcome.is_cancelled());
        assert!(!fx.dir.path().join("TODO.json").exists());
    }

    #[test]
    fn add_todo_cancelled_category_writes_nothing() {
        let fx = Fixture::new();
        fx.seed(&[]);
        let draft = TodoDraft {
            category: None,
            ..full_draft("x")
        };
        let outcome = fx.ctx(&mut NoPrompt).add_todo(draft).unwrap();
        assert!(outcome.is_cancelled());
        assert!(fx.store.load_todos().unwrap().is_empty());
    }

    #[test]
    fn add_todo_empty_title_counts_as_cancel() {
        let fx = Fixture::new();
        let mut p = Scripted {
            inputs: VecDeque::from(["   ".to_string()]),
            ..Default::default()
        };
        assert!(fx.ctx(&mut p).add_todo(TodoDraft::default()).unwrap().is_cancelled());
    }

    #[test]
    fn add_todo_rejects_unknown_category() {
        let fx = Fixture::new();
        let draft = TodoDraft {
            category: Some("Someday".into()),
            ..full_draft("x")
        };
        let err = fx.ctx(&mut NoPrompt).add_todo(draft).unwrap_err();
        assert!(matches!(err, PrakterError::InvalidCategory(_)));
    }

    #[test]
    fn add_todo_preserves_existing_items() {
        let fx = Fixture::new();
        let existing = TodoItem::new("1", "Old", "", "Bugs");
        fx.seed(std::slice::from_ref(&existing));
        fx.ctx(&mut NoPrompt).add_todo(full_draft("New")).unwrap();
        let todos = fx.store.load_todos().unwrap();
        assert_eq!(todos[0], existing);
        assert_eq!(todos[1].title, "New");
    }

    #[test]
    fn add_todo_on_invalid_file_aborts_without_write() {
        let fx = Fixture::new();
        let path = fx.dir.path().join("TODO.json");
        std::fs::write(&path, "nope").unwrap();
        let err = fx.ctx(&mut NoPrompt).add_todo(full_draft("x")).unwrap_err();
        assert!(matches!(err, PrakterError::Parse { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "nope");
    }

    #[test]
    fn create_task_in_category_uses_given_category() {
        let fx = Fixture::new();
        let draft = TodoDraft {
            category: None,
            ..full_draft("Sketch")
        };
        let item = fx
            .ctx(&mut NoPrompt)
            .create_task_in_category("Bugs", draft)
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(item.category, "Bugs");
    }

    #[test]
    fn delete_requires_confirmation() {
        let fx = Fixture::new();
        fx.seed(&[TodoItem::new("1", "A", "", "Ideas")]);
        let outcome = fx.ctx(&mut NoPrompt).delete_task("1", false).unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(fx.store.load_todos().unwrap().len(), 1);

        let mut yes = Scripted {
            confirms: VecDeque::from([true]),
            ..Default::default()
        };
        let removed = fx.ctx(&mut yes).delete_task("1", false).unwrap().done().unwrap();
        assert_eq!(removed.id, "1");
        assert!(fx.store.load_todos().unwrap().is_empty());
    }

    #[test]
    fn delete_preconfirmed_keeps_others_in_order() {
        let fx = Fixture::new();
        fx.seed(&[
            TodoItem::new("1", "A", "", "Ideas"),
            TodoItem::new("2", "B", "", "Ideas"),
            TodoItem::new("3", "C", "", "Ideas"),
        ]);
        fx.ctx(&mut NoPrompt).delete_task("2", true).unwrap();
        let ids: Vec<String> = fx
            .store
            .load_todos()
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn delete_unknown_task_fails() {
        let fx = Fixture::new();
        fx.seed(&[]);
        let err = fx.ctx(&mut NoPrompt).delete_task("9", true).unwrap_err();
        assert!(matches!(err, PrakterError::TaskNotFound(_)));
    }

    #[test]
    fn rename_and_complete() {
        let fx = Fixture::new();
        fx.seed(&[TodoItem::new("1", "Old", "", "Ideas")]);
        let renamed = fx
            .ctx(&mut NoPrompt)
            .rename_task("1", Some("New".into()))
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(renamed.title, "New");

        let done = fx.ctx(&mut NoPrompt).complete_task("1").unwrap();
        assert!(done.is_completed());
        assert_eq!(fx.ctx(&mut NoPrompt).view_task_details("1").unwrap(), done);
    }

    #[test]
    fn rename_without_title_prompts() {
        let fx = Fixture::new();
        fx.seed(&[TodoItem::new("1", "Old", "", "Ideas")]);
        let outcome = fx.ctx(&mut NoPrompt).rename_task("1", None).unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(fx.store.load_todos().unwrap()[0].title, "Old");
    }

    #[test]
    fn task_list_filters_by_category() {
        let fx = Fixture::new();
        fx.seed(&[
            TodoItem::new("1", "A", "", "Ideas"),
            TodoItem::new("2", "B", "", "Bugs"),
        ]);
        let mut p = NoPrompt;
        let ctx = fx.ctx(&mut p);
        assert_eq!(ctx.view_task_list(None).unwrap().len(), 2);
        let bugs = ctx.view_task_list(Some("Bugs")).unwrap();
        assert_eq!(bugs.len(), 1);
        assert_eq!(bugs[0].id, "2");
    }

    #[test]
    fn changelog_add_merges_into_existing_version() {
        let fx = Fixture::new();
        fx.ctx(&mut NoPrompt).create_files(false, None).unwrap();

        let recorded = fx
            .ctx(&mut NoPrompt)
            .add_changelog_item(ChangeDraft {
                version: Some("0.1.0".into()),
                change_type: Some(ChangeType::Fix),
                description: Some("bug".into()),
            })
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(recorded.merge, ChangeMerge::Merged);

        let log = fx.store.load_changelog().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].changes.len(), 2);
        assert_eq!(log[0].changes[0].change_type, ChangeType::Feature);
        assert_eq!(log[0].changes[1].change_type, ChangeType::Fix);
    }

    #[test]
    fn changelog_add_prompts_in_order() {
        let fx = Fixture::new();
        let mut p = Scripted {
            inputs: VecDeque::from(["1.0.0".to_string(), "Ship it".to_string()]),
            selections: VecDeque::from([2]),
            ..Default::default()
        };
        let recorded = fx
            .ctx(&mut p)
            .add_changelog_item(ChangeDraft::default())
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(recorded.merge, ChangeMerge::Created);
        assert_eq!(recorded.change.change_type, ChangeType::Chore);
        assert_eq!(
            p.asked,
            ["Enter version number", "Select change type", "Enter change description"]
        );
    }

    #[test]
    fn changelog_add_cancelled_type_writes_nothing() {
        let fx = Fixture::new();
        let draft = ChangeDraft {
            version: Some("1.0.0".into()),
            ..Default::default()
        };
        assert!(fx.ctx(&mut NoPrompt).add_changelog_item(draft).unwrap().is_cancelled());
        assert!(!fx.store.exists(FileKind::Changelog));
    }

    #[test]
    fn create_files_in_empty_workspace_needs_no_choice() {
        let fx = Fixture::new();
        let report = fx
            .ctx(&mut NoPrompt)
            .create_files(false, None)
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(report.written.len(), 3);
    }

    #[test]
    fn create_files_with_existing_files_asks() {
        let fx = Fixture::new();
        std::fs::write(fx.dir.path().join("README.md"), "mine").unwrap();

        assert!(fx.ctx(&mut NoPrompt).create_files(false, None).unwrap().is_cancelled());
        assert!(!fx.store.exists(FileKind::Todo));

        let mut p = Scripted {
            selections: VecDeque::from([1]),
            ..Default::default()
        };
        let report = fx.ctx(&mut p).create_files(false, None).unwrap().done().unwrap();
        assert_eq!(report.skipped, vec![FileKind::Readme]);
        assert_eq!(std::fs::read_to_string(fx.dir.path().join("README.md")).unwrap(), "mine");
    }

    #[test]
    fn placeholder_action_scaffolds_todo_file() {
        let fx = Fixture::new();
        let tree = TodoTree::new(&fx.store, fx.config.todo_categories.clone());
        let roots = tree.children(None);
        assert_eq!(roots[0].kind, NodeKind::Message);

        let action = roots[0].action.unwrap();
        fx.ctx(&mut NoPrompt).run_node_action(action).unwrap();
        assert_eq!(
            std::fs::read_to_string(fx.dir.path().join("TODO.json")).unwrap(),
            "[]"
        );
        assert_eq!(tree.children(None).len(), 2);
    }

    #[test]
    fn missing_workspace_is_reported() {
        let fx = Fixture::new();
        let gone = Store::new(fx.dir.path().join("missing"));
        let mut p = NoPrompt;
        let mut ctx = CommandContext::new(&gone, &fx.config, &fx.generator, &mut p);
        let err = ctx.add_todo(full_draft("x")).unwrap_err();
        assert!(matches!(err, PrakterError::MissingWorkspace(_)));
    }
}
