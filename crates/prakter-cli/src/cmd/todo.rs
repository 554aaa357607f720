use super::Session;
use crate::output::{print_json, print_outcome, print_table};
use clap::Subcommand;
use prakter_core::commands::TodoDraft;
use prakter_core::todo::{self, TodoItem};
use std::path::Path;

#[derive(Subcommand)]
pub enum TodoSubcommand {
    /// Add a task (prompts for anything not given)
    Add {
        #[command(flatten)]
        fields: TaskFields,
        /// Category; must be one of the configured categories
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a task to a given category
    CreateIn {
        category: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Rename a task
    Rename { id: String, title: Vec<String> },
    /// Mark a task as completed
    Complete { id: String },
    /// Show full details for a single task
    Show { id: String },
    /// List tasks
    List {
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(clap::Args)]
pub struct TaskFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Related file path (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    related_files: Vec<String>,
    #[arg(long)]
    solution: Option<String>,
}

impl TaskFields {
    fn into_draft(self, category: Option<String>) -> TodoDraft {
        TodoDraft {
            title: self.title,
            description: self.description,
            category,
            related_files: self.related_files,
            possible_solution: self.solution,
        }
    }
}

pub fn run(root: &Path, subcmd: TodoSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    match subcmd {
        TodoSubcommand::Add { fields, category } => {
            let outcome = session.ctx().add_todo(fields.into_draft(category))?;
            print_outcome(outcome, json, |item| added(&item, json))
        }
        TodoSubcommand::CreateIn { category, fields } => {
            let outcome = session
                .ctx()
                .create_task_in_category(&category, fields.into_draft(None))?;
            print_outcome(outcome, json, |item| added(&item, json))
        }
        TodoSubcommand::Delete { id, yes } => {
            let outcome = session.ctx().delete_task(&id, yes)?;
            print_outcome(outcome, json, |item| {
                if json {
                    print_json(&serde_json::json!({ "deleted": item.id, "title": item.title }))
                } else {
                    println!("Deleted task [{}]: {}", item.id, item.title);
                    Ok(())
                }
            })
        }
        TodoSubcommand::Rename { id, title } => {
            let title = (!title.is_empty()).then(|| title.join(" "));
            let outcome = session.ctx().rename_task(&id, title)?;
            print_outcome(outcome, json, |item| {
                if json {
                    print_json(&item)
                } else {
                    println!("Renamed task [{}]: {}", item.id, item.title);
                    Ok(())
                }
            })
        }
        TodoSubcommand::Complete { id } => {
            let item = session.ctx().complete_task(&id)?;
            if json {
                print_json(&item)
            } else {
                println!("Completed task [{}]: {}", item.id, item.title);
                Ok(())
            }
        }
        TodoSubcommand::Show { id } => {
            let item = session.ctx().view_task_details(&id)?;
            if json {
                print_json(&item)
            } else {
                show(&item);
                Ok(())
            }
        }
        TodoSubcommand::List { category } => {
            let items = session.ctx().view_task_list(category.as_deref())?;
            if json {
                print_json(&items)
            } else {
                list(&items);
                Ok(())
            }
        }
    }
}

fn added(item: &TodoItem, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(item)
    } else {
        println!("Added task [{}] to {}: {}", item.id, item.category, item.title);
        Ok(())
    }
}

fn status(item: &TodoItem) -> &'static str {
    if item.is_completed() {
        "✅"
    } else {
        "🔄"
    }
}

fn list(items: &[TodoItem]) {
    if items.is_empty() {
        println!("No tasks found.");
        return;
    }
    let rows = items
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                status(t).to_string(),
                t.category.clone(),
                t.title.clone(),
                t.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "CATEGORY", "TITLE", "CREATED"], rows);
    println!("\n{}", todo::summarize(items));
}

fn show(item: &TodoItem) {
    println!("[{}] {} {}", item.id, status(item), item.title);
    println!("Category:  {}", item.category);
    println!("Created:   {}", item.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated:   {}", item.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(done) = &item.completed_at {
        println!("Completed: {}", done.format("%Y-%m-%d %H:%M"));
    }
    if !item.description.is_empty() {
        println!("\n{}", item.description);
    }
    if let Some(solution) = &item.possible_solution {
        println!("\nPossible solution: {solution}");
    }
    if !item.related_files.is_empty() {
        println!("\nRelated files:");
        for f in &item.related_files {
            println!("  {f}");
        }
    }
    if !item.subtasks().is_empty() {
        println!("\nSubtasks:");
        for s in item.subtasks() {
            println!("  [{}] {} {}", s.id, status(s), s.title);
        }
    }
}
