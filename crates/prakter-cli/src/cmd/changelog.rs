use super::Session;
use crate::output::{print_json, print_outcome};
use clap::Subcommand;
use prakter_core::changelog::{ChangeMerge, ChangelogItem};
use prakter_core::commands::ChangeDraft;
use prakter_core::types::ChangeType;
use std::path::Path;

#[derive(Subcommand)]
pub enum ChangelogSubcommand {
    /// Record a change under a version (prompts for anything not given)
    #[command(disable_version_flag = true)]
    Add {
        #[arg(long)]
        version: Option<String>,
        /// feature, fix or chore
        #[arg(long = "type", value_name = "TYPE")]
        change_type: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all versions and their changes
    List,
}

pub fn run(root: &Path, subcmd: ChangelogSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    match subcmd {
        ChangelogSubcommand::Add {
            version,
            change_type,
            description,
        } => {
            let change_type = change_type
                .map(|t| t.parse::<ChangeType>())
                .transpose()?;
            let outcome = session.ctx().add_changelog_item(ChangeDraft {
                version,
                change_type,
                description,
            })?;
            print_outcome(outcome, json, |recorded| {
                if json {
                    return print_json(&recorded);
                }
                let verb = match recorded.merge {
                    ChangeMerge::Merged => "Added to",
                    ChangeMerge::Created => "Created",
                };
                println!(
                    "{verb} version {}: [{}] {}",
                    recorded.version, recorded.change.change_type, recorded.change.description
                );
                Ok(())
            })
        }
        ChangelogSubcommand::List => {
            let log = session.store.load_changelog()?;
            if json {
                return print_json(&log);
            }
            if log.is_empty() {
                println!("No changelog entries.");
            }
            for entry in &log {
                print_entry(entry, 0);
            }
            Ok(())
        }
    }
}

fn print_entry(entry: &ChangelogItem, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}{} ({})", entry.version, entry.date);
    for change in &entry.changes {
        println!("{indent}  - [{}] {}", change.change_type, change.description);
    }
    for sub in entry.sub_entries() {
        print_entry(sub, depth + 1);
    }
}
