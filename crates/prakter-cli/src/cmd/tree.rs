use crate::output::print_json;
use anyhow::Context;
use clap::ValueEnum;
use prakter_core::config::Config;
use prakter_core::store::Store;
use prakter_core::tree::{
    expand_all, render_tree, ChangelogTree, SubEntryPolicy, TodoTree, TreeProvider,
};
use std::path::Path;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TreeKind {
    Todo,
    Changelog,
}

pub fn run(root: &Path, kind: TreeKind, with_changes: bool, json: bool) -> anyhow::Result<()> {
    let store = Store::open(root)?;
    let provider: Box<dyn TreeProvider> = match kind {
        TreeKind::Todo => {
            let config = Config::load(root).context("failed to load .prakter/config.yaml")?;
            Box::new(TodoTree::new(&store, config.todo_categories))
        }
        TreeKind::Changelog => {
            let policy = if with_changes {
                SubEntryPolicy::Both
            } else {
                SubEntryPolicy::Precedence
            };
            Box::new(ChangelogTree::with_policy(&store, policy))
        }
    };

    if json {
        print_json(&expand_all(provider.as_ref()))
    } else {
        print!("{}", render_tree(provider.as_ref()));
        Ok(())
    }
}
