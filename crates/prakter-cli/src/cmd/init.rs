use super::Session;
use crate::output::{print_json, print_outcome};
use prakter_core::scaffold::{ScaffoldChoice, ScaffoldReport};
use std::path::Path;

pub fn run(
    root: &Path,
    generate: bool,
    choice: Option<ScaffoldChoice>,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    let generate = generate || session.config.use_generation;
    let outcome = session.ctx().create_files(generate, choice)?;

    print_outcome(outcome, json, |report| {
        if json {
            return print_json(&report);
        }
        print_report(root, &report);
        Ok(())
    })
}

fn print_report(root: &Path, report: &ScaffoldReport) {
    println!("Project files in: {}", root.display());
    for kind in &report.written {
        println!("  created: {}", kind.file_name());
    }
    for kind in &report.skipped {
        println!("  exists:  {}", kind.file_name());
    }
}
