//! One-time creation of README.md, CHANGELOG.json and TODO.json.
//!
//! `NoFiles` goes straight to `AllFilesPresent`. Once any file exists the
//! caller must pick a `ScaffoldChoice`; `Cancel` leaves the workspace as it
//! was, the other two end with all three files present.

use crate::changelog::{Change, ChangelogItem};
use crate::error::Result;
use crate::generate::{generate_or_default, ContentGenerator};
use crate::store::Store;
use crate::types::{ChangeType, FileKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_README: &str = "# Project Name\n\nProject description goes here.\n";

/// Static content written when no generator is used.
pub fn default_content(kind: FileKind, today: NaiveDate) -> Result<String> {
    match kind {
        FileKind::Readme => Ok(DEFAULT_README.to_string()),
        FileKind::Changelog => {
            let initial = ChangelogItem::new(
                "0.1.0",
                today,
                vec![Change::new(ChangeType::Feature, "Initial release")],
            );
            crate::io::to_pretty_json(&[initial])
        }
        FileKind::Todo => Ok("[]".to_string()),
    }
}

// ---------------------------------------------------------------------------
// State and choice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "present", rename_all = "snake_case")]
pub enum ScaffoldState {
    NoFiles,
    SomeFilesPresent(Vec<FileKind>),
    AllFilesPresent,
}

impl ScaffoldState {
    pub fn detect(store: &Store) -> Self {
        let present: Vec<FileKind> = FileKind::all()
            .iter()
            .copied()
            .filter(|k| store.exists(*k))
            .collect();
        match present.len() {
            0 => ScaffoldState::NoFiles,
            n if n == FileKind::all().len() => ScaffoldState::AllFilesPresent,
            _ => ScaffoldState::SomeFilesPresent(present),
        }
    }

    /// The host must ask for a `ScaffoldChoice` whenever any file exists.
    pub fn needs_choice(&self) -> bool {
        !matches!(self, ScaffoldState::NoFiles)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaffoldChoice {
    ReplaceAll,
    CreateMissing,
    Cancel,
}

impl ScaffoldChoice {
    pub fn all() -> &'static [ScaffoldChoice] {
        &[
            ScaffoldChoice::ReplaceAll,
            ScaffoldChoice::CreateMissing,
            ScaffoldChoice::Cancel,
        ]
    }

    /// Wire name, as accepted by serde.
    pub fn as_str(self) -> &'static str {
        match self {
            ScaffoldChoice::ReplaceAll => "replace_all",
            ScaffoldChoice::CreateMissing => "create_missing",
            ScaffoldChoice::Cancel => "cancel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScaffoldChoice::ReplaceAll => "Replace All",
            ScaffoldChoice::CreateMissing => "Create Missing Only",
            ScaffoldChoice::Cancel => "Cancel",
        }
    }
}

// ---------------------------------------------------------------------------
// Scaffolding
// ---------------------------------------------------------------------------

/// Where file content comes from.
pub enum ContentSource<'a> {
    Defaults,
    Generated {
        generator: &'a dyn ContentGenerator,
        context: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScaffoldReport {
    pub written: Vec<FileKind>,
    pub skipped: Vec<FileKind>,
}

/// Apply `choice` to the workspace behind `store`.
pub fn scaffold(
    store: &Store,
    choice: ScaffoldChoice,
    source: &ContentSource<'_>,
    today: NaiveDate,
) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();
    if choice == ScaffoldChoice::Cancel {
        return Ok(report);
    }

    for &kind in FileKind::all() {
        if choice == ScaffoldChoice::CreateMissing && store.exists(kind) {
            report.skipped.push(kind);
            continue;
        }
        let content = match source {
            ContentSource::Defaults => default_content(kind, today)?,
            ContentSource::Generated { generator, context } => {
                generate_or_default(*generator, kind, context, today)?
            }
        };
        store.write(kind, content.as_bytes())?;
        report.written.push(kind);
    }

    tracing::info!(
        written = ?report.written,
        skipped = ?report.skipped,
        "scaffolded project files"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
