use crate::types::ChangeType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub description: String,
}

impl Change {
    pub fn new(change_type: ChangeType, description: impl Into<String>) -> Self {
        Self {
            change_type,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogItem {
    pub version: String,
    pub date: String,
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_entries: Option<Vec<ChangelogItem>>,
}

impl ChangelogItem {
    pub fn new(version: impl Into<String>, date: NaiveDate, changes: Vec<Change>) -> Self {
        Self {
            version: version.into(),
            date: format_date(date),
            changes,
            sub_entries: None,
        }
    }

    pub fn sub_entries(&self) -> &[ChangelogItem] {
        self.sub_entries.as_deref().unwrap_or(&[])
    }
}

/// Whether `add_change` extended an existing version or started a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMerge {
    Merged,
    Created,
}

/// Record `change` under `version`.
///
/// Exact string match against top-level versions: on a hit the change is
/// appended to that entry, otherwise a new entry dated `today` is appended
/// to the end of the list. The list is never re-sorted.
pub fn add_change(
    changelog: &mut Vec<ChangelogItem>,
    version: &str,
    change: Change,
    today: NaiveDate,
) -> ChangeMerge {
    if let Some(entry) = changelog.iter_mut().find(|e| e.version == version) {
        entry.changes.push(change);
        return ChangeMerge::Merged;
    }
    changelog.push(ChangelogItem::new(version, today, vec![change]));
    ChangeMerge::Created
}

pub fn find<'a>(changelog: &'a [ChangelogItem], version: &str) -> Option<&'a ChangelogItem> {
    changelog.iter().find(|e| e.version == version)
}

/// Walk nested `subEntries` by version path, e.g. `["1.0.0", "1.0.1"]`.
pub fn find_path<'a>(changelog: &'a [ChangelogItem], path: &[String]) -> Option<&'a ChangelogItem> {
    let (first, rest) = path.split_first()?;
    let entry = find(changelog, first)?;
    if rest.is_empty() {
        Some(entry)
    } else {
        find_path(entry.sub_entries(), rest)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
