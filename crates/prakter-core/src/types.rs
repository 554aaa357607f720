use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ChangeType
// ---------------------------------------------------------------------------

/// Tag on a changelog change. User input is limited to the three known tags;
/// anything else found in a hand-edited file is kept as `Other` so it
/// survives a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeType {
    Feature,
    Fix,
    Chore,
    Other(String),
}

impl ChangeType {
    pub fn all() -> &'static [ChangeType] {
        &[ChangeType::Feature, ChangeType::Fix, ChangeType::Chore]
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChangeType::Feature => "feature",
            ChangeType::Fix => "fix",
            ChangeType::Chore => "chore",
            ChangeType::Other(s) => s,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ChangeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "feature" => ChangeType::Feature,
            "fix" => ChangeType::Fix,
            "chore" => ChangeType::Chore,
            _ => ChangeType::Other(s),
        }
    }
}

impl From<ChangeType> for String {
    fn from(t: ChangeType) -> Self {
        t.as_str().to_string()
    }
}

impl std::str::FromStr for ChangeType {
    type Err = crate::error::PrakterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feature" => Ok(ChangeType::Feature),
            "fix" => Ok(ChangeType::Fix),
            "chore" => Ok(ChangeType::Chore),
            _ => Err(crate::error::PrakterError::InvalidChangeType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FileKind
// ---------------------------------------------------------------------------

/// One of the three project files managed at the workspace root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Readme,
    Changelog,
    Todo,
}

impl FileKind {
    /// Scaffold order: README first, TODO last.
    pub fn all() -> &'static [FileKind] {
        &[FileKind::Readme, FileKind::Changelog, FileKind::Todo]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Readme => "readme",
            FileKind::Changelog => "changelog",
            FileKind::Todo => "todo",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            FileKind::Readme => crate::paths::README_MD,
            FileKind::Changelog => crate::paths::CHANGELOG_JSON,
            FileKind::Todo => crate::paths::TODO_JSON,
        }
    }

    pub fn is_json(self) -> bool {
        !matches!(self, FileKind::Readme)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FileKind {
    type Err = crate::error::PrakterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "readme" => Ok(FileKind::Readme),
            "changelog" => Ok(FileKind::Changelog),
            "todo" => Ok(FileKind::Todo),
            _ => Err(crate::error::PrakterError::InvalidFileKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// An ISO-8601 timestamp as stored in TODO.json.
///
/// The text is kept exactly as read so hand-edited or JS-written values
/// round-trip unchanged. Parsing is lenient and only used for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current UTC time with millisecond precision, e.g.
    /// `2024-03-01T10:20:30.123Z`.
    pub fn now() -> Self {
        Self(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accepts RFC 3339, a date-time without offset (read as UTC), or a bare
    /// date (midnight).
    pub fn parse(&self) -> Option<NaiveDateTime> {
        let text = self.0.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Format with a chrono pattern, or the raw text when it does not parse.
    pub fn format(&self, pattern: &str) -> String {
        match self.parse() {
            Some(dt) => dt.format(pattern).to_string(),
            None => self.0.clone(),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of an interactive command: either it ran to completion or the
/// user dismissed a prompt, in which case nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(v) => Some(v),
            Outcome::Cancelled => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(v) => Outcome::Done(f(v)),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }
}
