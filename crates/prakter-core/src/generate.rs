//! Content generation for the scaffold flow.
//!
//! Generators are handed to the command layer explicitly; there is no
//! process-wide instance. Whatever a generator returns is validated here and
//! replaced by the static default when unusable.

use crate::config::GeneratorConfig;
use crate::error::{PrakterError, Result};
use crate::scaffold::default_content;
use crate::types::FileKind;
use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

pub trait ContentGenerator: Send + Sync {
    /// Produce the initial content for `kind`: Markdown for the README,
    /// JSON text for the other two files.
    fn generate(&self, kind: FileKind, context: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// StaticGenerator
// ---------------------------------------------------------------------------

/// Always returns the built-in default content.
#[derive(Debug, Clone, Copy)]
pub struct StaticGenerator {
    pub today: NaiveDate,
}

impl StaticGenerator {
    pub fn today() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
        }
    }
}

impl ContentGenerator for StaticGenerator {
    fn generate(&self, kind: FileKind, _context: &str) -> Result<String> {
        default_content(kind, self.today)
    }
}

// ---------------------------------------------------------------------------
// CommandGenerator
// ---------------------------------------------------------------------------

/// Pipes a prompt into an external program and takes its stdout as the
/// generated content.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(cfg: &GeneratorConfig) -> Option<Self> {
        cfg.command
            .as_ref()
            .map(|program| Self::new(program.clone(), cfg.args.clone()))
    }
}

impl ContentGenerator for CommandGenerator {
    fn generate(&self, kind: FileKind, context: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PrakterError::Generation(format!("failed to spawn {}: {e}", self.program)))?;

        // Feed stdin from its own thread while `wait_with_output` drains
        // stdout and stderr, so a child that streams as it reads cannot
        // block on a full pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt_for(kind, context);
            std::thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });
        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // The child may exit without reading the whole prompt.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => {
                    return Err(PrakterError::Generation(format!(
                        "failed to write prompt to {}: {e}",
                        self.program
                    )))
                }
                Err(_) => {
                    return Err(PrakterError::Generation(format!(
                        "prompt writer for {} panicked",
                        self.program
                    )))
                }
            }
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrakterError::Generation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(PrakterError::Generation(format!(
                "{} produced no output",
                self.program
            )));
        }
        Ok(text)
    }
}

/// Instruction text sent to an external generator.
pub fn prompt_for(kind: FileKind, context: &str) -> String {
    let ask = match kind {
        FileKind::Readme => {
            "Write a comprehensive README.md in Markdown for this project.".to_string()
        }
        FileKind::Changelog => "Write CHANGELOG.json for this project: a JSON array of \
             {\"version\", \"date\" (YYYY-MM-DD), \"changes\": [{\"type\": \
             \"feature\"|\"fix\"|\"chore\", \"description\"}]}. Output JSON only."
            .to_string(),
        FileKind::Todo => "Write TODO.json for this project: a JSON array of tasks with \
             \"id\", \"title\", \"description\", \"category\", \"createdAt\", \
             \"updatedAt\", \"relatedFiles\". Output JSON only."
            .to_string(),
    };
    format!("{ask}\n\nProject context:\n{context}\n")
}

/// Run `generator` and validate the result; any failure falls back to the
/// default content. JSON output is re-indented with two spaces.
pub fn generate_or_default(
    generator: &dyn ContentGenerator,
    kind: FileKind,
    context: &str,
    today: NaiveDate,
) -> Result<String> {
    let generated = match generator.generate(kind, context) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "generation failed, using default content");
            return default_content(kind, today);
        }
    };
    if !kind.is_json() {
        return Ok(generated);
    }
    match serde_json::from_str::<serde_json::Value>(&generated) {
        Ok(value) => crate::io::to_pretty_json(&value),
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "generated content is not valid JSON, using default content");
            default_content(kind, today)
        }
    }
}

// ---------------------------------------------------------------------------
// Project analysis
// ---------------------------------------------------------------------------

/// Summarize the workspace for a generator prompt: manifest metadata, the
/// top-level file list, and every file under `src/`.
pub fn analyze_project(root: &Path) -> String {
    let mut out = String::new();

    if let Some(summary) = package_json_summary(root) {
        out.push_str(&summary);
    }
    if let Some(summary) = cargo_toml_summary(root) {
        out.push_str(&summary);
    }

    match list_dir(root) {
        Ok(files) => out.push_str(&format!("\nProject Files:\n{}\n", files.join("\n"))),
        Err(e) => {
            tracing::warn!(root = %root.display(), error = %e, "could not list project files");
            return out;
        }
    }

    let src = root.join("src");
    if src.is_dir() {
        let mut files = Vec::new();
        walk(&src, root, &mut files);
        out.push_str(&format!("\nSource Files:\n{}\n", files.join("\n")));
    }
    out
}

fn package_json_summary(root: &Path) -> Option<String> {
    let text = std::fs::read_to_string(root.join("package.json")).ok()?;
    let pkg: serde_json::Value = serde_json::from_str(&text).ok()?;
    let field = |k: &str| pkg.get(k).and_then(|v| v.as_str()).unwrap_or("").to_string();
    let deps: Vec<&str> = pkg
        .get("dependencies")
        .and_then(|d| d.as_object())
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default();
    Some(format!(
        "Project Name: {}\nDescription: {}\nDependencies: {}\n",
        field("name"),
        field("description"),
        deps.join(", ")
    ))
}

fn cargo_toml_summary(root: &Path) -> Option<String> {
    let text = std::fs::read_to_string(root.join("Cargo.toml")).ok()?;
    let manifest: toml::Table = text.parse().ok()?;
    let package = manifest.get("package").and_then(|p| p.as_table());
    let field = |k: &str| {
        package
            .and_then(|p| p.get(k))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };
    let deps: Vec<&str> = manifest
        .get("dependencies")
        .and_then(|d| d.as_table())
        .map(|t| t.keys().map(String::as_str).collect())
        .unwrap_or_default();
    Some(format!(
        "Crate Name: {}\nDescription: {}\nDependencies: {}\n",
        field("name"),
        field("description"),
        deps.join(", ")
    ))
}

fn list_dir(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<_> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            walk(&path, root, out);
        } else {
            let shown = path.strip_prefix(root).unwrap_or(&path);
            out.push(shown.display().to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
