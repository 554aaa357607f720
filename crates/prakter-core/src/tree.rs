//! Lazy tree projections of TODO.json and CHANGELOG.json.
//!
//! A host asks for the children of a node (or of the root) and gets a fresh
//! projection of the file on disk. Providers remember only whether the store
//! changed since the host last looked.

use crate::changelog::{self, ChangelogItem};
use crate::error::PrakterError;
use crate::store::{Store, Subscription};
use crate::todo::{self, TodoItem};
use crate::types::{ChangeType, FileKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const PATH_SEP: char = '|';
const ESCAPE: char = '\\';

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Stable address of a node. Textual form: `category:<name>`,
/// `task:<id>|<id>...`, `version:<v>|<v>...`, `change:<v>|<v>...#<index>`,
/// `placeholder`, `error`. Inside a path, `|` and `\` are escaped with `\`.
///
/// Tasks and versions are addressed by their path from the top level, so
/// duplicate ids in a hand-edited file never alias one another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    Placeholder,
    Error,
    Category(String),
    Task(Vec<String>),
    Version(Vec<String>),
    Change { path: Vec<String>, index: usize },
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |p: &[String]| join_path(p);
        match self {
            NodeId::Placeholder => f.write_str("placeholder"),
            NodeId::Error => f.write_str("error"),
            NodeId::Category(c) => write!(f, "category:{c}"),
            NodeId::Task(path) => write!(f, "task:{}", join(path)),
            NodeId::Version(path) => write!(f, "version:{}", join(path)),
            NodeId::Change { path, index } => write!(f, "change:{}#{index}", join(path)),
        }
    }
}

impl std::str::FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None if s == "placeholder" => Ok(NodeId::Placeholder),
            None if s == "error" => Ok(NodeId::Error),
            Some(("category", c)) => Ok(NodeId::Category(c.to_string())),
            Some(("task", p)) => Ok(NodeId::Task(split_path(p))),
            Some(("version", p)) => Ok(NodeId::Version(split_path(p))),
            Some(("change", rest)) => {
                let (p, idx) = rest
                    .rsplit_once('#')
                    .ok_or_else(|| format!("invalid change node id: {s}"))?;
                let index = idx
                    .parse()
                    .map_err(|_| format!("invalid change index in node id: {s}"))?;
                Ok(NodeId::Change {
                    path: split_path(p),
                    index,
                })
            }
            _ => Err(format!("invalid node id: {s}")),
        }
    }
}

fn join_path(path: &[String]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push(PATH_SEP);
        }
        for c in segment.chars() {
            if c == PATH_SEP || c == ESCAPE {
                out.push(ESCAPE);
            }
            out.push(c);
        }
    }
    out
}

fn split_path(text: &str) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => current.extend(chars.next()),
            PATH_SEP => path.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    path.push(current);
    path
}

impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TreeNode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "change_type", rename_all = "snake_case")]
pub enum NodeKind {
    Message,
    Error,
    Category,
    Todo,
    Subtask,
    Version,
    Change(ChangeType),
}

impl NodeKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NodeKind::Category => "folder",
            NodeKind::Todo => "task",
            NodeKind::Subtask => "subtask",
            NodeKind::Version => "tag",
            NodeKind::Change(ChangeType::Feature) => "star",
            NodeKind::Change(ChangeType::Fix) => "bug",
            NodeKind::Change(_) | NodeKind::Message | NodeKind::Error => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collapsible {
    None,
    Expanded,
}

/// What activating a node should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    /// Run the scaffold flow for the missing project files.
    CreateFiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub collapsible: Collapsible,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NodeAction>,
}

impl TreeNode {
    fn leaf(id: NodeId, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            label: label.into(),
            kind,
            description: None,
            tooltip: None,
            collapsible: Collapsible::None,
            action: None,
        }
    }

    fn placeholder(kind: FileKind) -> Self {
        let mut node = Self::leaf(
            NodeId::Placeholder,
            format!("{} not found. Create one?", kind.file_name()),
            NodeKind::Message,
        );
        node.action = Some(NodeAction::CreateFiles);
        node
    }

    fn error(kind: FileKind) -> Self {
        Self::leaf(
            NodeId::Error,
            format!("Error reading {}", kind.file_name()),
            NodeKind::Error,
        )
    }

    pub fn is_expandable(&self) -> bool {
        self.collapsible == Collapsible::Expanded
    }
}

// ---------------------------------------------------------------------------
// TreeProvider
// ---------------------------------------------------------------------------

pub trait TreeProvider {
    /// Children of `parent`, or the top-level nodes when `parent` is `None`.
    fn children(&self, parent: Option<&NodeId>) -> Vec<TreeNode>;
}

/// Dirty flag flipped by store events.
#[derive(Debug)]
struct DirtySignal {
    dirty: Arc<AtomicBool>,
    _subscription: Subscription,
}

impl DirtySignal {
    fn attach(store: &Store) -> Self {
        let dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&dirty);
        let subscription = store.subscribe(move |_| flag.store(true, Ordering::SeqCst));
        Self {
            dirty,
            _subscription: subscription,
        }
    }

    fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// TodoTree
// ---------------------------------------------------------------------------

/// Category → task → subtask projection of TODO.json.
#[derive(Debug)]
pub struct TodoTree {
    store: Store,
    categories: Vec<String>,
    signal: DirtySignal,
}

impl TodoTree {
    pub fn new(store: &Store, categories: Vec<String>) -> Self {
        Self {
            store: store.clone(),
            categories,
            signal: DirtySignal::attach(store),
        }
    }

    /// True if the store changed since the last call. Starts out dirty.
    pub fn take_dirty(&self) -> bool {
        self.signal.take()
    }

    fn load(&self) -> Result<Vec<TodoItem>, Vec<TreeNode>> {
        if !self.store.exists(FileKind::Todo) {
            return Err(vec![TreeNode::placeholder(FileKind::Todo)]);
        }
        self.store.load_todos().map_err(|e| {
            log_projection_error(FileKind::Todo, &e);
            vec![TreeNode::error(FileKind::Todo)]
        })
    }
}

impl TreeProvider for TodoTree {
    fn children(&self, parent: Option<&NodeId>) -> Vec<TreeNode> {
        let todos = match self.load() {
            Ok(t) => t,
            Err(nodes) => return nodes,
        };
        match parent {
            None => self
                .categories
                .iter()
                .map(|c| TreeNode {
                    collapsible: Collapsible::Expanded,
                    ..TreeNode::leaf(NodeId::Category(c.clone()), c.clone(), NodeKind::Category)
                })
                .collect(),
            Some(NodeId::Category(category)) => todo::in_category(&todos, category)
                .into_iter()
                .map(|t| todo_node(t, &[], NodeKind::Todo))
                .collect(),
            Some(NodeId::Task(path)) => find_task_path(&todos, path)
                .map(|t| {
                    t.subtasks()
                        .iter()
                        .map(|s| todo_node(s, path, NodeKind::Subtask))
                        .collect()
                })
                .unwrap_or_default(),
            Some(_) => Vec::new(),
        }
    }
}

/// Walk `subTasks` by id path, taking the first match at each level.
fn find_task_path<'a>(todos: &'a [TodoItem], path: &[String]) -> Option<&'a TodoItem> {
    let (first, rest) = path.split_first()?;
    let item = todos.iter().find(|t| &t.id == first)?;
    if rest.is_empty() {
        Some(item)
    } else {
        find_task_path(item.subtasks(), rest)
    }
}

fn todo_node(item: &TodoItem, parent_path: &[String], kind: NodeKind) -> TreeNode {
    let mut path = parent_path.to_vec();
    path.push(item.id.clone());
    let mut description = format!("Created: {}", item.created_at.format("%Y-%m-%d"));
    if let Some(done) = &item.completed_at {
        description.push_str(&format!(" | Completed: {}", done.format("%Y-%m-%d")));
    }
    TreeNode {
        id: NodeId::Task(path),
        label: item.title.clone(),
        kind,
        description: Some(description),
        tooltip: Some(todo_tooltip(item)),
        collapsible: if item.subtasks().is_empty() {
            Collapsible::None
        } else {
            Collapsible::Expanded
        },
        action: None,
    }
}

pub fn todo_tooltip(item: &TodoItem) -> String {
    let mut tip = format!("{}\n\n{}", item.title, item.description);
    if let Some(solution) = &item.possible_solution {
        tip.push_str(&format!("\n\nPossible Solution: {solution}"));
    }
    if !item.related_files.is_empty() {
        tip.push_str(&format!("\n\nRelated Files:\n{}", item.related_files.join("\n")));
    }
    tip
}

// ---------------------------------------------------------------------------
// ChangelogTree
// ---------------------------------------------------------------------------

/// How an entry carrying both `subEntries` and `changes` is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubEntryPolicy {
    /// Sub-entries replace the entry's own changes in the tree.
    #[default]
    Precedence,
    /// Sub-entries first, then the entry's own changes.
    Both,
}

/// Version → change projection of CHANGELOG.json.
#[derive(Debug)]
pub struct ChangelogTree {
    store: Store,
    policy: SubEntryPolicy,
    signal: DirtySignal,
}

impl ChangelogTree {
    pub fn new(store: &Store) -> Self {
        Self::with_policy(store, SubEntryPolicy::default())
    }

    pub fn with_policy(store: &Store, policy: SubEntryPolicy) -> Self {
        Self {
            store: store.clone(),
            policy,
            signal: DirtySignal::attach(store),
        }
    }

    pub fn take_dirty(&self) -> bool {
        self.signal.take()
    }

    fn load(&self) -> Result<Vec<ChangelogItem>, Vec<TreeNode>> {
        if !self.store.exists(FileKind::Changelog) {
            return Err(vec![TreeNode::placeholder(FileKind::Changelog)]);
        }
        self.store.load_changelog().map_err(|e| {
            log_projection_error(FileKind::Changelog, &e);
            vec![TreeNode::error(FileKind::Changelog)]
        })
    }
}

impl TreeProvider for ChangelogTree {
    fn children(&self, parent: Option<&NodeId>) -> Vec<TreeNode> {
        let log = match self.load() {
            Ok(l) => l,
            Err(nodes) => return nodes,
        };
        match parent {
            None => log.iter().map(|e| version_node(e, &[])).collect(),
            Some(NodeId::Version(path)) => {
                let Some(entry) = changelog::find_path(&log, path) else {
                    return Vec::new();
                };
                let subs = entry
                    .sub_entries
                    .as_ref()
                    .map(|subs| subs.iter().map(|e| version_node(e, path)).collect::<Vec<_>>());
                match (self.policy, subs) {
                    (SubEntryPolicy::Precedence, Some(subs)) => subs,
                    (SubEntryPolicy::Both, Some(mut subs)) => {
                        subs.extend(change_nodes(entry, path));
                        subs
                    }
                    (_, None) => change_nodes(entry, path),
                }
            }
            Some(_) => Vec::new(),
        }
    }
}

fn version_node(entry: &ChangelogItem, parent_path: &[String]) -> TreeNode {
    let mut path = parent_path.to_vec();
    path.push(entry.version.clone());
    let label = format!("{} ({})", entry.version, entry.date);
    TreeNode {
        id: NodeId::Version(path),
        tooltip: Some(label.clone()),
        label,
        kind: NodeKind::Version,
        description: None,
        collapsible: if entry.sub_entries.is_some() || !entry.changes.is_empty() {
            Collapsible::Expanded
        } else {
            Collapsible::None
        },
        action: None,
    }
}

fn change_nodes(entry: &ChangelogItem, path: &[String]) -> Vec<TreeNode> {
    entry
        .changes
        .iter()
        .enumerate()
        .map(|(index, c)| TreeNode {
            tooltip: Some(c.description.clone()),
            ..TreeNode::leaf(
                NodeId::Change {
                    path: path.to_vec(),
                    index,
                },
                c.description.clone(),
                NodeKind::Change(c.change_type.clone()),
            )
        })
        .collect()
}

fn log_projection_error(kind: FileKind, err: &PrakterError) {
    tracing::warn!(file = kind.file_name(), error = %err, "tree projection failed");
}

// ---------------------------------------------------------------------------
// Whole-tree helpers
// ---------------------------------------------------------------------------

/// A node with its children expanded, for hosts that want the whole tree.
#[derive(Debug, Clone, Serialize)]
pub struct ExpandedNode {
    #[serde(flatten)]
    pub node: TreeNode,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExpandedNode>,
}

pub fn expand_all(provider: &dyn TreeProvider) -> Vec<ExpandedNode> {
    expand(provider, None)
}

fn expand(provider: &dyn TreeProvider, parent: Option<&NodeId>) -> Vec<ExpandedNode> {
    provider
        .children(parent)
        .into_iter()
        .map(|node| {
            let children = if node.is_expandable() {
                expand(provider, Some(&node.id))
            } else {
                Vec::new()
            };
            ExpandedNode {
                icon: node.kind.icon(),
                node,
                children,
            }
        })
        .collect()
}

/// Indented text rendering, two spaces per level.
pub fn render_tree(provider: &dyn TreeProvider) -> String {
    let mut out = String::new();
    for node in expand_all(provider) {
        render_into(&node, 0, &mut out);
    }
    out
}

fn render_into(node: &ExpandedNode, depth: usize, out: &mut String) {
    let marker = match node.node.kind {
        NodeKind::Category | NodeKind::Version => "▾",
        NodeKind::Error => "!",
        NodeKind::Message => "?",
        _ => "•",
    };
    out.push_str(&"  ".repeat(depth));
    out.push_str(marker);
    out.push(' ');
    out.push_str(&node.node.label);
    if let NodeKind::Change(t) = &node.node.kind {
        out.push_str(&format!(" [{t}]"));
    }
    if let Some(desc) = &node.node.description {
        out.push_str(&format!("  ({desc})"));
    }
    out.push('\n');
    for child in &node.children {
        render_into(child, depth + 1, out);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
