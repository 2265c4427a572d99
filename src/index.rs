//! Asset index: the per-project table of everything under management
//!
//! Indexing walks candidate paths one at a time (the unit the scheduler
//! time-slices on) and records, per asset: its stable guid, its path and
//! kind, its place in the `Resources/` lookup table, and any class names a
//! script declares. Class extraction is deliberately heuristic: it splits
//! on ` class ` and validates the surrounding text against comment and
//! string state rather than parsing C#.

use crate::classify::{self, AssetKind};
use crate::identity::{AssetId, IdentityResolver};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

const CLASS_KEYWORD: &str = " class ";
const RESOURCES_SEGMENT: &str = "Resources/";
const CUSTOM_EDITOR_MARKER: &str = "CustomEditor";

/// Location and kind of one indexed asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub path: PathBuf,
    pub kind: AssetKind,
}

/// Declared class names and which assets declare them
///
/// Multiple assets may declare the same bare name; a reference to that name
/// is attributed to all of them. That ambiguity is accepted: telling
/// same-named classes apart would require real C# semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    declarations: HashMap<String, Vec<AssetId>>,
    /// inspected class name → editor class name, from `CustomEditor` markers
    editors: HashMap<String, String>,
}

impl SymbolTable {
    pub fn declare(&mut self, class_name: impl Into<String>, id: AssetId) {
        let entry = self.declarations.entry(class_name.into()).or_default();
        if !entry.contains(&id) {
            entry.push(id);
        }
    }

    pub fn register_editor(&mut self, inspected: impl Into<String>, editor: impl Into<String>) {
        self.editors.insert(inspected.into(), editor.into());
    }

    /// Assets declaring a class of this exact name
    pub fn declaring(&self, class_name: &str) -> &[AssetId] {
        self.declarations
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Editor class customizing the inspector of `inspected`, if any
    pub fn editor_for(&self, inspected: &str) -> Option<&str> {
        self.editors.get(inspected).map(String::as_str)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &String> {
        self.declarations.keys()
    }

    /// Class names declared by one specific asset
    pub fn declared_by(&self, id: &AssetId) -> Vec<&String> {
        self.declarations
            .iter()
            .filter(|(_, ids)| ids.contains(id))
            .map(|(name, _)| name)
            .collect()
    }

    pub fn remove_asset(&mut self, id: &AssetId) {
        for ids in self.declarations.values_mut() {
            ids.retain(|entry| entry != id);
        }
        self.declarations.retain(|_, ids| !ids.is_empty());
    }
}

/// Identifier table for all indexed assets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetIndex {
    records: HashMap<AssetId, AssetRecord>,
    /// Indexing order; extraction iterates this so cursors stay stable
    order: Vec<AssetId>,
    /// Normalized resources-relative path → asset, for `Resources.Load`
    resources: HashMap<String, AssetId>,
    symbols: SymbolTable,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one candidate path. Returns true when an asset was recorded.
    ///
    /// Paths outside the content root and extensionless paths (directories,
    /// control files) are ignored. A path whose identity does not resolve is
    /// skipped with a warning; indexing continues.
    pub fn index_path(
        &mut self,
        path: &Path,
        content_root: &Path,
        resolver: &dyn IdentityResolver,
    ) -> bool {
        if !path.starts_with(content_root) {
            return false;
        }
        if path.extension().map_or(true, |ext| ext.is_empty()) {
            return false;
        }

        let id = match resolver.resolve(path) {
            Some(id) => id,
            None => {
                warn!("no stable identity for {}, skipping", path.display());
                return false;
            }
        };

        let kind = classify::classify_path(path);

        if let Some(resource_key) = resource_key_for(path) {
            self.resources.entry(resource_key).or_insert_with(|| id.clone());
        }

        if kind.is_source_code() {
            self.extract_class_names(&id, path);
        }

        if !self.records.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.records.insert(
            id,
            AssetRecord {
                path: path.to_path_buf(),
                kind,
            },
        );

        true
    }

    pub fn get(&self, id: &AssetId) -> Option<&AssetRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Asset ids in indexing order
    pub fn ids(&self) -> &[AssetId] {
        &self.order
    }

    pub fn records(&self) -> impl Iterator<Item = (&AssetId, &AssetRecord)> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).map(|record| (id, record)))
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Resolve a `Resources.Load` argument against the resources table
    pub fn resolve_resource(&self, load_path: &str) -> Option<&AssetId> {
        self.resources.get(&load_path.replace('\\', "/"))
    }

    /// Find the id of an indexed asset by its path
    pub fn id_for_path(&self, path: &Path) -> Option<&AssetId> {
        self.records()
            .find(|(_, record)| record.path == path)
            .map(|(id, _)| id)
    }

    pub fn remove_asset(&mut self, id: &AssetId) {
        self.records.remove(id);
        self.order.retain(|entry| entry != id);
        self.resources.retain(|_, entry| entry != id);
        self.symbols.remove_asset(id);
    }

    /// Pull declared class names out of a script
    ///
    /// A ` class ` occurrence counts as a declaration only when the text
    /// before it is not a base-class position (after `:`), not inside an
    /// open block comment, not on a line comment, and not inside a string
    /// literal. Each surviving occurrence contributes the token after the
    /// keyword.
    fn extract_class_names(&mut self, id: &AssetId, path: &Path) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!("cannot read script {}: {}", path.display(), err);
                return;
            }
        };

        let fragments: Vec<&str> = text.split(CLASS_KEYWORD).collect();

        for window in 1..fragments.len() {
            let before = fragments[window - 1];

            if !is_declaration_context(before) {
                continue;
            }

            let Some(class_name) = class_name_token(fragments[window]) else {
                continue;
            };

            self.symbols.declare(class_name.clone(), id.clone());

            if before.contains(CUSTOM_EDITOR_MARKER) {
                if let Some(inspected) = inspected_class_name(before) {
                    self.symbols.register_editor(inspected, class_name);
                }
            }
        }
    }
}

/// Validate the text preceding a ` class ` occurrence
fn is_declaration_context(before: &str) -> bool {
    let trimmed = before.trim_end();

    // base-class list position, e.g. `Foo : class` in generic constraints
    if trimmed.is_empty() || trimmed.ends_with(':') {
        return false;
    }

    // open block comment
    if let Some(after_open) = before.rsplit("/*").next() {
        if before.contains("/*") && !after_open.contains("*/") {
            return false;
        }
    }

    let last_line = before.rsplit('\n').next().unwrap_or(before);

    // line comment
    if last_line.contains("//") {
        return false;
    }

    // unterminated string literal on the declaring line
    unescaped_quote_count(last_line) % 2 == 0
}

/// Count quote characters not preceded by a backslash
fn unescaped_quote_count(line: &str) -> usize {
    let bytes = line.as_bytes();
    let mut count = 0;
    for (pos, byte) in bytes.iter().enumerate() {
        if *byte == b'"' && (pos == 0 || bytes[pos - 1] != b'\\') {
            count += 1;
        }
    }
    count
}

/// First identifier token after the `class` keyword
fn class_name_token(after: &str) -> Option<String> {
    let token: String = after
        .trim_start()
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn custom_editor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"CustomEditor\s*\(\s*(?:typeof\s*\(\s*)?"?([A-Za-z_][A-Za-z0-9_]*)"#).unwrap()
    })
}

/// Class named inside a `CustomEditor(typeof(...))` attribute
fn inspected_class_name(before: &str) -> Option<String> {
    custom_editor_pattern()
        .captures(before)
        .map(|caps| caps[1].to_string())
}

/// Path remainder after the last `Resources/` segment, extension stripped
fn resource_key_for(path: &Path) -> Option<String> {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let start = normalized.rfind(RESOURCES_SEGMENT)? + RESOURCES_SEGMENT.len();
    let relative = &normalized[start..];

    let key = match relative.rfind('.') {
        Some(dot) => &relative[..dot],
        None => relative,
    };

    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}
