//! Source-code symbol scanner
//!
//! Scans a script line by line for two things: calls to the
//! `Resources.Load` primitive with a literal path argument, and bare
//! occurrences of class names other scripts declare. An occurrence only
//! counts when it sits in real code, so every line is first classified
//! byte-by-byte against three trackers: block-comment state (spans
//! lines), string-literal state (line-local, escape-aware), and
//! line-comment state. Unterminated constructs poison the rest of the
//! line, which errs on the side of missing a reference rather than
//! inventing one.

use crate::graph::{GraphKey, ReferenceGraph};
use crate::identity::AssetId;
use crate::index::AssetIndex;
use std::fs;
use std::path::Path;
use tracing::warn;

const LOAD_PRIMITIVE: &str = "Resources.Load";

/// What one byte of a source line is part of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Code,
    Comment,
    Str,
}

/// Classify every byte of a line, given the block-comment state the line
/// starts in. Returns the mask and the state the next line starts in.
pub fn line_code_mask(line: &str, entering_block_comment: bool) -> (Vec<CharClass>, bool) {
    let bytes = line.as_bytes();
    let mut mask = vec![CharClass::Code; bytes.len()];
    let mut in_block = entering_block_comment;
    let mut in_str = false;

    let mut pos = 0;
    while pos < bytes.len() {
        if in_block {
            mask[pos] = CharClass::Comment;
            if bytes[pos] == b'*' && pos + 1 < bytes.len() && bytes[pos + 1] == b'/' {
                mask[pos + 1] = CharClass::Comment;
                in_block = false;
                pos += 2;
            } else {
                pos += 1;
            }
        } else if in_str {
            mask[pos] = CharClass::Str;
            if bytes[pos] == b'"' && bytes[pos - 1] != b'\\' {
                in_str = false;
            }
            pos += 1;
        } else if bytes[pos] == b'/' && pos + 1 < bytes.len() && bytes[pos + 1] == b'/' {
            for slot in mask.iter_mut().skip(pos) {
                *slot = CharClass::Comment;
            }
            break;
        } else if bytes[pos] == b'/' && pos + 1 < bytes.len() && bytes[pos + 1] == b'*' {
            mask[pos] = CharClass::Comment;
            mask[pos + 1] = CharClass::Comment;
            in_block = true;
            pos += 2;
        } else if bytes[pos] == b'"' {
            mask[pos] = CharClass::Str;
            in_str = true;
            pos += 1;
        } else {
            pos += 1;
        }
    }

    (mask, in_block)
}

/// Scan one script for symbol and resource references
pub fn scan(graph: &mut ReferenceGraph, index: &AssetIndex, id: &AssetId, path: &Path) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("cannot read script {}: {}", path.display(), err);
            return;
        }
    };

    let symbols = index.symbols();
    let declared = symbols.declared_by(id);

    // a script declaring an inspected class is kept alive together with
    // its custom editor
    for name in &declared {
        if let Some(editor) = symbols.editor_for(name) {
            for editor_id in symbols.declaring(editor) {
                if editor_id != id {
                    graph.add_edge(GraphKey::Asset(id.clone()), GraphKey::Asset(editor_id.clone()));
                }
            }
        }
    }

    let mut in_block_comment = false;

    for line in text.lines() {
        // pure comment lines are common; skip the mask entirely
        if !in_block_comment && line.trim_start().starts_with("//") {
            continue;
        }

        let (mask, next_block_state) = line_code_mask(line, in_block_comment);
        in_block_comment = next_block_state;

        scan_resource_loads(graph, index, id, line, &mask);

        for name in symbols.class_names() {
            if declared.contains(&name) || !line.contains(name.as_str()) {
                continue;
            }

            if has_code_occurrence(line, &mask, name) {
                for declaring in symbols.declaring(name) {
                    if declaring != id {
                        graph.add_edge(
                            GraphKey::Asset(id.clone()),
                            GraphKey::Asset(declaring.clone()),
                        );
                    }
                }
            }
        }
    }
}

/// True when `name` appears in the line as a whole identifier in code
fn has_code_occurrence(line: &str, mask: &[CharClass], name: &str) -> bool {
    let bytes = line.as_bytes();

    for (start, matched) in line.match_indices(name) {
        let end = start + matched.len();

        if mask[start..end].iter().any(|class| *class != CharClass::Code) {
            continue;
        }

        let prev_ok = start == 0 || !is_identifier_byte(bytes[start - 1]);
        let next_ok = end == bytes.len() || !is_identifier_byte(bytes[end]);

        if prev_ok && next_ok {
            return true;
        }
    }

    false
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Resolve `Resources.Load("...")` literals against the resources table
fn scan_resource_loads(
    graph: &mut ReferenceGraph,
    index: &AssetIndex,
    id: &AssetId,
    line: &str,
    mask: &[CharClass],
) {
    for (start, matched) in line.match_indices(LOAD_PRIMITIVE) {
        let end = start + matched.len();

        if mask[start..end].iter().any(|class| *class != CharClass::Code) {
            continue;
        }

        let Some(literal) = literal_argument(&line[end..]) else {
            continue;
        };

        if let Some(resource_id) = index.resolve_resource(&literal) {
            graph.add_edge(GraphKey::Asset(id.clone()), GraphKey::Asset(resource_id.clone()));
        }
    }
}

/// String literal inside the call parentheses, same line only
///
/// Accepts an optional generic argument between the primitive and the
/// opening parenthesis. Multi-line or computed arguments are ambiguous and
/// yield nothing.
fn literal_argument(after_call: &str) -> Option<String> {
    let open = after_call.find('(')?;

    // only a generic type argument may sit between the name and the paren
    if !after_call[..open]
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '<' | '>' | '.' | '_' | ' '))
    {
        return None;
    }

    let close = after_call[open..].find(')')? + open;
    let argument = &after_call[open + 1..close];

    let first_quote = argument.find('"')?;
    let rest = &argument[first_quote + 1..];
    let second_quote = rest.find('"')?;

    Some(rest[..second_quote].to_string())
}
