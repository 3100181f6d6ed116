//! Evaluation AST and the raw-tree postprocessor.
//!
//! The parser's raw tree is faithful to the source text; evaluation wants
//! something flatter.  [`postprocess`] collapses string literals into plain
//! text, merges adjacent text runs, groups call arguments, and pairs
//! at-expression keys with their values.
//!
//! A tree that carries parse errors postprocesses to an empty AST, which in
//! turn evaluates to empty output.

use crate::parse::{Node, NodeKind, ParseTree};

/// A normalized, evaluation-ready node.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A literal run (text, decoded escapes, flattened string literals).
    Text(String),
    /// `$name` — resolved against the token map at evaluation time.
    Token(String),
    /// `$name(…)` — each argument is its own node sequence.
    Call { name: String, args: Vec<Vec<Ast>> },
    /// `@(…)` — builds a MultiMap at evaluation time.
    AtExpr { entries: Vec<AtEntry> },
}

/// One at-expression entry.  `key` is absent for the bare form `@(v)`,
/// which promotes the value expression to both key and value.
#[derive(Debug, Clone, PartialEq)]
pub struct AtEntry {
    pub key: Option<Vec<Ast>>,
    pub value: Vec<Ast>,
}

/// Normalize a parse tree into the evaluation AST.
pub fn postprocess(tree: &ParseTree) -> Vec<Ast> {
    if !tree.errors.is_empty() {
        return Vec::new();
    }
    process_list(&tree.root.children)
}

// Postprocess a sibling list, merging adjacent text runs.
fn process_list(nodes: &[Node]) -> Vec<Ast> {
    let mut out: Vec<Ast> = Vec::new();
    for node in nodes {
        let Some(ast) = process_node(node) else {
            continue;
        };
        match (out.last_mut(), ast) {
            (Some(Ast::Text(prev)), Ast::Text(next)) => prev.push_str(&next),
            (_, ast) => out.push(ast),
        }
    }
    out
}

fn process_node(node: &Node) -> Option<Ast> {
    match node.kind {
        NodeKind::Text | NodeKind::Escape => {
            Some(Ast::Text(node.value.clone().unwrap_or_default()))
        }
        NodeKind::Token => Some(Ast::Token(node.value.clone().unwrap_or_default())),
        NodeKind::String => {
            // Children are text/escape only; flatten to one literal.
            let flat: String = node
                .children
                .iter()
                .filter_map(|c| c.value.clone())
                .collect();
            Some(Ast::Text(flat))
        }
        NodeKind::Call => Some(Ast::Call {
            name: node.value.clone().unwrap_or_default(),
            args: node
                .children
                .iter()
                .filter(|c| c.kind == NodeKind::Argument)
                .map(|c| process_list(&c.children))
                .collect(),
        }),
        NodeKind::AtExpression => Some(Ast::AtExpr {
            entries: pair_entries(&node.children),
        }),
        // Structure-only kinds are handled by their parents.
        NodeKind::Tree | NodeKind::Argument | NodeKind::AtKey | NodeKind::AtValue => None,
    }
}

// Scan at-expression children in order: each at_key starts an entry, an
// immediately following at_value completes it, and a key with no value is
// promoted to a bare value entry.
fn pair_entries(children: &[Node]) -> Vec<AtEntry> {
    let mut entries = Vec::new();
    let mut pending_key: Option<Vec<Ast>> = None;
    for child in children {
        match child.kind {
            NodeKind::AtKey => {
                if let Some(key) = pending_key.take() {
                    entries.push(AtEntry { key: None, value: key });
                }
                pending_key = Some(process_list(&child.children));
            }
            NodeKind::AtValue => {
                entries.push(AtEntry {
                    key: pending_key.take(),
                    value: process_list(&child.children),
                });
            }
            _ => {}
        }
    }
    if let Some(key) = pending_key.take() {
        entries.push(AtEntry { key: None, value: key });
    }
    entries
}

// ── Tests ─────────────────────────────────────────────────────────────────────
