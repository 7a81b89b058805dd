//! Discovery and apply traversal over parsed Python source.
//!
//! tree-sitter output is rebuilt into an explicit tagged tree so that
//! discovery can be a pure read and apply can produce a new tree with
//! exactly one operator changed, without re-parsing.

use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::catalog;
use crate::error::{MutationError, Result};
use crate::mutants::{LocationIndex, MutOp, MutantDescriptor, OpCategory};

/// Syntax tree with catalog nodes made explicit. Nodes outside the
/// catalog pass through as `Branch` and are never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxTree {
    Operator(OperatorNode),
    Branch {
        kind: &'static str,
        children: Vec<SyntaxTree>,
    },
}

/// One operator-bearing node plus the byte span of its operator token,
/// kept so a mutant can later be rendered by splicing the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorNode {
    pub index: LocationIndex,
    pub token_start: usize,
    pub token_end: usize,
    pub children: Vec<SyntaxTree>,
}

/// Parse Python source into a `SyntaxTree`.
pub fn parse_source(file: &Path, source: &str) -> Result<SyntaxTree> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE;
    parser
        .set_language(&language.into())
        .map_err(|e| MutationError::Parse {
            file: file.to_path_buf(),
            reason: e.to_string(),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| MutationError::Parse {
        file: file.to_path_buf(),
        reason: "parser produced no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(MutationError::Parse {
            file: file.to_path_buf(),
            reason: "source contains syntax errors".to_string(),
        });
    }

    build_node(file, root, source)
}

fn build_node(file: &Path, node: Node, source: &str) -> Result<SyntaxTree> {
    if let Some(category) = OpCategory::from_node_kind(node.kind()) {
        return build_operator_node(file, node, source, category);
    }

    let mut children = Vec::new();
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            children.push(build_node(file, child, source)?);
        }
    }
    Ok(SyntaxTree::Branch {
        kind: node.kind(),
        children,
    })
}

fn build_operator_node(
    file: &Path,
    node: Node,
    source: &str,
    category: OpCategory,
) -> Result<SyntaxTree> {
    let mut children = Vec::new();
    let mut token: Option<(MutOp, usize, usize)> = None;
    let mut foreign = false;

    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        if child.is_named() {
            children.push(build_node(file, child, source)?);
            continue;
        }
        // Chained comparisons (a < b < c) carry several operator tokens in
        // one node; only the first is indexed as the mutable site.
        if token.is_some() || foreign {
            continue;
        }
        let text = &source[child.start_byte()..child.end_byte()];
        match catalog::member_from_token(category, text) {
            Some(op) => token = Some((op, child.start_byte(), child.end_byte())),
            // Operators outside the catalog (`is`, `in`, `&`, shifts, ...)
            // are not mutable sites; the node passes through untouched.
            None => foreign = true,
        }
    }

    if foreign {
        return Ok(SyntaxTree::Branch {
            kind: category.node_kind(),
            children,
        });
    }

    let Some((op, token_start, token_end)) = token else {
        return Err(MutationError::Parse {
            file: file.to_path_buf(),
            reason: format!(
                "{} node without an operator token at line {}",
                category.node_kind(),
                node.start_position().row + 1
            ),
        });
    };

    let index = LocationIndex {
        category,
        line: node.start_position().row + 1,
        column: node.start_position().column,
        original: op,
    };

    Ok(SyntaxTree::Operator(OperatorNode {
        index,
        token_start,
        token_end,
        children,
    }))
}

/// Collect every mutable location in pre-order. Pure read: repeated calls
/// on the same tree yield the same ordered list and leave it untouched.
pub fn discover(tree: &SyntaxTree) -> Vec<LocationIndex> {
    let mut locs = Vec::new();
    collect(tree, &mut locs);
    locs
}

fn collect(tree: &SyntaxTree, locs: &mut Vec<LocationIndex>) {
    match tree {
        SyntaxTree::Operator(node) => {
            locs.push(node.index);
            for child in &node.children {
                collect(child, locs);
            }
        }
        SyntaxTree::Branch { children, .. } => {
            for child in children {
                collect(child, locs);
            }
        }
    }
}

/// Expand every discovered location against the catalog, minus each
/// site's original operator.
///
/// Nested same-operator expressions (`a + b + c`) put two nodes at one
/// (line, column, category) site; apply can only ever reach the first, so
/// later duplicates are skipped rather than run as redundant trials.
pub fn expand_mutants(file: &Path, tree: &SyntaxTree) -> Vec<MutantDescriptor> {
    let mut mutants = Vec::new();
    let mut seen: Vec<LocationIndex> = Vec::new();
    for index in discover(tree) {
        if seen.iter().any(|s| s.same_site(&index)) {
            continue;
        }
        seen.push(index);
        for replacement in catalog::candidates(&index) {
            mutants.push(MutantDescriptor {
                source_file: file.to_path_buf(),
                location: index,
                replacement,
            });
        }
    }
    mutants
}

/// A successfully applied mutation: the rewritten tree plus the byte span
/// to splice when rendering mutated source text.
#[derive(Debug, Clone)]
pub struct AppliedMutation {
    pub tree: SyntaxTree,
    pub token_start: usize,
    pub token_end: usize,
    pub replacement: MutOp,
}

/// Produce a new tree identical to `tree` except that the node at the
/// target's (line, column, category) carries `replacement`. Zero matches
/// is a `TargetNotFound` error, never a silent no-op.
pub fn apply(
    file: &Path,
    tree: &SyntaxTree,
    target: &LocationIndex,
    replacement: MutOp,
) -> Result<AppliedMutation> {
    let mut hit: Option<(usize, usize)> = None;
    let rewritten = rewrite(tree, target, replacement, &mut hit);
    match hit {
        Some((token_start, token_end)) => Ok(AppliedMutation {
            tree: rewritten,
            token_start,
            token_end,
            replacement,
        }),
        None => Err(MutationError::TargetNotFound {
            file: file.to_path_buf(),
            line: target.line,
            column: target.column,
        }),
    }
}

fn rewrite(
    tree: &SyntaxTree,
    target: &LocationIndex,
    replacement: MutOp,
    hit: &mut Option<(usize, usize)>,
) -> SyntaxTree {
    match tree {
        SyntaxTree::Operator(node) => {
            let matched = hit.is_none() && node.index.same_site(target);
            if matched {
                *hit = Some((node.token_start, node.token_end));
            }
            let children = node
                .children
                .iter()
                .map(|c| rewrite(c, target, replacement, hit))
                .collect();
            let index = if matched {
                LocationIndex {
                    original: replacement,
                    ..node.index
                }
            } else {
                node.index
            };
            SyntaxTree::Operator(OperatorNode {
                index,
                token_start: node.token_start,
                token_end: node.token_end,
                children,
            })
        }
        SyntaxTree::Branch { kind, children } => SyntaxTree::Branch {
            kind: *kind,
            children: children
                .iter()
                .map(|c| rewrite(c, target, replacement, hit))
                .collect(),
        },
    }
}

/// Render mutated source text by splicing the replacement token over the
/// original operator token's byte span.
pub fn render(source: &str, applied: &AppliedMutation) -> String {
    let mut out = String::with_capacity(source.len() + 2);
    out.push_str(&source[..applied.token_start]);
    out.push_str(applied.replacement.token());
    out.push_str(&source[applied.token_end..]);
    out
}
