use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The kind of operator-bearing construct a mutable site belongs to.
/// Names follow the tree-sitter-python node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCategory {
    BinaryOperator,
    ComparisonOperator,
    BooleanOperator,
}

impl OpCategory {
    pub fn node_kind(self) -> &'static str {
        match self {
            OpCategory::BinaryOperator => "binary_operator",
            OpCategory::ComparisonOperator => "comparison_operator",
            OpCategory::BooleanOperator => "boolean_operator",
        }
    }

    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "binary_operator" => Some(OpCategory::BinaryOperator),
            "comparison_operator" => Some(OpCategory::ComparisonOperator),
            "boolean_operator" => Some(OpCategory::BooleanOperator),
            _ => None,
        }
    }
}

impl fmt::Display for OpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_kind())
    }
}

/// A concrete Python operator that can occupy a mutable site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MutOp {
    Add,
    Sub,
    Mult,
    Div,
    Pow,
    Mod,
    FloorDiv,
    Lt,
    LtE,
    Gt,
    GtE,
    Eq,
    NotEq,
    And,
    Or,
}

impl MutOp {
    /// The source token this operator renders as.
    pub fn token(self) -> &'static str {
        match self {
            MutOp::Add => "+",
            MutOp::Sub => "-",
            MutOp::Mult => "*",
            MutOp::Div => "/",
            MutOp::Pow => "**",
            MutOp::Mod => "%",
            MutOp::FloorDiv => "//",
            MutOp::Lt => "<",
            MutOp::LtE => "<=",
            MutOp::Gt => ">",
            MutOp::GtE => ">=",
            MutOp::Eq => "==",
            MutOp::NotEq => "!=",
            MutOp::And => "and",
            MutOp::Or => "or",
        }
    }

    pub fn category(self) -> OpCategory {
        match self {
            MutOp::Add
            | MutOp::Sub
            | MutOp::Mult
            | MutOp::Div
            | MutOp::Pow
            | MutOp::Mod
            | MutOp::FloorDiv => OpCategory::BinaryOperator,
            MutOp::Lt | MutOp::LtE | MutOp::Gt | MutOp::GtE | MutOp::Eq | MutOp::NotEq => {
                OpCategory::ComparisonOperator
            }
            MutOp::And | MutOp::Or => OpCategory::BooleanOperator,
        }
    }
}

impl fmt::Display for MutOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Identifies one mutable site in a parsed source tree.
///
/// `line` is 1-based and `column` 0-based, both referring to the start of
/// the operator-bearing node (the whole `b + 11`), not the operator token
/// itself. Equality and hashing are field-wise, so a `LocationIndex` is
/// directly usable as a set or map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationIndex {
    pub category: OpCategory,
    pub line: usize,
    pub column: usize,
    pub original: MutOp,
}

impl LocationIndex {
    /// Apply-mode matching key: position and category, ignoring the
    /// operator currently recorded at the site.
    pub fn same_site(&self, other: &LocationIndex) -> bool {
        self.category == other.category && self.line == other.line && self.column == other.column
    }
}

/// One unit of trial work: a site plus the replacement to install there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutantDescriptor {
    pub source_file: PathBuf,
    pub location: LocationIndex,
    pub replacement: MutOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialStatus {
    Detected,
    Survived,
    Error,
    Unknown,
    Timeout,
}

impl TrialStatus {
    pub fn label(self) -> &'static str {
        match self {
            TrialStatus::Detected => "DETECTED",
            TrialStatus::Survived => "SURVIVED",
            TrialStatus::Error => "ERROR",
            TrialStatus::Unknown => "UNKNOWN",
            TrialStatus::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for TrialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Write-once record of one completed trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub mutant: MutantDescriptor,
    pub status: TrialStatus,
    pub return_code: i32,
}
