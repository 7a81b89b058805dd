//! Mutation operator catalog: which operators a category mutates among.
//!
//! Categories are closed under substitution; there is no cross-category
//! mutation. Membership is fixed at build time.

use crate::mutants::{LocationIndex, MutOp, OpCategory};

pub const BINARY_OPS: &[MutOp] = &[
    MutOp::Add,
    MutOp::Sub,
    MutOp::Mult,
    MutOp::Div,
    MutOp::Pow,
    MutOp::Mod,
    MutOp::FloorDiv,
];

pub const COMPARISON_OPS: &[MutOp] = &[
    MutOp::Lt,
    MutOp::LtE,
    MutOp::Gt,
    MutOp::GtE,
    MutOp::Eq,
    MutOp::NotEq,
];

pub const BOOLEAN_OPS: &[MutOp] = &[MutOp::And, MutOp::Or];

/// Full member set for a category. Total over every category the walker
/// can discover; the closed `OpCategory` enum enforces that statically.
pub fn members(category: OpCategory) -> &'static [MutOp] {
    match category {
        OpCategory::BinaryOperator => BINARY_OPS,
        OpCategory::ComparisonOperator => COMPARISON_OPS,
        OpCategory::BooleanOperator => BOOLEAN_OPS,
    }
}

/// Legal replacements for a site: the category's members minus the
/// operator already there.
pub fn candidates(location: &LocationIndex) -> Vec<MutOp> {
    members(location.category)
        .iter()
        .copied()
        .filter(|op| *op != location.original)
        .collect()
}

/// Look up a source token within one category's member set.
pub fn member_from_token(category: OpCategory, token: &str) -> Option<MutOp> {
    members(category).iter().copied().find(|op| op.token() == token)
}
