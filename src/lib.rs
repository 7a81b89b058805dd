pub mod catalog;
pub mod coverage;
pub mod error;
pub mod mutants;
pub mod output;
pub mod report;
pub mod runner;
pub mod safety;
pub mod state;
pub mod walker;

pub use error::{MutationError, Result};
pub use mutants::{LocationIndex, MutOp, MutantDescriptor, OpCategory, TrialResult, TrialStatus};
