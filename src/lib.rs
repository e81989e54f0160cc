//! Exhaustive search for short programs that reproduce labeled examples.
//!
//! An execution target ([`memory::Memory`]) offers actions, conditions and
//! control structures. [`synth::brute_enum::BruteForce`] enumerates every
//! program built from them up to a length bound, and
//! [`learning::SupervisedLearning`] picks the one reproducing the most
//! examples, then replays it on new inputs.

pub mod control;
pub mod error;
pub mod event;
pub mod instruction;
pub mod learning;
pub mod memory;
pub mod program;
pub mod synth;
pub mod value;

pub use error::Error;
pub use instruction::{Action, Condition, ControlStructure, ControlTemplate, Instruction};
pub use learning::{DataSample, FitReport, LearnerConfig, SupervisedLearning};
pub use program::{Budget, Program};
pub use value::{same, Value};
