pub mod assessment;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod types;

pub use classifier::{Classification, PlausibilityClassifier};
pub use engine::ChemistryEngine;
pub use error::EvalError;
pub use evaluator::Evaluator;
pub use types::{BatchEntry, EvaluationVerdict, Level, MatchRecord, MechanismTier, ReactionPair};
