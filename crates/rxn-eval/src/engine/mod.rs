pub mod evodex;
pub mod output;

use crate::error::EvalError;
use crate::types::{MatchRecord, MechanismTier};
use rxn_common::ReactionSmiles;

/// The chemistry capability the classifier queries.
///
/// Both calls must be pure functions of their inputs: the same reaction
/// always yields the same matches. An `Err` is a capability fault, distinct
/// from an empty answer.
#[async_trait::async_trait]
pub trait ChemistryEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Best-matching formula-difference id, if the net formula change is known.
    async fn formula_match(&self, reaction: &ReactionSmiles)
        -> Result<Option<MatchRecord>, EvalError>;

    /// Mechanism ids matching at the given granularity.
    async fn mechanism_match(
        &self,
        reaction: &ReactionSmiles,
        tier: MechanismTier,
    ) -> Result<Vec<MatchRecord>, EvalError>;
}
