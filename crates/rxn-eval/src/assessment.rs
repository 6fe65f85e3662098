use crate::engine::ChemistryEngine;
use crate::error::EvalError;
use crate::types::{Confidence, MechanismTier, ReactionAssessment};
use rxn_common::ReactionSmiles;

/// Formula match and one operator tier on a reaction SMILES, both always run.
pub async fn assess(
    engine: &dyn ChemistryEngine,
    reaction: &ReactionSmiles,
    tier: MechanismTier,
) -> Result<ReactionAssessment, EvalError> {
    let formula = engine.formula_match(reaction).await?;
    let operators = engine.mechanism_match(reaction, tier).await?;

    let confidence = match (formula.is_some(), !operators.is_empty()) {
        (true, true) => Confidence::High,
        (true, false) | (false, true) => Confidence::Medium,
        (false, false) => Confidence::Low,
    };

    Ok(ReactionAssessment {
        reaction: reaction.to_string(),
        operator_type: tier,
        formula_id: formula.map(|f| f.match_id),
        matched_operators: operators.into_iter().map(|m| m.match_id).collect(),
        is_plausible: confidence != Confidence::Low,
        confidence,
    })
}

pub fn render_assessment(a: &ReactionAssessment) -> String {
    format!(
        "Reaction Evaluation\n\
         ===================\n\n\
         Reaction: {}\n\
         Formula ID: {}\n\
         Matched Operators ({}): {}\n\
         Is Plausible: {}\n\
         Confidence: {}\n\n\
         Interpretation:\n\
         - A formula ID means the net formula change has known precedent\n\
         - Matched operators mean the bond-level mechanism has known precedent\n\
         - Confidence is highest when both are present",
        a.reaction,
        a.formula_id.as_deref().unwrap_or("No match"),
        a.operator_type,
        render_ids(&a.matched_operators),
        a.is_plausible,
        a.confidence,
    )
}

pub fn render_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        "No matches".into()
    } else {
        ids.join(", ")
    }
}

/// Raw reaction strings in, one line-group per reaction out. Unparsable or
/// faulting reactions are reported inline.
pub async fn assess_batch(
    engine: &dyn ChemistryEngine,
    reactions: &[String],
    tier: MechanismTier,
) -> String {
    let mut text = format!("Batch Evaluation Results ({} reactions)\n", reactions.len());
    text.push_str(&"=".repeat(50));
    text.push_str("\n\n");

    for (i, raw) in reactions.iter().enumerate() {
        let outcome = match ReactionSmiles::parse(raw) {
            Ok(reaction) => assess(engine, &reaction, tier).await,
            Err(e) => Err(e.into()),
        };
        match outcome {
            Ok(a) => {
                text.push_str(&format!("{}. {}\n", i + 1, a.reaction));
                text.push_str(&format!(
                    "   Formula: {}\n",
                    a.formula_id.as_deref().unwrap_or("No match")
                ));
                text.push_str(&format!(
                    "   Operators: {}\n",
                    render_ids(&a.matched_operators)
                ));
                text.push_str(&format!(
                    "   Plausible: {} (Confidence: {})\n\n",
                    a.is_plausible, a.confidence
                ));
            }
            Err(e) => {
                tracing::warn!("Batch assessment of '{}' failed: {e}", raw);
                text.push_str(&format!("{}. {}\n   Error: {e}\n\n", i + 1, raw.trim()));
            }
        }
    }
    text.trim_end().to_string()
}
