//! Reaction-SMILES tools that talk to the chemistry engine directly, with no
//! name resolution and no tier ladder.

use super::{parse_params, Tool};
use rxn_common::mcp::{ToolCallResult, ToolDefinition};
use rxn_common::ReactionSmiles;
use rxn_eval::assessment::{assess, assess_batch, render_assessment, render_ids};
use rxn_eval::{ChemistryEngine, Evaluator, MechanismTier};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize)]
struct ReactionParams {
    reaction: String,
    #[serde(default)]
    operator_type: Option<String>,
}

#[derive(Deserialize)]
struct BatchParams {
    reactions: Vec<String>,
    #[serde(default)]
    operator_type: Option<String>,
}

fn reaction_property() -> Value {
    json!({
        "type": "string",
        "description": "Reaction SMILES in the form 'substrate>>product', e.g. 'CCCO>>CCC=O'."
    })
}

fn operator_type_property() -> Value {
    json!({
        "type": "string",
        "enum": ["E", "C", "N"],
        "default": "E",
        "description": "Operator set: 'E' (enzymatic), 'C' (chemical) or 'N' (natural)."
    })
}

fn tier(raw: Option<&str>) -> Result<MechanismTier, ToolCallResult> {
    match raw {
        None => Ok(MechanismTier::default()),
        Some(s) => s.parse().map_err(ToolCallResult::error),
    }
}

fn engine(evaluator: &Evaluator) -> &dyn ChemistryEngine {
    evaluator.classifier().engine().as_ref()
}

fn reaction_args(params: Value) -> Result<(ReactionSmiles, MechanismTier), ToolCallResult> {
    let params: ReactionParams = parse_params(params)?;
    let reaction =
        ReactionSmiles::parse(&params.reaction).map_err(|e| ToolCallResult::error(e.to_string()))?;
    Ok((reaction, tier(params.operator_type.as_deref())?))
}

pub struct AssignFormulaTool {
    evaluator: Arc<Evaluator>,
}

impl AssignFormulaTool {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait::async_trait]
impl Tool for AssignFormulaTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "assign_formula".into(),
            description: "Compute the net formula difference of a reaction SMILES and return \
                the matching EVODEX-F id, if the change has precedent."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {"reaction": reaction_property()},
                "required": ["reaction"]
            }),
        }
    }

    async fn call(&self, params: Value) -> ToolCallResult {
        let (reaction, _) = match reaction_args(params) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match engine(&self.evaluator).formula_match(&reaction).await {
            Ok(found) => ToolCallResult::text(format!(
                "Formula ID: {}\n\nReaction: {}",
                found.map_or_else(|| "No match found".to_string(), |m| m.match_id),
                reaction
            )),
            Err(e) => ToolCallResult::error(format!("Formula assignment failed: {e}")),
        }
    }
}

pub struct MatchOperatorsTool {
    evaluator: Arc<Evaluator>,
}

impl MatchOperatorsTool {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait::async_trait]
impl Tool for MatchOperatorsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "match_operators".into(),
            description: "Match a reaction SMILES against one EVODEX operator set and list \
                the ids of every matching operator."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "reaction": reaction_property(),
                    "operator_type": operator_type_property()
                },
                "required": ["reaction"]
            }),
        }
    }

    async fn call(&self, params: Value) -> ToolCallResult {
        let (reaction, tier) = match reaction_args(params) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match engine(&self.evaluator).mechanism_match(&reaction, tier).await {
            Ok(matches) => {
                let ids: Vec<String> = matches.into_iter().map(|m| m.match_id).collect();
                ToolCallResult::text(format!(
                    "Matched Operators ({}): {}\n\nReaction: {}",
                    tier,
                    render_ids(&ids),
                    reaction
                ))
            }
            Err(e) => ToolCallResult::error(format!("Operator matching failed: {e}")),
        }
    }
}

pub struct AssessReactionTool {
    evaluator: Arc<Evaluator>,
}

impl AssessReactionTool {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait::async_trait]
impl Tool for AssessReactionTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "assess_reaction".into(),
            description: "Check a reaction SMILES against both the formula-difference \
                catalog and one operator set, and rate its plausibility (High, Medium, Low)."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "reaction": reaction_property(),
                    "operator_type": operator_type_property()
                },
                "required": ["reaction"]
            }),
        }
    }

    async fn call(&self, params: Value) -> ToolCallResult {
        let (reaction, tier) = match reaction_args(params) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match assess(engine(&self.evaluator), &reaction, tier).await {
            Ok(assessment) => ToolCallResult::text(render_assessment(&assessment)),
            Err(e) => ToolCallResult::error(format!("Assessment failed: {e}")),
        }
    }
}

pub struct BatchAssessTool {
    evaluator: Arc<Evaluator>,
}

impl BatchAssessTool {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait::async_trait]
impl Tool for BatchAssessTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "batch_assess".into(),
            description: "Run assess_reaction over a list of reaction SMILES. Failures are \
                reported per reaction."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "reactions": {
                        "type": "array",
                        "items": reaction_property(),
                        "description": "Reaction SMILES strings."
                    },
                    "operator_type": operator_type_property()
                },
                "required": ["reactions"]
            }),
        }
    }

    async fn call(&self, params: Value) -> ToolCallResult {
        let params: BatchParams = match parse_params(params) {
            Ok(p) => p,
            Err(result) => return result,
        };
        let tier = match tier(params.operator_type.as_deref()) {
            Ok(t) => t,
            Err(result) => return result,
        };
        ToolCallResult::text(assess_batch(engine(&self.evaluator), &params.reactions, tier).await)
    }
}
