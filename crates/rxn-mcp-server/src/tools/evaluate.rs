use super::{json_result, parse_params, Tool};
use rxn_common::mcp::{ToolCallResult, ToolDefinition};
use rxn_eval::{Evaluator, ReactionPair};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct EvaluateReactionTool {
    evaluator: Arc<Evaluator>,
}

impl EvaluateReactionTool {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait::async_trait]
impl Tool for EvaluateReactionTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "evaluate_reaction".into(),
            description: "Judge whether a substrate can be enzymatically converted into a \
                product. Give both compounds by NAME; they are resolved to structures \
                (PubChem, then CACTUS, then ChemSpider) and checked against known formula \
                changes and chemical, natural and enzymatic mechanisms. Returns JSON with \
                the resolved SMILES, the matched ids, the level reached and a conclusion."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "substrate_name": {
                        "type": "string",
                        "description": "Common or IUPAC name of the starting compound, e.g. 'propanol'."
                    },
                    "product_name": {
                        "type": "string",
                        "description": "Common or IUPAC name of the desired product, e.g. 'propanal'."
                    }
                },
                "required": ["substrate_name", "product_name"]
            }),
        }
    }

    async fn call(&self, params: Value) -> ToolCallResult {
        let pair: ReactionPair = match parse_params(params) {
            Ok(p) => p,
            Err(result) => return result,
        };

        match self
            .evaluator
            .evaluate(&pair.substrate_name, &pair.product_name)
            .await
        {
            Ok(verdict) => json_result(&verdict),
            Err(e) => ToolCallResult::error(format!("Evaluation failed: {e}")),
        }
    }
}

pub struct BatchEvaluateTool {
    evaluator: Arc<Evaluator>,
}

#[derive(Deserialize)]
struct BatchParams {
    // Items are read one by one so a malformed pair fails only its own slot.
    reactions: Vec<Value>,
}

impl BatchEvaluateTool {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait::async_trait]
impl Tool for BatchEvaluateTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "batch_evaluate".into(),
            description: "Evaluate several substrate/product name pairs in one call. Results \
                come back in input order; a failure in one pair is reported in that pair's \
                entry and does not affect the others."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "reactions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["substrate_name", "product_name"],
                            "properties": {
                                "substrate_name": {"type": "string"},
                                "product_name": {"type": "string"}
                            }
                        },
                        "description": "Pairs to evaluate."
                    }
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
        let pairs: Vec<ReactionPair> = params
            .reactions
            .into_iter()
            .map(ReactionPair::from_item)
            .collect();
        tracing::info!("Batch evaluating {} reactions", pairs.len());
        let entries = self.evaluator.evaluate_batch(&pairs).await;
        json_result(&entries)
    }
}
