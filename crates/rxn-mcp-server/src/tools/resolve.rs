use super::{json_result, parse_params, Tool};
use rxn_common::mcp::{ToolCallResult, ToolDefinition};
use rxn_eval::Evaluator;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Name to SMILES through the same service chain `evaluate_reaction` uses.
pub struct ResolveCompoundTool {
    evaluator: Arc<Evaluator>,
}

#[derive(Deserialize)]
struct ResolveParams {
    name: String,
}

#[derive(Serialize)]
struct ResolveOutput {
    name: String,
    smiles: Option<String>,
    source: Option<String>,
}

impl ResolveCompoundTool {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait::async_trait]
impl Tool for ResolveCompoundTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "resolve_compound".into(),
            description: "Look up the SMILES structure of a compound by name and report \
                which service answered. `smiles` is null when no service knows the name."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Compound name."}
                },
                "required": ["name"]
            }),
        }
    }

    async fn call(&self, params: Value) -> ToolCallResult {
        let params: ResolveParams = match parse_params(params) {
            Ok(p) => p,
            Err(result) => return result,
        };
        let name = params.name.trim().to_string();
        let resolution = self.evaluator.resolver().resolve_with_source(&name).await;

        json_result(&ResolveOutput {
            name,
            smiles: resolution.as_ref().map(|r| r.smiles.to_string()),
            source: resolution.map(|r| r.source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;

    #[tokio::test]
    async fn test_reports_source() {
        let tool = ResolveCompoundTool::new(testing::evaluator());
        let result = tool.call(json!({"name": " ethanol "})).await;
        let out: Value = serde_json::from_str(&result.joined_text()).unwrap();
        assert_eq!(out, json!({"name": "ethanol", "smiles": "CCO", "source": "names"}));
    }

    #[tokio::test]
    async fn test_unknown_name_is_null() {
        let tool = ResolveCompoundTool::new(testing::evaluator());
        let result = tool.call(json!({"name": "unobtainium"})).await;
        assert!(!result.is_error);
        let out: Value = serde_json::from_str(&result.joined_text()).unwrap();
        assert!(out["smiles"].is_null());
        assert!(out["source"].is_null());
    }
}
