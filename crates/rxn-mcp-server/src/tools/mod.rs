pub mod evaluate;
pub mod operators;
pub mod resolve;

use rxn_common::mcp::{ToolCallResult, ToolDefinition};
use rxn_eval::Evaluator;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Trait that every MCP tool implements.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Called only after the registry has checked the schema's `required` keys.
    async fn call(&self, params: Value) -> ToolCallResult;
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(evaluate::EvaluateReactionTool::new(evaluator.clone())),
            Box::new(evaluate::BatchEvaluateTool::new(evaluator.clone())),
            Box::new(resolve::ResolveCompoundTool::new(evaluator.clone())),
            Box::new(operators::AssignFormulaTool::new(evaluator.clone())),
            Box::new(operators::MatchOperatorsTool::new(evaluator.clone())),
            Box::new(operators::AssessReactionTool::new(evaluator.clone())),
            Box::new(operators::BatchAssessTool::new(evaluator)),
        ];
        Self { tools }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub async fn call(&self, name: &str, params: Value) -> ToolCallResult {
        for tool in &self.tools {
            let definition = tool.definition();
            if definition.name == name {
                if let Err(message) = check_required(&definition.input_schema, &params) {
                    tracing::info!("Rejected call to {}: {}", name, message);
                    return ToolCallResult::error(message);
                }
                return tool.call(params).await;
            }
        }
        ToolCallResult::error(format!("Unknown tool: {name}"))
    }
}

/// Every key in the schema's `required` list must be present, non-null and,
/// for strings, non-blank.
fn check_required(schema: &Value, params: &Value) -> Result<(), String> {
    let Some(args) = params.as_object() else {
        return Err("Arguments must be a JSON object".into());
    };
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for key in required.iter().filter_map(Value::as_str) {
        let present = match args.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(format!("Missing required parameter: {key}"));
        }
    }
    Ok(())
}

pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, ToolCallResult> {
    serde_json::from_value(params)
        .map_err(|e| ToolCallResult::error(format!("Invalid parameters: {e}")))
}

pub(crate) fn json_result<T: Serialize>(value: &T) -> ToolCallResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => ToolCallResult::text(json),
        Err(e) => ToolCallResult::error(format!("Serialization error: {e}")),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_keys() {
        let schema = json!({"required": ["substrate_name", "product_name"]});
        assert!(check_required(&schema, &json!({"substrate_name": "a", "product_name": "b"})).is_ok());

        let err = check_required(&schema, &json!({"substrate_name": "a"})).unwrap_err();
        assert!(err.contains("product_name"));
        assert!(check_required(&schema, &json!({"substrate_name": null, "product_name": "b"})).is_err());
        assert!(check_required(&schema, &json!({"substrate_name": " ", "product_name": "b"})).is_err());
        assert!(check_required(&schema, &json!("not an object")).is_err());
        assert!(check_required(&json!({}), &json!({})).is_ok());
    }

    #[tokio::test]
    async fn test_registry_lists_every_tool() {
        let registry = ToolRegistry::new(testing::evaluator());
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "evaluate_reaction",
                "batch_evaluate",
                "resolve_compound",
                "assign_formula",
                "match_operators",
                "assess_reaction",
                "batch_assess"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_and_missing_parameter() {
        let registry = ToolRegistry::new(testing::evaluator());

        let result = registry.call("fold_protein", json!({})).await;
        assert!(result.is_error);
        assert_eq!(result.joined_text(), "Unknown tool: fold_protein");

        let result = registry
            .call("evaluate_reaction", json!({"substrate_name": "propanol"}))
            .await;
        assert!(result.is_error);
        assert!(result.joined_text().contains("product_name"));
    }
}
