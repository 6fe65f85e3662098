use crate::tools::ToolRegistry;
use rxn_common::mcp::*;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Run the MCP server: read JSON-RPC from stdin, write responses to stdout.
pub async fn run(registry: ToolRegistry) -> Result<(), Box<dyn std::error::Error>> {
    serve(&registry, tokio::io::stdin(), tokio::io::stdout()).await
}

/// One JSON-RPC message per line in, one response per request line out.
pub async fn serve<R, W>(
    registry: &ToolRegistry,
    input: R,
    mut output: W,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();

    tracing::info!("MCP server ready, reading from stdin");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                let resp = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                write_response(&mut output, &resp).await?;
                continue;
            }
        };

        if let Some(resp) = handle_request(&request, registry).await {
            write_response(&mut output, &resp).await?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

async fn handle_request(req: &JsonRpcRequest, registry: &ToolRegistry) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            let result = InitializeResult {
                protocol_version: PROTOCOL_VERSION.into(),
                capabilities: ServerCapabilities {
                    tools: ToolsCapability {
                        list_changed: false,
                    },
                },
                server_info: ServerInfo {
                    name: "rxn-tools".into(),
                    version: env!("CARGO_PKG_VERSION").into(),
                },
            };
            Some(respond(req.id.clone(), &result))
        }

        // Notifications get no response
        "notifications/initialized" | "initialized" => None,

        "tools/list" => {
            let result = ToolsListResult {
                tools: registry.definitions(),
            };
            Some(respond(req.id.clone(), &result))
        }

        "tools/call" => {
            let name = req.params.get("name").and_then(Value::as_str).unwrap_or("");
            let arguments = req
                .params
                .get("arguments")
                .cloned()
                .unwrap_or(Value::Object(serde_json::Map::new()));

            tracing::info!("tools/call {}", name);
            let result = registry.call(name, arguments).await;
            if result.is_error {
                tracing::warn!("{} returned an error: {}", name, result.joined_text());
            }
            Some(respond(req.id.clone(), &result))
        }

        _ if req.id.is_none() => {
            tracing::debug!("Ignoring notification: {}", req.method);
            None
        }

        _ => {
            tracing::debug!("Unknown method: {}", req.method);
            Some(JsonRpcResponse::error(
                req.id.clone(),
                METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            ))
        }
    }
}

fn respond<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {e}")),
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    output: &mut W,
    resp: &JsonRpcResponse,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(resp)?;
    output.write_all(json.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;
    use serde_json::json;

    async fn exchange(input: &str) -> Vec<Value> {
        let registry = ToolRegistry::new(testing::evaluator());
        let mut output: Vec<u8> = Vec::new();
        serve(&registry, input.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"evaluate_reaction","arguments":{"substrate_name":"propanol","product_name":"propanal"}}}"#,
        ]
        .join("\n");

        let responses = exchange(&input).await;
        assert_eq!(responses.len(), 3);

        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "rxn-tools");

        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 7);

        let call = &responses[2]["result"];
        assert!(call.get("isError").is_none());
        let verdict: Value =
            serde_json::from_str(call["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(verdict["level"], "full_enzymatic");
    }

    #[tokio::test]
    async fn test_errors() {
        let input = [
            "{not json",
            r#"{"jsonrpc":"2.0","id":7,"method":"resources/list"}"#,
            r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"evaluate_reaction","arguments":{"substrate_name":"propanol"}}}"#,
        ]
        .join("\n");

        let responses = exchange(&input).await;
        assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(responses[1]["id"], 7);
        assert_eq!(responses[2]["result"]["isError"], json!(true));
    }
}
