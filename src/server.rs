use crate::{
    config::Config,
    errors::AppError,
    mcp::{
        registry::ToolRegistry,
        types::{RpcRequest, RpcResponse, PROTOCOL_VERSION},
    },
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub registry: Arc<ToolRegistry>,
}

pub async fn serve_stdio(state: AppState) -> anyhow::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(state, stdin, stdout).await
}

/// One newline-delimited JSON-RPC message per line; requests are handled
/// to completion in arrival order.
pub async fn serve<R, W>(state: AppState, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let resp = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(req) => handle(&state, req).await,
            Err(e) => Some(RpcResponse::err(Value::Null, -32700, format!("parse error: {e}"))),
        };
        if let Some(resp) = resp {
            let mut out = serde_json::to_vec(&resp)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// `None` for notifications, which never get a reply.
pub async fn handle(state: &AppState, req: RpcRequest) -> Option<RpcResponse> {
    let Some(id) = req.id else {
        tracing::debug!(method = %req.method, "notification");
        return None;
    };
    let resp = match req.method.as_str() {
        "initialize" => RpcResponse::ok(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {"name": state.cfg.server.name, "version": state.cfg.server.version},
            }),
        ),
        "ping" => RpcResponse::ok(id, json!({})),
        "tools/list" => RpcResponse::ok(id, json!({"tools": state.registry.list_info()})),
        "tools/call" => call(state, id, req.params).await,
        other => RpcResponse::err(id, -32601, format!("method not found: {other}")),
    };
    Some(resp)
}

async fn call(state: &AppState, id: Value, params: Value) -> RpcResponse {
    use std::time::Instant;
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let tool_name = params.get("name").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    let Some(tool) = state.registry.get(&tool_name) else {
        let e = AppError::UnknownTool(tool_name.clone());
        audit_end(&request_id, &tool_name, "deny", e.code(), started.elapsed().as_millis() as u64, None);
        return RpcResponse::err(id, e.rpc_code(), e.to_string());
    };

    match tool.call(arguments).await {
        Ok(output) => {
            let code = if output.is_error { "ToolError" } else { "OK" };
            audit_end(&request_id, &tool_name, "allow", code, started.elapsed().as_millis() as u64, Some(output.is_error));
            match serde_json::to_value(&output) {
                Ok(v) => RpcResponse::ok(id, v),
                Err(e) => RpcResponse::err(id, -32603, e.to_string()),
            }
        }
        Err(e) => {
            audit_end(&request_id, &tool_name, "error", e.code(), started.elapsed().as_millis() as u64, None);
            RpcResponse::err(id, e.rpc_code(), e.to_string())
        }
    }
}

fn audit_end(request_id: &str, tool: &str, decision: &str, code: &str, duration_ms: u64, is_error: Option<bool>) {
    tracing::info!(
        request_id = request_id,
        tool = tool,
        decision = decision,
        code = code,
        duration_ms = duration_ms,
        is_error = ?is_error,
        "audit"
    );
}
