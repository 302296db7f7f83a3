use crate::{
    errors::AppError,
    mcp::{registry::Tool, types::ToolOutput},
    security::PathSandbox,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct ListAllowedDirsTool { sandbox: Arc<PathSandbox> }

impl ListAllowedDirsTool { pub fn new(sandbox: Arc<PathSandbox>) -> Self { Self { sandbox } } }

#[async_trait]
impl Tool for ListAllowedDirsTool {
    fn name(&self) -> &'static str { "list_allowed_directories" }
    fn description(&self) -> &'static str { "List the directories this server may read from and write to" }
    fn capabilities(&self) -> serde_json::Value {
        json!({"input": {"type":"object","properties": {}}})
    }
    async fn call(&self, _params: serde_json::Value) -> Result<ToolOutput, AppError> {
        let dirs: Vec<String> = self.sandbox.allowed().iter().map(|d| d.display().to_string()).collect();
        Ok(ToolOutput::text(format!("Allowed directories:\n{}", dirs.join("\n")), false))
    }
}
