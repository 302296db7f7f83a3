use super::types::{ToolInfo, ToolOutput};
use crate::{config::Config, convert::ConversionGateway, errors::AppError, security::PathSandbox};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynTool = Arc<dyn Tool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<(String, DynTool)>,
}

impl ToolRegistry {
    pub fn new(cfg: &Config, sandbox: Arc<PathSandbox>, gateway: Arc<ConversionGateway>) -> anyhow::Result<Self> {
        use crate::tools::{batch_convert::BatchConvertTool, convert::ConvertTool, list_dirs::ListAllowedDirsTool};
        let tools: Vec<DynTool> = vec![
            Arc::new(ConvertTool::new(cfg, gateway.clone())),
            Arc::new(BatchConvertTool::new(cfg, gateway)),
            Arc::new(ListAllowedDirsTool::new(sandbox)),
        ];
        // listing order is registration order
        let tools = tools.into_iter().map(|t| (t.name().to_string(), t)).collect();
        Ok(Self { tools })
    }

    pub fn get(&self, name: &str) -> Option<DynTool> { self.tools.iter().find(|(n, _)| n == name).map(|(_, t)| t.clone()) }
    pub fn list_names(&self) -> Vec<String> { self.tools.iter().map(|(n, _)| n.clone()).collect() }

    pub fn list_info(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|(n, t)| ToolInfo {
                name: n.clone(),
                description: t.description().to_string(),
                input_schema: t.capabilities()["input"].clone(),
            })
            .collect()
    }
}

#[async_trait]
pub trait Tool {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn capabilities(&self) -> serde_json::Value;
    async fn call(&self, params: serde_json::Value) -> Result<ToolOutput, AppError>;
}
