use super::{parse_params, ConvertDefaults, ConvertOptions};
use crate::{
    config::Config,
    convert::ConversionGateway,
    errors::AppError,
    mcp::{registry::Tool, types::ToolOutput},
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub struct ConvertTool {
    gateway: Arc<ConversionGateway>,
    defaults: ConvertDefaults,
}

impl ConvertTool {
    pub fn new(cfg: &Config, gateway: Arc<ConversionGateway>) -> Self {
        Self { gateway, defaults: ConvertDefaults::from_config(cfg) }
    }
}

#[derive(Debug, Deserialize)]
struct Params {
    image_path: String,
    #[serde(flatten)]
    opts: ConvertOptions,
}

#[async_trait]
impl Tool for ConvertTool {
    fn name(&self) -> &'static str { "convert_to_webp" }
    fn description(&self) -> &'static str { "Convert a PNG or JPEG image inside an allowed directory to WebP" }
    fn capabilities(&self) -> serde_json::Value {
        let mut props = self.defaults.option_properties();
        props["image_path"] = json!({"type":"string","description":"path to a .png, .jpg or .jpeg file"});
        json!({"input": {"type":"object","required":["image_path"],"properties": props}})
    }

    async fn call(&self, params: serde_json::Value) -> Result<ToolOutput, AppError> {
        let params: Params = parse_params(params)?;
        let req = self.defaults.request(&params.image_path, &params.opts)?;
        let result = self.gateway.convert(&req).await;
        let text = serde_json::to_string_pretty(&result).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(ToolOutput::text(text, !result.is_success()))
    }
}
