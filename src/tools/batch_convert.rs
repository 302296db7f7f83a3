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

pub struct BatchConvertTool {
    gateway: Arc<ConversionGateway>,
    defaults: ConvertDefaults,
    max_items: usize,
}

impl BatchConvertTool {
    pub fn new(cfg: &Config, gateway: Arc<ConversionGateway>) -> Self {
        Self {
            gateway,
            defaults: ConvertDefaults::from_config(cfg),
            max_items: cfg.limits.max_batch_items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Params {
    image_paths: Vec<String>,
    #[serde(flatten)]
    opts: ConvertOptions,
}

#[async_trait]
impl Tool for BatchConvertTool {
    fn name(&self) -> &'static str { "batch_convert_to_webp" }
    fn description(&self) -> &'static str {
        "Convert several PNG or JPEG images to WebP, one after another; each item reports its own result"
    }
    fn capabilities(&self) -> serde_json::Value {
        let mut props = self.defaults.option_properties();
        props["image_paths"] = json!({"type":"array","items":{"type":"string"},"maxItems": self.max_items});
        json!({"input": {"type":"object","required":["image_paths"],"properties": props}})
    }

    async fn call(&self, params: serde_json::Value) -> Result<ToolOutput, AppError> {
        let params: Params = parse_params(params)?;
        if params.image_paths.len() > self.max_items {
            return Err(AppError::InvalidParams(format!(
                "too many image_paths: {} (max {})",
                params.image_paths.len(),
                self.max_items
            )));
        }
        let reqs = params
            .image_paths
            .iter()
            .map(|p| self.defaults.request(p, &params.opts))
            .collect::<Result<Vec<_>, _>>()?;
        let results = self.gateway.convert_batch(&reqs).await;
        let converted = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(total = results.len(), converted, "batch finished");
        let text = serde_json::to_string_pretty(&results).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(ToolOutput::text(text, false))
    }
}
