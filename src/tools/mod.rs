pub mod batch_convert;
pub mod convert;
pub mod list_dirs;

use crate::{config::Config, convert::ConversionRequest, errors::AppError};
use serde::Deserialize;
use serde_json::{json, Value};

/// Agents sometimes wrap paths in quotes. Surrounding whitespace goes, then
/// at most one matching `"` or `'` pair; whatever is inside is kept as is.
pub fn strip_quotes(raw: &str) -> &str {
    let s = raw.trim();
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

/// Per-call options shared by both conversion tools.
#[derive(Debug, Default, Deserialize)]
pub struct ConvertOptions {
    pub quality: Option<i64>,
    pub lossless: Option<bool>,
    pub keep_original: Option<bool>,
    pub base_path: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConvertDefaults {
    pub quality: u8,
    pub lossless: bool,
    pub keep_original: bool,
}

impl ConvertDefaults {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            quality: cfg.convert.default_quality,
            lossless: cfg.convert.default_lossless,
            keep_original: cfg.convert.default_keep_original,
        }
    }

    pub fn request(&self, path: &str, opts: &ConvertOptions) -> Result<ConversionRequest, AppError> {
        let quality = match opts.quality {
            None => self.quality,
            Some(q) => u8::try_from(q)
                .ok()
                .filter(|q| *q <= 100)
                .ok_or_else(|| AppError::InvalidParams(format!("quality must be within 0..=100, got {q}")))?,
        };
        Ok(ConversionRequest {
            source_path: strip_quotes(path).to_string(),
            quality,
            lossless: opts.lossless.unwrap_or(self.lossless),
            keep_original: opts.keep_original.unwrap_or(self.keep_original),
            base_dir: opts.base_path.as_deref().map(strip_quotes).filter(|b| !b.is_empty()).map(str::to_string),
        })
    }

    /// Schema properties common to both conversion tools.
    pub fn option_properties(&self) -> Value {
        json!({
            "quality": {"type":"integer","minimum":0,"maximum":100,"default": self.quality, "description":"WebP quality (ignored for size when lossless)"},
            "lossless": {"type":"boolean","default": self.lossless},
            "keep_original": {"type":"boolean","default": self.keep_original, "description":"keep the source file after conversion"},
            "base_path": {"type":"string","description":"directory that relative image paths resolve against"}
        })
    }
}

pub fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, AppError> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| AppError::InvalidParams(e.to_string()))
}
