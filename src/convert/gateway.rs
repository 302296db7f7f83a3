use super::codec::{ImageEncoder, WebpOptions};
use crate::{
    errors::{AppError, AppResult},
    security::{self, PathSandbox},
};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::{fs, time::timeout};

const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source_path: String,
    pub quality: u8,
    pub lossless: bool,
    pub keep_original: bool,
    /// Relative `source_path`s resolve against this instead of the cwd.
    /// Subject to the same sandbox check as any other path.
    pub base_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversionSuccess {
    pub success: bool,
    pub input_path: String,
    pub output_path: String,
    pub size_before: u64,
    pub size_after: u64,
    pub quality: u8,
    pub lossless: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversionFailure {
    pub success: bool,
    pub input_path: String,
    pub error: String,
    pub error_code: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ConversionResult {
    Success(ConversionSuccess),
    Failure(ConversionFailure),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool { matches!(self, ConversionResult::Success(_)) }

    fn failed(input_path: &str, err: &AppError) -> Self {
        ConversionResult::Failure(ConversionFailure {
            success: false,
            input_path: input_path.to_string(),
            error: err.to_string(),
            error_code: err.code().to_string(),
        })
    }
}

/// Orchestrates one conversion: sandbox checks, encode, cleanup, sizes.
pub struct ConversionGateway {
    sandbox: Option<Arc<PathSandbox>>,
    encoder: Arc<dyn ImageEncoder>,
    encode_timeout: Duration,
}

impl ConversionGateway {
    pub fn new(sandbox: Option<Arc<PathSandbox>>, encoder: Arc<dyn ImageEncoder>, encode_timeout: Duration) -> Self {
        Self { sandbox, encoder, encode_timeout }
    }

    pub async fn convert(&self, req: &ConversionRequest) -> ConversionResult {
        match self.try_convert(req).await {
            Ok(ok) => {
                tracing::info!(
                    input = %ok.input_path,
                    output = %ok.output_path,
                    size_before = ok.size_before,
                    size_after = ok.size_after,
                    "converted"
                );
                ConversionResult::Success(ok)
            }
            Err(e) => {
                tracing::warn!(input = %req.source_path, code = e.code(), error = %e, "conversion failed");
                ConversionResult::failed(&req.source_path, &e)
            }
        }
    }

    /// Strictly sequential; results line up with `reqs`.
    pub async fn convert_batch(&self, reqs: &[ConversionRequest]) -> Vec<ConversionResult> {
        let mut results = Vec::with_capacity(reqs.len());
        for req in reqs {
            results.push(self.convert(req).await);
        }
        results
    }

    /// Relative paths resolve against `base`, or the cwd when there is none.
    fn resolve(&self, requested: &str, base: Option<&Path>) -> AppResult<PathBuf> {
        match (&self.sandbox, base) {
            (Some(sandbox), Some(base)) => sandbox.validate_from(requested, base),
            (Some(sandbox), None) => sandbox.validate(requested),
            (None, base) => {
                let base = match base {
                    Some(b) => b.to_path_buf(),
                    None => std::env::current_dir().map_err(|e| AppError::Internal(e.to_string()))?,
                };
                Ok(security::absolutize(&security::expand_home(requested), &base))
            }
        }
    }

    async fn try_convert(&self, req: &ConversionRequest) -> AppResult<ConversionSuccess> {
        let base = match &req.base_dir {
            Some(dir) => {
                let dir = self.resolve(dir, None)?;
                if !fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
                    return Err(AppError::NotFound(dir.display().to_string()));
                }
                Some(dir)
            }
            None => None,
        };
        let input = self.resolve(&req.source_path, base.as_deref())?;

        let meta = fs::metadata(&input)
            .await
            .map_err(|_| AppError::NotFound(input.display().to_string()))?;
        if !meta.is_file() {
            return Err(AppError::NotFound(input.display().to_string()));
        }

        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            let shown = if ext.is_empty() { "(none)".to_string() } else { format!(".{ext}") };
            return Err(AppError::UnsupportedFormat(shown));
        }

        // input is absolute by now, so no base is needed
        let output = self.resolve(&webp_sibling(&input).to_string_lossy(), None)?;
        let size_before = meta.len();

        let options = WebpOptions { quality: req.quality, lossless: req.lossless };
        let encoder = self.encoder.clone();
        let src = input.clone();
        let job = tokio::task::spawn_blocking(move || encoder.encode(&src, options));
        // a job abandoned on timeout only drops its bytes; nothing is written
        let bytes = match timeout(self.encode_timeout, job).await {
            Err(_) => {
                return Err(AppError::EncodeFailure(format!(
                    "timed out after {}s",
                    self.encode_timeout.as_secs()
                )))
            }
            Ok(Err(join)) => return Err(AppError::EncodeFailure(join.to_string())),
            Ok(Ok(Err(e))) => return Err(AppError::EncodeFailure(format!("{e:#}"))),
            Ok(Ok(Ok(bytes))) => bytes,
        };

        fs::write(&output, &bytes)
            .await
            .map_err(|e| AppError::EncodeFailure(format!("writing {}: {e}", output.display())))?;
        let size_after = bytes.len() as u64;

        if !req.keep_original {
            fs::remove_file(&input).await.map_err(|e| AppError::DeleteFailure {
                path: input.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        Ok(ConversionSuccess {
            success: true,
            input_path: input.display().to_string(),
            output_path: output.display().to_string(),
            size_before,
            size_after,
            quality: req.quality,
            lossless: req.lossless,
        })
    }
}

/// Same directory and stem, `.webp` extension.
pub fn webp_sibling(input: &Path) -> PathBuf {
    input.with_extension("webp")
}
