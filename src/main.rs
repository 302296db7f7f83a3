mod config;
mod convert;
mod errors;
mod logging;
mod mcp;
mod security;
mod server;
mod tools;


use crate::{
    config::Config,
    convert::{ConversionGateway, WebpEncoder},
    security::{AllowedDirectorySet, PathSandbox},
};
use anyhow::Context;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;

const USAGE: &str = "usage: webpgate [--config <file>] <allowed-directory>...";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut roots: Vec<PathBuf> = Vec::new();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i >= args.len() { eprintln!("--config requires a path"); std::process::exit(2); }
                config_path = Some(PathBuf::from(&args[i]));
            }
            "-h" | "--help" => { println!("{USAGE}"); return Ok(()); }
            dir => roots.push(security::expand_home(dir)),
        }
        i += 1;
    }

    let mut cfg = match &config_path {
        Some(p) => Config::load(p).with_context(|| format!("loading config {}", p.display()))?,
        None => Config::default(),
    };
    logging::init(&cfg.logging);

    cfg.sandbox.allowed_dirs = cfg
        .sandbox
        .allowed_dirs
        .iter()
        .map(|d| security::expand_home(&d.to_string_lossy()))
        .chain(roots)
        .collect();
    if cfg.sandbox.allowed_dirs.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }
    cfg.validate().context("validating config")?;

    let allowed = AllowedDirectorySet::new(&cfg.sandbox.allowed_dirs).context("building allowed directory set")?;
    let sandbox = Arc::new(PathSandbox::new(allowed));
    let gateway = Arc::new(ConversionGateway::new(
        Some(sandbox.clone()),
        Arc::new(WebpEncoder),
        Duration::from_secs(cfg.limits.encode_timeout_s),
    ));
    let registry = mcp::registry::ToolRegistry::new(&cfg, sandbox.clone(), gateway)?;

    let dirs: Vec<String> = sandbox.allowed().iter().map(|d| d.display().to_string()).collect();
    info!(allowed_dirs = ?dirs, tools = ?registry.list_names(), "webpgate ready");

    let state = server::AppState { cfg: Arc::new(cfg), registry: Arc::new(registry) };
    server::serve_stdio(state).await
}
