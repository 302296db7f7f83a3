//! Path sandbox: every path a conversion touches must resolve under one of
//! the directories fixed at startup.

use crate::errors::AppError;
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
struct AllowedDir {
    /// Symlinks resolved; the authoritative form.
    real: PathBuf,
    /// Absolute and normalized, as the operator wrote it.
    nominal: PathBuf,
}

/// Ordered, immutable set of allow-listed roots.
#[derive(Debug, Clone)]
pub struct AllowedDirectorySet {
    dirs: Vec<AllowedDir>,
}

impl AllowedDirectorySet {
    /// Each root must exist and be a directory.
    pub fn new<P: AsRef<Path>>(roots: &[P]) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let mut dirs: Vec<AllowedDir> = Vec::with_capacity(roots.len());
        for root in roots {
            let expanded = expand_home(&root.as_ref().to_string_lossy());
            let nominal = absolutize(&expanded, &cwd);
            let real = dunce::canonicalize(&nominal)
                .map_err(|e| anyhow::anyhow!("cannot access {}: {e}", nominal.display()))?;
            if !real.is_dir() {
                anyhow::bail!("not a directory: {}", nominal.display());
            }
            if dirs.iter().any(|d| d.real == real) {
                continue;
            }
            dirs.push(AllowedDir { real, nominal });
        }
        if dirs.is_empty() {
            anyhow::bail!("at least one allowed directory is required");
        }
        Ok(Self { dirs })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(|d| d.real.as_path())
    }

    fn admits_nominal(&self, path: &Path) -> bool {
        self.dirs.iter().any(|d| path.starts_with(&d.nominal) || path.starts_with(&d.real))
    }

    fn admits_real(&self, path: &Path) -> bool {
        self.dirs.iter().any(|d| path.starts_with(&d.real))
    }
}

#[derive(Debug, Clone)]
pub struct PathSandbox {
    allowed: AllowedDirectorySet,
}

impl PathSandbox {
    pub fn new(allowed: AllowedDirectorySet) -> Self { Self { allowed } }

    pub fn allowed(&self) -> &AllowedDirectorySet { &self.allowed }

    /// Relative paths resolve against the process working directory.
    pub fn validate(&self, requested: &str) -> Result<PathBuf, AppError> {
        let cwd = std::env::current_dir().map_err(|e| AppError::Internal(e.to_string()))?;
        self.validate_from(requested, &cwd)
    }

    pub fn validate_from(&self, requested: &str, base: &Path) -> Result<PathBuf, AppError> {
        let expanded = expand_home(requested);
        let normalized = absolutize(&expanded, base);
        let shown = normalized.display().to_string();

        // nothing outside the sandbox is stat'ed, not even to report it missing
        if !self.allowed.admits_nominal(&normalized) {
            return Err(AppError::AccessDenied(shown));
        }

        match dunce::canonicalize(&normalized) {
            Ok(real) => {
                if self.allowed.admits_real(&real) {
                    Ok(real)
                } else {
                    tracing::warn!(requested = %shown, resolved = %real.display(), "symlink escapes sandbox");
                    Err(AppError::AccessDenied(shown))
                }
            }
            Err(_) => {
                if fs::symlink_metadata(&normalized).map(|m| m.file_type().is_symlink()).unwrap_or(false) {
                    tracing::warn!(requested = %shown, "dangling symlink rejected");
                    return Err(AppError::AccessDenied(shown));
                }
                let parent = normalized.parent().ok_or_else(|| AppError::ParentNotFound(shown.clone()))?;
                let real_parent = dunce::canonicalize(parent)
                    .map_err(|_| AppError::ParentNotFound(parent.display().to_string()))?;
                if self.allowed.admits_real(&real_parent) {
                    Ok(normalized)
                } else {
                    Err(AppError::AccessDenied(shown))
                }
            }
        }
    }
}

/// `~` and `~/rest` expand to the user's home directory.
pub fn expand_home(input: &str) -> PathBuf {
    if input == "~" || input.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return match input.strip_prefix("~/") {
                Some(rest) => home.join(rest),
                None => home,
            };
        }
    }
    PathBuf::from(input)
}

/// Join onto `base` when relative, then fold `.` and `..` lexically.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() { path.to_path_buf() } else { base.join(path) };
    normalize(&joined)
}

pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                // popping past the root stays at the root
                if !matches!(out.components().next_back(), Some(Component::RootDir | Component::Prefix(_)) | None) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
