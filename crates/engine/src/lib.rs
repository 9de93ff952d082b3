use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;

pub use app::{
    parse_hex_color, run_app, world_to_screen_px, AppError, Camera2D, InputAction, InputSnapshot,
    LoopConfig, Rect, Renderer, Rgba, Scene, SceneCommand, SceneKey, SceneWorld, Shape, ShapeKind,
    Vec2, Viewport, MAX_OPTION_KEYS,
};
pub use content::{read_json_file, write_json_file_atomic, write_text_atomic, JsonFileError};

pub const ROOT_ENV_VAR: &str = "ISURV_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub base_content_dir: PathBuf,
    pub saves_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create saves directory at {path}: {source}")]
    CreateSavesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "ISURV_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/infinite-survival\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let paths = app_paths_for_root(root);

    fs::create_dir_all(&paths.saves_dir).map_err(|source| StartupError::CreateSavesDir {
        path: paths.saves_dir.clone(),
        source,
    })?;

    Ok(paths)
}

/// Directory layout below a project root. Does not touch the filesystem.
pub fn app_paths_for_root(root: PathBuf) -> AppPaths {
    let base_content_dir = root.join("assets").join("base");
    let saves_dir = root.join("saves");
    AppPaths {
        root,
        base_content_dir,
        saves_dir,
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => root_from_override(Path::new(&value)),
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_above(exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn root_from_override(raw: &Path) -> Result<PathBuf, StartupError> {
    let path = normalize_path(raw);
    if is_project_root(&path) {
        Ok(path)
    } else {
        Err(StartupError::InvalidEnvRoot { path })
    }
}

/// Nearest ancestor of `start` (inclusive) that looks like a project root.
fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_project_root(candidate))
        .map(normalize_path)
}

fn is_project_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file()
        && (path.join("crates").is_dir() || path.join("assets").is_dir())
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
