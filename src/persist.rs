use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::context::MatchContext;
use crate::store::MatchStore;

const CACHE_DIR: &str = "matchedge";
const CACHE_FILE: &str = "session.json";
const CACHE_VERSION: u32 = 1;

static CACHE_PATH: OnceCell<Option<PathBuf>> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    store: MatchStore,
    context: MatchContext,
}

/// Loads the previous session's match data and context, if a compatible
/// cache exists. Any read or parse problem just means a fresh session.
pub fn load_session() -> Option<(MatchStore, MatchContext)> {
    load_session_from(cache_path()?)
}

pub fn load_session_from(path: &Path) -> Option<(MatchStore, MatchContext)> {
    let raw = fs::read_to_string(path).ok()?;
    let session = serde_json::from_str::<SessionFile>(&raw).ok()?;
    if session.version != CACHE_VERSION {
        return None;
    }
    Some((session.store, session.context))
}

/// Persists the session. Best-effort: failures are swallowed, the data
/// still lives in the running app.
pub fn save_session(store: &MatchStore, context: &MatchContext) {
    if let Some(path) = cache_path() {
        save_session_to(path, store, context);
    }
}

pub fn save_session_to(path: &Path, store: &MatchStore, context: &MatchContext) {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }

    let session = SessionFile {
        version: CACHE_VERSION,
        store: store.clone(),
        context: context.clone(),
    };
    if let Ok(json) = serde_json::to_string(&session) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, path);
        }
    }
}

/// Removes the persisted session alongside a clear-all.
pub fn clear_session() {
    if let Some(path) = cache_path() {
        let _ = fs::remove_file(path);
    }
}

fn cache_path() -> Option<&'static PathBuf> {
    CACHE_PATH.get_or_init(resolve_cache_path).as_ref()
}

fn resolve_cache_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}
