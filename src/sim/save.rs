/// Profile persistence: one JSON document, username → profile.
///
/// ## Semantics
///
///   **Load** never fails: a missing or unparsable file reads as an empty map.
///
///   **Save** rewrites the whole document (read → replace entry → write).
///   Write failures are returned; losing a save silently is not acceptable.
///
/// Concurrent processes are not coordinated: two writers racing on the
/// same file can drop one update. Fine for a one-player terminal game.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::profile::PlayerProfile;
use crate::error::GameError;

pub const PROFILE_FILE: &str = "profiles.json";

pub type ProfileMap = BTreeMap<String, PlayerProfile>;

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// Default location for save data when the config does not name one.
pub fn default_data_dir() -> PathBuf {
    // 1. Exe directory, if writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let test_path = parent.join(".write_test_hangman");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/hangman");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Write `contents` to `path`, creating parent directories as needed.
pub(crate) fn write_document(path: &Path, contents: &str) -> Result<(), GameError> {
    let persist = |source| GameError::Persist { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(persist)?;
    }
    std::fs::write(path, contents).map_err(persist)
}

// ══════════════════════════════════════════════════════════════
// Store
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProfileStore { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PROFILE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_all(&self) -> ProfileMap {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no profile store, starting empty");
                return ProfileMap::new();
            }
        };
        match serde_json::from_str::<ProfileMap>(&text) {
            Ok(mut map) => {
                map.values_mut().for_each(PlayerProfile::backfill);
                map
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "profile store unreadable, treating as empty");
                ProfileMap::new()
            }
        }
    }

    /// Existing profile (back-filled) or a fresh default; persisted either way.
    pub fn get_or_create(&self, username: &str) -> Result<PlayerProfile, GameError> {
        let mut all = self.load_all();
        let profile = all.entry(username.to_string()).or_default().clone();
        self.write_all(&all)?;
        Ok(profile)
    }

    pub fn save(&self, username: &str, profile: &PlayerProfile) -> Result<(), GameError> {
        let mut all = self.load_all();
        all.insert(username.to_string(), profile.clone());
        self.write_all(&all)
    }

    /// Top `limit` players by points; ties broken by name.
    pub fn leaderboard(&self, limit: usize) -> Vec<(String, PlayerProfile)> {
        let mut ranked: Vec<_> = self.load_all().into_iter().collect();
        ranked.sort_by(|(an, a), (bn, b)| b.points.cmp(&a.points).then_with(|| an.cmp(bn)));
        ranked.truncate(limit);
        ranked
    }

    fn write_all(&self, all: &ProfileMap) -> Result<(), GameError> {
        let text = serde_json::to_string_pretty(all)?;
        write_document(&self.path, &text)
    }
}
