//! Session-scoped token storage and the longer-lived display profile.
//!
//! The bearer token lives only in process memory, mirroring browser session
//! storage: it is gone when the process ends and is never written to disk.
//! The human-visible username survives restarts in a small JSON profile
//! file, written with a tmp-then-rename so a crash never leaves a torn file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Shared, process-wide store for the bearer token and its role mirror.
///
/// An absent token is a normal state, not an error. `Clone` is cheap; all
/// clones observe the same slot.
///
/// # Panics
///
/// Accessors panic if the inner [`RwLock`] is poisoned (a writer panicked
/// while holding the lock). This is treated as an invariant violation.
#[derive(Clone, Debug, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    token: Option<String>,
    role: Option<String>,
}

impl TokenStore {
    /// Create an empty store (anonymous session).
    pub fn new() -> Self {
        Self::default()
    }

    /// The current bearer token, if one is set.
    pub fn get(&self) -> Option<String> {
        self.inner.read().expect("token store lock poisoned").token.clone()
    }

    /// Store a freshly issued token. Does not touch the role mirror; callers
    /// are expected to follow up with a session refresh, which recomputes it.
    pub fn set(&self, token: impl Into<String>) {
        self.inner.write().expect("token store lock poisoned").token = Some(token.into());
    }

    /// Clear the token, returning `true` upon completion.
    ///
    /// Clearing an already-empty store is fine and still returns `true`.
    pub fn remove(&self) -> bool {
        self.inner.write().expect("token store lock poisoned").token = None;
        true
    }

    /// The mirrored role string extracted from the token payload, if any.
    pub fn role(&self) -> Option<String> {
        self.inner.read().expect("token store lock poisoned").role.clone()
    }

    /// Replace the mirrored role string.
    pub fn set_role(&self, role: Option<String>) {
        self.inner.write().expect("token store lock poisoned").role = role;
    }

    /// Clear both the token and the role mirror in one write.
    pub fn clear(&self) {
        let mut slot = self.inner.write().expect("token store lock poisoned");
        slot.token = None;
        slot.role = None;
    }
}

/// On-disk shape of the display profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileData {
    /// Display-only username shown in greetings and the logout farewell.
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

/// Longer-lived storage for display-only user data.
///
/// Holds nothing security-relevant: losing or corrupting the file only costs
/// a greeting. Loads are therefore lenient (missing or corrupt file becomes
/// an empty profile with a warning) while saves are atomic.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    data: Arc<RwLock<ProfileData>>,
}

impl ProfileStore {
    /// Open the profile stored in `dir`, creating an empty one in memory if
    /// no usable file exists yet.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` for read failures other than file-not-found.
    /// A corrupt file is not an error: it is logged and replaced on the next
    /// save.
    pub fn open(dir: &Path) -> io::Result<Self> {
        let path = dir.join("profile.json");
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "corrupt profile file, starting empty"
                    );
                    ProfileData::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => ProfileData::default(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// The stored display username, if any.
    pub fn username(&self) -> Option<String> {
        self.data.read().expect("profile lock poisoned").username.clone()
    }

    /// Replace the display username and persist the profile.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if directory creation, file writing, or renaming
    /// fails. The in-memory value is updated regardless, so the UI stays
    /// consistent even when the disk write fails.
    pub fn set_username(&self, username: Option<String>) -> io::Result<()> {
        {
            let mut data = self.data.write().expect("profile lock poisoned");
            data.username = username;
        }
        self.save()
    }

    /// Persist the current profile atomically (write tmp, rename over).
    fn save(&self) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let data = self.data.read().expect("profile lock poisoned").clone();
        let json = serde_json::to_string_pretty(&data).map_err(io::Error::other)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
