use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// The signed-in state: bearer token plus the identity it was issued for.
///
/// Both fields are set and cleared together. The identity is persisted
/// alongside the token so that mention detection still has a name to compare
/// against after a process restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub identity: Option<String>,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

/// Durable holder of the current [`Session`].
///
/// The session is mirrored in memory and written to a single JSON file under
/// the store root; a freshly opened store picks up whatever the previous
/// process left behind without re-validating the token.
#[derive(Clone)]
pub struct SessionStore {
    root: PathBuf,
    current: Arc<RwLock<Session>>,
}

impl SessionStore {
    pub fn new(root: PathBuf) -> Self {
        fs::create_dir_all(&root).ok();
        let current = load_session(&session_path(&root));
        Self {
            root,
            current: Arc::new(RwLock::new(current)),
        }
    }

    pub fn in_memory() -> Self {
        let mut path = std::env::temp_dir();
        path.push(format!("ripple-{}", Uuid::new_v4()));
        Self::new(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self) -> Session {
        self.current.read().clone()
    }

    /// Persists the new session, then swaps the in-memory copy.
    pub fn set(&self, token: impl Into<String>, identity: impl Into<String>) -> Result<()> {
        let session = Session {
            token: Some(token.into()),
            identity: Some(identity.into()),
        };
        let serialized = serde_json::to_vec_pretty(&session)?;
        fs::write(session_path(&self.root), serialized)?;
        *self.current.write() = session;
        Ok(())
    }

    /// Removes the persisted session and resets the in-memory copy.
    /// Clearing an already-empty store is a no-op.
    pub fn clear(&self) -> Result<()> {
        let path = session_path(&self.root);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        *self.current.write() = Session::default();
        Ok(())
    }
}

fn session_path(root: &Path) -> PathBuf {
    root.join("session.json")
}

fn load_session(path: &Path) -> Session {
    let Ok(contents) = fs::read_to_string(path) else {
        return Session::default();
    };
    match serde_json::from_str(&contents) {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(%err, "failed to parse session.json, starting signed out");
            Session::default()
        }
    }
}
