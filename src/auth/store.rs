//! Bearer token storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use arc_swap::ArcSwapOption;

/// Where the bearer token lives between requests.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: ArcSwapOption<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.token.store(Some(Arc::new(token.into())));
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.load_full().map(|t| t.as_ref().clone())
    }

    fn set(&self, token: &str) -> io::Result<()> {
        self.token.store(Some(Arc::new(token.to_string())));
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.token.store(None);
        Ok(())
    }
}

/// Token storage persisted to a file, cached in memory.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: MemoryTokenStore,
}

impl FileTokenStore {
    /// Open the store, loading any token already on disk.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cached = MemoryTokenStore::new();
        match fs::read_to_string(&path) {
            Ok(content) => {
                let token = content.trim();
                if !token.is_empty() {
                    cached.set(token)?;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(Self { path, cached })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.cached.get()
    }

    fn set(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        self.cached.set(token)
    }

    fn clear(&self) -> io::Result<()> {
        self.cached.clear()?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
