use crate::domain::ports::SessionStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct SessionFlag {
    authed: bool,
    authed_at: DateTime<Utc>,
}

/// 以本機檔案保存登入旗標，跨次執行保留
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    async fn load_flag(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let data = fs::read(&self.path)?;
        match serde_json::from_slice::<SessionFlag>(&data) {
            Ok(flag) => {
                tracing::debug!("Session flag set at {}", flag.authed_at);
                Ok(flag.authed)
            }
            Err(e) => {
                // 壞掉的檔案視同未登入
                tracing::warn!("⚠️ Ignoring unreadable session file {:?}: {}", self.path, e);
                Ok(false)
            }
        }
    }

    async fn store_flag(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let flag = SessionFlag {
            authed: true,
            authed_at: Utc::now(),
        };
        fs::write(&self.path, serde_json::to_vec_pretty(&flag)?)?;
        Ok(())
    }

    async fn clear_flag(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
