use crate::domain::ports::SessionStore;
use crate::utils::error::{FenceError, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Digits only, so "12 34" and "1-2-3-4" both count as 1234.
pub fn normalize_pin(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// PIN check in front of the quote tool. The open/closed flag lives in the
/// injected [`SessionStore`] so it survives restarts.
pub struct AccessGate<S: SessionStore> {
    store: S,
    pin: String,
}

impl<S: SessionStore> AccessGate<S> {
    pub fn new(store: S, pin: &str) -> Self {
        Self {
            store,
            pin: normalize_pin(pin),
        }
    }

    pub async fn is_open(&self) -> Result<bool> {
        self.store.load_flag().await
    }

    pub async fn login(&self, attempt: &str) -> Result<()> {
        if normalize_pin(attempt) != self.pin {
            tracing::info!("🔒 Rejected PIN attempt");
            return Err(FenceError::AccessDenied {
                message: format!("Incorrect PIN. Try {} for the demo.", self.pin),
            });
        }
        self.store.store_flag().await?;
        tracing::info!("🔓 Access granted");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.clear_flag().await?;
        tracing::info!("🔒 Logged out");
        Ok(())
    }

    /// Opens the gate from the stored flag, or from `attempt` when given.
    pub async fn ensure_open(&self, attempt: Option<&str>) -> Result<()> {
        if self.is_open().await? {
            return Ok(());
        }
        match attempt {
            Some(attempt) => self.login(attempt).await,
            None => Err(FenceError::AccessDenied {
                message: "Enter PIN to continue.".to_string(),
            }),
        }
    }
}

/// Session flag that lasts as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    authed: AtomicBool,
}

impl SessionStore for MemorySessionStore {
    async fn load_flag(&self) -> Result<bool> {
        Ok(self.authed.load(Ordering::SeqCst))
    }

    async fn store_flag(&self) -> Result<()> {
        self.authed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_flag(&self) -> Result<()> {
        self.authed.store(false, Ordering::SeqCst);
        Ok(())
    }
}
