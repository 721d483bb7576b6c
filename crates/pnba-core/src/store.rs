use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{domain::SessionBlob, errors::Error, phone::PhoneNumber, Result};

/// Durable session material for one phone number.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    blob: SessionBlob,
    created_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(blob: SessionBlob, now: DateTime<Utc>) -> Self {
        Self {
            blob,
            created_at: now,
            last_used_at: now,
        }
    }

    pub fn blob(&self) -> &SessionBlob {
        &self.blob
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> DateTime<Utc> {
        self.last_used_at
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_used_at = now;
    }
}

/// Key-value boundary over `PhoneNumber -> SessionRecord`.
///
/// Per-key writes are atomic (a reader sees the old record or the new one,
/// never a torn write) and cross-key operations are independent. Same-phone
/// serialization across operations is explicitly the caller's concern.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Overwrites any existing record for `phone`.
    async fn put(&self, phone: &PhoneNumber, record: &SessionRecord) -> Result<()>;

    async fn get(&self, phone: &PhoneNumber) -> Result<Option<SessionRecord>>;

    /// Idempotent; deleting a missing record is not an error.
    async fn delete(&self, phone: &PhoneNumber) -> Result<()>;
}

/// File-backed store: one JSON file per phone number under `dir`, named by
/// the hex SHA-256 of the normalized number.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, phone: &PhoneNumber) -> PathBuf {
        let digest = Sha256::digest(phone.as_str().as_bytes());
        let name: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn put(&self, phone: &PhoneNumber, record: &SessionRecord) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(Error::storage)?;

        let path = self.record_path(phone);
        let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
        let body = serde_json::to_vec(record).map_err(Error::storage)?;

        // Write-to-temp-then-rename keeps the commit atomic per key.
        tokio::fs::write(&tmp, &body).await.map_err(Error::storage)?;
        tokio::fs::rename(&tmp, &path).await.map_err(Error::storage)?;
        Ok(())
    }

    async fn get(&self, phone: &PhoneNumber) -> Result<Option<SessionRecord>> {
        let bytes = match tokio::fs::read(self.record_path(phone)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage(e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(Error::storage)
    }

    async fn delete(&self, phone: &PhoneNumber) -> Result<()> {
        match tokio::fs::remove_file(self.record_path(phone)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(e)),
        }
    }
}
