//! # cf-storage-local
//! community-forum/crates/cf-plugins/cf-storage-local/src/lib.rs
//! Local filesystem implementation of `KvStore`.
//! Features: one file per key, hashed file names, directory sharding, and
//! write-then-rename so a reader never sees a half-written blob.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cf_core::error::Result;
use cf_core::traits::KvStore;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

pub struct LocalKvStore {
    /// Root directory for all values (e.g., "./data/forum")
    root_path: PathBuf,
    /// Disambiguates temp files of concurrent writes to the same key
    write_seq: AtomicU64,
}

impl LocalKvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root.into(),
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Generates a sharded path: "ab/cd/abcd...hash.json"
    fn get_sharded_path(&self, key: &str) -> PathBuf {
        let hash = hex::encode(Sha256::digest(key.as_bytes()));
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(format!("{hash}.json"));
        path
    }
}

#[async_trait]
impl KvStore for LocalKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.get_sharded_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let target_path = self.get_sharded_path(key);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp_path = target_path.with_extension(format!("{}.{seq}.tmp", std::process::id()));
        fs::write(&tmp_path, value).await?;
        if let Err(e) = fs::rename(&tmp_path, &target_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(key, path = %target_path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.get_sharded_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let kv = LocalKvStore::new(dir.path());
        assert_eq!(kv.get("community_forum_posts_v2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let kv = LocalKvStore::new(dir.path());

        kv.set("posts", br#"[{"id":"p1"}]"#).await.unwrap();
        kv.set("posts", b"[]").await.unwrap();
        assert_eq!(kv.get("posts").await.unwrap(), Some(b"[]".to_vec()));

        // a fresh handle over the same directory sees the same data
        let reopened = LocalKvStore::new(dir.path());
        assert_eq!(reopened.get("posts").await.unwrap(), Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_sharded_layout_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let kv = LocalKvStore::new(dir.path());
        kv.set("posts", b"[]").await.unwrap();

        let path = kv.get_sharded_path("posts");
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name.len(), 64 + ".json".len());
        let inner = path.parent().unwrap();
        let outer = inner.parent().unwrap();
        assert_eq!(inner.file_name().unwrap().to_string_lossy(), name[2..4]);
        assert_eq!(outer.file_name().unwrap().to_string_lossy(), name[0..2]);

        let siblings = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let kv = LocalKvStore::new(dir.path());
        kv.set("posts", b"[]").await.unwrap();

        kv.delete("posts").await.unwrap();
        kv.delete("posts").await.unwrap();
        assert_eq!(kv.get("posts").await.unwrap(), None);
    }
}
