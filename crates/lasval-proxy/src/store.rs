//! Versioned cache store
//!
//! Generations are named maps from request key to response. With a root
//! directory the store is persistent: each generation is a directory named
//! after the percent-encoded generation name, and each entry a body file plus
//! a JSON metadata file named after the SHA-256 of the key. The metadata
//! carries the key itself. Memory mirrors disk; writes overwrite by key, so the
//! last writer wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use lasval_core::prelude::*;

use crate::request::{ProxyResponse, ResponseKind};

const BODY_SUFFIX: &str = ".body";
const META_SUFFIX: &str = ".meta.json";

type Generation = HashMap<String, ProxyResponse>;

/// On-disk metadata of one entry
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: String,
    status: u16,
    headers: Vec<(String, String)>,
    kind: ResponseKind,
}

#[derive(Debug, Default)]
pub struct CacheStorage {
    root: Option<PathBuf>,
    caches: RwLock<HashMap<String, Generation>>,
}

impl CacheStorage {
    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or create) a persistent store under `root`, loading every
    /// generation already on disk.
    pub async fn open_dir(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| Error::cache_store(format!("create {}: {}", root.display(), e)))?;

        let mut caches = HashMap::new();
        let mut dirs = tokio::fs::read_dir(&root).await?;
        while let Some(entry) = dirs.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(name) = decode_name(&entry.file_name().to_string_lossy()) else {
                warn!("Skipping cache dir with undecodable name: {:?}", entry.path());
                continue;
            };
            let generation = load_generation(&entry.path()).await?;
            debug!("Loaded cache {} ({} entries)", name, generation.len());
            caches.insert(name, generation);
        }

        info!(
            "Opened cache store at {} ({} generations)",
            root.display(),
            caches.len()
        );
        Ok(Self {
            root: Some(root),
            caches: RwLock::new(caches),
        })
    }

    /// Create the generation if it does not exist yet
    pub async fn open(&self, name: &str) -> Result<()> {
        let mut caches = self.caches.write().await;
        if caches.contains_key(name) {
            return Ok(());
        }
        if let Some(dir) = self.generation_dir(name) {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| Error::cache_store(format!("create {}: {}", dir.display(), e)))?;
        }
        caches.insert(name.to_string(), HashMap::new());
        debug!("Opened cache {}", name);
        Ok(())
    }

    pub async fn has(&self, name: &str) -> bool {
        self.caches.read().await.contains_key(name)
    }

    /// Names of every generation, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove a generation and everything in it. Returns false if absent.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let mut caches = self.caches.write().await;
        if !caches.contains_key(name) {
            return Ok(false);
        }
        // Disk first; memory keeps mirroring disk when the removal fails
        if let Some(dir) = self.generation_dir(name) {
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::cache_store(format!(
                        "remove {}: {}",
                        dir.display(),
                        e
                    )))
                }
            }
        }
        caches.remove(name);
        info!("Deleted cache {}", name);
        Ok(true)
    }

    /// Store `response` under `key`, replacing any previous entry.
    ///
    /// A generation deleted in the meantime is not recreated.
    pub async fn put(&self, name: &str, key: &str, response: ProxyResponse) -> Result<()> {
        let mut caches = self.caches.write().await;
        let Some(generation) = caches.get_mut(name) else {
            debug!("Cache {} is gone, not storing {}", name, key);
            return Ok(());
        };

        if let Some(dir) = self.generation_dir(name) {
            write_entry(&dir, key, &response).await?;
        }
        generation.insert(key.to_string(), response);
        trace!("Stored {} in {}", key, name);
        Ok(())
    }

    pub async fn match_in(&self, name: &str, key: &str) -> Option<ProxyResponse> {
        self.caches
            .read()
            .await
            .get(name)
            .and_then(|generation| generation.get(key))
            .cloned()
    }

    pub async fn entry_count(&self, name: &str) -> usize {
        self.caches
            .read()
            .await
            .get(name)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    fn generation_dir(&self, name: &str) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(encode_name(name)))
    }
}

fn encode_name(name: &str) -> String {
    utf8_percent_encode(name, NON_ALPHANUMERIC).to_string()
}

fn decode_name(encoded: &str) -> Option<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// Fixed-length file stem for an entry, whatever the key length
fn entry_stem(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

async fn write_entry(dir: &Path, key: &str, response: &ProxyResponse) -> Result<()> {
    let stem = entry_stem(key);
    let meta = EntryMeta {
        key: key.to_string(),
        status: response.status,
        headers: response.headers.clone(),
        kind: response.kind,
    };

    tokio::fs::write(dir.join(format!("{stem}{BODY_SUFFIX}")), &response.body)
        .await
        .map_err(|e| Error::cache_store(format!("write body of {}: {}", key, e)))?;
    tokio::fs::write(
        dir.join(format!("{stem}{META_SUFFIX}")),
        serde_json::to_vec(&meta)?,
    )
    .await
    .map_err(|e| Error::cache_store(format!("write meta of {}: {}", key, e)))?;
    Ok(())
}

async fn load_generation(dir: &Path) -> Result<Generation> {
    let mut generation = HashMap::new();
    let mut files = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = files.next_entry().await? {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(stem) = file_name.strip_suffix(META_SUFFIX) else {
            continue;
        };

        let meta: EntryMeta = match tokio::fs::read(entry.path())
            .await
            .map_err(Error::from)
            .and_then(|raw| serde_json::from_slice(&raw).map_err(Error::from))
        {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Skipping unreadable cache entry {:?}: {}", entry.path(), e);
                continue;
            }
        };

        let body = match tokio::fs::read(dir.join(format!("{stem}{BODY_SUFFIX}"))).await {
            Ok(body) => Bytes::from(body),
            Err(e) => {
                warn!("Cache entry {} has no body: {}", meta.key, e);
                continue;
            }
        };

        generation.insert(
            meta.key,
            ProxyResponse {
                status: meta.status,
                headers: meta.headers,
                body,
                kind: meta.kind,
            },
        );
    }
    Ok(generation)
}
