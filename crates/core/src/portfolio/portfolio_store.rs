//! JSON file store behind a single writer.
//!
//! All reads and writes run on one dedicated thread that owns the file, fed
//! by an mpsc queue. Concurrent callers are therefore serialised and no
//! read-modify-write cycle can interleave with another.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::portfolio::portfolio_model::{Position, PositionPatch};
use crate::portfolio::portfolio_traits::PortfolioRepositoryTrait;

// A job runs against the file path and reports through its own oneshot.
type Job = Box<dyn FnOnce(&Path) + Send + 'static>;

#[derive(Debug, Default, Deserialize)]
struct PortfolioFile {
    #[serde(default)]
    portfolio: Vec<Position>,
}

#[derive(Serialize)]
struct PortfolioFileRef<'a> {
    portfolio: &'a [Position],
}

pub struct JsonPortfolioStore {
    tx: mpsc::Sender<Job>,
    path: PathBuf,
}

impl JsonPortfolioStore {
    /// Spawn the writer thread for the file at `path`.
    ///
    /// The file need not exist; a missing file reads as an empty portfolio.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        // Pending jobs queue here; senders wait when it is full.
        let (tx, mut rx) = mpsc::channel::<Job>(1024);

        let actor_path = path.clone();
        std::thread::Builder::new()
            .name("portfolio-writer".to_string())
            .spawn(move || {
                while let Some(job) = rx.blocking_recv() {
                    job(&actor_path);
                }
                debug!("Portfolio writer for {} stopped", actor_path.display());
            })?;

        Ok(Self { tx, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `job` on the writer thread against the loaded positions.
    ///
    /// The file is rewritten only when the job succeeds and changed the list.
    async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Position>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (ret_tx, ret_rx) = oneshot::channel();
        let boxed: Job = Box::new(move |path| {
            // Ignore a dropped receiver: the caller went away.
            let _ = ret_tx.send(read_modify_write(path, job));
        });

        self.tx
            .send(boxed)
            .await
            .map_err(|_| Error::Storage("Portfolio writer is not running".to_string()))?;
        ret_rx
            .await
            .map_err(|_| Error::Storage("Portfolio writer dropped the reply".to_string()))?
    }
}

fn read_modify_write<F, T>(path: &Path, job: F) -> Result<T>
where
    F: FnOnce(&mut Vec<Position>) -> Result<T>,
{
    let mut positions = load(path)?;
    let before = positions.clone();
    let out = job(&mut positions)?;
    if positions != before {
        save(path, &positions)?;
    }
    Ok(out)
}

fn load(path: &Path) -> Result<Vec<Position>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let file: PortfolioFile = serde_json::from_str(&raw).map_err(|e| {
        error!("Malformed portfolio file {}: {}", path.display(), e);
        Error::Storage(format!("Malformed portfolio file: {}", e))
    })?;
    Ok(file.portfolio)
}

/// Write to a sibling temp file, then rename it over the original.
fn save(path: &Path, positions: &[Position]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, &PortfolioFileRef { portfolio: positions })?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Storage(e.to_string()))?;

    debug!("Wrote {} positions to {}", positions.len(), path.display());
    Ok(())
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("Position {}", id))
}

#[async_trait]
impl PortfolioRepositoryTrait for JsonPortfolioStore {
    async fn list(&self) -> Result<Vec<Position>> {
        self.exec(|positions| {
            for p in positions.iter_mut().filter(|p| p.id.is_empty()) {
                p.id = Uuid::new_v4().to_string();
            }
            Ok(positions.clone())
        })
        .await
    }

    async fn add(&self, position: Position) -> Result<Position> {
        self.exec(move |positions| {
            positions.push(position.clone());
            Ok(position)
        })
        .await
    }

    async fn update(&self, id: &str, patch: PositionPatch) -> Result<Position> {
        let id = id.to_string();
        self.exec(move |positions| {
            let slot = positions
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| not_found(&id))?;
            let updated = patch.apply(slot)?;
            *slot = updated.clone();
            Ok(updated)
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<Position> {
        let id = id.to_string();
        self.exec(move |positions| {
            let index = positions
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| not_found(&id))?;
            Ok(positions.remove(index))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::NewPosition;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn new_position(ticker: &str) -> Position {
        NewPosition {
            ticker: Some(ticker.to_string()),
            shares: Some(dec!(10)),
            avg_price: Some(dec!(50)),
            ..Default::default()
        }
        .into_position()
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonPortfolioStore::open(dir.path().join("portfolio.json")).unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_add_writes_pretty_wrapper() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        let store = JsonPortfolioStore::open(&path).unwrap();

        let added = store.add(new_position("KO")).await.unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"portfolio\": ["));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["portfolio"][0]["id"], added.id.as_str());
        assert_eq!(value["portfolio"][0]["avgPrice"], serde_json::json!(50.0));
    }

    #[tokio::test]
    async fn test_list_assigns_missing_ids_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        fs::write(
            &path,
            r#"{"portfolio": [{"ticker": "KO", "shares": 3, "avgPrice": 55.5}]}"#,
        )
        .unwrap();
        let store = JsonPortfolioStore::open(&path).unwrap();

        let first = store.list().await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(!first[0].id.is_empty());

        let second = store.list().await.unwrap();
        assert_eq!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_leaves_file_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        let store = JsonPortfolioStore::open(&path).unwrap();
        store.add(new_position("KO")).await.unwrap();
        let before = fs::read(&path).unwrap();

        let result = store.delete("no-such-id").await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let dir = tempdir().unwrap();
        let store = JsonPortfolioStore::open(dir.path().join("portfolio.json")).unwrap();
        let added = store.add(new_position("KO")).await.unwrap();

        let updated = store
            .update(
                &added.id,
                PositionPatch {
                    shares: Some(dec!(15)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.shares, dec!(15));

        let removed = store.delete(&added.id).await.unwrap();
        assert_eq!(removed.id, added.id);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_update_is_not_persisted() {
        let dir = tempdir().unwrap();
        let store = JsonPortfolioStore::open(dir.path().join("portfolio.json")).unwrap();
        let added = store.add(new_position("KO")).await.unwrap();

        let result = store
            .update(
                &added.id,
                PositionPatch {
                    shares: Some(dec!(0)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.list().await.unwrap()[0].shares, dec!(10));
    }

    #[tokio::test]
    async fn test_malformed_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonPortfolioStore::open(&path).unwrap();

        assert!(matches!(store.list().await, Err(Error::Storage(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_all_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        let store = Arc::new(JsonPortfolioStore::open(&path).unwrap());

        let handles: Vec<_> = (0..25)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.add(new_position(&format!("T{}", i))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = JsonPortfolioStore::open(&path).unwrap();
        assert_eq!(reopened.list().await.unwrap().len(), 25);
    }
}
