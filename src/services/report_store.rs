//! Report artifact directory
//!
//! One JSON file per generation run, named after the generation date
//! (`report_YYYYMMDD.json`, then `report_YYYYMMDD_2.json`, ... for later runs on
//! the same day). `index.json` records a monotonically increasing sequence and the
//! latest artifact, so "latest" does not depend on filesystem timestamps.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};

use crate::{error::AppError, models::report::LibraryReport};

const INDEX_FILE: &str = "index.json";
const ARTIFACT_PREFIX: &str = "report_";
const ARTIFACT_SUFFIX: &str = ".json";

#[derive(Error, Debug)]
pub enum ReportStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Report write task failed: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

impl From<ReportStoreError> for AppError {
    fn from(e: ReportStoreError) -> Self {
        match e {
            ReportStoreError::Corrupt { .. } => AppError::CorruptReport(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

type StoreResult<T> = Result<T, ReportStoreError>;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ReportStoreError + '_ {
    move |source| ReportStoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReportIndex {
    sequence: u64,
    latest: Option<String>,
}

#[derive(Clone)]
pub struct ReportStore {
    directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl ReportStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Persist a report as a new artifact and return its file name.
    ///
    /// Prior artifacts are never overwritten. The write runs on its own task, so
    /// dropping the returned future does not leave an artifact without its index
    /// entry.
    pub async fn write(&self, report: &LibraryReport) -> StoreResult<String> {
        let store = self.clone();
        let report = report.clone();
        tokio::spawn(async move { store.write_locked(&report).await }).await?
    }

    async fn write_locked(&self, report: &LibraryReport) -> StoreResult<String> {
        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&self.directory)
            .await
            .map_err(io_err(&self.directory))?;

        let date = report.timestamp.format("%Y%m%d").to_string();
        let name = self.free_artifact_name(&date).await?;
        let body = serde_json::to_vec_pretty(report)?;
        self.write_atomic(&name, &body).await?;

        let mut index = match self.read_index().await {
            Ok(index) => index.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Rebuilding report index: {}", e);
                ReportIndex::default()
            }
        };
        index.sequence += 1;
        index.latest = Some(name.clone());
        self.write_atomic(INDEX_FILE, &serde_json::to_vec(&index)?).await?;

        tracing::info!(
            artifact = %name,
            sequence = index.sequence,
            path = %self.directory.display(),
            "Report artifact written"
        );
        Ok(name)
    }

    /// Latest artifact, or `None` when no report has been generated yet
    pub async fn latest(&self) -> StoreResult<Option<(String, LibraryReport)>> {
        if !self.exists(&self.directory).await? {
            return Ok(None);
        }

        let indexed = match self.read_index().await {
            Ok(index) => index.and_then(|i| i.latest).filter(|name| {
                let valid = is_artifact_name(name) && !name.contains(|c: char| c == '/' || c == '\\');
                if !valid {
                    tracing::warn!(artifact = %name, "Ignoring invalid artifact name in report index");
                }
                valid
            }),
            Err(e) => {
                tracing::warn!("Ignoring report index: {}", e);
                None
            }
        };

        let name = match indexed {
            Some(name) => {
                if self.exists(&self.directory.join(&name)).await? {
                    Some(name)
                } else {
                    tracing::warn!(artifact = %name, "Indexed report artifact is missing, scanning directory");
                    self.newest_by_mtime().await?
                }
            }
            None => self.newest_by_mtime().await?,
        };

        match name {
            Some(name) => {
                let report = self.read_artifact(&name).await?;
                Ok(Some((name, report)))
            }
            None => Ok(None),
        }
    }

    async fn read_artifact(&self, name: &str) -> StoreResult<LibraryReport> {
        let path = self.directory.join(name);
        let bytes = fs::read(&path).await.map_err(io_err(&path))?;
        serde_json::from_slice(&bytes).map_err(|source| ReportStoreError::Corrupt { path, source })
    }

    async fn read_index(&self) -> StoreResult<Option<ReportIndex>> {
        let path = self.directory.join(INDEX_FILE);
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| ReportStoreError::Corrupt { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    /// Fallback for directories without an index
    async fn newest_by_mtime(&self) -> StoreResult<Option<String>> {
        let mut entries = fs::read_dir(&self.directory)
            .await
            .map_err(io_err(&self.directory))?;

        let mut newest: Option<(SystemTime, String)> = None;
        while let Some(entry) = entries.next_entry().await.map_err(io_err(&self.directory))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_artifact_name(&name) {
                continue;
            }
            let modified = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .map_err(io_err(&entry.path()))?;
            let candidate = (modified, name);
            if newest.as_ref().map_or(true, |current| candidate > *current) {
                newest = Some(candidate);
            }
        }

        Ok(newest.map(|(_, name)| name))
    }

    async fn free_artifact_name(&self, date: &str) -> StoreResult<String> {
        let mut n = 1u32;
        loop {
            let name = artifact_name(date, n);
            if !self.exists(&self.directory.join(&name)).await? {
                return Ok(name);
            }
            n += 1;
        }
    }

    /// Write to a hidden temporary file, then rename into place
    async fn write_atomic(&self, name: &str, body: &[u8]) -> StoreResult<()> {
        let tmp = self.directory.join(format!(".{}.tmp", name));
        let target = self.directory.join(name);

        let mut file = fs::File::create(&tmp).await.map_err(io_err(&tmp))?;
        file.write_all(body).await.map_err(io_err(&tmp))?;
        file.sync_all().await.map_err(io_err(&tmp))?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(io_err(&target)(e));
        }
        Ok(())
    }

    async fn exists(&self, path: &Path) -> StoreResult<bool> {
        fs::try_exists(path).await.map_err(io_err(path))
    }
}

fn artifact_name(date: &str, n: u32) -> String {
    if n <= 1 {
        format!("{}{}{}", ARTIFACT_PREFIX, date, ARTIFACT_SUFFIX)
    } else {
        format!("{}{}_{}{}", ARTIFACT_PREFIX, date, n, ARTIFACT_SUFFIX)
    }
}

fn is_artifact_name(name: &str) -> bool {
    name.starts_with(ARTIFACT_PREFIX) && name.ends_with(ARTIFACT_SUFFIX)
}
