//! Append-only log of successful lookups, read back newest first.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

use crate::{WeatherError, model::SearchRecord};

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a record for `city` stamped with the current time.
    async fn record(&self, city: &str) -> Result<SearchRecord, WeatherError>;

    /// Up to `n` records, newest first.
    async fn recent(&self, n: usize) -> Result<Vec<SearchRecord>, WeatherError>;
}

/// Records in insertion order plus the id the next append receives.
#[derive(Debug)]
struct Log {
    records: Vec<SearchRecord>,
    next_id: u64,
}

impl Default for Log {
    fn default() -> Self {
        Self { records: Vec::new(), next_id: 1 }
    }
}

impl Log {
    fn from_records(records: Vec<SearchRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        Self { records, next_id }
    }

    fn next_record(&self, city: &str) -> SearchRecord {
        SearchRecord { id: self.next_id, city: city.to_string(), searched_at: Utc::now() }
    }

    fn push(&mut self, record: SearchRecord) {
        self.next_id = record.id + 1;
        self.records.push(record);
    }

    /// Newest first; ties on timestamp fall back to insertion order (higher id first).
    fn newest_first(&self, n: usize) -> Vec<SearchRecord> {
        let mut out = self.records.clone();
        out.sort_by(|a, b| b.searched_at.cmp(&a.searched_at).then(b.id.cmp(&a.id)));
        out.truncate(n);
        out
    }
}

#[derive(Debug, Default)]
pub struct MemoryHistory {
    log: Mutex<Log>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.log.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn record(&self, city: &str) -> Result<SearchRecord, WeatherError> {
        let mut log = self.log.lock().await;
        let record = log.next_record(city);
        log.push(record.clone());
        Ok(record)
    }

    async fn recent(&self, n: usize) -> Result<Vec<SearchRecord>, WeatherError> {
        Ok(self.log.lock().await.newest_first(n))
    }
}

/// History persisted as JSON lines, one record appended per search.
#[derive(Debug)]
pub struct FileHistory {
    path: PathBuf,
    log: Mutex<Log>,
}

impl FileHistory {
    /// Open `path`, loading existing records. A missing file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, WeatherError> {
        let path = path.into();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => parse_lines(&path, &contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(WeatherError::internal(format!(
                    "failed to read history file {}: {e}",
                    path.display()
                )));
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(WeatherError::internal)?;
        }

        Ok(Self { path, log: Mutex::new(Log::from_records(records)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, record: &SearchRecord) -> Result<(), WeatherError> {
        let mut line = serde_json::to_vec(record).map_err(WeatherError::internal)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(WeatherError::internal)?;
        file.write_all(&line).await.map_err(WeatherError::internal)?;
        file.flush().await.map_err(WeatherError::internal)?;

        Ok(())
    }
}

fn parse_lines(path: &Path, contents: &str) -> Result<Vec<SearchRecord>, WeatherError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| {
                WeatherError::internal(format!(
                    "corrupt history file {} at line {}: {e}",
                    path.display(),
                    idx + 1
                ))
            })
        })
        .collect()
}

#[async_trait]
impl HistoryStore for FileHistory {
    async fn record(&self, city: &str) -> Result<SearchRecord, WeatherError> {
        let mut log = self.log.lock().await;
        let record = log.next_record(city);

        // Only keep what made it to disk.
        self.append(&record).await?;
        log.push(record.clone());

        Ok(record)
    }

    async fn recent(&self, n: usize) -> Result<Vec<SearchRecord>, WeatherError> {
        Ok(self.log.lock().await.newest_first(n))
    }
}
