use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use chatthread_store::PageSource;
use chatthread_types::RawMessageRecord;

/// Order of the records inside the export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrder {
    /// As the thread displays them: newest on top.
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Comment list exported from the page as a JSON array of records.
///
/// The exporter writes the file once the list has rendered, so a missing
/// file reads as "not rendered yet".
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    order: PageOrder,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            order: PageOrder::default(),
        }
    }

    pub fn with_order(mut self, order: PageOrder) -> Self {
        self.order = order;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PageSource for FileSource {
    async fn fetch_records(&self) -> Result<Option<Vec<RawMessageRecord>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Comment export not present yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        let mut records: Vec<RawMessageRecord> = serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding comment export {}", self.path.display()))?;

        if self.order == PageOrder::NewestFirst {
            records.reverse();
        }
        Ok(Some(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"[
        {"author": "bo", "isAdmin": false, "message": "newer", "timestamp": "var timestamp = \"2024-01-02T00:00:00Z\";"},
        {"author": "ana", "isAdmin": true, "message": "older", "timestamp": "var timestamp = \"2024-01-01T00:00:00Z\";"}
    ]"#;

    #[tokio::test]
    async fn missing_file_is_not_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("absent.json"));
        assert!(source.fetch_records().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn newest_first_export_is_reversed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.json");
        std::fs::write(&path, EXPORT).unwrap();

        let records = FileSource::new(&path).fetch_records().await.unwrap().unwrap();
        let authors: Vec<&str> = records.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(authors, ["ana", "bo"]);

        let records = FileSource::new(&path)
            .with_order(PageOrder::OldestFirst)
            .fetch_records()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(records[0].author, "bo");
    }

    #[tokio::test]
    async fn garbage_export_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.json");
        std::fs::write(&path, "<ul class=\"comment-list\">").unwrap();

        let err = FileSource::new(&path).fetch_records().await.unwrap_err();
        assert!(format!("{err:#}").contains("decoding comment export"));
    }
}
