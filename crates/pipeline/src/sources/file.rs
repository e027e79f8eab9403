//! Persisted-snapshot producer.
//!
//! Reads back the snapshot the binary writes after each fresh fetch, so a
//! restart during an upstream outage still has something to serve.

use std::path::PathBuf;

use async_trait::async_trait;
use common::{Error, RawRecord, RawSnapshot, Result};
use tracing::debug;

use super::Producer;

/// Producer backed by a previously persisted snapshot file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Producer for FileSource {
    fn name(&self) -> &str {
        "snapshot-file"
    }

    async fn produce(&self) -> Result<Vec<RawRecord>> {
        let path = self.path.clone();
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::Snapshot(format!("cannot read {}: {}", path.display(), e)))?;

        let snapshot: RawSnapshot = serde_json::from_str(&contents)
            .map_err(|e| Error::Snapshot(format!("cannot parse {}: {}", path.display(), e)))?;

        debug!(
            "Snapshot file {} carries {} rows (written {})",
            path.display(),
            snapshot.data.len(),
            snapshot.timestamp.as_deref().unwrap_or("unknown")
        );
        Ok(snapshot.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn test_reads_persisted_snapshot() {
        let dir = std::env::temp_dir().join("weather-gateway-file-source-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("snapshot.json");
        let mut file = std::fs::File::create(&path).expect("snapshot file");
        write!(
            file,
            r#"{{"timestamp": "2025-08-07T06:00:00.000Z", "data": [
                {{"date": "Today", "time": "06:00", "weather": "Clear", "temperature": "17 °"}}
            ]}}"#
        )
        .expect("write snapshot");

        let source = FileSource::new(&path);
        let rows = source.produce().await.expect("snapshot parses");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time.as_deref(), Some("06:00"));
    }

    #[tokio::test]
    async fn test_missing_file_is_a_producer_failure() {
        let source = FileSource::new("definitely/not/here.json");
        let err = source.produce().await.expect_err("missing file fails");
        assert!(matches!(err, Error::Snapshot(_)));
    }
}
