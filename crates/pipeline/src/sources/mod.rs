//! Data producers and the ordered fallback chain.
//!
//! Each producer can independently deliver raw observation rows or fail;
//! the chain tries them in priority order and stops at the first one whose
//! normalized output is non-empty. Producer failures are logged and
//! swallowed here, never surfaced raw.

mod api;
mod file;
mod scrape;
mod synthetic;

pub use api::ApiSource;
pub use file::FileSource;
pub use scrape::ScrapeSource;
pub use synthetic::SyntheticSource;

use async_trait::async_trait;
use common::{Error, ObservationRecord, RawRecord, Result};
use tracing::{info, warn};

use crate::normalize::normalize;

/// A single data-producing strategy.
///
/// Implementations own their timeouts; the chain imposes no global bound
/// beyond the sum of producer timeouts.
#[async_trait]
pub trait Producer: Send + Sync {
    /// Short stable name for logs and the response `source` field.
    fn name(&self) -> &str;

    /// Produce raw observation rows, or fail.
    async fn produce(&self) -> Result<Vec<RawRecord>>;
}

/// The ordered fallback chain.
pub struct SourceChain {
    producers: Vec<Box<dyn Producer>>,
}

impl SourceChain {
    pub fn new(producers: Vec<Box<dyn Producer>>) -> Self {
        Self { producers }
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    pub fn producers(&self) -> &[Box<dyn Producer>] {
        &self.producers
    }

    /// Walk the chain in priority order and return the first normalized,
    /// non-empty payload together with the winning producer's name.
    ///
    /// Every producer failure (error or empty result) is swallowed and
    /// collected; if the whole chain fails the aggregate becomes a
    /// [`Error::SourceExhausted`].
    pub async fn fetch(&self, max_records: usize) -> Result<(Vec<ObservationRecord>, String)> {
        let mut failures: Vec<String> = Vec::new();

        for producer in &self.producers {
            let name = producer.name();
            match producer.produce().await {
                Ok(raw) => match normalize(raw, max_records) {
                    Ok(records) => {
                        info!("Source '{}' produced {} records", name, records.len());
                        return Ok((records, name.to_string()));
                    }
                    Err(e) => {
                        info!("Source '{}' returned nothing usable: {}", name, e);
                        failures.push(format!("{}: {}", name, e));
                    }
                },
                Err(e) => {
                    warn!("Source '{}' failed: {}", name, e);
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        Err(Error::SourceExhausted(failures.join("; ")))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic producers for pipeline tests.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub struct StaticProducer {
        pub name: &'static str,
        pub records: Vec<RawRecord>,
        pub calls: Arc<AtomicUsize>,
    }

    impl StaticProducer {
        pub fn new(name: &'static str, records: Vec<RawRecord>) -> Self {
            Self {
                name,
                records,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Producer for StaticProducer {
        fn name(&self) -> &str {
            self.name
        }

        async fn produce(&self) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    pub struct FailingProducer {
        pub name: &'static str,
        pub calls: Arc<AtomicUsize>,
    }

    impl FailingProducer {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Producer for FailingProducer {
        fn name(&self) -> &str {
            self.name
        }

        async fn produce(&self) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Scrape(format!("{} is down", self.name)))
        }
    }

    pub fn raw_record(time: &str, temp: &str) -> RawRecord {
        RawRecord {
            time: Some(time.into()),
            temperature: Some(temp.into()),
            weather: Some("Clear".into()),
            ..RawRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_first_success_wins() {
        let first = StaticProducer::new("first", vec![raw_record("08:00", "15 °")]);
        let second = StaticProducer::new("second", vec![raw_record("08:00", "99 °")]);
        let second_calls = second.calls.clone();

        let chain = SourceChain::new(vec![Box::new(first), Box::new(second)]);
        let (records, source) = chain.fetch(48).await.expect("first source succeeds");

        assert_eq!(source, "first");
        assert_eq!(records[0].temperature, "15 °");
        assert_eq!(second_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_fall_through_in_order() {
        let a = FailingProducer::new("a");
        let b = StaticProducer::new("b", Vec::new());
        let c = StaticProducer::new("c", vec![raw_record("08:00", "15 °")]);
        let (a_calls, b_calls, c_calls) = (a.calls.clone(), b.calls.clone(), c.calls.clone());

        let chain = SourceChain::new(vec![Box::new(a), Box::new(b), Box::new(c)]);
        let (_, source) = chain.fetch(48).await.expect("third source succeeds");

        assert_eq!(source, "c");
        assert_eq!(a_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_aggregates_failures() {
        let chain = SourceChain::new(vec![
            Box::new(FailingProducer::new("a")),
            Box::new(FailingProducer::new("b")),
        ]);

        let err = chain.fetch(48).await.expect_err("everything failed");
        let text = err.to_string();
        assert!(matches!(err, Error::SourceExhausted(_)));
        assert!(text.contains("a is down"), "aggregate names each failure: {}", text);
        assert!(text.contains("b is down"));
    }

    #[tokio::test]
    async fn test_empty_chain_is_exhausted() {
        let chain = SourceChain::new(Vec::new());
        let err = chain.fetch(48).await.expect_err("no producers");
        assert!(matches!(err, Error::SourceExhausted(_)));
    }
}
