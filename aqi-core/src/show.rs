//! Re-querying saved stations.

use anyhow::{Context, Result};
use futures::{StreamExt, TryStreamExt, stream};
use std::collections::HashSet;
use tracing::debug;

use crate::{model::StationReading, provider::AqiProvider, registry::StationRegistry};

/// Upper bound on in-flight searches when refreshing saved stations.
pub const MAX_CONCURRENT_REQUESTS: usize = 10;

/// Search every saved location concurrently and keep only the saved stations.
///
/// Results come back in completion order. A station saved under several
/// locations appears once. The first failed request aborts the whole refresh.
pub async fn fetch_saved(
    provider: &dyn AqiProvider,
    registry: &StationRegistry,
) -> Result<Vec<StationReading>> {
    let saved = registry.all_uids();

    let responses: Vec<Vec<StationReading>> = stream::iter(registry.locations())
        .map(|location| async move {
            provider
                .search(location)
                .await
                .with_context(|| format!("Failed to refresh stations for '{location}'"))
        })
        .buffer_unordered(MAX_CONCURRENT_REQUESTS)
        .try_collect()
        .await?;

    let mut seen = HashSet::new();
    let readings: Vec<StationReading> = responses
        .into_iter()
        .flatten()
        .filter(|r| saved.contains(&r.station.uid) && seen.insert(r.station.uid))
        .collect();

    debug!(saved = saved.len(), found = readings.len(), "saved stations refreshed");
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AqiValue, Station};
    use async_trait::async_trait;
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    #[derive(Debug, Default)]
    struct MockProvider {
        responses: HashMap<String, Vec<StationReading>>,
        fail_on: Option<String>,
        queries: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MockProvider {
        fn with(mut self, keyword: &str, stations: &[(i64, &str, u32)]) -> Self {
            let readings = stations
                .iter()
                .map(|&(uid, name, aqi)| StationReading {
                    station: Station {
                        uid,
                        name: name.into(),
                    },
                    aqi: AqiValue::Reported(aqi),
                    observed_at: None,
                })
                .collect();
            self.responses.insert(keyword.into(), readings);
            self
        }
    }

    #[async_trait]
    impl AqiProvider for MockProvider {
        async fn search(&self, keyword: &str) -> anyhow::Result<Vec<StationReading>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.queries.lock().unwrap().push(keyword.to_string());

            if self.fail_on.as_deref() == Some(keyword) {
                anyhow::bail!("api is not responsive");
            }

            Ok(self.responses.get(keyword).cloned().unwrap_or_default())
        }
    }

    fn uids(readings: &[StationReading]) -> Vec<i64> {
        let mut uids: Vec<_> = readings.iter().map(|r| r.station.uid).collect();
        uids.sort_unstable();
        uids
    }

    #[tokio::test]
    async fn keeps_only_saved_stations() {
        let provider = MockProvider::default()
            .with(
                "kathmandu",
                &[(11, "Kathmandu", 100), (55, "Bhaktapur", 80), (77, "Lalitpur", 60)],
            )
            .with("delhi", &[(3, "Anand Vihar", 310)]);

        let mut registry = StationRegistry::default();
        registry.add("kathmandu", 11);
        registry.add("kathmandu", 55);
        registry.add("delhi", 3);

        let readings = fetch_saved(&provider, &registry).await.unwrap();
        assert_eq!(uids(&readings), vec![3, 11, 55]);

        let mut queries = provider.queries.lock().unwrap().clone();
        queries.sort();
        assert_eq!(queries, vec!["delhi", "kathmandu"]);
    }

    #[tokio::test]
    async fn station_saved_twice_is_shown_once() {
        let provider = MockProvider::default()
            .with("kathmandu", &[(11, "Kathmandu", 100)])
            .with("nepal", &[(11, "Kathmandu", 100)]);

        let mut registry = StationRegistry::default();
        registry.add("kathmandu", 11);
        registry.add("nepal", 11);

        let readings = fetch_saved(&provider, &registry).await.unwrap();
        assert_eq!(uids(&readings), vec![11]);
    }

    #[tokio::test]
    async fn stations_gone_from_the_api_are_skipped() {
        let provider = MockProvider::default().with("kathmandu", &[(11, "Kathmandu", 100)]);

        let mut registry = StationRegistry::default();
        registry.add("kathmandu", 11);
        registry.add("kathmandu", 404);

        let readings = fetch_saved(&provider, &registry).await.unwrap();
        assert_eq!(uids(&readings), vec![11]);
    }

    #[tokio::test]
    async fn failed_request_aborts_refresh() {
        let provider = MockProvider {
            fail_on: Some("kathmandu".into()),
            ..MockProvider::default()
        };

        let mut registry = StationRegistry::default();
        registry.add("kathmandu", 11);

        let err = fetch_saved(&provider, &registry).await.unwrap_err();
        assert!(format!("{err:#}").contains("api is not responsive"));
        assert!(err.to_string().contains("kathmandu"));
    }

    #[tokio::test]
    async fn fan_out_is_bounded() {
        let mut provider = MockProvider::default();
        let mut registry = StationRegistry::default();
        for i in 0..25 {
            let location = format!("city-{i}");
            provider = provider.with(&location, &[(i, "Somewhere", 10)]);
            registry.add(&location, i);
        }

        let readings = fetch_saved(&provider, &registry).await.unwrap();
        assert_eq!(readings.len(), 25);
        assert!(provider.peak.load(Ordering::SeqCst) <= MAX_CONCURRENT_REQUESTS);
        assert!(provider.peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn empty_registry_makes_no_requests() {
        let provider = MockProvider::default();
        let readings = fetch_saved(&provider, &StationRegistry::default()).await.unwrap();

        assert!(readings.is_empty());
        assert!(provider.queries.lock().unwrap().is_empty());
    }
}
