//! Public statistics: opaque aggregates rendered as-is by the dashboard.

use campus_core::{Statistics, StatsCategory, StatsPeriod};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::with_query;
use crate::error::ClientResult;
use crate::http::{ApiBody, ApiClient};

#[derive(Serialize)]
struct StatisticsParams {
    category: &'static str,
    period: &'static str,
}

/// The three statistic groups the dashboard shows together.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsBundle {
    pub consumption: Statistics,
    pub vehicles: Statistics,
    pub waste: Statistics,
}

impl ApiClient {
    /// `GET /public/statistics?category=..&period=..`
    pub async fn statistics(
        &self,
        category: StatsCategory,
        period: StatsPeriod,
    ) -> ClientResult<Statistics> {
        let path = with_query(
            "/public/statistics",
            &StatisticsParams {
                category: category.as_str(),
                period: period.as_str(),
            },
        )?;
        Ok(match self.get(&path).await? {
            ApiBody::Json(value) => value,
            ApiBody::Text(text) => Value::String(text),
        })
    }

    /// Fetches all three groups concurrently; any failure fails the bundle.
    pub async fn statistics_bundle(&self, period: StatsPeriod) -> ClientResult<StatisticsBundle> {
        let (consumption, vehicles, waste) = tokio::try_join!(
            self.statistics(StatsCategory::Consumption, period),
            self.statistics(StatsCategory::Vehicles, period),
            self.statistics(StatsCategory::Waste, period),
        )?;
        debug!(period = period.as_str(), "Statistics fetched");
        Ok(StatisticsBundle {
            consumption,
            vehicles,
            waste,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::http::ApiClient;
    use campus_core::StatsPeriod;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&ClientConfig::with_base_url(format!("{}/api", server.uri()))).unwrap()
    }

    async fn mount(server: &MockServer, category: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/public/statistics"))
            .and(query_param("category", category))
            .and(query_param("period", "last_month"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"category": category, "total": 42})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_bundle_fetches_all_groups() {
        let server = MockServer::start().await;
        for category in ["consumption", "vehicles", "waste"] {
            mount(&server, category, 200).await;
        }

        let bundle = client(&server)
            .statistics_bundle(StatsPeriod::LastMonth)
            .await
            .unwrap();
        assert_eq!(bundle.vehicles["category"], "vehicles");
        assert_eq!(bundle.waste["total"], 42);
    }

    #[tokio::test]
    async fn test_bundle_fails_if_any_group_fails() {
        let server = MockServer::start().await;
        mount(&server, "consumption", 200).await;
        mount(&server, "vehicles", 503).await;
        mount(&server, "waste", 200).await;

        assert!(client(&server)
            .statistics_bundle(StatsPeriod::LastMonth)
            .await
            .is_err());
    }
}
