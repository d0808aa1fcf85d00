//! Campus metrics: descriptive key/value facts, listed per category.

use campus_core::validation::validate_metric_key;
use campus_core::{Metric, MetricHistoryEntry, Page, ValidationError};
use serde::Serialize;
use tracing::{debug, info};

use super::with_query;
use crate::error::ClientResult;
use crate::http::ApiClient;

#[derive(Serialize)]
struct CategoryParam {
    category: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    metric_key: Option<&'a str>,
    page: u32,
    size: u32,
}

impl ApiClient {
    /// `GET /metrics?category=<UPPER>`
    pub async fn list_metrics(&self, category: &str) -> ClientResult<Vec<Metric>> {
        let category = category.trim().to_uppercase();
        if category.is_empty() {
            return Err(ValidationError::EmptyField { field: "category" }.into());
        }
        let path = with_query("/metrics", &CategoryParam { category })?;
        let page: Page<Metric> = self.get_json(&path).await?;
        debug!(count = page.content.len(), "Metrics fetched");
        Ok(page.content)
    }

    /// `POST /metrics`
    pub async fn create_metric(&self, metric: &Metric) -> ClientResult<()> {
        validate_metric_key(&metric.metric_key)?;
        self.post("/metrics", &normalized(metric)).await?;
        info!(key = %metric.metric_key, "Metric created");
        Ok(())
    }

    /// `PUT /metrics/{id}`
    pub async fn update_metric(&self, metric: &Metric) -> ClientResult<()> {
        let id = metric
            .id
            .ok_or(ValidationError::EmptyField { field: "id" })?;
        validate_metric_key(&metric.metric_key)?;
        self.put(&format!("/metrics/{}", id), &normalized(metric))
            .await?;
        info!(id, key = %metric.metric_key, "Metric updated");
        Ok(())
    }

    /// `GET /metrics/history?metricKey=..&page=..&size=..`
    pub async fn metric_history(
        &self,
        metric_key: Option<&str>,
        page: u32,
        size: u32,
    ) -> ClientResult<Page<MetricHistoryEntry>> {
        let path = with_query(
            "/metrics/history",
            &HistoryParams {
                metric_key,
                page,
                size,
            },
        )?;
        self.get_json(&path).await
    }
}

/// Outgoing copy with the id stripped and the category upper-cased.
fn normalized(metric: &Metric) -> Metric {
    Metric {
        id: None,
        category: metric.category.to_uppercase(),
        ..metric.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::http::ApiClient;
    use campus_core::Metric;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&ClientConfig::with_base_url(format!("{}/api", server.uri()))).unwrap()
    }

    #[tokio::test]
    async fn test_list_metrics_uppercases_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .and(query_param("category", "WASTE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"id": 1, "metricKey": "recycling_bins", "metricValue": 150, "category": "WASTE"}],
                "number": 0, "totalPages": 1, "totalElements": 1
            })))
            .mount(&server)
            .await;

        let metrics = client(&server).list_metrics("waste").await.unwrap();
        assert_eq!(metrics[0].metric_value, "150");
    }

    #[tokio::test]
    async fn test_update_metric_puts_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/metrics/4"))
            .and(body_json(json!({
                "metricKey": "solar_kwp",
                "metricValue": "520",
                "category": "ENERGY_CLIMATE_CHANGE"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut metric = Metric::new("solar_kwp", "520", "energy_climate_change", None);
        metric.id = Some(4);
        client(&server).update_metric(&metric).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_without_id_is_rejected() {
        let server = MockServer::start().await;
        let metric = Metric::new("solar_kwp", "520", "energy", None);
        assert!(client(&server).update_metric(&metric).await.is_err());
    }

    #[tokio::test]
    async fn test_history_omits_missing_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics/history"))
            .and(query_param("page", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{
                    "id": 1, "metricKey": "solar_kwp", "oldValue": 500, "newValue": "520",
                    "changedBy": "admin", "changedAt": "2025-07-01T10:00:00"
                }],
                "number": 0, "totalPages": 1, "totalElements": 1
            })))
            .mount(&server)
            .await;

        let page = client(&server).metric_history(None, 0, 10).await.unwrap();
        assert_eq!(page.content[0].old_value.as_deref(), Some("500"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("page=0&size=10"));
    }
}
