//! Report store backed by the hosted table's REST interface.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ReportStore;
use crate::error::{RescueError, StoreError};
use crate::models::config::{ServiceConfig, StoreConfig};
use crate::models::report::{NewReport, Report, ReportUpdate};
use crate::service::http::error_message;

/// Reads and writes `<base_url>/rest/v1/<table>`.
pub struct RestReportStore {
    table_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl RestReportStore {
    /// Build a store from configuration.
    pub fn from_config(service: &ServiceConfig, store: &StoreConfig) -> Result<Self, RescueError> {
        let mut builder = reqwest::Client::builder();
        if service.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(service.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| RescueError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            table_url: format!(
                "{}/rest/v1/{}",
                service.base_url.trim_end_matches('/'),
                store.table
            ),
            api_key: service.api_key.clone(),
            client,
        })
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn rows<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, StoreError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

fn first_row(rows: Vec<Report>, id: &str) -> Result<Report, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

#[async_trait]
impl ReportStore for RestReportStore {
    async fn insert(&self, report: &NewReport) -> Result<Report, StoreError> {
        debug!("Inserting report into {}", self.table_url);
        let request = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(report);

        let rows: Vec<Report> = self.rows(request).await?;
        rows.into_iter().next().ok_or_else(|| StoreError::Rejected {
            message: "insert returned no row".to_string(),
        })
    }

    async fn get(&self, id: &str) -> Result<Report, StoreError> {
        let request = self
            .client
            .get(&self.table_url)
            .query(&id_filter(id))
            .query(&[("select", "*")]);

        first_row(self.rows(request).await?, id)
    }

    async fn update(&self, id: &str, update: &ReportUpdate) -> Result<Report, StoreError> {
        debug!("Updating report {}", id);
        let request = self
            .client
            .patch(&self.table_url)
            .query(&id_filter(id))
            .header("Prefer", "return=representation")
            .json(update);

        first_row(self.rows(request).await?, id)
    }
}
