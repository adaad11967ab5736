//! REST client for the tabular ledger API

use crate::ledger::record::{DeploymentRecord, Status};
use crate::ledger::LedgerError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Thin client over the ledger REST API
///
/// One table, one row per deployment attempt, no multi-row transactions.
pub struct AirtableClient {
    endpoint: String,
    token: String,
    base: String,
    table: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    id: String,
    fields: DeploymentRecord,
}

#[derive(Debug, Deserialize)]
struct RecordsPage {
    records: Vec<RecordEnvelope>,
    offset: Option<String>,
}

impl AirtableClient {
    pub fn new(endpoint: String, token: String, base: String, table: String) -> Self {
        Self::with_timeout(
            endpoint,
            token,
            base,
            table,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        endpoint: String,
        token: String,
        base: String,
        table: String,
        timeout: Duration,
    ) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("appforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint,
            token,
            base,
            table,
            http,
        }
    }

    fn records_url(&self) -> String {
        format!("{}/v0/{}/{}", self.endpoint, self.base, self.table)
    }

    /// Inserts a row and returns its ledger-assigned record id
    pub async fn insert(&self, record: &DeploymentRecord) -> Result<String, LedgerError> {
        let response = self
            .http
            .post(self.records_url())
            .bearer_auth(&self.token)
            .json(&json!({ "records": [{ "fields": record }] }))
            .send()
            .await
            .map_err(map_send_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let page: RecordsPage = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;

        let id = page
            .records
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| LedgerError::InvalidResponse("insert returned no records".to_string()))?;

        info!("Inserted ledger row {} for {}", id, record.unique_id);
        Ok(id)
    }

    /// Looks up a row by identifier via an exact-match formula query
    pub async fn find_by_uid(
        &self,
        unique_id: &str,
    ) -> Result<Option<(String, DeploymentRecord)>, LedgerError> {
        let formula = format!("{{unique_id}}='{}'", unique_id);
        let response = self
            .http
            .get(self.records_url())
            .bearer_auth(&self.token)
            .query(&[("filterByFormula", formula.as_str())])
            .send()
            .await
            .map_err(map_send_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let page: RecordsPage = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;

        Ok(page
            .records
            .into_iter()
            .next()
            .map(|r| (r.id, r.fields)))
    }

    /// Advances a row's status, refusing backward transitions
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` when no row carries the identifier and
    /// `InvalidTransition` when the stored status cannot advance to `next`.
    pub async fn update_status(&self, unique_id: &str, next: Status) -> Result<(), LedgerError> {
        let (record_id, record) = self
            .find_by_uid(unique_id)
            .await?
            .ok_or_else(|| LedgerError::RecordNotFound(unique_id.to_string()))?;

        if !record.status.can_advance_to(next) {
            return Err(LedgerError::InvalidTransition {
                from: record.status,
                to: next,
            });
        }

        let response = self
            .http
            .patch(self.records_url())
            .bearer_auth(&self.token)
            .json(&json!({
                "records": [{ "id": record_id, "fields": { "Status": next } }]
            }))
            .send()
            .await
            .map_err(map_send_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        info!("Ledger row for {} advanced to {}", unique_id, next);
        Ok(())
    }

    /// Full-table scan, following offset pagination to the end
    pub async fn list_all(&self) -> Result<Vec<DeploymentRecord>, LedgerError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.http.get(self.records_url()).bearer_auth(&self.token);
            if let Some(ref cursor) = offset {
                request = request.query(&[("offset", cursor.as_str())]);
            }

            let response = request.send().await.map_err(map_send_err)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LedgerError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let page: RecordsPage = response
                .json()
                .await
                .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;

            records.extend(page.records.into_iter().map(|r| r.fields));

            match page.offset {
                Some(cursor) => offset = Some(cursor),
                None => break,
            }
        }

        debug!("Ledger scan returned {} rows", records.len());
        Ok(records)
    }

    /// Verifies the token and base with a single-record read
    pub async fn health_check(&self) -> Result<bool, LedgerError> {
        match self
            .http
            .get(self.records_url())
            .bearer_auth(&self.token)
            .query(&[("maxRecords", "1")])
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) if e.is_timeout() || e.is_connect() => Ok(false),
            Err(e) => Err(LedgerError::Network(e.to_string())),
        }
    }
}

fn map_send_err(e: reqwest::Error) -> LedgerError {
    LedgerError::Network(e.to_string())
}
