//! Supabase / PostgREST-backed store.
//!
//! Rows live in a `prescriptions` table exposed at `{url}/rest/v1/prescriptions`.

use std::time::Duration;

use reqwest::blocking::{Client, Response};

use super::store::PrescriptionStore;
use super::DatabaseError;
use crate::models::PrescriptionRecord;

pub const TABLE: &str = "prescriptions";

pub struct RestStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestStore {
    /// Build a store for a Supabase project URL and service key.
    ///
    /// Must be called outside an async context (the blocking client owns
    /// its own runtime).
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, DatabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url)
    }

    fn authorized(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

/// Decode the row array of a 2xx response; anything else is
/// [`DatabaseError::Remote`].
fn read_rows(response: Response) -> Result<Vec<PrescriptionRecord>, DatabaseError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(DatabaseError::Remote {
            status: status.as_u16(),
            message,
        });
    }
    let body = response.bytes()?;
    Ok(serde_json::from_slice(&body)?)
}

impl PrescriptionStore for RestStore {
    fn store(&self, record: &PrescriptionRecord) -> Result<PrescriptionRecord, DatabaseError> {
        tracing::debug!(table = TABLE, patient_id = %record.patient_id, "Inserting row");
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(record)
            .send()?;

        read_rows(response)?
            .into_iter()
            .next()
            .ok_or(DatabaseError::EmptyResponse)
    }

    fn lookup(&self, patient_id: &str) -> Result<Option<PrescriptionRecord>, DatabaseError> {
        let filter = format!("eq.{patient_id}");
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("patient_id", filter.as_str()), ("select", "*")])
            .send()?;

        Ok(read_rows(response)?.into_iter().next())
    }

    fn backend(&self) -> &'static str {
        "postgrest"
    }
}
