// libs/shared/fhir/src/client.rs
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::{AppointmentResource, SlotBundle, SlotResource};

const FHIR_JSON: &str = "application/fhir+json";

pub struct FhirClient {
    client: Client,
    base_url: String,
}

impl FhirClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.fhir_base_url.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| anyhow!("Invalid bearer token"))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making FHIR request to {}", url);

        let headers = self.get_headers(auth_token)?;

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("FHIR error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("FHIR error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Query the free slots of one schedule within a closed date range.
    pub async fn query_free_slots(
        &self,
        schedule_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<SlotResource>> {
        let path = format!(
            "/Slot?schedule=Schedule/{}&status=free&_count=200&start=ge{}&start=le{}",
            schedule_id, start_date, end_date
        );

        let bundle: SlotBundle = self.request(Method::GET, &path, auth_token, None).await?;

        Ok(bundle.entry.into_iter().map(|e| e.resource).collect())
    }

    /// Post an appointment-creation payload to the backend.
    pub async fn create_appointment(
        &self,
        appointment: &AppointmentResource,
        auth_token: Option<&str>,
    ) -> Result<()> {
        let body = serde_json::to_value(appointment)?;

        let _: Value = self
            .request(Method::POST, "/Appointment", auth_token, Some(body))
            .await?;

        Ok(())
    }

    /// Flip a slot to `busy` so it stops appearing in free-slot queries.
    pub async fn mark_slot_busy(
        &self,
        slot: &SlotResource,
        auth_token: Option<&str>,
    ) -> Result<()> {
        let slot_id = slot
            .id
            .as_deref()
            .ok_or_else(|| anyhow!("Slot has no id, cannot update status"))?;

        let mut updated = slot.clone();
        updated.status = "busy".to_string();
        let body = serde_json::to_value(&updated)?;

        let path = format!("/Slot/{}", slot_id);
        let _: Value = self.request(Method::PUT, &path, auth_token, Some(body)).await?;

        Ok(())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
