use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::models::PropertyRecord;

/// Errors that can occur when talking to the property record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Property record store client
///
/// Thin client over the document-store API that owns property records.
/// The analysis core only reads through this interface; writes happen on
/// behalf of the property CRUD surface.
pub struct PropertyStore {
    base_url: String,
    api_key: String,
    collection: String,
    client: Client,
}

impl PropertyStore {
    pub fn new(base_url: String, api_key: String, collection: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            collection,
            client,
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.collection
        )
    }

    /// Persist a new property record
    pub async fn create_property(&self, record: &PropertyRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.documents_url())
            .header("X-Api-Key", &self.api_key)
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to create property: {}",
                response.status()
            )));
        }

        tracing::debug!("Created property record {}", record.id);

        Ok(())
    }

    /// Fetch a single property record by id
    pub async fn get_property(&self, property_id: &str) -> Result<PropertyRecord, StoreError> {
        let query_json = format!(r#"["id={}"]"#, property_id);
        let encoded_query = urlencoding::encode(&query_json);

        let url = format!("{}?query={}", self.documents_url(), encoded_query);

        tracing::debug!("Fetching property record: {}", property_id);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to fetch property: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

        let doc = documents
            .first()
            .ok_or_else(|| StoreError::NotFound(format!("Property {} not found", property_id)))?;

        let data = doc.get("data").unwrap_or(doc);

        serde_json::from_value(data.clone())
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse property: {}", e)))
    }

    /// Fetch every property record in the collection
    pub async fn list_properties(&self) -> Result<Vec<PropertyRecord>, StoreError> {
        self.fetch_documents(self.documents_url()).await
    }

    /// Fetch every property record for a city, in store order
    pub async fn list_by_city(&self, city: &str) -> Result<Vec<PropertyRecord>, StoreError> {
        let query_json = format!(r#"["city={}"]"#, city);
        let encoded_query = urlencoding::encode(&query_json);

        let url = format!("{}?query={}", self.documents_url(), encoded_query);

        self.fetch_documents(url).await
    }

    async fn fetch_documents(&self, url: String) -> Result<Vec<PropertyRecord>, StoreError> {
        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to query properties: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

        let records: Vec<PropertyRecord> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .collect();

        tracing::debug!("Fetched {} property records", records.len());

        Ok(records)
    }
}
