use serde::{Deserialize, Serialize};

use crate::models::domain::{BandAssignment, PropertyRecord, RentRangeEstimate};

/// Response for the analyze endpoint
///
/// `band_assignment` and `rent_range` are independently nullable: either
/// being absent means "insufficient comparable data", not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(rename = "comparablesCount")]
    pub comparables_count: usize,
    #[serde(rename = "bandAssignment")]
    pub band_assignment: Option<BandAssignment>,
    #[serde(rename = "rentRange")]
    pub rent_range: Option<RentRangeEstimate>,
}

/// Response for the property listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyListResponse {
    pub properties: Vec<PropertyRecord>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
