use serde::{Deserialize, Serialize};
use validator::Validate;

/// Structural configuration as submitted by clients
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StructuralConfigPayload {
    #[validate(range(exclusive_min = 0.0))]
    #[serde(alias = "area_sqft", rename = "areaSqft")]
    pub area_sqft: f64,
    #[validate(length(min = 1))]
    #[serde(alias = "bhk_type", rename = "bhkType")]
    pub bhk_type: String,
    pub bedrooms: u8,
    pub bathrooms: u8,
    #[validate(length(min = 1))]
    #[serde(alias = "property_type", rename = "propertyType")]
    pub property_type: String,
}

/// Amenity context as submitted by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmenitySetPayload {
    #[serde(alias = "furniture_items", rename = "furnitureItems", default)]
    pub furniture_items: Vec<String>,
    #[serde(default)]
    pub appliances: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Request to create a property record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePropertyRequest {
    #[validate(nested)]
    pub structural: StructuralConfigPayload,
    #[serde(default)]
    pub amenities: AmenitySetPayload,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub locality: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(alias = "current_rent", rename = "currentRent", default)]
    pub current_rent: Option<f64>,
}

/// Request to analyze a property against its city's market
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "property_id", rename = "propertyId")]
    pub property_id: String,
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
    #[serde(
        alias = "area_tolerance_percent",
        rename = "areaTolerancePercent",
        default
    )]
    pub area_tolerance_percent: Option<f64>,
}
