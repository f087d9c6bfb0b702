use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural configuration of a property
///
/// Together with an area tolerance this fully determines whether two
/// properties are structurally comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralConfig {
    #[serde(rename = "areaSqft")]
    pub area_sqft: f64,
    #[serde(rename = "bhkType")]
    pub bhk_type: String,
    pub bedrooms: u8,
    pub bathrooms: u8,
    #[serde(rename = "propertyType")]
    pub property_type: String,
}

/// Descriptive amenity context for a property
///
/// Not used in any numeric computation; passed through to the band
/// classifier as qualitative signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmenitySet {
    #[serde(rename = "furnitureItems", default)]
    pub furniture_items: Vec<String>,
    #[serde(default)]
    pub appliances: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// A rental listing as stored by the record source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    pub structural: StructuralConfig,
    pub amenities: AmenitySet,
    pub city: String,
    pub locality: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "currentRent", default)]
    pub current_rent: Option<f64>,
}

/// Ordinal market-tier label, L1 (entry-level) to L5 (premium)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    L1,
    L2,
    L3,
    L4,
    L5,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Band::L1 => "L1",
            Band::L2 => "L2",
            Band::L3 => "L3",
            Band::L4 => "L4",
            Band::L5 => "L5",
        };
        write!(f, "{}", label)
    }
}

/// Structured reply from the band classification oracle
///
/// `subject_band` is not guaranteed to appear among the `bands` keys; the
/// pipeline treats a missing key as an empty member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandAssignment {
    pub bands: BTreeMap<Band, Vec<String>>,
    #[serde(rename = "criteriaUsed")]
    pub criteria_used: Vec<String>,
    pub rationale: String,
    #[serde(rename = "subjectBand")]
    pub subject_band: Band,
    pub confidence: f64,
}

impl BandAssignment {
    /// Property ids the oracle placed in the subject's band
    pub fn subject_band_members(&self) -> &[String] {
        self.bands
            .get(&self.subject_band)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Robust rent range derived from a band's rent sample
///
/// The IQR bounds are used directly as the recommendation, not as
/// outlier fences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentRangeEstimate {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    #[serde(rename = "recommendedMin")]
    pub recommended_min: f64,
    #[serde(rename = "recommendedMax")]
    pub recommended_max: f64,
}

impl RentRangeEstimate {
    pub fn zero() -> Self {
        Self {
            q1: 0.0,
            median: 0.0,
            q3: 0.0,
            iqr: 0.0,
            recommended_min: 0.0,
            recommended_max: 0.0,
        }
    }
}
