// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AmenitySet, Band, BandAssignment, PropertyRecord, RentRangeEstimate, StructuralConfig,
};
pub use requests::{AmenitySetPayload, AnalyzeRequest, CreatePropertyRequest, StructuralConfigPayload};
pub use responses::{AnalyzeResponse, ErrorResponse, HealthResponse, PropertyListResponse};
