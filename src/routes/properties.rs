use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::pipeline::{AnalysisError, BandingPipeline};
use crate::models::{
    AmenitySet, AnalyzeRequest, AnalyzeResponse, CreatePropertyRequest, ErrorResponse,
    HealthResponse, PropertyListResponse, PropertyRecord, StructuralConfig,
};
use crate::services::{LlmBandClassifier, PropertyStore, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PropertyStore>,
    pub pipeline: BandingPipeline<LlmBandClassifier>,
    pub default_radius_km: f64,
    pub default_area_tolerance_percent: f64,
}

/// Configure all property-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/properties", web::post().to(create_property))
        .route("/properties", web::get().to(list_properties))
        .route("/properties/analyze", web::post().to(analyze_property))
        .route("/properties/{id}", web::get().to(get_property));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Create property endpoint
///
/// POST /api/v1/properties
async fn create_property(
    state: web::Data<AppState>,
    req: web::Json<CreatePropertyRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_property request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let req = req.into_inner();

    let record = PropertyRecord {
        id: uuid::Uuid::new_v4().to_string(),
        structural: StructuralConfig {
            area_sqft: req.structural.area_sqft,
            bhk_type: req.structural.bhk_type,
            bedrooms: req.structural.bedrooms,
            bathrooms: req.structural.bathrooms,
            property_type: req.structural.property_type,
        },
        amenities: AmenitySet {
            furniture_items: req.amenities.furniture_items,
            appliances: req.amenities.appliances,
            amenities: req.amenities.amenities,
        },
        city: req.city,
        locality: req.locality,
        latitude: req.latitude,
        longitude: req.longitude,
        current_rent: req.current_rent,
    };

    match state.store.create_property(&record).await {
        Ok(()) => {
            tracing::info!("Created property {} in {}", record.id, record.city);
            HttpResponse::Created().json(record)
        }
        Err(e) => {
            tracing::error!("Failed to create property: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to create property".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Fetch property endpoint
///
/// GET /api/v1/properties/{id}
async fn get_property(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let property_id = path.into_inner();

    match state.store.get_property(&property_id).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(StoreError::NotFound(message)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Property not found".to_string(),
            message,
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch property {}: {}", property_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch property".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// List properties endpoint
///
/// GET /api/v1/properties?city={city}
async fn list_properties(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let result = match query.get("city") {
        Some(city) => state.store.list_by_city(city).await,
        None => state.store.list_properties().await,
    };

    match result {
        Ok(properties) => {
            let total = properties.len();
            HttpResponse::Ok().json(PropertyListResponse { properties, total })
        }
        Err(e) => {
            tracing::error!("Failed to list properties: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list properties".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Analyze property endpoint
///
/// POST /api/v1/properties/analyze
///
/// Request body:
/// ```json
/// {
///   "propertyId": "string",
///   "radiusKm": 2.0,
///   "areaTolerancePercent": 15.0
/// }
/// ```
///
/// A successful run may still carry null `bandAssignment`/`rentRange`
/// fields; that means the market was too sparse, not that the run failed.
async fn analyze_property(
    state: web::Data<AppState>,
    req: web::Json<AnalyzeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for analyze request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let radius_km = req.radius_km.unwrap_or(state.default_radius_km);
    let area_tolerance_percent = req
        .area_tolerance_percent
        .unwrap_or(state.default_area_tolerance_percent);

    tracing::info!(
        "Analyzing property {} (radius {}km, tolerance {}%)",
        req.property_id,
        radius_km,
        area_tolerance_percent
    );

    let subject = match state.store.get_property(&req.property_id).await {
        Ok(record) => record,
        Err(StoreError::NotFound(message)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Property not found".to_string(),
                message,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch subject {}: {}", req.property_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch property".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let pool = match state.store.list_by_city(&subject.city).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Failed to fetch pool for {}: {}", subject.city, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch candidate pool".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let outcome = match state
        .pipeline
        .analyze(&subject, &pool, radius_km, area_tolerance_percent)
        .await
    {
        Ok(outcome) => outcome,
        Err(AnalysisError::InvalidInput(message)) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid analysis parameters".to_string(),
                message,
                status_code: 400,
            });
        }
        Err(e @ AnalysisError::ClassificationUnavailable(_)) => {
            tracing::error!("Analysis failed for {}: {}", req.property_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Classification unavailable".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    tracing::info!(
        "Analysis for {} found {} comparables (band assigned: {})",
        req.property_id,
        outcome.comparables.len(),
        outcome.band_assignment.is_some()
    );

    HttpResponse::Ok().json(AnalyzeResponse {
        property_id: req.property_id.clone(),
        comparables_count: outcome.comparables.len(),
        band_assignment: outcome.band_assignment,
        rent_range: outcome.rent_range,
    })
}
