use thiserror::Error;

use crate::core::comparables::select_comparables;
use crate::core::quartiles::estimate_range;
use crate::models::{BandAssignment, PropertyRecord, RentRangeEstimate};

/// Errors surfaced by a band classification oracle
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classification oracle unavailable: {0}")]
    Unavailable(String),

    #[error("classification reply violated the expected schema: {0}")]
    InvalidResponse(String),
}

/// Errors that fail an analysis run outright
///
/// Empty comparable sets and empty rent samples are not errors; they are
/// reported as `None` fields in the outcome.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid parameter: {0}")]
    InvalidInput(String),

    #[error("band classification failed: {0}")]
    ClassificationUnavailable(#[from] ClassifierError),
}

/// Capability interface for the external band classification oracle
///
/// The single operation keeps the non-deterministic boundary narrow so a
/// deterministic fake can stand in for it in tests. Implementations are
/// never invoked with an empty comparable set; the pipeline enforces that
/// precondition.
pub trait BandClassifier {
    fn classify(
        &self,
        subject: &PropertyRecord,
        comparables: &[PropertyRecord],
    ) -> impl std::future::Future<Output = Result<BandAssignment, ClassifierError>>;
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Filter,
    Classify,
    Estimate,
    Done,
}

/// Result of a full analysis run
///
/// All three fields degrade independently: no comparables leaves the
/// assignment and range unset, and an assignment whose subject band has no
/// rent observations leaves only the range unset.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub comparables: Vec<PropertyRecord>,
    pub band_assignment: Option<BandAssignment>,
    pub rent_range: Option<RentRangeEstimate>,
}

/// Mutable state threaded through the stage transitions
#[derive(Debug)]
struct AnalysisState<'a> {
    subject: &'a PropertyRecord,
    pool: &'a [PropertyRecord],
    radius_km: f64,
    area_tolerance_percent: f64,
    comparables: Vec<PropertyRecord>,
    band_assignment: Option<BandAssignment>,
    rent_range: Option<RentRangeEstimate>,
}

/// Banding orchestrator - sequences the comparable-selection pipeline
///
/// # Pipeline Stages
/// 1. Filter - fuzzy structural match + radius gate over the pool
/// 2. Classify - delegate band partitioning to the classification oracle
/// 3. Estimate - IQR rent range over the subject band's rent sample
///
/// Stage 1 short-circuits the run when nothing is comparable; stage 3
/// degrades to an unset range when the subject's band has no usable rents.
#[derive(Debug, Clone)]
pub struct BandingPipeline<C> {
    classifier: C,
}

impl<C: BandClassifier> BandingPipeline<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// Run the full analysis for a subject against a candidate pool
    ///
    /// # Arguments
    /// * `subject` - The property being priced
    /// * `pool` - Candidate records, typically the subject's city listing
    /// * `radius_km` - Maximum comparable distance from the subject
    /// * `area_tolerance_percent` - Structural area tolerance for fuzzy matching
    ///
    /// # Errors
    /// `InvalidInput` for negative parameters before any stage runs;
    /// `ClassificationUnavailable` when the oracle call fails, which aborts
    /// the whole run since no statistical stage can proceed without bands.
    pub async fn analyze(
        &self,
        subject: &PropertyRecord,
        pool: &[PropertyRecord],
        radius_km: f64,
        area_tolerance_percent: f64,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        if radius_km < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "radius_km must be non-negative, got {}",
                radius_km
            )));
        }
        if area_tolerance_percent < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "area_tolerance_percent must be non-negative, got {}",
                area_tolerance_percent
            )));
        }

        let mut state = AnalysisState {
            subject,
            pool,
            radius_km,
            area_tolerance_percent,
            comparables: Vec::new(),
            band_assignment: None,
            rent_range: None,
        };

        let mut stage = Stage::Filter;
        while stage != Stage::Done {
            stage = self.run_stage(stage, &mut state).await?;
        }

        Ok(AnalysisOutcome {
            comparables: state.comparables,
            band_assignment: state.band_assignment,
            rent_range: state.rent_range,
        })
    }

    /// Execute one stage and return the next one
    async fn run_stage(
        &self,
        stage: Stage,
        state: &mut AnalysisState<'_>,
    ) -> Result<Stage, AnalysisError> {
        match stage {
            Stage::Filter => {
                state.comparables = select_comparables(
                    state.subject,
                    state.pool,
                    state.radius_km,
                    state.area_tolerance_percent,
                );

                if state.comparables.is_empty() {
                    tracing::debug!(
                        "No comparables for {} within {}km, skipping classification",
                        state.subject.id,
                        state.radius_km
                    );
                    Ok(Stage::Done)
                } else {
                    tracing::debug!(
                        "Selected {} comparables for {}",
                        state.comparables.len(),
                        state.subject.id
                    );
                    Ok(Stage::Classify)
                }
            }
            Stage::Classify => {
                let assignment = self
                    .classifier
                    .classify(state.subject, &state.comparables)
                    .await?;

                tracing::debug!(
                    "Subject {} assigned to band {} (confidence {:.2})",
                    state.subject.id,
                    assignment.subject_band,
                    assignment.confidence
                );

                state.band_assignment = Some(assignment);
                Ok(Stage::Estimate)
            }
            Stage::Estimate => {
                if let Some(assignment) = &state.band_assignment {
                    let members = assignment.subject_band_members();

                    let rents: Vec<f64> = state
                        .comparables
                        .iter()
                        .filter(|record| members.contains(&record.id))
                        .filter_map(|record| record.current_rent)
                        .collect();

                    if rents.is_empty() {
                        tracing::debug!(
                            "Band {} has no usable rents for {}",
                            assignment.subject_band,
                            state.subject.id
                        );
                    } else {
                        state.rent_range = Some(estimate_range(&rents));
                    }
                }

                Ok(Stage::Done)
            }
            Stage::Done => Ok(Stage::Done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmenitySet, Band, StructuralConfig};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(id: &str, lat: f64, lon: f64, rent: Option<f64>) -> PropertyRecord {
        PropertyRecord {
            id: id.to_string(),
            structural: StructuralConfig {
                area_sqft: 1000.0,
                bhk_type: "2BHK".to_string(),
                bedrooms: 2,
                bathrooms: 2,
                property_type: "apartment".to_string(),
            },
            amenities: AmenitySet::default(),
            city: "Bangalore".to_string(),
            locality: "Koramangala".to_string(),
            latitude: lat,
            longitude: lon,
            current_rent: rent,
        }
    }

    fn assignment(bands: &[(Band, &[&str])], subject_band: Band) -> BandAssignment {
        let mut map = BTreeMap::new();
        for (band, ids) in bands {
            map.insert(*band, ids.iter().map(|s| s.to_string()).collect());
        }
        BandAssignment {
            bands: map,
            criteria_used: vec!["furnishing_level".to_string()],
            rationale: "test split".to_string(),
            subject_band,
            confidence: 0.9,
        }
    }

    /// Classifier that returns a canned assignment and counts invocations
    struct FixedClassifier {
        assignment: BandAssignment,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(assignment: BandAssignment) -> Self {
            Self {
                assignment,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl BandClassifier for FixedClassifier {
        async fn classify(
            &self,
            _subject: &PropertyRecord,
            _comparables: &[PropertyRecord],
        ) -> Result<BandAssignment, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.assignment.clone())
        }
    }

    struct UnavailableClassifier;

    impl BandClassifier for UnavailableClassifier {
        async fn classify(
            &self,
            _subject: &PropertyRecord,
            _comparables: &[PropertyRecord],
        ) -> Result<BandAssignment, ClassifierError> {
            Err(ClassifierError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_empty_pool_short_circuits_before_classification() {
        let classifier = FixedClassifier::new(assignment(&[], Band::L3));
        let pipeline = BandingPipeline::new(classifier);
        let subject = record("subject", 12.9352, 77.6245, None);

        let outcome = pipeline.analyze(&subject, &[], 2.0, 15.0).await.unwrap();

        assert!(outcome.comparables.is_empty());
        assert!(outcome.band_assignment.is_none());
        assert!(outcome.rent_range.is_none());
        assert_eq!(pipeline.classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_run_produces_band_range() {
        let classifier = FixedClassifier::new(assignment(
            &[(Band::L3, &["near1", "near2"]), (Band::L5, &["near3"])],
            Band::L3,
        ));
        let pipeline = BandingPipeline::new(classifier);

        let subject = record("subject", 12.9352, 77.6245, None);
        let pool = vec![
            record("near1", 12.9362, 77.6255, Some(15000.0)),
            record("near2", 12.9372, 77.6265, Some(25000.0)),
            record("near3", 12.9355, 77.6248, Some(60000.0)),
        ];

        let outcome = pipeline.analyze(&subject, &pool, 2.0, 15.0).await.unwrap();

        assert_eq!(outcome.comparables.len(), 3);
        let range = outcome.rent_range.unwrap();
        assert_eq!(range.median, 20000.0);
        assert_eq!(range.recommended_min, range.q1);
        assert_eq!(range.recommended_max, range.q3);
        assert_eq!(pipeline.classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subject_band_without_rents_leaves_range_unset() {
        // The assigned band points at a comparable with no listed rent
        let classifier =
            FixedClassifier::new(assignment(&[(Band::L2, &["no_rent"])], Band::L2));
        let pipeline = BandingPipeline::new(classifier);

        let subject = record("subject", 12.9352, 77.6245, None);
        let pool = vec![
            record("no_rent", 12.9362, 77.6255, None),
            record("priced", 12.9372, 77.6265, Some(30000.0)),
        ];

        let outcome = pipeline.analyze(&subject, &pool, 2.0, 15.0).await.unwrap();

        assert!(outcome.band_assignment.is_some());
        assert!(outcome.rent_range.is_none());
    }

    #[tokio::test]
    async fn test_subject_band_missing_from_bands_map() {
        // Schema-valid but semantically inconsistent reply: the subject's
        // band has no entry in the bands map. Treated as an empty band.
        let classifier =
            FixedClassifier::new(assignment(&[(Band::L1, &["near1"])], Band::L4));
        let pipeline = BandingPipeline::new(classifier);

        let subject = record("subject", 12.9352, 77.6245, None);
        let pool = vec![record("near1", 12.9362, 77.6255, Some(18000.0))];

        let outcome = pipeline.analyze(&subject, &pool, 2.0, 15.0).await.unwrap();

        assert!(outcome.band_assignment.is_some());
        assert!(outcome.rent_range.is_none());
    }

    #[tokio::test]
    async fn test_classifier_failure_fails_the_run() {
        let pipeline = BandingPipeline::new(UnavailableClassifier);

        let subject = record("subject", 12.9352, 77.6245, None);
        let pool = vec![record("near1", 12.9362, 77.6255, Some(18000.0))];

        let result = pipeline.analyze(&subject, &pool, 2.0, 15.0).await;

        assert!(matches!(
            result,
            Err(AnalysisError::ClassificationUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_negative_parameters_rejected_before_any_stage() {
        let classifier = FixedClassifier::new(assignment(&[], Band::L3));
        let pipeline = BandingPipeline::new(classifier);
        let subject = record("subject", 12.9352, 77.6245, None);
        let pool = vec![record("near1", 12.9362, 77.6255, Some(18000.0))];

        let bad_radius = pipeline.analyze(&subject, &pool, -1.0, 15.0).await;
        assert!(matches!(bad_radius, Err(AnalysisError::InvalidInput(_))));

        let bad_tolerance = pipeline.analyze(&subject, &pool, 2.0, -5.0).await;
        assert!(matches!(bad_tolerance, Err(AnalysisError::InvalidInput(_))));

        assert_eq!(pipeline.classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_filter_transition_short_circuits() {
        let classifier = FixedClassifier::new(assignment(&[], Band::L3));
        let pipeline = BandingPipeline::new(classifier);
        let subject = record("subject", 12.9352, 77.6245, None);

        let mut state = AnalysisState {
            subject: &subject,
            pool: &[],
            radius_km: 2.0,
            area_tolerance_percent: 15.0,
            comparables: Vec::new(),
            band_assignment: None,
            rent_range: None,
        };

        let next = pipeline.run_stage(Stage::Filter, &mut state).await.unwrap();
        assert_eq!(next, Stage::Done);
    }

    #[tokio::test]
    async fn test_filter_transition_advances_to_classify() {
        let classifier = FixedClassifier::new(assignment(&[], Band::L3));
        let pipeline = BandingPipeline::new(classifier);
        let subject = record("subject", 12.9352, 77.6245, None);
        let pool = vec![record("near1", 12.9362, 77.6255, Some(18000.0))];

        let mut state = AnalysisState {
            subject: &subject,
            pool: &pool,
            radius_km: 2.0,
            area_tolerance_percent: 15.0,
            comparables: Vec::new(),
            band_assignment: None,
            rent_range: None,
        };

        let next = pipeline.run_stage(Stage::Filter, &mut state).await.unwrap();
        assert_eq!(next, Stage::Classify);
        assert_eq!(state.comparables.len(), 1);
    }
}
