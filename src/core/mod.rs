// Core algorithm exports
pub mod comparables;
pub mod distance;
pub mod matching;
pub mod pipeline;
pub mod quartiles;

pub use comparables::select_comparables;
pub use distance::haversine_distance;
pub use matching::is_comparable;
pub use pipeline::{
    AnalysisError, AnalysisOutcome, BandClassifier, BandingPipeline, ClassifierError, Stage,
};
pub use quartiles::estimate_range;
