use crate::core::distance::haversine_distance;
use crate::core::matching::is_comparable;
use crate::models::PropertyRecord;

/// Reduce a candidate pool to the subject's comparable set
///
/// A candidate is kept when its structural configuration fuzzy-matches the
/// subject's under `area_tolerance_percent` and it lies within `radius_km`
/// of the subject. The subject itself is always excluded by id, and the
/// pool's order is preserved. An empty result is a valid outcome for
/// sparse markets, not an error.
pub fn select_comparables(
    subject: &PropertyRecord,
    pool: &[PropertyRecord],
    radius_km: f64,
    area_tolerance_percent: f64,
) -> Vec<PropertyRecord> {
    pool.iter()
        .filter(|candidate| candidate.id != subject.id)
        .filter(|candidate| {
            is_comparable(&subject.structural, &candidate.structural, area_tolerance_percent)
        })
        .filter(|candidate| {
            let distance = haversine_distance(
                subject.latitude,
                subject.longitude,
                candidate.latitude,
                candidate.longitude,
            );
            distance <= radius_km
        })
        .cloned()
        .collect()
}
