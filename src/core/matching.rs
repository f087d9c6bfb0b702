use crate::models::StructuralConfig;

/// Check whether a candidate's structural configuration is comparable to
/// the reference configuration
///
/// Bhk type, bedroom count, bathroom count and property type must match
/// exactly (no normalization or case folding). The candidate's area must
/// then fall within the reference area plus or minus
/// `area_tolerance_percent` percent, inclusive on both bounds.
#[inline]
pub fn is_comparable(
    reference: &StructuralConfig,
    candidate: &StructuralConfig,
    area_tolerance_percent: f64,
) -> bool {
    if reference.bhk_type != candidate.bhk_type {
        return false;
    }

    if reference.bedrooms != candidate.bedrooms {
        return false;
    }

    if reference.bathrooms != candidate.bathrooms {
        return false;
    }

    if reference.property_type != candidate.property_type {
        return false;
    }

    let tolerance = reference.area_sqft * (area_tolerance_percent / 100.0);
    let lower_bound = reference.area_sqft - tolerance;
    let upper_bound = reference.area_sqft + tolerance;

    candidate.area_sqft >= lower_bound && candidate.area_sqft <= upper_bound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(area_sqft: f64, bhk_type: &str, bedrooms: u8, bathrooms: u8, property_type: &str) -> StructuralConfig {
        StructuralConfig {
            area_sqft,
            bhk_type: bhk_type.to_string(),
            bedrooms,
            bathrooms,
            property_type: property_type.to_string(),
        }
    }

    #[test]
    fn test_exact_match() {
        let reference = config(1200.0, "3BHK", 3, 2, "apartment");
        let candidate = config(1200.0, "3BHK", 3, 2, "apartment");

        assert!(is_comparable(&reference, &candidate, 15.0));
    }

    #[test]
    fn test_area_within_tolerance() {
        let reference = config(1000.0, "2BHK", 2, 2, "apartment");
        let candidate = config(1100.0, "2BHK", 2, 2, "apartment");

        assert!(is_comparable(&reference, &candidate, 15.0));
    }

    #[test]
    fn test_area_outside_tolerance() {
        let reference = config(1000.0, "2BHK", 2, 2, "apartment");
        let candidate = config(1200.0, "2BHK", 2, 2, "apartment");

        assert!(!is_comparable(&reference, &candidate, 15.0));
    }

    #[test]
    fn test_area_boundaries_inclusive() {
        let reference = config(1000.0, "2BHK", 2, 2, "apartment");

        let lower = config(850.0, "2BHK", 2, 2, "apartment");
        let upper = config(1150.0, "2BHK", 2, 2, "apartment");

        assert!(is_comparable(&reference, &lower, 15.0));
        assert!(is_comparable(&reference, &upper, 15.0));
    }

    #[test]
    fn test_bhk_mismatch_rejects_regardless_of_area() {
        let reference = config(1000.0, "2BHK", 2, 2, "apartment");
        let candidate = config(1000.0, "3BHK", 2, 2, "apartment");

        assert!(!is_comparable(&reference, &candidate, 15.0));
    }

    #[test]
    fn test_bedrooms_mismatch() {
        let reference = config(1000.0, "2BHK", 2, 2, "apartment");
        let candidate = config(1000.0, "2BHK", 3, 2, "apartment");

        assert!(!is_comparable(&reference, &candidate, 15.0));
    }

    #[test]
    fn test_bathrooms_mismatch() {
        let reference = config(1000.0, "2BHK", 2, 2, "apartment");
        let candidate = config(1000.0, "2BHK", 2, 3, "apartment");

        assert!(!is_comparable(&reference, &candidate, 15.0));
    }

    #[test]
    fn test_property_type_mismatch() {
        let reference = config(1000.0, "2BHK", 2, 2, "apartment");
        let candidate = config(1000.0, "2BHK", 2, 2, "villa");

        assert!(!is_comparable(&reference, &candidate, 15.0));
    }

    #[test]
    fn test_zero_tolerance_requires_equal_area() {
        let reference = config(1000.0, "2BHK", 2, 2, "apartment");

        let equal = config(1000.0, "2BHK", 2, 2, "apartment");
        let off_by_one = config(1001.0, "2BHK", 2, 2, "apartment");

        assert!(is_comparable(&reference, &equal, 0.0));
        assert!(!is_comparable(&reference, &off_by_one, 0.0));
    }
}
