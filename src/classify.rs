// ===============================
// src/classify.rs
// ===============================
use crate::domain::ReportRow;
use crate::zones::ZoneStore;

/// Attach the three zone-membership flags to every row. Pure per row and
/// stable: rows keep their input order. Classifying twice yields the same
/// flags (the zone store is immutable).
pub fn classify(rows: &mut [ReportRow], zones: &ZoneStore) {
    for row in rows.iter_mut() {
        row.flags = zones.flags_for(row.lon, row.lat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, tests::full_claim};
    use crate::zones::tests::square_store;
    use chrono_tz::America::Santiago;

    fn rows() -> Vec<ReportRow> {
        // First drop-off inside the unit-square zones, second far outside.
        [full_claim("inside", 5.0, 5.0), full_claim("outside", 50.0, 50.0)]
            .iter()
            .map(|c| normalize(c, Santiago, None).unwrap())
            .collect()
    }

    #[test]
    fn flags_follow_input_order() {
        let zones = square_store();
        let mut rows = rows();
        classify(&mut rows, &zones);

        assert_eq!(rows[0].claim_id, "inside");
        assert!(rows[0].flags.sdd_zone);
        assert!(rows[0].flags.near_ndd_zone);
        assert!(rows[0].flags.far_ndd_zone);

        assert_eq!(rows[1].claim_id, "outside");
        assert!(!rows[1].flags.sdd_zone);
        assert!(!rows[1].flags.near_ndd_zone);
        assert!(!rows[1].flags.far_ndd_zone);
    }

    #[test]
    fn classification_is_idempotent() {
        let zones = square_store();
        let mut once = rows();
        classify(&mut once, &zones);
        let mut twice = once.clone();
        classify(&mut twice, &zones);
        assert_eq!(once, twice);
    }
}
