// ===============================
// src/window.rs
// ===============================
//
// Report-window arithmetic. Pure: "now" is always an explicit input so
// every branch is testable without the wall clock.
//
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;

use crate::config::ReportMode;

/// Inclusive search range sent to the claims API, plus the optional
/// single day the normalizer should keep rows for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWindow {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Set for the single-day modes (Today/Yesterday/Tomorrow): rows whose
    /// cutoff date differs are dropped after normalization.
    pub target_day: Option<NaiveDate>,
}

// Fixed historical ranges for the Weekly / Monthly views.
const WEEKLY_START: (i32, u32, u32) = (2023, 5, 8);
const WEEKLY_END: (i32, u32, u32) = (2023, 5, 14);
const MONTHLY_START: (i32, u32, u32) = (2023, 4, 15);
const MONTHLY_END: (i32, u32, u32) = (2023, 5, 31);

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixed date")
}

/// Compute the search window for a report mode at `now_local` (reference
/// timezone). Day-offset modes look two days back from the reference day;
/// `Received` looks a week back and two days forward; the fixed ranges
/// start one day before their nominal start so claims created late on the
/// previous day (API offset skew) are not missed.
pub fn search_window(mode: ReportMode, now_local: DateTime<Tz>) -> SearchWindow {
    match mode {
        ReportMode::Received => {
            let today = now_local.date_naive();
            SearchWindow {
                date_from: today - Duration::days(7),
                date_to: today + Duration::days(2),
                target_day: None,
            }
        }
        ReportMode::Today | ReportMode::Yesterday | ReportMode::Tomorrow => {
            let offset_back = match mode {
                ReportMode::Yesterday => 1,
                ReportMode::Tomorrow => -1,
                _ => 0,
            };
            let day = (now_local - Duration::days(offset_back)).date_naive();
            SearchWindow {
                date_from: day - Duration::days(2),
                date_to: day,
                target_day: Some(day),
            }
        }
        ReportMode::Weekly => SearchWindow {
            date_from: ymd(WEEKLY_START) - Duration::days(1),
            date_to: ymd(WEEKLY_END),
            target_day: None,
        },
        ReportMode::Monthly => SearchWindow {
            date_from: ymd(MONTHLY_START) - Duration::days(1),
            date_to: ymd(MONTHLY_END),
            target_day: None,
        },
    }
}
