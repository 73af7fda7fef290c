// ===============================
// src/report.rs
// ===============================
//
// Pipeline orchestration: fetch -> normalize -> classify. Non-fatal
// losses (failed credentials, dropped claims) are logged and counted so
// the completeness of a report can be audited afterwards.
//
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::info;

use crate::classify::classify;
use crate::config::{Config, ReportMode};
use crate::domain::{ReportRow, ZoneKind};
use crate::fetcher::{fetch_all, ClaimsApi};
use crate::metrics::{CLAIMS_DROPPED, REPORT_ROWS};
use crate::normalize::normalize;
use crate::window::search_window;
use crate::zones::ZoneStore;

/// Run the full pipeline for one report mode. Never fails: a report is
/// produced from whatever the credentials and claims yielded.
pub async fn build_report<A: ClaimsApi>(
    api: &A,
    cfg: &Config,
    zones: &ZoneStore,
    mode: ReportMode,
    now_local: DateTime<Tz>,
) -> Vec<ReportRow> {
    let window = search_window(mode, now_local);
    info!(
        mode = mode.as_str(),
        date_from = %window.date_from,
        date_to = %window.date_to,
        credentials = cfg.claim_secrets.len(),
        "building report"
    );

    let outcome = fetch_all(
        api,
        &cfg.claim_secrets,
        &window,
        &cfg.request_utc_offset,
        cfg.page_limit,
    )
    .await;

    let total_claims = outcome.claims.len();
    let mut dropped: usize = 0;
    let mut rows: Vec<ReportRow> = Vec::with_capacity(total_claims);
    for claim in &outcome.claims {
        match normalize(claim, cfg.client_timezone, window.target_day) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                dropped += 1;
                CLAIMS_DROPPED.with_label_values(&[reason.as_str()]).inc();
            }
        }
    }

    classify(&mut rows, zones);

    REPORT_ROWS
        .with_label_values(&[mode.as_str()])
        .set(rows.len() as i64);
    info!(
        mode = mode.as_str(),
        claims = total_claims,
        rows = rows.len(),
        dropped,
        failed_credentials = outcome.failed_credentials,
        "report ready"
    );
    rows
}

/// Dashboard view filter: keep only the configured statuses
/// (default: claims still waiting for a courier).
pub fn filter_by_status(rows: &[ReportRow], statuses: &[String]) -> Vec<ReportRow> {
    rows.iter()
        .filter(|r| statuses.iter().any(|s| s == &r.status))
        .cloned()
        .collect()
}

/// Rows whose drop-off failed the selected zone's containment test.
pub fn out_of_zone(rows: &[ReportRow], zone: ZoneKind) -> Vec<ReportRow> {
    rows.iter()
        .filter(|r| !r.flags.in_zone(zone))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub zone: ZoneKind,
    pub total: usize,
    pub excluded: usize,
    pub exclusion_rate: f64,
}

pub fn summarize(rows: &[ReportRow], zone: ZoneKind) -> Summary {
    let excluded = rows.iter().filter(|r| !r.flags.in_zone(zone)).count();
    let exclusion_rate = if rows.is_empty() {
        0.0
    } else {
        excluded as f64 / rows.len() as f64
    };
    Summary {
        zone,
        total: rows.len(),
        excluded,
        exclusion_rate,
    }
}
