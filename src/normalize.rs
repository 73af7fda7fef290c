// ===============================
// src/normalize.rs
// ===============================
//
// RawClaim -> ReportRow. One validation pass per claim: either every
// mandatory path is present and parseable and a full row comes out, or
// the claim is dropped with a reason. Optional fields fall back to their
// documented sentinel strings.
//
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::claims_api::RawClaim;
use crate::domain::{ReportRow, ZoneFlags};

pub const SENTINEL_CLIENT_ID: &str = "External ID not set";
pub const SENTINEL_LO_CODE: &str = "No LO code";
pub const SENTINEL_COMMENT: &str = "Missing comment in claim";

/// Why a claim was excluded from the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No delivery-window start timestamp at all.
    MissingCutoff,
    /// A mandatory timestamp did not parse as ISO-8601.
    BadTimestamp,
    /// Pickup or drop-off route point absent.
    MissingRoutePoint,
    /// Route point present but without usable coordinates.
    MissingCoordinates,
    /// Cutoff falls on a different day than the mode's target day.
    OffTargetDay,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::MissingCutoff      => "missing_cutoff",
            DropReason::BadTimestamp       => "bad_timestamp",
            DropReason::MissingRoutePoint  => "missing_route_point",
            DropReason::MissingCoordinates => "missing_coordinates",
            DropReason::OffTargetDay       => "off_target_day",
        }
    }
}

fn parse_zoned(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&tz))
}

/// Normalize one claim. All timestamps land in `tz`; when `target_day`
/// is set (single-day report modes) rows with a different cutoff date
/// are rejected with `OffTargetDay`.
pub fn normalize(
    claim: &RawClaim,
    tz: Tz,
    target_day: Option<NaiveDate>,
) -> Result<ReportRow, DropReason> {
    let cutoff_raw = claim
        .delivery_interval_from()
        .ok_or(DropReason::MissingCutoff)?;
    let cutoff = parse_zoned(cutoff_raw, tz).ok_or(DropReason::BadTimestamp)?;

    if let Some(day) = target_day {
        if cutoff.date_naive() != day {
            return Err(DropReason::OffTargetDay);
        }
    }

    let destination = claim.destination().ok_or(DropReason::MissingRoutePoint)?;
    let pickup = claim.pickup().ok_or(DropReason::MissingRoutePoint)?;
    let (lon, lat) = destination
        .lon_lat()
        .ok_or(DropReason::MissingCoordinates)?;
    let (store_lon, store_lat) = pickup.lon_lat().ok_or(DropReason::MissingCoordinates)?;

    let created_raw = claim.created_ts.as_deref().ok_or(DropReason::BadTimestamp)?;
    let created_time = parse_zoned(created_raw, tz).ok_or(DropReason::BadTimestamp)?;
    let status_raw = claim.updated_ts.as_deref().ok_or(DropReason::BadTimestamp)?;
    let status_time = parse_zoned(status_raw, tz).ok_or(DropReason::BadTimestamp)?;

    let address = destination
        .address
        .as_ref()
        .ok_or(DropReason::MissingRoutePoint)?;
    let contact = destination
        .contact
        .as_ref()
        .ok_or(DropReason::MissingRoutePoint)?;

    Ok(ReportRow {
        cutoff,
        created_time,
        client_id: destination
            .external_order_id
            .clone()
            .unwrap_or_else(|| SENTINEL_CLIENT_ID.to_string()),
        claim_id: claim.id.clone(),
        lo_code: claim
            .lo_code()
            .map(|s| s.to_string())
            .unwrap_or_else(|| SENTINEL_LO_CODE.to_string()),
        status: claim.status.clone(),
        status_time,
        receiver_address: address.fullname.clone(),
        receiver_phone: contact.phone.clone(),
        receiver_name: contact.name.clone(),
        client_comment: claim
            .comment
            .clone()
            .unwrap_or_else(|| SENTINEL_COMMENT.to_string()),
        lon,
        lat,
        store_lon,
        store_lat,
        corp_client_id: claim.corp_client_id.clone(),
        flags: ZoneFlags::default(),
    })
}
