// ===============================
// src/domain.rs
// ===============================
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// The three delivery-eligibility zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind { Sdd, NddNear, NddFar }

impl ZoneKind {
    pub fn parse_one(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sdd" | "same_day"  => Some(ZoneKind::Sdd),
            "ndd_near" | "near" => Some(ZoneKind::NddNear),
            "ndd_far" | "far"   => Some(ZoneKind::NddFar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Sdd     => "sdd",
            ZoneKind::NddNear => "ndd_near",
            ZoneKind::NddFar  => "ndd_far",
        }
    }
}

/// Per-row zone membership. All false until classification runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneFlags {
    pub sdd_zone: bool,
    pub near_ndd_zone: bool,
    pub far_ndd_zone: bool,
}

impl ZoneFlags {
    pub fn in_zone(&self, kind: ZoneKind) -> bool {
        match kind {
            ZoneKind::Sdd     => self.sdd_zone,
            ZoneKind::NddNear => self.near_ndd_zone,
            ZoneKind::NddFar  => self.far_ndd_zone,
        }
    }
}

/// One normalized order. All timestamps are already converted to the
/// reference timezone; `claim_id` is the row identity within a fetch window.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub cutoff: DateTime<Tz>,
    pub created_time: DateTime<Tz>,
    pub client_id: String,
    pub claim_id: String,
    pub lo_code: String,
    pub status: String,
    pub status_time: DateTime<Tz>,
    pub receiver_address: String,
    pub receiver_phone: String,
    pub receiver_name: String,
    pub client_comment: String,
    pub lon: f64,
    pub lat: f64,
    pub store_lon: f64,
    pub store_lat: f64,
    pub corp_client_id: String,
    pub flags: ZoneFlags,
}
