// ===============================
// src/export.rs
// ===============================
//
// Tabular exports for the presentation layer: the full classified table
// and the out-of-zone subset, one CSV each. Parent directories are
// created on demand; a failed export is logged by the caller and never
// takes the report down.
//
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::domain::ReportRow;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

pub const REPORT_COLUMNS: [&str; 19] = [
    "cutoff",
    "created_time",
    "client_id",
    "claim_id",
    "lo_code",
    "status",
    "status_time",
    "receiver_address",
    "receiver_phone",
    "receiver_name",
    "client_comment",
    "lon",
    "lat",
    "store_lon",
    "store_lat",
    "corp_client_id",
    "sdd_zone",
    "near_ndd_zone",
    "far_ndd_zone",
];

pub const EXCLUDED_COLUMNS: [&str; 4] = ["claim_id", "created_time", "client_id", "receiver_address"];

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// All rows with the full column set plus the three zone flags.
pub fn write_full_report(path: &Path, rows: &[ReportRow]) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(REPORT_COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.cutoff.format("%Y-%m-%d %H:%M").to_string(),
            row.created_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.client_id.clone(),
            row.claim_id.clone(),
            row.lo_code.clone(),
            row.status.clone(),
            row.status_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.receiver_address.clone(),
            row.receiver_phone.clone(),
            row.receiver_name.clone(),
            row.client_comment.clone(),
            row.lon.to_string(),
            row.lat.to_string(),
            row.store_lon.to_string(),
            row.store_lat.to_string(),
            row.corp_client_id.clone(),
            row.flags.sdd_zone.to_string(),
            row.flags.near_ndd_zone.to_string(),
            row.flags.far_ndd_zone.to_string(),
        ])?;
    }
    writer.flush().map_err(ExportError::Io)?;
    info!(path = %path.display(), rows = rows.len(), "full report written");
    Ok(())
}

/// Out-of-zone rows with the reduced column set (the exclusion list the
/// dispatchers work from). `created_time` is truncated to the date.
pub fn write_excluded_report(path: &Path, rows: &[ReportRow]) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(EXCLUDED_COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.claim_id.clone(),
            row.created_time.format("%Y-%m-%d").to_string(),
            row.client_id.clone(),
            row.receiver_address.clone(),
        ])?;
    }
    writer.flush().map_err(ExportError::Io)?;
    info!(path = %path.display(), rows = rows.len(), "exclusion report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, tests::full_claim};
    use chrono_tz::America::Santiago;
    use std::path::PathBuf;

    fn tmp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join("exclude_machine_tests")
            .join(format!("{}-{}", std::process::id(), name))
    }

    fn sample_rows() -> Vec<ReportRow> {
        [full_claim("c1", -70.6, -33.5), full_claim("c2", -70.7, -33.4)]
            .iter()
            .map(|c| normalize(c, Santiago, None).unwrap())
            .collect()
    }

    #[test]
    fn full_report_has_header_and_all_rows() {
        let path = tmp_path("full.csv");
        let rows = sample_rows();
        write_full_report(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("cutoff,created_time,client_id,claim_id"));
        assert!(lines[1].contains("c1"));
        assert!(lines[1].contains("2023-05-20 16:00"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn excluded_report_uses_reduced_columns() {
        let path = tmp_path("excluded.csv");
        let rows = sample_rows();
        write_excluded_report(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "claim_id,created_time,client_id,receiver_address");
        assert!(lines[1].starts_with("c1,2023-05-20,EXT-1"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn parent_directories_are_created() {
        let path = tmp_path("nested/dir/report.csv");
        write_full_report(&path, &[]).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }
}
