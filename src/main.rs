// ===============================
// src/main.rs
// ===============================
mod cache;
mod claims_api; // wire models for the upstream claims API
mod classify;
mod config;
mod domain;
mod export;
mod fetcher; // paginated per-credential fetch (reqwest)
mod metrics;
mod normalize;
mod report;
mod window; // pure report-window date arithmetic
mod zones; // GeoJSON zone store

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

use crate::cache::ReportCache;
use crate::config::ReportMode;
use crate::domain::ZoneKind;
use crate::fetcher::HttpClaimsApi;
use crate::zones::ZoneStore;

#[derive(Parser, Debug)]
#[command(name = "exclude_machine", about = "Delivery-zone exclusion reports")]
struct Cli {
    /// Report window: received|today|yesterday|tomorrow|weekly|monthly
    #[arg(long, default_value = "received")]
    mode: String,

    /// Zone used for the exclusion export: sdd|ndd_near|ndd_far
    #[arg(long, default_value = "sdd")]
    zone: String,

    /// Directory the CSV exports are written to
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Rebuild interval in seconds; 0 runs once and exits. The cache TTL
    /// still governs how often the upstream API is actually called.
    #[arg(long, default_value_t = 0)]
    refresh_secs: u64,
}

#[tokio::main]
async fn main() {
    // ---- Logging ----
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();

    let Some(mode) = ReportMode::parse_one(&cli.mode) else {
        error!(mode = %cli.mode, "unknown report mode");
        std::process::exit(2);
    };
    let Some(zone) = ZoneKind::parse_one(&cli.zone) else {
        error!(zone = %cli.zone, "unknown zone selector");
        std::process::exit(2);
    };

    // ---- Load config ----
    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // ---- Metrics ----
    metrics::init();
    tokio::spawn(metrics::serve_metrics(cfg.metrics_port));

    // ---- Human-friendly startup info + export config to metrics ----
    info!(
        mode = mode.as_str(),
        zone = zone.as_str(),
        timezone = %cfg.client_timezone,
        credentials = cfg.claim_secrets.len(),
        cache_ttl_secs = cfg.cache_ttl_secs,
        refresh_secs = cli.refresh_secs,
        out_dir = %cli.out_dir.display(),
        "startup config"
    );
    metrics::CONFIG_MODE
        .with_label_values(&[mode.as_str()])
        .set(1);
    metrics::CONFIG_ZONE
        .with_label_values(&[zone.as_str()])
        .set(1);

    // ---- Zone store (fatal if the geometry cannot be loaded) ----
    let zones = match ZoneStore::load(
        &cfg.zone_paths.sdd,
        &cfg.zone_paths.ndd_near,
        &cfg.zone_paths.ndd_far,
    ) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "zone geometry load failed");
            std::process::exit(1);
        }
    };

    let api = HttpClaimsApi::new(cfg.api_url.clone());
    let cache = ReportCache::new(Duration::from_secs(cfg.cache_ttl_secs));

    loop {
        let now_local = Utc::now().with_timezone(&cfg.client_timezone);

        let rows = cache
            .get_or_compute(mode, || {
                report::build_report(&api, &cfg, &zones, mode, now_local)
            })
            .await;

        let filtered = report::filter_by_status(&rows, &cfg.status_filter);
        let excluded = report::out_of_zone(&filtered, zone);
        let summary = report::summarize(&filtered, zone);

        metrics::OUT_OF_ZONE_ROWS
            .with_label_values(&[zone.as_str()])
            .set(summary.excluded as i64);
        info!(
            zone = zone.as_str(),
            claims = summary.total,
            out_of_zone = summary.excluded,
            exclusion_rate = format!("{:.0}%", summary.exclusion_rate * 100.0),
            "report summary"
        );

        // Exports are named after the day the report is about.
        let report_day = window::search_window(mode, now_local)
            .target_day
            .unwrap_or_else(|| now_local.date_naive());
        let full_path = cli.out_dir.join(format!("route_report_{report_day}.csv"));
        let excluded_path = cli.out_dir.join(format!("excluded_orders_{report_day}.csv"));

        if let Err(e) = export::write_full_report(&full_path, &filtered) {
            error!(error = %e, path = %full_path.display(), "full report export failed");
        }
        if let Err(e) = export::write_excluded_report(&excluded_path, &excluded) {
            error!(error = %e, path = %excluded_path.display(), "exclusion export failed");
        }

        if cli.refresh_secs == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_secs(cli.refresh_secs)).await;
    }
}
