// ===============================
// src/metrics.rs
// ===============================
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

// Single custom registry (we register everything here)
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

// -------- Fetch pipeline --------
pub static CLAIMS_FETCHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("claims_fetched_total", "claims returned by the API per credential"),
        &["credential"],
    )
    .unwrap()
});

pub static PAGES_FETCHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pages_fetched_total", "search pages fetched per credential"),
        &["credential"],
    )
    .unwrap()
});

pub static FETCH_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "fetch_errors_total",
            "failed credential fetches (credential skipped, report partial)",
        ),
        &["credential"],
    )
    .unwrap()
});

// -------- Normalization --------
pub static CLAIMS_DROPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("claims_dropped_total", "claims excluded from the report (label: reason)"),
        &["reason"],
    )
    .unwrap()
});

// -------- Cache --------
pub static CACHE_HITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("report_cache_hits_total", "report cache hits per mode"),
        &["mode"],
    )
    .unwrap()
});

pub static CACHE_MISSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("report_cache_misses_total", "report cache misses per mode"),
        &["mode"],
    )
    .unwrap()
});

// -------- Report contents --------
pub static REPORT_ROWS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("report_rows", "rows in the last built report per mode"),
        &["mode"],
    )
    .unwrap()
});

pub static OUT_OF_ZONE_ROWS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("out_of_zone_rows", "rows failing the selected zone test (label: zone)"),
        &["zone"],
    )
    .unwrap()
});

// ---- Config visibility (mode / zone selector) ----
pub static CONFIG_MODE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("config_report_mode", "active report mode (label: mode)"),
        &["mode"],
    )
    .unwrap()
});

pub static CONFIG_ZONE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("config_exclusion_zone", "zone used for the exclusion export (label: zone)"),
        &["zone"],
    )
    .unwrap()
});

pub fn init() {
    // Register all metrics to the custom registry
    for m in [
        REGISTRY.register(Box::new(CLAIMS_FETCHED.clone())),
        REGISTRY.register(Box::new(PAGES_FETCHED.clone())),
        REGISTRY.register(Box::new(FETCH_ERRORS.clone())),
        REGISTRY.register(Box::new(CLAIMS_DROPPED.clone())),
        REGISTRY.register(Box::new(CACHE_HITS.clone())),
        REGISTRY.register(Box::new(CACHE_MISSES.clone())),
        REGISTRY.register(Box::new(REPORT_ROWS.clone())),
        REGISTRY.register(Box::new(OUT_OF_ZONE_ROWS.clone())),
        REGISTRY.register(Box::new(CONFIG_MODE.clone())),
        REGISTRY.register(Box::new(CONFIG_ZONE.clone())),
    ] {
        let _ = m;
    }
}

// Encode all metrics in Prometheus text format
fn encode_metrics() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buf = Vec::new();
    if encoder.encode(&families, &mut buf).is_err() || buf.is_empty() {
        buf.extend_from_slice(b"# no metrics\n");
    }
    buf
}

// Serve one HTTP request (GET / or /metrics) — tiny HTTP 1.1 responder
fn handle_client(mut stream: TcpStream) {
    // Read a bit to consume headers (no full parse)
    let mut _req_buf = [0u8; 1024];
    let _ = stream.read(&mut _req_buf);

    let body = encode_metrics();
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

// Run the metrics server in a dedicated OS thread (keeps Tokio runtime clean)
pub async fn serve_metrics(port: u16) {
    thread::spawn(move || {
        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr)
            .unwrap_or_else(|e| panic!("metrics bind {} failed: {}", addr, e));
        eprintln!("metrics listening on http://{addr}/ (and /metrics)");

        for conn in listener.incoming() {
            match conn {
                Ok(stream) => handle_client(stream),
                Err(e) => eprintln!("metrics accept error: {}", e),
            }
        }
    });
}
