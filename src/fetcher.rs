// ===============================
// src/fetcher.rs
// ===============================
//
// Claims fetcher: bearer-authenticated POST search with cursor
// pagination, one sequential page loop per credential, credentials
// fetched concurrently. Failure policy is explicit: a credential that
// errors is logged, counted, and skipped — the report is built from the
// credentials that succeeded.
//
use futures_util::future::join_all;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::claims_api::{ClaimsPage, RawClaim};
use crate::metrics::{CLAIMS_FETCHED, FETCH_ERRORS, PAGES_FETCHED};
use crate::window::SearchWindow;

#[derive(Debug, Error)]
pub enum FetchErrorKind {
    #[error("http status {0}")]
    Status(reqwest::StatusCode),
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A failed credential fetch. Carries the credential's position in the
/// configured list, never the token itself.
#[derive(Debug, Error)]
#[error("credential #{credential}: {kind}")]
pub struct FetchError {
    pub credential: usize,
    pub kind: FetchErrorKind,
}

/// Transport seam for the claims search endpoint. The production
/// implementation is `HttpClaimsApi`; tests swap in a scripted mock.
#[allow(async_fn_in_trait)]
pub trait ClaimsApi {
    async fn search(&self, token: &str, body: &Value) -> Result<ClaimsPage, FetchErrorKind>;
}

pub struct HttpClaimsApi {
    http: reqwest::Client,
    api_url: String,
}

impl HttpClaimsApi {
    pub fn new(api_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
        }
    }
}

impl ClaimsApi for HttpClaimsApi {
    async fn search(&self, token: &str, body: &Value) -> Result<ClaimsPage, FetchErrorKind> {
        let rsp = self
            .http
            .post(&self.api_url)
            .bearer_auth(token)
            .header("Accept-Language", "en")
            .json(body)
            .send()
            .await?;

        let status = rsp.status();
        if !status.is_success() {
            let detail = rsp.text().await.unwrap_or_default();
            error!(%status, %detail, "claims search rejected");
            return Err(FetchErrorKind::Status(status));
        }
        Ok(rsp.json::<ClaimsPage>().await?)
    }
}

/// First-page payload: inclusive date bounds with the fixed UTC offset
/// applied to both ends, plus the page-size limit. The API expects
/// `cursor: 0` on the opening request and the opaque token afterwards.
pub fn first_page_body(window: &SearchWindow, utc_offset: &str, limit: u32) -> Value {
    json!({
        "created_from": format!("{}T00:00:00{}", window.date_from, utc_offset),
        "created_to": format!("{}T23:59:59{}", window.date_to, utc_offset),
        "limit": limit,
        "cursor": 0,
    })
}

/// Fetch every page for one credential, preserving page order.
pub async fn fetch_credential<A: ClaimsApi>(
    api: &A,
    credential: usize,
    token: &str,
    window: &SearchWindow,
    utc_offset: &str,
    limit: u32,
) -> Result<Vec<RawClaim>, FetchError> {
    let label = credential.to_string();
    let mut body = first_page_body(window, utc_offset, limit);
    let mut claims: Vec<RawClaim> = Vec::new();
    let mut pages: u32 = 0;

    loop {
        let page = api
            .search(token, &body)
            .await
            .map_err(|kind| FetchError { credential, kind })?;
        pages += 1;
        PAGES_FETCHED.with_label_values(&[&label]).inc();
        claims.extend(page.claims);

        match page.cursor {
            Some(cursor) => body = json!({ "cursor": cursor }),
            None => break, // last page
        }
    }

    CLAIMS_FETCHED
        .with_label_values(&[&label])
        .inc_by(claims.len() as u64);
    debug!(credential, pages, claims = claims.len(), "pagination exhausted");
    Ok(claims)
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub claims: Vec<RawClaim>,
    pub failed_credentials: usize,
}

/// Fetch all credentials concurrently and concatenate their claims.
/// Ordering across credentials follows the configured list; ordering
/// within one credential follows its pagination.
pub async fn fetch_all<A: ClaimsApi>(
    api: &A,
    secrets: &[String],
    window: &SearchWindow,
    utc_offset: &str,
    limit: u32,
) -> FetchOutcome {
    let fetches = secrets
        .iter()
        .enumerate()
        .map(|(idx, token)| fetch_credential(api, idx, token, window, utc_offset, limit));

    let mut outcome = FetchOutcome::default();
    for result in join_all(fetches).await {
        match result {
            Ok(batch) => outcome.claims.extend(batch),
            Err(e) => {
                outcome.failed_credentials += 1;
                FETCH_ERRORS
                    .with_label_values(&[&e.credential.to_string()])
                    .inc();
                warn!(credential = e.credential, error = %e, "credential fetch failed, continuing with partial results");
            }
        }
    }
    outcome
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub(crate) fn test_window() -> SearchWindow {
        SearchWindow {
            date_from: NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2023, 5, 22).unwrap(),
            target_day: None,
        }
    }

    fn claim(id: &str) -> RawClaim {
        RawClaim {
            id: id.to_string(),
            ..RawClaim::default()
        }
    }

    fn page(ids: &[&str], cursor: Option<&str>) -> ClaimsPage {
        ClaimsPage {
            claims: ids.iter().map(|id| claim(id)).collect(),
            cursor: cursor.map(|c| c.to_string()),
        }
    }

    /// Scripted transport: pops pre-canned pages in order and records
    /// every request body.
    pub(crate) struct MockApi {
        pages: Mutex<Vec<ClaimsPage>>,
        pub calls: AtomicUsize,
        pub bodies: Mutex<Vec<Value>>,
    }

    impl MockApi {
        pub(crate) fn new(pages: Vec<ClaimsPage>) -> Self {
            Self {
                pages: Mutex::new(pages),
                calls: AtomicUsize::new(0),
                bodies: Mutex::new(Vec::new()),
            }
        }
    }

    impl ClaimsApi for MockApi {
        async fn search(&self, token: &str, body: &Value) -> Result<ClaimsPage, FetchErrorKind> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies.lock().unwrap().push(body.clone());
            if token == "bad-token" {
                return Err(FetchErrorKind::Status(reqwest::StatusCode::UNAUTHORIZED));
            }
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                Ok(ClaimsPage::default())
            } else {
                Ok(pages.remove(0))
            }
        }
    }

    #[test]
    fn first_page_body_applies_offset_and_limit() {
        let body = first_page_body(&test_window(), "-04:00", 1000);
        assert_eq!(body["created_from"], "2023-05-13T00:00:00-04:00");
        assert_eq!(body["created_to"], "2023-05-22T23:59:59-04:00");
        assert_eq!(body["limit"], 1000);
        assert_eq!(body["cursor"], 0);
    }

    #[tokio::test]
    async fn pagination_concatenates_pages_in_order() {
        let api = MockApi::new(vec![
            page(&["a", "b"], Some("C1")),
            page(&["c"], Some("C2")),
            page(&["d"], None),
        ]);

        let claims = fetch_credential(&api, 0, "token", &test_window(), "-04:00", 1000)
            .await
            .unwrap();

        let ids: Vec<&str> = claims.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);

        // Follow-up requests carry only the cursor.
        let bodies = api.bodies.lock().unwrap();
        assert!(bodies[0].get("created_from").is_some());
        assert_eq!(bodies[1], json!({"cursor": "C1"}));
        assert_eq!(bodies[2], json!({"cursor": "C2"}));
    }

    #[tokio::test]
    async fn empty_response_yields_no_claims() {
        let api = MockApi::new(vec![page(&[], None)]);
        let claims = fetch_credential(&api, 0, "token", &test_window(), "-04:00", 1000)
            .await
            .unwrap();
        assert!(claims.is_empty());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_credential_is_skipped_not_fatal() {
        let api = MockApi::new(vec![page(&["ok-1", "ok-2"], None)]);
        let secrets = vec!["bad-token".to_string(), "good-token".to_string()];

        let outcome = fetch_all(&api, &secrets, &test_window(), "-04:00", 1000).await;

        assert_eq!(outcome.failed_credentials, 1);
        let ids: Vec<&str> = outcome.claims.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["ok-1", "ok-2"]);
    }
}
