// ===============================
// src/claims_api.rs
// ===============================
//
// Minimal wire models for the upstream claims API. Every field that the
// API may omit is an Option (or defaulted container) so a partially
// filled claim still deserializes; normalization decides what is
// mandatory and what falls back to a sentinel.
//
use serde::Deserialize;

/// One page of the search response: `{claims: [...], cursor?: "..."}`.
/// An absent cursor marks the final page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimsPage {
    #[serde(default)]
    pub claims: Vec<RawClaim>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// One delivery order as the API returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClaim {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_ts: Option<String>,
    #[serde(default)]
    pub updated_ts: Option<String>,
    #[serde(default)]
    pub corp_client_id: String,
    #[serde(default)]
    pub same_day_data: Option<SameDayData>,
    #[serde(default)]
    pub route_points: Vec<RoutePoint>,
    #[serde(default)]
    pub items: Vec<ClaimItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SameDayData {
    #[serde(default)]
    pub delivery_interval: Option<DeliveryInterval>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryInterval {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// Route point 0 is the pickup (store), route point 1 the drop-off.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutePoint {
    #[serde(default)]
    pub external_order_id: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub fullname: String,
    /// `[lon, lat]` per the API convention.
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimItem {
    #[serde(default)]
    pub extra_id: Option<String>,
}

impl RawClaim {
    /// Delivery-window start; a claim without one is malformed.
    pub fn delivery_interval_from(&self) -> Option<&str> {
        self.same_day_data
            .as_ref()?
            .delivery_interval
            .as_ref()?
            .from
            .as_deref()
    }

    pub fn pickup(&self) -> Option<&RoutePoint> {
        self.route_points.first()
    }

    pub fn destination(&self) -> Option<&RoutePoint> {
        self.route_points.get(1)
    }

    pub fn lo_code(&self) -> Option<&str> {
        self.items.first()?.extra_id.as_deref()
    }
}

impl RoutePoint {
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        let coords = &self.address.as_ref()?.coordinates;
        match coords.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_claim_deserializes() {
        let claim: RawClaim = serde_json::from_value(json!({
            "id": "claim-1",
            "status": "performer_lookup"
        }))
        .unwrap();
        assert_eq!(claim.id, "claim-1");
        assert!(claim.delivery_interval_from().is_none());
        assert!(claim.destination().is_none());
        assert!(claim.lo_code().is_none());
    }

    #[test]
    fn nested_accessors() {
        let claim: RawClaim = serde_json::from_value(json!({
            "id": "claim-2",
            "same_day_data": {"delivery_interval": {"from": "2023-05-20T10:00:00-04:00"}},
            "route_points": [
                {"address": {"fullname": "Store", "coordinates": [-70.7, -33.4]}},
                {
                    "external_order_id": "EXT-9",
                    "address": {"fullname": "Av. Siempre Viva 742", "coordinates": [-70.6, -33.5]},
                    "contact": {"phone": "+56911111111", "name": "Ana"}
                }
            ],
            "items": [{"extra_id": "LO-77"}]
        }))
        .unwrap();
        assert_eq!(claim.delivery_interval_from(), Some("2023-05-20T10:00:00-04:00"));
        assert_eq!(claim.destination().unwrap().lon_lat(), Some((-70.6, -33.5)));
        assert_eq!(claim.pickup().unwrap().lon_lat(), Some((-70.7, -33.4)));
        assert_eq!(claim.lo_code(), Some("LO-77"));
    }

    #[test]
    fn final_page_has_no_cursor() {
        let page: ClaimsPage =
            serde_json::from_value(json!({"claims": [{"id": "a"}]})).unwrap();
        assert_eq!(page.claims.len(), 1);
        assert!(page.cursor.is_none());
    }
}
