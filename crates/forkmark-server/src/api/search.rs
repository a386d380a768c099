use axum::{
    extract::{Query, State},
    Extension, Json,
};
use forkmark_core::{Coordinate, RestaurantStatus};
use forkmark_search::{SearchContext, SearchHit, SearchResult, Tier};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, IndexStatus, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    q: Option<String>,
}

/// Raw strings so malformed numbers get the API's own error envelope.
#[derive(Debug, Deserialize)]
pub(super) struct NearParams {
    lat: Option<String>,
    lng: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    pub tier: Tier,
    pub context: Option<SearchContext>,
    pub count: usize,
    pub restaurants: Vec<RestaurantItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct RestaurantItem {
    pub id: Uuid,
    pub name: String,
    pub cuisine: Option<String>,
    pub status: RestaurantStatus,
    pub address_summary: Option<String>,
    pub distance_km: Option<f64>,
    pub walking_minutes: Option<f64>,
}

impl From<SearchHit> for RestaurantItem {
    fn from(hit: SearchHit) -> Self {
        let walking_minutes = hit.walking_minutes();
        Self {
            id: hit.restaurant.id,
            name: hit.restaurant.name,
            cuisine: hit.restaurant.cuisine,
            status: hit.restaurant.status,
            address_summary: hit.restaurant.address_summary,
            distance_km: hit.distance_km,
            walking_minutes,
        }
    }
}

impl From<SearchResult> for SearchData {
    fn from(result: SearchResult) -> Self {
        Self {
            tier: result.tier,
            context: result.context,
            count: result.hits.len(),
            restaurants: result.hits.into_iter().map(RestaurantItem::from).collect(),
        }
    }
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let Some(query) = params.q else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query parameter `q` is required",
        ));
    };

    let result = state.search.search(&query).await;

    Ok(Json(ApiResponse {
        data: SearchData::from(result),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn search_near(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<NearParams>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let origin = match parse_coordinate(params.lat.as_deref(), params.lng.as_deref()) {
        Ok(origin) => origin,
        Err(message) => return Err(ApiError::new(req_id.0, "validation_error", message)),
    };

    let result = state.search.search_near(origin);

    Ok(Json(ApiResponse {
        data: SearchData::from(result),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn refresh_index(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<IndexStatus>>, ApiError> {
    let snapshot = state
        .search
        .refresh_index()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: IndexStatus::from_snapshot(&snapshot),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn parse_coordinate(lat: Option<&str>, lng: Option<&str>) -> Result<Coordinate, &'static str> {
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err("query parameters `lat` and `lng` are required");
    };
    let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) else {
        return Err("`lat` and `lng` must be numbers");
    };

    let coordinate = Coordinate::new(lat, lng);
    if !coordinate.is_valid() {
        return Err("`lat` must be within [-90, 90] and `lng` within [-180, 180]");
    }
    Ok(coordinate)
}
