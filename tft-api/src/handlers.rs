//! Route handlers.
//!
//! Each handler moves its query onto the blocking pool with a clone of the
//! shared catalog handle and serialises whatever comes back.

use std::{fmt, str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State},
};
use log::debug;
use serde::{Deserialize, Deserializer, de};
use tft_core::{
    AugmentFilter, AugmentSummary, Catalog, CatalogError, ChampionDetail, ChampionFilter,
    ChampionSummary, Composition, ItemSummary, SetSummary, TraitSummary,
};

use crate::error::{ApiError, HealthResponse};

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
}

impl AppState {
    pub fn new(catalog: impl Catalog + 'static) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Query string of `GET /api/champions`.
#[derive(Debug, Default, Deserialize)]
pub struct ChampionQuery {
    #[serde(default, rename = "trait", deserialize_with = "empty_as_none")]
    trait_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    cost: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    set: Option<String>,
}

/// Query string of routes that only take `set`.
#[derive(Debug, Default, Deserialize)]
pub struct SetQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    set: Option<String>,
}

/// Query string of `GET /api/augments`.
#[derive(Debug, Default, Deserialize)]
pub struct AugmentQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    tier: Option<i64>,
    #[serde(default, rename = "trait", deserialize_with = "empty_as_none")]
    trait_name: Option<String>,
}

/// `?set=` and friends mean "no filter", not "match the empty string".
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

async fn run_query<T, F>(state: &AppState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn Catalog) -> Result<T, CatalogError> + Send + 'static,
{
    let catalog = Arc::clone(&state.catalog);
    let value = tokio::task::spawn_blocking(move || query(catalog.as_ref())).await??;
    Ok(value)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

pub async fn list_champions(
    State(state): State<AppState>,
    Query(query): Query<ChampionQuery>,
) -> Result<Json<Vec<ChampionSummary>>, ApiError> {
    let filter = ChampionFilter {
        trait_name: query.trait_name,
        cost: query.cost,
        set: query.set,
    };
    debug!("listing champions with {filter:?}");
    run_query(&state, move |catalog| catalog.champions(&filter))
        .await
        .map(Json)
}

pub async fn get_champion(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ChampionDetail>, ApiError> {
    debug!("looking up champion {name}");
    let lookup = name.clone();
    run_query(&state, move |catalog| catalog.champion_by_name(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("champion {name}")))
}

pub async fn get_composition(
    State(state): State<AppState>,
    Path(trait_name): Path<String>,
    Query(query): Query<SetQuery>,
) -> Result<Json<Composition>, ApiError> {
    debug!("building composition for {trait_name}");
    run_query(&state, move |catalog| {
        catalog.composition(&trait_name, query.set.as_deref())
    })
    .await
    .map(Json)
}

pub async fn list_traits(
    State(state): State<AppState>,
    Query(query): Query<SetQuery>,
) -> Result<Json<Vec<TraitSummary>>, ApiError> {
    run_query(&state, move |catalog| catalog.traits(query.set.as_deref()))
        .await
        .map(Json)
}

pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    run_query(&state, |catalog| catalog.items()).await.map(Json)
}

pub async fn list_augments(
    State(state): State<AppState>,
    Query(query): Query<AugmentQuery>,
) -> Result<Json<Vec<AugmentSummary>>, ApiError> {
    let filter = AugmentFilter {
        tier: query.tier,
        trait_name: query.trait_name,
    };
    debug!("listing augments with {filter:?}");
    run_query(&state, move |catalog| catalog.augments(&filter))
        .await
        .map(Json)
}

pub async fn list_sets(State(state): State<AppState>) -> Result<Json<Vec<SetSummary>>, ApiError> {
    run_query(&state, |catalog| catalog.sets()).await.map(Json)
}
