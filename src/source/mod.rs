pub mod http;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::catalog::{CatalogError, EntityDetail, EntitySummary};
use crate::utils;

pub use http::{HttpCatalog, HttpCatalogOptions};

/// Where the catalog comes from.
///
/// `fetch_detail` swallows its own failures: a missing detail only costs the
/// entity its badges, it never fails the page.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn fetch_summaries(&self) -> Result<Vec<EntitySummary>, CatalogError>;

    async fn fetch_detail(&self, id: u32) -> Option<EntityDetail>;
}

/// Caps detail requests in flight. Clones share the same permits, so every
/// fan-out started from one session counts against one bound.
#[derive(Clone, Debug)]
pub struct FetchLimit {
    permits: Arc<Semaphore>,
    width: usize,
}

impl FetchLimit {
    pub fn new(concurrency: usize) -> Self {
        let width = concurrency.max(1);
        Self {
            permits: Arc::new(Semaphore::new(width)),
            width,
        }
    }
}

// results keep the order of `ids`
pub async fn fetch_details<S: CatalogSource>(
    source: &S,
    ids: &[u32],
    limit: &FetchLimit,
) -> Vec<(u32, Option<EntityDetail>)> {
    stream::iter(ids.iter().copied())
        .map(|id| async move {
            // the semaphore is never closed, so this only waits
            let _permit = limit.permits.acquire().await;
            (id, source.fetch_detail(id).await)
        })
        .buffered(limit.width)
        .collect()
        .await
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: u32,
    #[serde(default)]
    weight: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    abilities: Vec<AbilitySlot>,
    #[serde(default)]
    sprites: Option<Sprites>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(default)]
    slot: u8,
    #[serde(rename = "type")]
    kind: NamedRef,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    ability: NamedRef,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    #[serde(default)]
    front_default: Option<String>,
}

pub(crate) fn parse_summaries(
    body: &str,
    max_id: u32,
) -> Result<Vec<EntitySummary>, serde_json::Error> {
    let list: ListResponse = serde_json::from_str(body)?;
    let mut out = Vec::with_capacity(list.results.len());
    for entry in list.results {
        let id = match utils::parse_id_from_url(&entry.url) {
            Some(id) => id,
            None => {
                warn!(url = %entry.url, name = %entry.name, "skipping entry without a numeric id");
                continue;
            }
        };
        if id >= max_id {
            continue;
        }
        out.push(EntitySummary {
            id,
            name: entry.name,
            detail_url: entry.url,
        });
    }
    Ok(out)
}

pub(crate) fn parse_detail(body: &str) -> Result<EntityDetail, serde_json::Error> {
    let mut detail: DetailResponse = serde_json::from_str(body)?;
    detail.types.sort_by_key(|t| t.slot);
    Ok(EntityDetail {
        id: detail.id,
        categories: detail.types.into_iter().map(|t| t.kind.name).collect(),
        weight: detail.weight,
        height: detail.height,
        abilities: detail.abilities.into_iter().map(|a| a.ability.name).collect(),
        sprite_url: detail.sprites.and_then(|s| s.front_default),
    })
}
