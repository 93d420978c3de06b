use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, EntityDetail, EntitySummary};
use crate::source::{parse_detail, parse_summaries, CatalogSource};
use crate::utils;

#[derive(Clone, Debug)]
pub struct HttpCatalogOptions {
    pub api_base: String,
    pub list_limit: u32,
    pub max_id: u32,
    pub rate: u32,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
}

impl Default for HttpCatalogOptions {
    fn default() -> Self {
        Self {
            api_base: utils::DEFAULT_API_BASE.to_string(),
            list_limit: utils::DEFAULT_LIST_LIMIT,
            max_id: utils::DEFAULT_MAX_ID,
            rate: 50,
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

pub struct HttpCatalog {
    client: reqwest::Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    api_base: String,
    list_limit: u32,
    max_id: u32,
}

impl HttpCatalog {
    pub fn new(options: &HttpCatalogOptions) -> Result<Self, CatalogError> {
        let rate = NonZeroU32::new(options.rate).ok_or(CatalogError::InvalidOptions {
            field: "rate",
            message: "expected a positive number of requests per second".to_string(),
        })?;
        if options.timeout_seconds == 0 {
            return Err(CatalogError::InvalidOptions {
                field: "timeout",
                message: "expected a positive number of seconds".to_string(),
            });
        }
        let client = build_client(options.proxy.as_deref(), options.timeout_seconds)?;
        Ok(Self {
            client,
            limiter: RateLimiter::direct(Quota::per_second(rate)),
            api_base: options.api_base.clone(),
            list_limit: options.list_limit,
            max_id: options.max_id,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, CatalogError> {
        self.limiter.until_ready().await;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(|e| CatalogError::Network {
            url: url.to_string(),
            source: e,
        })
    }
}

impl CatalogSource for HttpCatalog {
    async fn fetch_summaries(&self) -> Result<Vec<EntitySummary>, CatalogError> {
        let url = utils::join_url(
            &self.api_base,
            &format!("pokemon?limit={}", self.list_limit),
        );
        let body = self.get_text(&url).await?;
        let summaries =
            parse_summaries(&body, self.max_id).map_err(|e| CatalogError::Decode {
                url: url.clone(),
                source: e,
            })?;
        info!(count = summaries.len(), url = %url, "fetched catalog list");
        Ok(summaries)
    }

    async fn fetch_detail(&self, id: u32) -> Option<EntityDetail> {
        let url = utils::join_url(&self.api_base, &format!("pokemon/{id}"));
        let body = match self.get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(id, error = %e, "detail fetch failed");
                return None;
            }
        };
        match parse_detail(&body) {
            Ok(detail) => {
                debug!(id, categories = ?detail.categories, "fetched detail");
                Some(detail)
            }
            Err(e) => {
                warn!(id, error = %e, "detail response could not be decoded");
                None
            }
        }
    }
}

fn build_client(proxy: Option<&str>, timeout_seconds: u64) -> Result<reqwest::Client, CatalogError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!("dexview/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(timeout_seconds));

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| CatalogError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| CatalogError::HttpClientBuild { source: e })
}
