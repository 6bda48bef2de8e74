//! Request fulfillment strategies.
//!
//! ### Dispatch
//! - Non-GET requests bypass the engine and go straight to the network.
//! - GET requests are classified and fulfilled by the matching strategy.
//!
//! ### Strategies
//! - `Api`: network-first into the api generation, JSON 503 when offline.
//! - `StaticAsset`: cache-first from the asset generation.
//! - `Navigation`: network-first, storing every response, with a fallback to
//!   the cached root document.
//! - `Default`: network-first into the asset generation.
//!
//! Only 2xx responses are stored, except on navigation. Each request gets a
//! single network attempt. Storage errors are logged and treated as misses,
//! so fulfillment itself never fails.

pub mod fallback;

use url::Url;

use crate::Error;
use crate::cache::GenerationHandle;
use crate::classify::{Classifier, RequestClass, Route};
use crate::generation::GenerationManager;
use crate::network::Network;
use crate::request::{Request, RequestIdentity};
use crate::response::{Response, ResponseSource};

/// The policy engine: classifies requests and fulfills them from network
/// and cache generations.
pub struct Engine<N> {
    network: N,
    classifier: Classifier,
    generations: GenerationManager,
    root: RequestIdentity,
}

impl<N: Network> Engine<N> {
    /// Create an engine. `origin` locates the root document used as the
    /// last-resort navigation response.
    pub fn new(network: N, classifier: Classifier, generations: GenerationManager, origin: &Url) -> Self {
        let root = RequestIdentity::get(&origin.join("/").unwrap_or_else(|_| origin.clone()));
        Self { network, classifier, generations, root }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn generations(&self) -> &GenerationManager {
        &self.generations
    }

    /// Identity of the root document.
    pub fn root(&self) -> &RequestIdentity {
        &self.root
    }

    /// Apply the GET pre-filter, then classify.
    pub fn route(&self, request: &Request) -> Route {
        self.classifier.route(request)
    }

    /// Host entry point.
    ///
    /// Non-GET requests are forwarded untouched and network errors surface
    /// to the caller. GET requests are fulfilled and always produce a
    /// response.
    pub async fn handle(&self, request: &Request) -> Result<Response, Error> {
        match self.route(request) {
            Route::Bypass => {
                tracing::debug!(method = %request.method, url = %request.url, "bypassing cache");
                let response = self.network.fetch(request).await?;
                Ok(response.with_source(ResponseSource::Passthrough))
            }
            Route::Fulfill(class) => Ok(self.fulfill_as(request, class).await),
        }
    }

    /// Produce a response for a GET request.
    pub async fn fulfill(&self, request: &Request) -> Response {
        let class = self.classifier.classify(request);
        self.fulfill_as(request, class).await
    }

    async fn fulfill_as(&self, request: &Request, class: RequestClass) -> Response {
        let response = match class {
            RequestClass::Api => self.api_network_first(request).await,
            RequestClass::StaticAsset => self.asset_cache_first(request).await,
            RequestClass::Navigation => self.navigation(request).await,
            RequestClass::Default => self.default_network_first(request).await,
        };

        tracing::debug!(
            url = %request.url,
            ?class,
            status = response.status,
            source = ?response.source,
            "fulfilled request"
        );
        response
    }

    async fn api_network_first(&self, request: &Request) -> Response {
        let api = self.generations.api();
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(api, request, &response).await;
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "api fetch failed, trying cache");
                match self.lookup(api, request.identity().as_ref()).await {
                    Some(cached) => cached,
                    None => fallback::api_offline(chrono::Utc::now()),
                }
            }
        }
    }

    async fn asset_cache_first(&self, request: &Request) -> Response {
        let assets = self.generations.assets();
        if let Some(cached) = self.lookup(assets, request.identity().as_ref()).await {
            return cached;
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(assets, request, &response).await;
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "asset fetch failed");
                fallback::asset_offline()
            }
        }
    }

    async fn navigation(&self, request: &Request) -> Response {
        let assets = self.generations.assets();
        match self.network.fetch(request).await {
            Ok(response) => {
                // Stored whatever the status, unlike every other class.
                self.store(assets, request, &response).await;
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "navigation fetch failed, trying cache");
                if let Some(cached) = self.lookup(assets, request.identity().as_ref()).await {
                    return cached;
                }
                if let Some(root) = self.lookup(assets, Some(&self.root)).await {
                    return root;
                }
                tracing::warn!(root = %self.root, "root document missing from asset generation");
                fallback::network_error()
            }
        }
    }

    async fn default_network_first(&self, request: &Request) -> Response {
        let assets = self.generations.assets();
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(assets, request, &response).await;
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "fetch failed, trying cache");
                match self.lookup(assets, request.identity().as_ref()).await {
                    Some(cached) => cached,
                    None => fallback::network_error(),
                }
            }
        }
    }

    async fn lookup(&self, generation: &GenerationHandle, identity: Option<&RequestIdentity>) -> Option<Response> {
        let identity = identity?;
        match self.generations.db().match_entry(generation, identity).await {
            Ok(Some(cached)) => {
                tracing::debug!(generation = generation.name(), %identity, "cache hit");
                Some(cached)
            }
            Ok(None) => {
                tracing::debug!(generation = generation.name(), %identity, "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(generation = generation.name(), %identity, error = %e, "cache read failed");
                None
            }
        }
    }

    /// Store a copy of `response`; the caller keeps the original to return.
    async fn store(&self, generation: &GenerationHandle, request: &Request, response: &Response) {
        let Some(identity) = request.identity() else {
            return;
        };
        if let Err(e) = self.generations.db().put_entry(generation, &identity, response).await {
            tracing::warn!(generation = generation.name(), %identity, error = %e, "cache write failed");
        }
    }
}
