//! MCP tool implementations.
//!
//! This module contains all tools exposed by the offgrid server. Each tool
//! is split into a function returning its typed output and an `*_impl`
//! wrapper that renders that output as the tool result.

pub mod cache;
pub mod web_fetch;

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::error::ToolError;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, ToolError> {
    let json = serde_json::to_string_pretty(output)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Network double and state builder for tool tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use offgrid_core::{
        Broadcast, CacheDb, Classifier, Engine, Error, GenerationManager, GenerationNames, Network, Request, Response,
        ResponseSource,
    };
    use url::Url;

    use crate::state::AppState;

    pub const ORIGIN: &str = "https://app.test";

    /// Serves fixed bodies by URL; unknown URLs get a 404.
    #[derive(Default)]
    pub struct StubNetwork {
        routes: HashMap<String, (u16, &'static str)>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl StubNetwork {
        pub fn route(mut self, url: &str, status: u16, body: &'static str) -> Self {
            self.routes.insert(url.to_string(), (status, body));
            self
        }

        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Network for StubNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(Error::Network("connection refused".into()));
            }
            let (status, body) = self.routes.get(request.url.as_str()).copied().unwrap_or((404, "not found"));
            Ok(Response::new(status, vec![("content-type".into(), "text/plain".into())], body, ResponseSource::Network))
        }
    }

    /// State for app version 1 with a two-entry manifest.
    pub async fn state(network: StubNetwork) -> AppState<StubNetwork> {
        build(network, None).await
    }

    /// Like [`state`], publishing lifecycle messages to `broadcast`.
    pub async fn state_with_broadcast(network: StubNetwork, broadcast: Arc<dyn Broadcast>) -> AppState<StubNetwork> {
        build(network, Some(broadcast)).await
    }

    async fn build(network: StubNetwork, broadcast: Option<Arc<dyn Broadcast>>) -> AppState<StubNetwork> {
        let origin = Url::parse(ORIGIN).unwrap();
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut generations = GenerationManager::open(db, GenerationNames::for_version("app", "1")).await.unwrap();
        if let Some(broadcast) = broadcast {
            generations = generations.with_broadcast(broadcast);
        }
        let engine = Engine::new(network, Classifier::default(), generations, &origin);
        let manifest = vec![origin.join("/").unwrap(), origin.join("/app.css").unwrap()];
        AppState { engine, origin, manifest }
    }
}
