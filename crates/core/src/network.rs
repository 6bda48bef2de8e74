//! The network seam the engine fetches through.

use crate::Error;
use crate::request::Request;
use crate::response::Response;

/// Performs one network attempt for a request.
///
/// Implementations return `Ok` for any HTTP response, including 4xx/5xx;
/// deciding whether a status is acceptable is the strategy's job. `Err`
/// means the network could not produce a response at all.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

#[async_trait::async_trait]
impl<N: Network + ?Sized> Network for std::sync::Arc<N> {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        (**self).fetch(request).await
    }
}
