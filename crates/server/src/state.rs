//! Shared state handed to every tool.

use offgrid_core::Engine;
use url::Url;

/// Engine plus the configuration values tools resolve requests against.
pub struct AppState<N> {
    pub engine: Engine<N>,
    /// Origin that relative URLs resolve against.
    pub origin: Url,
    /// Precache manifest, already resolved against `origin`.
    pub manifest: Vec<Url>,
}
