use std::sync::Arc;

use crate::chat::registry::RoomRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Room membership tables shared by every connection actor.
    pub rooms: Arc<RoomRegistry>,
}

impl AppState {
    /// Build fresh state with an empty registry. Called once at startup;
    /// tests build their own so the registry stays substitutable.
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RoomRegistry::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
