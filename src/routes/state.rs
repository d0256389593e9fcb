use std::sync::Arc;

use crate::{config::Limits, store::TravelStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TravelStore>,
    pub limits: Limits,
}

impl AppState {
    pub fn new(store: Arc<dyn TravelStore>, limits: Limits) -> Self {
        Self { store, limits }
    }
}
