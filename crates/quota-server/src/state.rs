//! State shared across request handlers.

use std::sync::Arc;

use quota_limiter::UsageLimiter;

use crate::store::SharedStore;

/// Limiter type served over HTTP.
pub type Limiter = UsageLimiter<SharedStore>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<Limiter>,
}

impl AppState {
    pub fn new(limiter: Limiter) -> Self {
        Self {
            limiter: Arc::new(limiter),
        }
    }
}
