//! HTTP handlers

pub mod health;
pub mod models;
pub mod predict;

use std::sync::Arc;

use dispre_core::{DisasterEngine, HazardResult};

use crate::AppResult;

/// Run CPU-bound engine work off the async runtime
pub(crate) async fn blocking<T, F>(engine: &Arc<DisasterEngine>, work: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&DisasterEngine) -> HazardResult<T> + Send + 'static,
{
    let engine = Arc::clone(engine);
    let result = tokio::task::spawn_blocking(move || work(&engine)).await?;
    Ok(result?)
}
