use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{error, info, spotify, success, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    info!("Waiting for authorization in the browser...");
    match spotify::auth::authorize(shared_state).await {
        Ok(manager) => success!(
            "Authentication successful! Stored in {}",
            manager.path().display()
        ),
        Err(e) => error!("Authentication failed. Err: {}", e),
    }
}
