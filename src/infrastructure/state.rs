use std::sync::Arc;

use crate::infrastructure::{
    config::Config,
    store::{self, NoteStore},
};

/// Dependencies shared by every invocation handled by one function instance.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn NoteStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn NoteStore>) -> Self {
        Self { config, store }
    }

    pub async fn from_config(config: Arc<Config>) -> anyhow::Result<Self> {
        let store = store::build_store(&config.store).await?;
        Ok(Self::new(config, store))
    }
}
