use reqwest::Client;

use crate::provider::{cache::DiskCache, Provider};
use crate::utils::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub provider: Provider,
}

impl AppState {
    pub fn init(config: Config) -> std::io::Result<Self> {
        let cache = DiskCache::new(&config.cache_dir)?;
        let provider = Provider::new(Client::new(), cache, &config);
        Ok(AppState { config, provider })
    }
}
