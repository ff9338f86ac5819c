#[derive(Debug, Clone)]
pub struct Config {
    pub cache_dir: String,
    pub jolpica_base_url: String,
    pub openf1_base_url: String,
}

impl Config {
    pub fn init() -> Self {
        Config {
            cache_dir: std::env::var("CACHE_DIR").unwrap_or_else(|_| "cache".to_string()),
            jolpica_base_url: std::env::var("JOLPICA_BASE_URL")
                .unwrap_or_else(|_| "https://api.jolpi.ca".to_string()),
            openf1_base_url: std::env::var("OPENF1_BASE_URL")
                .unwrap_or_else(|_| "https://api.openf1.org".to_string()),
        }
    }
}
