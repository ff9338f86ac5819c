use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Directory-backed cache of raw upstream response bodies, keyed by a
/// sanitized form of the request URL. Created once at startup.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(DiskCache { dir })
    }

    pub fn get(&self, url: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(url)) {
            Ok(body) => {
                debug!("cache hit for {url}");
                Some(body)
            }
            Err(_) => {
                debug!("cache miss for {url}");
                None
            }
        }
    }

    /// Best-effort write; a failure is logged, never fatal.
    pub fn put(&self, url: &str, body: &str) {
        let path = self.path_for(url);
        if let Err(e) = fs::write(&path, body) {
            warn!("failed to write cache file {}: {e}", path.display());
        }
    }

    fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(url)))
    }
}

fn sanitize(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
