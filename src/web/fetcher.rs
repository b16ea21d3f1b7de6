//! Fetcher
//!
//! Seam for the remote fetch function injected into the URL cache. The cache
//! never performs network I/O itself.

/// Retrieves remote content for a URL.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn fetch(&self, url: &str) -> anyhow::Result<String> {
        self(url)
    }
}
