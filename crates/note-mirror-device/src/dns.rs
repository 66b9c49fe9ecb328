use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resolver that remembers answers for `ttl`, so a long walk does not hit
/// the system resolver once per pooled connection.
#[derive(Debug)]
pub struct CachingResolver {
    ttl: Duration,
    cache: Arc<Mutex<HashMap<String, (Instant, Vec<SocketAddr>)>>>,
}

impl CachingResolver {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn cached(&self, host: &str) -> Option<Vec<SocketAddr>> {
        let cache = self.cache.lock().ok()?;
        let (resolved_at, addrs) = cache.get(host)?;
        (resolved_at.elapsed() < self.ttl).then(|| addrs.clone())
    }
}

impl Resolve for CachingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_owned();

        if let Some(addrs) = self.cached(&host) {
            tracing::trace!(host = %host, "dns cache hit");
            let addrs: Addrs = Box::new(addrs.into_iter());
            return Box::pin(std::future::ready(Ok::<Addrs, BoxError>(addrs)));
        }

        let cache = Arc::clone(&self.cache);
        Box::pin(async move {
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
                .await
                .map_err(|e| -> BoxError { Box::new(e) })?
                .collect();
            tracing::debug!(host = %host, count = addrs.len(), "resolved device host");

            if let Ok(mut cache) = cache.lock() {
                cache.insert(host, (Instant::now(), addrs.clone()));
            }

            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<Addrs, BoxError>(addrs)
        })
    }
}
