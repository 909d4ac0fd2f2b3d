//! Cache del token de Fleetop
//!
//! El token vive `ttl` y se renueva `refresh_margin` antes de expirar. El
//! mutex se mantiene durante la renovación: si varias tareas piden el token a
//! la vez sólo una llama a Fleetop y el resto recibe el mismo resultado.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant, refresh_margin: Duration) -> bool {
        now + refresh_margin < self.expires_at
    }
}

#[derive(Clone)]
pub struct TokenCache {
    inner: Arc<Mutex<Option<CachedToken>>>,
    ttl: Duration,
    refresh_margin: Duration,
}

impl TokenCache {
    pub fn new(ttl: Duration, refresh_margin: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
            ttl,
            refresh_margin,
        }
    }

    /// Devolver el token cacheado o obtener uno nuevo con `fetch`
    pub async fn get_or_refresh<F, Fut, E>(&self, fetch: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let mut guard = self.inner.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.is_fresh(Instant::now(), self.refresh_margin) {
                debug!("🔑 Token Fleetop cache HIT");
                return Ok(cached.token.clone());
            }
            debug!("⏰ Token Fleetop próximo a expirar, renovando");
        }

        let token = fetch().await?;
        info!("💾 Token Fleetop renovado (TTL: {}s)", self.ttl.as_secs());
        *guard = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + self.ttl,
        });
        Ok(token)
    }

    /// Descartar el token, p. ej. tras un 401 de Fleetop
    pub async fn invalidate(&self) {
        let mut guard = self.inner.lock().await;
        if guard.take().is_some() {
            info!("🗑️ Token Fleetop invalidado");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> TokenCache {
        TokenCache::new(Duration::from_secs(30 * 60), Duration::from_secs(5 * 60))
    }

    async fn fetch_counted(counter: Arc<AtomicUsize>) -> Result<String, String> {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(format!("token-{}", n))
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuses_token_until_refresh_margin() {
        let cache = cache();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_refresh(|| fetch_counted(counter.clone())).await.unwrap();
        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        let second = cache.get_or_refresh(|| fetch_counted(counter.clone())).await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-1");
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // Dentro de los 5 minutos previos a la expiración se renueva
        tokio::time::advance(Duration::from_secs(6 * 60)).await;
        let third = cache.get_or_refresh(|| fetch_counted(counter.clone())).await.unwrap();
        assert_eq!(third, "token-2");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = cache();
        let counter = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    cache.get_or_refresh(|| fetch_counted(counter)).await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "token-1");
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = cache();
        let err = cache
            .get_or_refresh(|| async { Err::<String, _>("boom".to_string()) })
            .await;
        assert!(err.is_err());

        let ok = cache
            .get_or_refresh(|| async { Ok::<_, String>("fresh".to_string()) })
            .await
            .unwrap();
        assert_eq!(ok, "fresh");
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = cache();
        let counter = Arc::new(AtomicUsize::new(0));

        cache.get_or_refresh(|| fetch_counted(counter.clone())).await.unwrap();
        cache.invalidate().await;
        let token = cache.get_or_refresh(|| fetch_counted(counter.clone())).await.unwrap();

        assert_eq!(token, "token-2");
    }
}
