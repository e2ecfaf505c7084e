//! Connection lifecycle for the graph store.
//!
//! A [`StoreSession`] owns at most one store handle. It is opened with
//! [`connect`](StoreSession::connect), released with
//! [`disconnect`](StoreSession::disconnect), and every data operation goes
//! through [`run`](StoreSession::run), which fails fast with
//! `StoreUnavailable` while no store is connected.
//!
//! Store calls are synchronous, so `run` moves them onto tokio's blocking
//! pool and bounds them with `store_timeout`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use graph_store::{GraphStore, StoreError};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{Result, ServiceError};

pub struct StoreSession {
    store: RwLock<Option<Arc<dyn GraphStore>>>,
    timeout: Duration,
}

impl StoreSession {
    /// Create a session with no store connected.
    pub fn new(timeout: Duration) -> Self {
        Self {
            store: RwLock::new(None),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Verify `store` answers, then make it the active store.
    ///
    /// A previously connected store is closed first.
    pub async fn connect(&self, store: Arc<dyn GraphStore>) -> Result<()> {
        let mut slot = self.store.write().await;
        if let Some(previous) = slot.take() {
            info!("Closing previous graph store connection");
            if let Err(err) = run_blocking(previous, self.timeout, "close", |s| Ok(s.close()?)).await {
                warn!("Previous graph store did not close cleanly: {}", err);
            }
        }

        run_blocking(store.clone(), self.timeout, "ping", |s| Ok(s.ping()?)).await?;
        *slot = Some(store);
        info!("Connected to graph store");
        Ok(())
    }

    /// Close and release the active store. Returns false if none was connected.
    pub async fn disconnect(&self) -> Result<bool> {
        let Some(store) = self.store.write().await.take() else {
            debug!("Disconnect requested with no active store");
            return Ok(false);
        };
        run_blocking(store, self.timeout, "close", |s| Ok(s.close()?)).await?;
        info!("Disconnected from graph store");
        Ok(true)
    }

    pub async fn is_connected(&self) -> bool {
        self.store.read().await.is_some()
    }

    /// The active store, or `StoreUnavailable`.
    pub async fn store(&self) -> Result<Arc<dyn GraphStore>> {
        self.store
            .read()
            .await
            .clone()
            .ok_or(ServiceError::StoreUnavailable)
    }

    /// Run `f` against the active store on the blocking pool.
    pub async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn GraphStore>) -> Result<T> + Send + 'static,
    {
        self.run_guarded(operation, (), f).await
    }

    /// Run `f` on the blocking pool with `guard` moved into the task.
    ///
    /// A call that times out is abandoned by the caller but keeps running on
    /// the blocking pool. The guard is dropped only when `f` returns, so a
    /// lock guard passed here stays held for as long as the work can still
    /// touch the store.
    ///
    /// # Arguments
    /// * `operation` - Name used in logs and in `StoreError::Timeout`
    /// * `guard` - Any value to keep alive until `f` has finished
    /// * `f` - The store work itself
    pub async fn run_guarded<T, G, F>(&self, operation: &'static str, guard: G, f: F) -> Result<T>
    where
        T: Send + 'static,
        G: Send + 'static,
        F: FnOnce(Arc<dyn GraphStore>) -> Result<T> + Send + 'static,
    {
        let store = self.store().await?;
        run_blocking(store, self.timeout, operation, move |store| {
            let _guard = guard;
            f(store)
        })
        .await
    }
}

async fn run_blocking<T, F>(
    store: Arc<dyn GraphStore>,
    timeout: Duration,
    operation: &'static str,
    f: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(Arc<dyn GraphStore>) -> Result<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || f(store));

    let result = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ServiceError::Internal(anyhow!(
            "store operation '{}' panicked: {}",
            operation,
            join_err
        ))),
        Err(_) => Err(ServiceError::Store(StoreError::Timeout {
            operation,
            after: timeout,
        })),
    };

    if let Err(err) = &result {
        match err {
            ServiceError::Store(_) | ServiceError::Internal(_) => {
                error!(operation, "Graph store operation failed: {}", err)
            }
            _ => debug!(operation, "Graph store operation rejected: {}", err),
        }
    }
    result
}
