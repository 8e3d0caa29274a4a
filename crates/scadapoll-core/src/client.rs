// ── Client facade ──
//
// Ties the poller, the synchronized collection and the writer to one
// live configuration. The poll chain's closures hold only the shared
// config cell and the collection, never the client itself, so dropping
// the last `Client` clone drops the `PollHandle` and stops polling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use tracing::{debug, info, trace, warn};
use url::Url;

use scadapoll_api::{
    Error as ApiError, HttpTransport, RawItem, ScadaClient, Transport, parse_read_body, read_url,
};

use crate::config::{ClientConfig, parse_base_url, validate_selector};
use crate::error::CoreError;
use crate::model::{Item, ItemValue, Selector, WriteBatch, WritePair, WriteResult};
use crate::poller::{PollHandle, Poller};
use crate::store::ItemCollection;
use crate::writer::Writer;

// ── Client ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ClientInner>`. Starts and stops polling,
/// owns the synchronized item collection, and submits writes.
pub struct Client<T = HttpTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ClientInner<T> {
    config: Arc<ArcSwap<ClientConfig>>,
    api: ScadaClient<T>,
    poller: Poller<T>,
    writer: Writer<T>,
    items: Arc<Mutex<ItemCollection>>,
    poll_handle: Mutex<Option<PollHandle>>,
}

impl Client<HttpTransport> {
    /// Validate `config` and build a client on a reqwest transport.
    /// Does not touch the network.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let transport = HttpTransport::new(&config.transport_config())?;
        Ok(Self::build(config, transport))
    }
}

impl<T: Transport> Client<T> {
    /// Validate `config` and build a client on a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self::build(config, transport))
    }

    fn build(config: ClientConfig, transport: T) -> Self {
        let transport = Arc::new(transport);
        let api = ScadaClient::from_shared(Arc::clone(&transport));
        Self {
            inner: Arc::new(ClientInner {
                config: Arc::new(ArcSwap::from_pointee(config)),
                poller: Poller::new(transport),
                writer: Writer::new(api.clone()),
                api,
                items: Arc::new(Mutex::new(ItemCollection::new())),
                poll_handle: Mutex::new(None),
            }),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> Arc<ClientConfig> {
        self.inner.config.load_full()
    }

    // ── Polling lifecycle ────────────────────────────────────────

    /// Start polling with the current configuration.
    ///
    /// After every successful tick `callback` receives the merged items
    /// in collection order; failed ticks deliver the error instead and
    /// polling carries on. The callback runs with no lock held, so it
    /// may call back into the client.
    ///
    /// With a zero interval a single poll is made and the client is idle
    /// again afterwards. Must be called within a Tokio runtime.
    pub fn on<F>(&self, mut callback: F) -> Result<(), CoreError>
    where
        F: FnMut(Result<&[Item], &CoreError>) + Send + 'static,
    {
        let mut slot = lock(&self.inner.poll_handle);
        if slot.as_ref().is_some_and(PollHandle::is_running) {
            return Err(CoreError::AlreadyActive);
        }

        let cfg = self.inner.config.load_full();
        cfg.validate()?;

        let url_config = Arc::clone(&self.inner.config);
        let url_provider = move || -> Result<Url, ApiError> {
            let cfg = url_config.load();
            let url = read_url(&cfg.base_url, &cfg.selector)?;
            if cfg.debug {
                info!("GET {url}");
            } else {
                debug!("GET {url}");
            }
            Ok(url)
        };

        let interval_config = Arc::clone(&self.inner.config);
        let interval_provider = move || interval_config.load().poll_interval;

        let result_config = Arc::clone(&self.inner.config);
        let items = Arc::clone(&self.inner.items);
        let on_result = move |result: Result<String, ApiError>| {
            let outcome = result
                .map_err(CoreError::from)
                .and_then(|body| decode_body(&body, result_config.load().debug))
                .map(|raw| merge_snapshot(&items, raw));
            match outcome {
                Ok(snapshot) => callback(Ok(snapshot.as_slice())),
                Err(e) => {
                    warn!(error = %e, "poll tick failed");
                    callback(Err(&e));
                }
            }
        };

        info!(
            url = %cfg.base_url,
            interval = ?cfg.poll_interval,
            "polling started"
        );
        *slot = self
            .inner
            .poller
            .start(url_provider, interval_provider, on_result);
        Ok(())
    }

    /// Stop polling. No-op when idle. A response still in flight is
    /// discarded.
    pub fn off(&self) {
        let handle = lock(&self.inner.poll_handle).take();
        if let Some(handle) = handle {
            handle.dispose();
            info!("polling stopped");
        }
    }

    /// `true` while a recurring poll chain is running.
    pub fn is_active(&self) -> bool {
        lock(&self.inner.poll_handle)
            .as_ref()
            .is_some_and(PollHandle::is_running)
    }

    /// One poll-decode-merge cycle, awaited directly.
    pub async fn read_once(&self) -> Result<Vec<Item>, CoreError> {
        let cfg = self.inner.config.load_full();
        cfg.validate()?;

        let raw = self.inner.api.read_items(&cfg.base_url, &cfg.selector).await?;
        if cfg.debug {
            info!(count = raw.len(), "read response");
        }
        Ok(merge_snapshot(&self.inner.items, raw))
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Write a single pair or a batch.
    pub async fn set(&self, batch: impl Into<WriteBatch>) -> Result<WriteResult, CoreError> {
        let cfg = self.inner.config.load_full();
        let batch = batch.into();
        if cfg.debug {
            info!(url = %cfg.base_url, pairs = ?batch.pairs(), "POST write/items");
        }

        let result = self.inner.writer.write(&cfg.base_url, batch).await?;
        if cfg.debug {
            info!(?result, "write response");
        }
        Ok(result)
    }

    // ── Items ────────────────────────────────────────────────────

    /// Ordered snapshot of the synchronized items.
    pub fn items(&self) -> Vec<Item> {
        lock(&self.inner.items).to_vec()
    }

    pub fn item(&self, name: &str) -> Option<Item> {
        lock(&self.inner.items).get(name).cloned()
    }

    // ── Local edits ──────────────────────────────────────────────

    pub fn begin_edit(&self, name: &str) -> Result<(), CoreError> {
        found(lock(&self.inner.items).begin_edit(name), name)
    }

    pub fn set_pending_edit(&self, name: &str, value: impl Into<ItemValue>) -> Result<(), CoreError> {
        found(
            lock(&self.inner.items).set_pending_edit(name, value.into()),
            name,
        )
    }

    pub fn cancel_edit(&self, name: &str) -> Result<(), CoreError> {
        found(lock(&self.inner.items).cancel_edit(name), name)
    }

    /// Write the pending edit of `name`.
    ///
    /// The edit is promoted into the item's value when the server
    /// accepted it and the edit was not changed meanwhile; otherwise it
    /// stays pending.
    pub async fn submit_edit(&self, name: &str) -> Result<WriteResult, CoreError> {
        let value = {
            let col = lock(&self.inner.items);
            let item = col.get(name).ok_or_else(|| CoreError::ItemNotFound {
                name: name.to_owned(),
            })?;
            item.pending_edit
                .clone()
                .ok_or_else(|| CoreError::NoPendingEdit {
                    name: name.to_owned(),
                })?
        };

        let result = self.set(WritePair::new(name, value.clone())).await?;

        if result.error_for(name).is_none() {
            let mut col = lock(&self.inner.items);
            let unchanged = col
                .get(name)
                .and_then(|i| i.pending_edit.as_ref())
                .is_some_and(|pending| *pending == value);
            if unchanged {
                col.commit_edit(name);
            }
        }
        Ok(result)
    }

    // ── Reconfiguration ──────────────────────────────────────────

    /// Point at another endpoint. Takes effect on the next tick and
    /// clears the collection.
    pub fn set_base_url(&self, url: &str) -> Result<(), CoreError> {
        let url = parse_base_url(url)?;
        let prev = self.update_config(|c| c.base_url = url.clone());
        if prev.base_url != url {
            self.clear_items("base URL changed");
        }
        Ok(())
    }

    /// Change the poll interval from the next tick on. Setting zero ends
    /// a running chain after its next request.
    pub fn set_interval(&self, interval: Duration) {
        self.update_config(|c| c.poll_interval = interval);
    }

    /// Select other items. Takes effect on the next tick and clears the
    /// collection.
    pub fn set_selector(&self, selector: Selector) -> Result<(), CoreError> {
        validate_selector(&selector)?;
        let prev = self.update_config(|c| c.selector = selector.clone());
        if prev.selector != selector {
            self.clear_items("selector changed");
        }
        Ok(())
    }

    pub fn set_debug(&self, debug: bool) {
        self.update_config(|c| c.debug = debug);
    }

    /// Apply `apply` to a copy of the config and publish it. Returns the
    /// previous config.
    fn update_config(&self, apply: impl Fn(&mut ClientConfig)) -> Arc<ClientConfig> {
        self.inner.config.rcu(|cur| {
            let mut next = ClientConfig::clone(cur);
            apply(&mut next);
            next
        })
    }

    fn clear_items(&self, reason: &str) {
        lock(&self.inner.items).clear();
        debug!(reason, "item collection cleared");
    }
}

// ── Tick helpers ─────────────────────────────────────────────────

fn decode_body(body: &str, debug: bool) -> Result<Vec<RawItem>, CoreError> {
    if debug {
        info!(%body, "poll response");
    } else {
        trace!(%body, "poll response");
    }
    Ok(parse_read_body(body)?)
}

/// Merge under the lock and copy the result out; the lock is released
/// before anyone sees the snapshot.
fn merge_snapshot(items: &Mutex<ItemCollection>, raw: Vec<RawItem>) -> Vec<Item> {
    let mut col = lock(items);
    let report = col.merge(raw);
    if !report.is_empty() {
        debug!(
            inserted = report.inserted.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            "items merged"
        );
    }
    col.to_vec()
}

fn found(ok: bool, name: &str) -> Result<(), CoreError> {
    if ok {
        Ok(())
    } else {
        Err(CoreError::ItemNotFound {
            name: name.to_owned(),
        })
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
