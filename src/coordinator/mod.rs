mod state;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use crate::aggregator::{MediaAggregator, MediaSnapshot};
use crate::entities::Tab;
use crate::error::GalleryError;
use crate::index::MediaIndex;

pub use state::{LibraryState, LoadStatus};

type StateSender = watch::Sender<Arc<LibraryState>>;

#[derive(Debug, Clone, Default)]
pub struct CoordinatorOptions {
    /// A load still running after this long is reported as `IndexUnavailable`.
    pub load_timeout: Option<Duration>,
}

/// Owns the published `LibraryState` and runs loads on the blocking pool.
///
/// Every `reload` takes a new generation token. A finished load publishes only
/// if its token is still the current one; the check and the write happen under
/// the state channel's lock, so a superseded load can never overwrite a newer
/// one and readers never see a half-applied snapshot.
pub struct LibraryCoordinator<I: MediaIndex + 'static> {
    aggregator: Arc<MediaAggregator<I>>,
    state_tx: Arc<StateSender>,
    cancel_token: CancellationToken,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    runtime: Handle,
    options: CoordinatorOptions,
}

impl<I: MediaIndex + 'static> LibraryCoordinator<I> {
    /// Must be called inside a tokio runtime. Loads are spawned on that runtime,
    /// so `reload` and `select_tab` may then be called from any thread.
    pub fn new(index: I, options: CoordinatorOptions) -> Self {
        let (state_tx, _) = watch::channel(Arc::new(LibraryState::default()));
        let coordinator = Self {
            aggregator: Arc::new(MediaAggregator::new(index)),
            state_tx: Arc::new(state_tx),
            cancel_token: CancellationToken::new(),
            in_flight: Mutex::new(None),
            runtime: Handle::current(),
            options,
        };
        coordinator.reload();
        coordinator
    }

    pub fn state(&self) -> Arc<LibraryState> {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<LibraryState>> {
        self.state_tx.subscribe()
    }

    /// Resolves with the first snapshot that is not loading. A port call that
    /// never returns keeps this pending unless a load timeout is configured.
    pub async fn wait_until_loaded(&self) -> Arc<LibraryState> {
        let mut state_rx = self.subscribe();
        let state = match state_rx.wait_for(|state| !state.is_loading).await {
            Ok(state) => Arc::clone(&state),
            Err(_) => self.state(),
        };
        state
    }

    pub fn reload(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        self.start_load(&mut in_flight);
    }

    /// Reloads unless a load is still running. Returns whether a load started.
    pub fn reload_if_idle(&self) -> bool {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if self.state_tx.borrow().is_loading {
            debug!("reload skipped, load #{} still running", self.state_tx.borrow().generation);
            return false;
        }
        self.start_load(&mut in_flight)
    }

    /// The task exists before the new generation is published and only starts
    /// loading once it receives that generation.
    fn start_load(&self, in_flight: &mut Option<JoinHandle<()>>) -> bool {
        if self.cancel_token.is_cancelled() {
            debug!("reload ignored, coordinator is shut down");
            return false;
        }

        let (start_tx, start_rx) = oneshot::channel::<u64>();
        let aggregator = self.aggregator.clone();
        let state_tx = self.state_tx.clone();
        let cancel_token = self.cancel_token.clone();
        let load_timeout = self.options.load_timeout;
        let handle = self.runtime.spawn(async move {
            let generation = match start_rx.await {
                Ok(generation) => generation,
                Err(_) => return,
            };
            let outcome = tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!("load #{} cancelled", generation);
                    return;
                }
                outcome = run_load(aggregator, load_timeout) => outcome,
            };
            publish(&state_tx, &cancel_token, generation, outcome);
        });

        let generation = begin_load(&self.state_tx);
        info!("starting load #{}", generation);
        let _ = start_tx.send(generation);

        if let Some(previous) = in_flight.replace(handle) {
            previous.abort();
        }
        true
    }

    pub fn select_tab(&self, tab: Tab) {
        let cancel_token = &self.cancel_token;
        self.state_tx.send_if_modified(|state| {
            if cancel_token.is_cancelled() || state.selected_tab == tab {
                return false;
            }
            let mut next = LibraryState::clone(state);
            next.selected_tab = tab;
            *state = Arc::new(next);
            true
        });
    }

    /// Selects a tab by its position. Anything but `0` (library) and `1`
    /// (albums) is rejected and leaves the state untouched.
    pub fn select_tab_index(&self, index: i64) -> Result<Tab, GalleryError> {
        let tab = Tab::try_from(index)?;
        self.select_tab(tab);
        Ok(tab)
    }

    /// Cancels the in-flight load. Once this returns nothing writes to the
    /// state again, so later `reload` and `select_tab` calls are no-ops.
    pub fn shutdown(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if self.cancel_token.is_cancelled() {
            return;
        }
        self.cancel_token.cancel();
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
        // Waits out a publish that already holds the state lock.
        self.state_tx.send_if_modified(|_| false);
        info!("library coordinator shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl<I: MediaIndex + 'static> Drop for LibraryCoordinator<I> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn begin_load(state_tx: &StateSender) -> u64 {
    let mut generation = 0;
    state_tx.send_modify(|state| {
        let mut next = LibraryState::clone(state);
        next.generation += 1;
        next.is_loading = true;
        next.status = LoadStatus::Loading;
        generation = next.generation;
        *state = Arc::new(next);
    });
    generation
}

async fn run_load<I: MediaIndex + 'static>(
    aggregator: Arc<MediaAggregator<I>>,
    load_timeout: Option<Duration>,
) -> Result<MediaSnapshot, GalleryError> {
    let task = tokio::task::spawn_blocking(move || aggregator.load());
    let joined = match load_timeout {
        Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
            GalleryError::IndexUnavailable(format!("load timed out after {}", humantime::format_duration(limit)))
        })?,
        None => task.await,
    };
    joined.map_err(|e| GalleryError::IndexUnavailable(format!("load task failed: {}", e)))?
}

/// Applies a finished load if it is still the current generation. Returns
/// whether the state changed.
fn publish(
    state_tx: &StateSender,
    cancel_token: &CancellationToken,
    generation: u64,
    outcome: Result<MediaSnapshot, GalleryError>,
) -> bool {
    state_tx.send_if_modified(|state| {
        if cancel_token.is_cancelled() {
            return false;
        }
        if state.generation != generation {
            debug!("discarding load #{}, superseded by #{}", generation, state.generation);
            return false;
        }

        let mut next = LibraryState::clone(state);
        next.is_loading = false;
        match outcome {
            Ok(snapshot) => {
                info!("load #{} ready: {} items, {} albums", generation, snapshot.items.len(), snapshot.albums.len());
                next.items = snapshot.items.into();
                next.albums = snapshot.albums.into();
                next.skipped_rows = snapshot.skipped_rows;
                next.status = LoadStatus::Ready;
                next.last_error = None;
            }
            Err(e) => {
                warn!("load #{} failed, keeping previous library: {}", generation, e);
                next.status = LoadStatus::Failed;
                next.last_error = Some(e);
            }
        }
        *state = Arc::new(next);
        true
    })
}
