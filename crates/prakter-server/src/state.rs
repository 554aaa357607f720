use crate::error::AppError;
use prakter_core::commands::CommandContext;
use prakter_core::config::Config;
use prakter_core::generate::{CommandGenerator, ContentGenerator, StaticGenerator};
use prakter_core::prompt::NoPrompt;
use prakter_core::store::{Store, StoreEvent, Subscription};
use prakter_core::types::FileKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::broadcast;
use tokio::task::AbortHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(800);

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub store: Store,
    pub config: Arc<Config>,
    pub generator: Arc<dyn ContentGenerator>,
    pub event_tx: broadcast::Sender<StoreEvent>,
    _subscription: Arc<Subscription>,
    _poller: Arc<Poller>,
}

/// Stops the mtime poller when the last clone of the state is dropped.
struct Poller(Option<AbortHandle>);

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}

impl AppState {
    /// Load `.prakter/config.yaml` under `root`; a malformed file is an error.
    pub fn new(root: PathBuf) -> prakter_core::Result<Self> {
        let config = Config::load(&root)?;
        let generator: Arc<dyn ContentGenerator> =
            match CommandGenerator::from_config(&config.generator) {
                Some(g) => Arc::new(g),
                None => Arc::new(StaticGenerator::today()),
            };
        Ok(Self::with_parts(root, config, generator))
    }

    pub fn with_parts(
        root: PathBuf,
        config: Config,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        let (tx, _) = broadcast::channel(64);
        let store = Store::new(&root);

        // Writes made through this process
        let forward = tx.clone();
        let subscription = store.subscribe(move |event| {
            let _ = forward.send(event);
        });

        // Edits made by anything else (CLI, editor). Skipped outside a Tokio
        // runtime, e.g. in sync unit tests.
        let poller = tokio::runtime::Handle::try_current()
            .ok()
            .map(|rt| rt.spawn(poll_mtimes(store.clone(), tx.clone())).abort_handle());

        Self {
            root,
            store,
            config: Arc::new(config),
            generator,
            event_tx: tx,
            _subscription: Arc::new(subscription),
            _poller: Arc::new(Poller(poller)),
        }
    }

    /// Run a host command on the blocking pool. Nobody can answer prompts
    /// here, so missing input cancels the command.
    pub async fn run_command<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&mut CommandContext<'_>) -> prakter_core::Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        let config = Arc::clone(&self.config);
        let generator = Arc::clone(&self.generator);
        let result = tokio::task::spawn_blocking(move || {
            let mut prompter = NoPrompt;
            let mut ctx =
                CommandContext::new(&store, &*config, generator.as_ref(), &mut prompter);
            f(&mut ctx)
        })
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
        Ok(result)
    }

    /// Run plain blocking store work.
    pub async fn blocking<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Store, &Config) -> prakter_core::Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        let config = Arc::clone(&self.config);
        let result = tokio::task::spawn_blocking(move || f(&store, &*config))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
        Ok(result)
    }
}

async fn poll_mtimes(store: Store, tx: broadcast::Sender<StoreEvent>) {
    let mut last: Vec<Option<SystemTime>> = Vec::new();
    for &kind in FileKind::all() {
        last.push(mtime(&store, kind).await);
    }
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        for (i, &kind) in FileKind::all().iter().enumerate() {
            let now = mtime(&store, kind).await;
            if now != last[i] {
                last[i] = now;
                tracing::debug!(file = kind.file_name(), "file changed on disk");
                let _ = tx.send(StoreEvent::for_kind(kind));
            }
        }
    }
}

async fn mtime(store: &Store, kind: FileKind) -> Option<SystemTime> {
    tokio::fs::metadata(store.path(kind))
        .await
        .ok()
        .and_then(|m| m.modified().ok())
}
