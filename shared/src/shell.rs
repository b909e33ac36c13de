//! Async driver for native shells and tests.
//!
//! The driver owns a Crux [`Core`]. Each HTTP or image request runs as its own
//! tokio task which sends the request back down one channel together with its
//! output; only [`Shell::step`] resolves it against the core. Overlapping
//! requests therefore complete in whatever order the network decides, but the
//! model is only ever touched from the driver's loop.

use std::future::Future;
use std::sync::Arc;

use crux_core::{Core, Request};
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::App;
use crate::capabilities::{
    Capabilities, Effect, HttpOutput, HttpRequest, ImageOperation, ImageResult, RenderScope,
};
use crate::config::{ApiConfig, ConfigError};
use crate::event::Event;
use crate::view::ViewModel;

/// Executes HTTP requests for the core.
///
/// Report every failure as `HttpOutput::Err` rather than panicking. Deadlines
/// are enforced by the driver.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> HttpOutput;
}

#[async_trait::async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, operation: ImageOperation) -> ImageResult;
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("completion channel closed with {pending} effects outstanding")]
    ChannelClosed { pending: usize },
}

enum Completion {
    Http(Request<HttpRequest>, HttpOutput),
    Image(Request<ImageOperation>, ImageResult),
}

pub struct Shell<T, L> {
    core: Core<Effect, App>,
    config: ApiConfig,
    transport: Arc<T>,
    images: Arc<L>,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    pending: usize,
    renders: Vec<RenderScope>,
}

impl<T, L> Shell<T, L>
where
    T: Transport + 'static,
    L: ImageLoader + 'static,
{
    pub fn new(config: ApiConfig, transport: T, images: L) -> Result<Self, ShellError> {
        config.validate()?;
        let (tx, rx) = unbounded_channel();
        let mut shell = Self {
            core: Core::new::<Capabilities>(),
            config: config.clone(),
            transport: Arc::new(transport),
            images: Arc::new(images),
            tx,
            rx,
            pending: 0,
            renders: Vec::new(),
        };

        shell.dispatch(Event::Configure { config });
        // Nothing is on screen yet.
        shell.renders.clear();
        Ok(shell)
    }

    /// Feeds one event to the core and starts whatever effects it asks for.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn dispatch(&mut self, event: Event) {
        let effects = self.core.process_event(event);
        self.execute_all(effects);
    }

    /// Waits for the next completion and resolves it.
    ///
    /// Returns `Ok(false)` when nothing is outstanding.
    pub async fn step(&mut self) -> Result<bool, ShellError> {
        if self.pending == 0 {
            return Ok(false);
        }
        let completion = self.rx.recv().await.ok_or(ShellError::ChannelClosed {
            pending: self.pending,
        })?;
        self.pending -= 1;

        let effects = match completion {
            Completion::Http(mut request, output) => self.core.resolve(&mut request, output),
            Completion::Image(mut request, output) => self.core.resolve(&mut request, output),
        };
        self.execute_all(effects);
        Ok(true)
    }

    /// Resolves completions until no effect is outstanding; returns how many
    /// were resolved.
    pub async fn run_until_idle(&mut self) -> Result<usize, ShellError> {
        let mut resolved = 0;
        while self.step().await? {
            resolved += 1;
        }
        Ok(resolved)
    }

    pub fn view(&self) -> ViewModel<Event> {
        self.core.view()
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Render requests issued since the last call, oldest first.
    pub fn take_renders(&mut self) -> Vec<RenderScope> {
        std::mem::take(&mut self.renders)
    }

    fn execute_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Render(_) => {
                let scope = self.core.view().refresh;
                trace!(?scope, "render");
                self.renders.push(scope);
            }
            Effect::Http(request) => {
                let transport = Arc::clone(&self.transport);
                let deadline = self.config.timeout_for(&request.operation.method);
                let operation = request.operation.clone();
                self.spawn(async move {
                    let output = tokio::time::timeout(deadline, transport.execute(operation))
                        .await
                        .unwrap_or(HttpOutput::Err(crux_http::Error::Timeout));
                    Completion::Http(request, output)
                });
            }
            Effect::Image(request) => {
                let images = Arc::clone(&self.images);
                let operation = request.operation.clone();
                self.spawn(async move {
                    let output = images.load(operation).await;
                    Completion::Image(request, output)
                });
            }
        }
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            if tx.send(work.await).is_err() {
                debug!("shell dropped before the effect completed");
            }
        });
    }
}

impl<T, L> std::fmt::Debug for Shell<T, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("config", &self.config)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `shared=info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shared=info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
