//! Decode-once texture assets.
//!
//! A [`TextureAsset`] is a named handle to an image that is loaded at most
//! once. The first request launches a load task through the asset's
//! [`LoadContext`]; every later or concurrent request waits for that same task
//! and receives the same shared [`RawImage`].
//!
//! ```text
//! NotStarted --request_load--> InFlight --task publishes--> Done
//! ```
//!
//! Failed loads also end in `Done`. They publish a [`TextureError`] instead of
//! an image, which [`TextureAsset::get_image`] reports as `None` and
//! [`TextureAsset::try_image`] returns as is.

use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU8, AtomicUsize, Ordering},
    },
};

use futures_intrusive::sync::ManualResetEvent;

use crate::{
    data_structures::image::RawImage,
    error::TextureError,
    resources::{LoadContext, normalize::normalize},
};

/// Progress of a texture's single load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    InFlight,
    Done,
}

const NOT_STARTED: u8 = 0;
const IN_FLIGHT: u8 = 1;
const DONE: u8 = 2;

impl LoadState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            NOT_STARTED => Self::NotStarted,
            IN_FLIGHT => Self::InFlight,
            _ => Self::Done,
        }
    }
}

type LoadOutcome = Result<Arc<RawImage>, TextureError>;

struct Inner {
    name: String,
    context: LoadContext,
    state: AtomicU8,
    outcome: OnceLock<LoadOutcome>,
    done: ManualResetEvent,
    load_tasks: AtomicUsize,
}

impl Inner {
    fn load(&self) -> LoadOutcome {
        self.load_tasks.fetch_add(1, Ordering::Relaxed);
        let ctx = &self.context;
        if !ctx.loader.file_exists(&self.name) {
            return Err(TextureError::MissingAsset(self.name.clone()));
        }

        log::info!("Start async loading of {}", self.name);
        let bytes = ctx
            .loader
            .read_binary(&self.name)
            .map_err(|e| TextureError::Io {
                name: self.name.clone(),
                message: format!("{e:#}"),
            })?;
        let mut image = ctx.decoders.decode(&bytes, &self.name)?;
        drop(bytes);
        if ctx.normalize {
            image = normalize(image)?;
        }
        log::info!(
            "End async loading of {} ({}x{}, {} bits)",
            self.name,
            image.width,
            image.height,
            image.bit_count
        );

        Ok(Arc::new(image))
    }

    fn publish(&self, outcome: LoadOutcome) {
        match &outcome {
            Err(e) if e.is_absent() => log::info!("texture {} has no content: {}", self.name, e),
            Err(e) => log::warn!("texture {} failed to load: {}", self.name, e),
            Ok(_) => (),
        }
        if self.outcome.set(outcome).is_err() {
            log::error!("texture {} was published more than once", self.name);
        }
        self.state.store(DONE, Ordering::Release);
        self.done.set();
    }

    fn outcome(&self) -> LoadOutcome {
        self.outcome
            .get()
            .cloned()
            .unwrap_or_else(|| Err(TextureError::LoadAborted(self.name.clone())))
    }
}

/// Publishes a result exactly once, even if the task owning it never runs.
struct Completion(Option<Arc<Inner>>);

impl Completion {
    fn finish(mut self, outcome: LoadOutcome) {
        if let Some(inner) = self.0.take() {
            inner.publish(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(inner) = self.0.take() {
            let aborted = TextureError::LoadAborted(inner.name.clone());
            inner.publish(Err(aborted));
        }
    }
}

/// A texture referenced by name whose image is decoded once and then shared.
///
/// Cloning is cheap and clones share the same load. Two assets created
/// separately for the same name do not; use a
/// [`TextureLibrary`](crate::resources::library::TextureLibrary) to
/// deduplicate by name.
#[derive(Clone)]
pub struct TextureAsset {
    inner: Arc<Inner>,
}

impl fmt::Debug for TextureAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureAsset")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}

impl TextureAsset {
    pub fn new(name: impl Into<String>, context: LoadContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                context,
                state: AtomicU8::new(NOT_STARTED),
                outcome: OnceLock::new(),
                done: ManualResetEvent::new(false),
                load_tasks: AtomicUsize::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn state(&self) -> LoadState {
        LoadState::from_raw(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Done
    }

    /// How many load task bodies have run for this asset. Never exceeds one.
    pub fn load_task_count(&self) -> usize {
        self.inner.load_tasks.load(Ordering::Relaxed)
    }

    /// Start loading in the background unless a load was already requested.
    ///
    /// Returns `true` only for the call that launched the task.
    pub fn request_load(&self) -> bool {
        if self
            .inner
            .state
            .compare_exchange(NOT_STARTED, IN_FLIGHT, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        log::debug!("scheduling load of {}", self.inner.name);
        let inner = Arc::clone(&self.inner);
        let completion = Completion(Some(Arc::clone(&self.inner)));
        self.inner.context.launcher.launch(Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| inner.load())).unwrap_or_else(|_| {
                log::error!("load task for {} panicked", inner.name);
                Err(TextureError::LoadAborted(inner.name.clone()))
            });
            completion.finish(outcome);
        }));
        true
    }

    /// Block until the image is loaded, requesting the load if needed.
    ///
    /// Returns `None` when the texture could not be loaded; see
    /// [`try_image`](Self::try_image) for the reason. The calling thread is
    /// parked while waiting, so this must not be called from an async task;
    /// use [`image_async`](Self::image_async) there.
    pub fn get_image(&self) -> Option<Arc<RawImage>> {
        self.try_image().ok()
    }

    /// Like [`get_image`](Self::get_image) but reports why no image exists.
    pub fn try_image(&self) -> Result<Arc<RawImage>, TextureError> {
        self.request_load();
        if !self.inner.done.is_set() {
            futures::executor::block_on(self.inner.done.wait());
        }
        self.inner.outcome()
    }

    pub async fn image_async(&self) -> Option<Arc<RawImage>> {
        self.try_image_async().await.ok()
    }

    pub async fn try_image_async(&self) -> Result<Arc<RawImage>, TextureError> {
        self.request_load();
        self.inner.done.wait().await;
        self.inner.outcome()
    }

    /// The image if it has already been published. Never blocks or starts a load.
    pub fn peek(&self) -> Option<Arc<RawImage>> {
        self.inner.outcome.get()?.as_ref().ok().cloned()
    }

    /// The failure of a finished load. Never blocks or starts a load.
    pub fn error(&self) -> Option<TextureError> {
        self.inner.outcome.get()?.as_ref().err().cloned()
    }

    /// Whether both handles refer to the same asset.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this asset, including in-flight load tasks.
    pub(crate) fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}
