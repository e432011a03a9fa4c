use std::sync::Arc;
use std::thread;

use futures::channel::oneshot;
use image::RgbaImage;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::canvas::CanvasSnapshot;
use crate::error::{BackendError, GenerationError};
use crate::generation::{CancelToken, GenerationBackend, GenerationConfig, GenerationRequest};
use crate::image_history::ImageHistory;
use crate::util::time::current_time_secs;

/// Called from the worker thread when a result is ready
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Backend shared between the session and its worker threads
pub type SharedBackend = Arc<Mutex<Box<dyn GenerationBackend>>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenerationState {
    Idle,
    Requesting { request_id: Uuid, started_at: f64 },
}

/// What `poll` observed
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The image was appended to the image history at `position`
    Completed { request_id: Uuid, position: usize },
    Failed { request_id: Uuid, error: BackendError },
}

struct Pending {
    request_id: Uuid,
    started_at: f64,
    config: GenerationConfig,
    cancel: CancelToken,
    receiver: oneshot::Receiver<Result<RgbaImage, BackendError>>,
}

/// Runs at most one generation request at a time
pub struct GenerationSession {
    backend: SharedBackend,
    pending: Option<Pending>,
    last_error: Option<GenerationError>,
    waker: Option<Waker>,
}

impl std::fmt::Debug for GenerationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSession")
            .field("state", &self.state())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl GenerationSession {
    pub fn new(backend: Box<dyn GenerationBackend>) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            pending: None,
            last_error: None,
            waker: None,
        }
    }

    /// Called whenever a worker finishes, e.g. to request a repaint
    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn state(&self) -> GenerationState {
        match &self.pending {
            Some(pending) => GenerationState::Requesting {
                request_id: pending.request_id,
                started_at: pending.started_at,
            },
            None => GenerationState::Idle,
        }
    }

    pub fn is_requesting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<&GenerationError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Start generating from `snapshot`. Only accepted while idle.
    pub fn generate(
        &mut self,
        snapshot: &CanvasSnapshot,
        config: &GenerationConfig,
    ) -> Result<Uuid, GenerationError> {
        if self.pending.is_some() {
            log::warn!("generate ignored: a request is already in flight");
            return Err(GenerationError::GenerationInProgress);
        }
        if let Err(e) = config.validate() {
            log::warn!("generate rejected: {e}");
            let err = GenerationError::InvalidConfig(e);
            self.last_error = Some(err.clone());
            return Err(err);
        }

        let mut resolved = config.clone();
        let seed = *resolved.seed.get_or_insert_with(random_seed);
        let request = GenerationRequest::new(snapshot.shared_image(), &resolved, seed);
        let reload = resolved.reload_pipeline;

        let request_id = Uuid::new_v4();
        let cancel = CancelToken::new();
        let (sender, receiver) = oneshot::channel();

        let backend = Arc::clone(&self.backend);
        let token = cancel.clone();
        let waker = self.waker.clone();
        let job = Job {
            request,
            model_path: resolved.model_path.clone(),
            scheduler: resolved.scheduler,
            reload,
        };
        let spawned = thread::Builder::new()
            .name(format!("generation-{request_id}"))
            .spawn(move || {
                let result = job.run(&backend, &token);
                if sender.send(result).is_err() {
                    log::debug!("generation {request_id} finished after being cancelled");
                }
                if let Some(waker) = waker {
                    waker();
                }
            });
        if let Err(e) = spawned {
            let err = GenerationError::Backend(BackendError::Inference(format!(
                "failed to start generation worker: {e}"
            )));
            self.last_error = Some(err.clone());
            return Err(err);
        }

        log::info!(
            "generation {request_id} started: {} steps, seed {seed}, scheduler {}",
            resolved.steps,
            resolved.scheduler
        );
        self.last_error = None;
        self.pending = Some(Pending {
            request_id,
            started_at: current_time_secs(),
            config: resolved,
            cancel,
            receiver,
        });
        Ok(request_id)
    }

    /// Check for a finished request. Successful images are appended to `images`.
    pub fn poll(&mut self, images: &mut ImageHistory) -> Option<GenerationOutcome> {
        let pending = self.pending.as_mut()?;
        let result = match pending.receiver.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(BackendError::Inference(
                "generation worker stopped unexpectedly".into(),
            )),
        };

        let pending = self.pending.take()?;
        let request_id = pending.request_id;
        match result {
            Ok(image) => {
                let elapsed = current_time_secs() - pending.started_at;
                let position = images.push(request_id, image, pending.config);
                log::info!("generation {request_id} completed in {elapsed:.1}s");
                Some(GenerationOutcome::Completed { request_id, position })
            }
            Err(error) => {
                log::error!("generation {request_id} failed: {error}");
                self.last_error = Some(GenerationError::Backend(error.clone()));
                Some(GenerationOutcome::Failed { request_id, error })
            }
        }
    }

    /// Abandon the in-flight request. Its result, if it still arrives, is discarded.
    pub fn cancel(&mut self) -> Option<Uuid> {
        let pending = self.pending.take()?;
        pending.cancel.cancel();
        log::info!("generation {} cancelled", pending.request_id);
        Some(pending.request_id)
    }
}

struct Job {
    request: GenerationRequest,
    model_path: std::path::PathBuf,
    scheduler: crate::generation::Scheduler,
    reload: bool,
}

impl Job {
    fn run(self, backend: &SharedBackend, cancel: &CancelToken) -> Result<RgbaImage, BackendError> {
        cancel.check()?;
        let mut backend = backend.lock();
        cancel.check()?;

        if self.reload || !backend.is_loaded() {
            log::info!("loading pipeline from {}", self.model_path.display());
            backend.load(&self.model_path, self.scheduler)?;
        } else if backend.scheduler() != Some(self.scheduler) {
            backend.set_scheduler(self.scheduler)?;
        }
        cancel.check()?;

        backend.generate(&self.request, cancel)
    }
}

fn random_seed() -> u64 {
    let bytes = Uuid::new_v4().into_bytes();
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(head) % (GenerationConfig::MAX_SEED + 1)
}
