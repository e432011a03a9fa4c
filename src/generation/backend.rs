use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;

use crate::error::BackendError;
use crate::generation::{GenerationConfig, Scheduler};

/// Everything the pipeline needs for one image
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The drawing as copied from the canvas
    pub image: Arc<RgbaImage>,
    pub prompt: String,
    pub negative_prompt: String,
    pub steps: u32,
    pub guidance_scale: f32,
    pub image_guidance_scale: f32,
    pub seed: u64,
}

impl GenerationRequest {
    pub fn new(image: Arc<RgbaImage>, config: &GenerationConfig, seed: u64) -> Self {
        Self {
            image,
            prompt: config.prompt.clone(),
            negative_prompt: config.negative_prompt.clone(),
            steps: config.steps,
            guidance_scale: config.guidance_scale,
            image_guidance_scale: config.image_guidance_scale,
            seed,
        }
    }
}

/// Shared flag set when the requester gives up on a request
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancelled
    pub fn check(&self) -> Result<(), BackendError> {
        if self.is_cancelled() {
            Err(BackendError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// An image-to-image pipeline the generation session drives.
///
/// Calls are made from the generation worker thread, one at a time.
pub trait GenerationBackend: Send {
    /// (Re)initialize the pipeline from `model_path`
    fn load(&mut self, model_path: &Path, scheduler: Scheduler) -> Result<(), BackendError>;

    /// Swap the scheduler of the loaded pipeline
    fn set_scheduler(&mut self, scheduler: Scheduler) -> Result<(), BackendError>;

    /// Scheduler of the loaded pipeline, `None` when nothing is loaded
    fn scheduler(&self) -> Option<Scheduler>;

    fn is_loaded(&self) -> bool {
        self.scheduler().is_some()
    }

    /// Run one request. Implementations may poll `cancel` to stop early.
    fn generate(
        &mut self,
        request: &GenerationRequest,
        cancel: &CancelToken,
    ) -> Result<RgbaImage, BackendError>;
}

impl<B: GenerationBackend + ?Sized> GenerationBackend for Box<B> {
    fn load(&mut self, model_path: &Path, scheduler: Scheduler) -> Result<(), BackendError> {
        (**self).load(model_path, scheduler)
    }

    fn set_scheduler(&mut self, scheduler: Scheduler) -> Result<(), BackendError> {
        (**self).set_scheduler(scheduler)
    }

    fn scheduler(&self) -> Option<Scheduler> {
        (**self).scheduler()
    }

    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn generate(
        &mut self,
        request: &GenerationRequest,
        cancel: &CancelToken,
    ) -> Result<RgbaImage, BackendError> {
        (**self).generate(request, cancel)
    }
}
