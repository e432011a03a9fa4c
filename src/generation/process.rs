//! Drives an external pipeline process over a line-delimited JSON protocol.
//!
//! The process is spawned on `load` and kept alive for later requests. Drawings and
//! results travel as PNG files in a work directory.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use image::{RgbImage, RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BackendError;
use crate::generation::{CancelToken, GenerationBackend, GenerationRequest, Scheduler};

/// Side length the pipeline expects its input at
pub const PIPELINE_INPUT_SIZE: u32 = 512;

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request<'a> {
    Load {
        model_path: &'a Path,
        scheduler: Scheduler,
    },
    SetScheduler {
        scheduler: Scheduler,
    },
    Generate {
        input_path: &'a Path,
        output_path: &'a Path,
        prompt: &'a str,
        negative_prompt: &'a str,
        steps: u32,
        guidance_scale: f32,
        image_guidance_scale: f32,
        seed: u64,
    },
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
enum FailureKind {
    ModelNotFound,
    InvalidParameter,
    InferenceError,
}

#[derive(Debug, Deserialize)]
struct Response {
    ok: bool,
    #[serde(default)]
    output_path: Option<PathBuf>,
    #[serde(default)]
    kind: Option<FailureKind>,
    #[serde(default)]
    message: String,
}

struct PipelineProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl PipelineProcess {
    fn spawn(program: &Path, args: &[String]) -> Result<Self, BackendError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                BackendError::Inference(format!("failed to start {}: {e}", program.display()))
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        match (stdin, stdout) {
            (Some(stdin), Some(stdout)) => Ok(Self {
                child,
                stdin,
                stdout: BufReader::new(stdout),
            }),
            _ => {
                let _ = child.kill();
                Err(BackendError::Inference("pipeline process has no stdio".into()))
            }
        }
    }

    /// Send one request and read one reply. Any failure here leaves the pipe unusable.
    fn call(&mut self, request: &Request<'_>) -> Result<Response, Disconnected> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| Disconnected(format!("cannot encode request: {e}")))?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .and_then(|()| self.stdin.flush())
            .map_err(|e| Disconnected(format!("pipeline process unreachable: {e}")))?;

        let mut reply = String::new();
        let read = self
            .stdout
            .read_line(&mut reply)
            .map_err(|e| Disconnected(format!("failed to read pipeline reply: {e}")))?;
        if read == 0 {
            return Err(Disconnected("pipeline process exited".into()));
        }

        serde_json::from_str(reply.trim())
            .map_err(|e| Disconnected(format!("malformed pipeline reply: {e}")))
    }
}

/// The pipe to the pipeline process broke; the process has to be restarted
#[derive(Debug)]
struct Disconnected(String);

impl From<Disconnected> for BackendError {
    fn from(Disconnected(reason): Disconnected) -> Self {
        BackendError::Inference(reason)
    }
}

impl Response {
    /// Failures reported by a healthy pipeline
    fn into_result(self, model_path: Option<&Path>) -> Result<Self, BackendError> {
        if self.ok {
            return Ok(self);
        }
        Err(match self.kind {
            Some(FailureKind::ModelNotFound) => {
                BackendError::ModelNotFound(model_path.map(Path::to_path_buf).unwrap_or_default())
            }
            Some(FailureKind::InvalidParameter) => BackendError::InvalidParameter(self.message),
            Some(FailureKind::InferenceError) | None => BackendError::Inference(self.message),
        })
    }
}

impl Drop for PipelineProcess {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("pipeline process already gone: {e}");
        }
        let _ = self.child.wait();
    }
}

/// Backend running the diffusion pipeline in a child process
pub struct ProcessBackend {
    program: PathBuf,
    args: Vec<String>,
    work_dir: PathBuf,
    process: Option<PipelineProcess>,
    scheduler: Option<Scheduler>,
}

impl std::fmt::Debug for ProcessBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessBackend")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("work_dir", &self.work_dir)
            .field("running", &self.process.is_some())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl ProcessBackend {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            work_dir: work_dir.into(),
            process: None,
            scheduler: None,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Call the running pipeline. A broken pipe unloads it so the next request reloads.
    fn call(&mut self, request: &Request<'_>) -> Result<Response, BackendError> {
        let process = self
            .process
            .as_mut()
            .ok_or_else(|| BackendError::Inference("pipeline not loaded, load a model first".into()))?;
        match process.call(request) {
            Ok(response) => response.into_result(None),
            Err(disconnected) => {
                log::warn!("dropping pipeline process: {}", disconnected.0);
                self.process = None;
                self.scheduler = None;
                Err(disconnected.into())
            }
        }
    }
}

impl GenerationBackend for ProcessBackend {
    fn load(&mut self, model_path: &Path, scheduler: Scheduler) -> Result<(), BackendError> {
        if !model_path.exists() {
            return Err(BackendError::ModelNotFound(model_path.to_path_buf()));
        }
        fs::create_dir_all(&self.work_dir)
            .map_err(|e| BackendError::Inference(format!("cannot create work dir: {e}")))?;

        // Drop the old pipeline before starting a new one
        self.process = None;
        self.scheduler = None;

        log::info!("starting pipeline {} for {}", self.program.display(), model_path.display());
        let mut process = PipelineProcess::spawn(&self.program, &self.args)?;
        process
            .call(&Request::Load { model_path, scheduler })?
            .into_result(Some(model_path))?;

        self.process = Some(process);
        self.scheduler = Some(scheduler);
        Ok(())
    }

    fn set_scheduler(&mut self, scheduler: Scheduler) -> Result<(), BackendError> {
        self.call(&Request::SetScheduler { scheduler })?;
        log::info!("scheduler switched to {scheduler}");
        self.scheduler = Some(scheduler);
        Ok(())
    }

    fn scheduler(&self) -> Option<Scheduler> {
        self.scheduler
    }

    fn generate(
        &mut self,
        request: &GenerationRequest,
        cancel: &CancelToken,
    ) -> Result<RgbaImage, BackendError> {
        let job = Uuid::new_v4();
        let input_path = self.work_dir.join(format!("input-{job}.png"));
        let output_path = self.work_dir.join(format!("output-{job}.png"));

        prepare_input(&request.image)
            .save(&input_path)
            .map_err(|e| BackendError::Inference(format!("cannot write drawing: {e}")))?;
        cancel.check()?;

        let reply = self.call(&Request::Generate {
            input_path: &input_path,
            output_path: &output_path,
            prompt: &request.prompt,
            negative_prompt: &request.negative_prompt,
            steps: request.steps,
            guidance_scale: request.guidance_scale,
            image_guidance_scale: request.image_guidance_scale,
            seed: request.seed,
        });
        remove_quietly(&input_path);
        let reply = reply?;

        let result_path = reply.output_path.unwrap_or(output_path);
        let image = image::open(&result_path)
            .map_err(|e| BackendError::Inference(format!("cannot read result image: {e}")))?
            .to_rgba8();
        remove_quietly(&result_path);
        Ok(image)
    }
}

/// RGB, inverted, `PIPELINE_INPUT_SIZE` square
pub fn prepare_input(drawing: &RgbaImage) -> RgbImage {
    let mut rgb = RgbImage::from_fn(drawing.width(), drawing.height(), |x, y| {
        let [r, g, b, _] = drawing.get_pixel(x, y).0;
        image::Rgb([r, g, b])
    });
    imageops::invert(&mut rgb);
    if rgb.dimensions() != (PIPELINE_INPUT_SIZE, PIPELINE_INPUT_SIZE) {
        rgb = imageops::resize(
            &rgb,
            PIPELINE_INPUT_SIZE,
            PIPELINE_INPUT_SIZE,
            imageops::FilterType::Lanczos3,
        );
    }
    rgb
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("could not remove {}: {e}", path.display());
    }
}
