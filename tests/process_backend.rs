//! Runs `ProcessBackend` against small shell scripts standing in for the pipeline.
#![cfg(unix)]

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use doodlepix::error::BackendError;
use doodlepix::generation::{
    CancelToken, GenerationBackend, GenerationConfig, GenerationRequest, ProcessBackend, Scheduler,
};
use image::{Rgba, RgbaImage};
use uuid::Uuid;

/// Answers the load request, then exits
const EXITS_AFTER_LOAD: &str = r#"read line
echo '{"ok":true}'
"#;

/// Stays alive but fails every request after the load
const FAILS_EVERY_REQUEST: &str = r#"read line
echo '{"ok":true}'
while read line; do
  echo '{"ok":false,"kind":"inference_error","message":"out of memory"}'
done
"#;

struct Fixture {
    dir: PathBuf,
    backend: ProcessBackend,
}

impl Fixture {
    fn new(script: &str) -> Self {
        let dir = env::temp_dir().join(format!("doodlepix-pipeline-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let script_path = dir.join("pipeline.sh");
        fs::write(&script_path, script).unwrap();
        let backend = ProcessBackend::new(
            "sh",
            vec![script_path.display().to_string()],
            dir.join("work"),
        );
        Self { dir, backend }
    }

    fn load(&mut self) {
        let model = self.dir.clone();
        self.backend.load(&model, Scheduler::Ddim).unwrap();
        assert!(self.backend.is_loaded());
    }

    fn generate(&mut self) -> Result<RgbaImage, BackendError> {
        let drawing = Arc::new(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255])));
        let request = GenerationRequest::new(drawing, &GenerationConfig::default(), 7);
        self.backend.generate(&request, &CancelToken::new())
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

#[test]
fn test_dead_pipeline_is_unloaded() {
    let mut fixture = Fixture::new(EXITS_AFTER_LOAD);
    fixture.load();

    assert!(matches!(fixture.generate(), Err(BackendError::Inference(_))));
    assert!(!fixture.backend.is_loaded());
    assert_eq!(fixture.backend.scheduler(), None);

    // Loading again starts a fresh process
    fixture.load();
    assert_eq!(fixture.backend.scheduler(), Some(Scheduler::Ddim));
}

#[test]
fn test_reported_failure_keeps_pipeline() {
    let mut fixture = Fixture::new(FAILS_EVERY_REQUEST);
    fixture.load();

    for _ in 0..2 {
        assert_eq!(
            fixture.generate(),
            Err(BackendError::Inference("out of memory".into()))
        );
        assert!(fixture.backend.is_loaded());
    }
    assert_eq!(
        fixture.backend.set_scheduler(Scheduler::Pndm),
        Err(BackendError::Inference("out of memory".into()))
    );
    assert_eq!(fixture.backend.scheduler(), Some(Scheduler::Ddim));
}
