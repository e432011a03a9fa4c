#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod brush;
pub mod canvas;
pub mod command;
pub mod error;
pub mod event;
pub mod generation;
pub mod geometry;
pub mod image_history;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod settings;
pub mod shortcuts;
pub mod state;
pub mod stroke;
pub mod tools;
pub mod util;

pub use app::DoodlePixApp;
pub use canvas::{Canvas, CanvasSnapshot};
pub use command::{Command, CommandHistory};
pub use error::{BackendError, ConfigError, GenerationError, HistoryError, PersistenceError};
pub use generation::{GenerationBackend, GenerationConfig, GenerationSession, Scheduler};
pub use image_history::{GeneratedImage, ImageHistory};
pub use settings::Settings;
pub use shortcuts::{Action, ShortcutDispatcher};
pub use state::{Session, SessionSnapshot};
pub use stroke::{Shape, Stroke, StrokeMode};
pub use tools::{ToolController, ToolMode};
