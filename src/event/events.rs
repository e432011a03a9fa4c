use uuid::Uuid;

use crate::geometry::PixelRect;
use crate::tools::ToolMode;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Pixels inside `region` changed and the viewport should refresh them
    CanvasChanged {
        region: PixelRect,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    ToolChanged {
        old: ToolMode,
        new: ToolMode,
    },
    GenerationStarted {
        request_id: Uuid,
    },
    GenerationCompleted {
        request_id: Uuid,
        index: usize,
    },
    GenerationFailed {
        request_id: Uuid,
        reason: String,
    },
    GenerationCancelled {
        request_id: Uuid,
    },
    ImageSelected {
        index: Option<usize>,
    },
}
