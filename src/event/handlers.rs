use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{EventHandler, SessionEvent};
use crate::geometry::PixelRect;

/// Accumulates the canvas regions changed since the last `take`, so the viewport only
/// re-uploads what changed.
#[derive(Debug, Clone, Default)]
pub struct DirtyRegionTracker {
    dirty: Arc<Mutex<Option<PixelRect>>>,
}

impl DirtyRegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a region dirty without going through the event bus
    pub fn mark(&self, region: PixelRect) {
        if region.is_empty() {
            return;
        }
        let mut dirty = self.dirty.lock();
        *dirty = Some(match *dirty {
            Some(existing) => existing.union(region),
            None => region,
        });
    }

    /// Take and reset the pending dirty region
    pub fn take(&self) -> Option<PixelRect> {
        self.dirty.lock().take()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.lock().is_some()
    }
}

impl EventHandler for DirtyRegionTracker {
    fn handle_event(&mut self, event: &SessionEvent) {
        if let SessionEvent::CanvasChanged { region } = event {
            self.mark(*region);
        }
    }
}

/// Logs every session event at debug level
#[derive(Debug, Default)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle_event(&mut self, event: &SessionEvent) {
        log::debug!("session event: {:?}", event);
    }
}

/// Keeps a copy of every event it sees
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }

    pub fn drain(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventHandler for EventRecorder {
    fn handle_event(&mut self, event: &SessionEvent) {
        self.events.lock().push(event.clone());
    }
}
