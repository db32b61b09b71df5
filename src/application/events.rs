use crate::domain::Rgb;

/// What the visualization side is told about a growing stack
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    /// Drop everything drawn so far
    Clear,
    /// Cell `(x, y)` of layer `layer` is alive
    CellAlive { x: i32, y: i32, layer: usize, color: Rgb },
}

/// Receiver for render events.
pub trait RenderSink {
    fn emit(&mut self, event: RenderEvent);

    fn clear_all(&mut self) {
        self.emit(RenderEvent::Clear);
    }
}

/// Collects events in order; handy for tests and headless runs.
impl RenderSink for Vec<RenderEvent> {
    fn emit(&mut self, event: RenderEvent) {
        self.push(event);
    }
}

/// Discards every event.
impl RenderSink for () {
    fn emit(&mut self, _event: RenderEvent) {}
}
