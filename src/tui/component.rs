use ratatui::Frame;
use ratatui::layout::Rect;

/// A piece of the screen.
///
/// Props arrive as struct fields; persistent presentation state (scroll
/// offsets, selection) is held by reference in `*State` structs owned by
/// `TuiState`, so a component can be rebuilt every frame.
///
/// `render` takes `&mut self` so components can update that state (e.g.
/// keep the caret visible) during the render pass, in the spirit of
/// ratatui's `StatefulWidget`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that consumes terminal events.
pub trait EventHandler {
    /// High-level event emitted to the parent.
    type Event;

    /// Handle a low-level `TuiEvent`, optionally emitting a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
