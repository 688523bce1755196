use crate::canvas::Canvas;

/// Per-tick view of the scene handed to every entity.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    pub tick: u64,
    pub width: f32,
    pub height: f32,
}

/// Something the scene advances once per tick and draws once per frame.
pub trait Entity {
    fn update(&mut self, frame: &Frame);
    fn draw(&self, canvas: &mut Canvas);
    /// The owning collection drops (or recycles) expired entities.
    fn is_expired(&self, frame: &Frame) -> bool;
}
