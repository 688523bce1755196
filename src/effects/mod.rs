use crate::config::Config;
use crate::error::Result;
use crossterm::event::Event;
use std::io::Write;

pub mod fireworks;

/// A full-screen animation driven by the terminal loop.
///
/// Sizes are in terminal pixels: one column per cell, two rows per cell.
pub trait Effect {
    fn new(cols: usize, rows: usize, config: &Config) -> Result<Self>
    where
        Self: Sized;
    fn resize(&mut self, cols: usize, rows: usize);
    /// One fixed simulation tick.
    fn update(&mut self);
    fn render<W: Write>(&mut self, out: &mut W) -> std::io::Result<()>;
    fn handle_event(&mut self, _event: &Event) {}
}
