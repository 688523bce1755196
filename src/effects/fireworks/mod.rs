//! Fireworks that periodically resolve into a message.
//!
//! [`FireworksShow`] is the scene: it owns every rocket and particle, steps
//! them once per tick in a fixed order (rockets, fragments, message
//! particles, then the message lifecycle checks) and draws them onto the
//! terminal canvas.

pub mod entity;
pub mod font;
pub mod fragment;
pub mod glyph;
pub mod lifecycle;
pub mod message;
pub mod particles;
pub mod pool;
pub mod rocket;

use super::Effect;
use crate::canvas::{Canvas, Rgb};
use crate::config::Config;
use crate::error::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use entity::{Entity, Frame};
use fastrand::Rng;
use font::Font;
use glyph::GlyphSampler;
use lifecycle::MessageLifecycle;
use particles::Particles;
use rocket::{Explosion, Rocket};
use std::io::Write;

pub(crate) const GRAVITY: f32 = 0.06;
pub(crate) const WIND: f32 = 0.0;

const POOL_PREFILL: usize = 300;
const FIRST_LAUNCH_INTERVAL: u32 = 40;
/// Pointer launches stay this far from the side edges.
const EDGE_MARGIN: f32 = 30.0;

/// Uniform in `[lo, hi)`; also accepts `lo > hi`.
pub(crate) fn random_range(rng: &mut Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.f32() * (hi - lo)
}

fn update_all<E: Entity>(entities: &mut [E], frame: &Frame) {
    for entity in entities {
        entity.update(frame);
    }
}

fn draw_all<E: Entity>(entities: &[E], canvas: &mut Canvas) {
    for entity in entities {
        entity.draw(canvas);
    }
}

pub struct FireworksShow {
    canvas: Canvas,
    width: f32,
    height: f32,
    bg: Rgb,
    sky_alpha: f32,
    rng: Rng,
    tick: u64,
    spawn_timer: u32,
    spawn_interval: u32,
    message: String,
    rockets: Vec<Rocket>,
    particles: Particles,
    lifecycle: MessageLifecycle,
    sampler: GlyphSampler,
}

impl FireworksShow {
    /// `cols` x `rows` terminal pixels (rows are half cells).
    pub fn new(cols: usize, rows: usize, config: &Config) -> Result<Self> {
        let font = Font::from_path(config.message.font.as_deref())?;
        log::info!("message {:?} rendered with the {}", config.message.text, font.describe());

        let seed = config.general.seed.unwrap_or_else(|| fastrand::u64(..));
        log::info!("random seed {seed}");
        let mut rng = Rng::with_seed(seed);

        let display = &config.display;
        let canvas = Canvas::new(cols, rows, display.scale, display.bg_color);
        let lifecycle = MessageLifecycle::new(&config.message, &mut rng);

        Ok(Self {
            width: canvas.logical_width(),
            height: canvas.logical_height(),
            canvas,
            bg: display.bg_color,
            sky_alpha: display.sky_alpha as f32,
            rng,
            tick: 0,
            spawn_timer: 0,
            spawn_interval: FIRST_LAUNCH_INTERVAL,
            message: config.message.text.clone(),
            rockets: Vec::new(),
            particles: Particles::new(POOL_PREFILL),
            lifecycle,
            sampler: GlyphSampler::new(font, config.message.stride, config.message.font_scale),
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    pub fn lifecycle(&self) -> &MessageLifecycle {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut MessageLifecycle {
        &mut self.lifecycle
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn frame(&self) -> Frame {
        Frame {
            tick: self.tick,
            width: self.width,
            height: self.height,
        }
    }

    pub fn launch_rocket(&mut self, x: Option<f32>) -> &mut Rocket {
        let rocket = Rocket::new(x, self.width, self.height, &mut self.rng);
        self.rockets.push(rocket);
        let last = self.rockets.len() - 1;
        &mut self.rockets[last]
    }

    /// Keeps live entities; only the drawing surface changes size.
    pub fn on_resize(&mut self, cols: usize, rows: usize) {
        self.canvas.resize(cols, rows, self.bg);
        self.width = self.canvas.logical_width();
        self.height = self.canvas.logical_height();
        log::debug!("resized to {cols}x{rows} pixels ({}x{} logical)", self.width, self.height);
    }

    /// Advances the scene by one tick.
    pub fn on_frame(&mut self) {
        self.tick += 1;
        let frame = self.frame();

        self.spawn_timer += 1;
        if self.spawn_timer > self.spawn_interval {
            self.spawn_timer = 0;
            self.spawn_interval = self.rng.u32(28..60);
            self.launch_rocket(None);
        }

        let mut explosions: Vec<Explosion> = Vec::new();
        for rocket in &mut self.rockets {
            rocket.update(&frame);
            if rocket.ready_to_explode() {
                explosions.extend(rocket.explode(&mut self.lifecycle, &mut self.particles, &mut self.rng));
            }
        }
        self.rockets.retain(|r| !r.is_expired(&frame));

        for explosion in explosions.iter().filter(|e| e.triggers_message) {
            self.form_message((explosion.x, explosion.y), &frame);
        }

        update_all(&mut self.particles.fragments, &frame);
        self.particles.sweep_dead();

        update_all(&mut self.particles.messages, &frame);
        self.lifecycle.advance(&mut self.particles, &frame, &mut self.rng);
    }

    fn form_message(&mut self, anchor: (f32, f32), frame: &Frame) {
        let targets = self.sampler.prepare_targets(
            &self.message,
            self.width,
            self.height,
            anchor.0,
            anchor.1,
            &mut self.rng,
        );
        self.lifecycle
            .begin_forming(anchor, targets, &mut self.particles, frame, &mut self.rng);
    }

    /// Launches one or two rockets near `x`.
    pub fn on_pointer_down(&mut self, x: f32, _y: f32) {
        let count = self.rng.usize(1..3);
        let hi = (self.width - EDGE_MARGIN).max(EDGE_MARGIN);
        for _ in 0..count {
            let launch_x = (x + random_range(&mut self.rng, -60.0, 60.0)).clamp(EDGE_MARGIN, hi);
            self.launch_rocket(Some(launch_x));
        }
    }

    /// Space sends up a low-fused rocket that will carry the message.
    pub fn on_key(&mut self, key: char) {
        if key != ' ' {
            return;
        }
        let x = random_range(&mut self.rng, self.width * 0.2, self.width * 0.8);
        let fuse = random_range(&mut self.rng, self.height * 0.12, self.height * 0.3);
        self.launch_rocket(Some(x)).fuse_height = fuse;
        self.lifecycle.request_message();
        log::debug!("message requested from keyboard");
    }

    pub fn draw(&mut self) {
        self.canvas.fade(self.bg, self.sky_alpha);
        draw_all(&self.rockets, &mut self.canvas);
        draw_all(&self.particles.fragments, &mut self.canvas);
        draw_all(&self.particles.messages, &mut self.canvas);
    }
}

impl Effect for FireworksShow {
    fn new(cols: usize, rows: usize, config: &Config) -> Result<Self> {
        FireworksShow::new(cols, rows, config)
    }

    fn resize(&mut self, cols: usize, rows: usize) {
        self.on_resize(cols, rows);
    }

    fn update(&mut self) {
        self.on_frame();
    }

    fn render<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        self.draw();
        self.canvas.present(out)
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Mouse(mouse_event) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind {
                    // Center of the clicked cell, which spans two pixel rows.
                    let scale = self.canvas.scale();
                    let x = (mouse_event.column as f32 + 0.5) * scale;
                    let y = (mouse_event.row as f32 * 2.0 + 1.0) * scale;
                    self.on_pointer_down(x, y);
                }
            }
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                if let KeyCode::Char(c) = key_event.code {
                    self.on_key(c);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(seed: u64) -> FireworksShow {
        let mut config = Config::default();
        config.general.seed = Some(seed);
        FireworksShow::new(200, 100, &config).unwrap()
    }

    #[test]
    fn logical_canvas_is_scaled() {
        let s = show(1);
        assert_eq!((s.width(), s.height()), (1600.0, 800.0));
        assert_eq!(s.particles().pool.len(), POOL_PREFILL);
    }

    #[test]
    fn first_rocket_launches_after_initial_interval() {
        let mut s = show(2);
        for _ in 0..FIRST_LAUNCH_INTERVAL {
            s.on_frame();
        }
        assert!(s.rockets().is_empty());
        s.on_frame();
        assert_eq!(s.rockets().len(), 1);
    }

    #[test]
    fn pointer_launches_one_or_two_near_x() {
        for seed in 0..20 {
            let mut s = show(seed);
            s.on_pointer_down(5.0, 100.0);
            let n = s.rockets().len();
            assert!((1..=2).contains(&n));
            for r in s.rockets() {
                assert!(r.x >= EDGE_MARGIN && r.x <= 5.0 + 60.0 + EDGE_MARGIN);
            }
        }
    }

    #[test]
    fn space_requests_a_message_with_a_low_fuse() {
        let mut s = show(3);
        s.on_key('x');
        assert!(s.rockets().is_empty());
        s.on_key(' ');
        assert!(s.lifecycle().pending());
        let r = &s.rockets()[0];
        assert!(r.fuse_height >= 800.0 * 0.12 && r.fuse_height <= 800.0 * 0.3);
        assert!(r.x >= 1600.0 * 0.2 && r.x <= 1600.0 * 0.8);
    }

    #[test]
    fn exploded_rockets_leave_the_scene() {
        let mut s = show(4);
        s.lifecycle_mut().set_countdown(1000);
        s.launch_rocket(Some(800.0));
        for _ in 0..400 {
            s.on_frame();
            assert!(s.rockets().iter().all(|r| !r.exploded()));
            if !s.particles().fragments.is_empty() {
                return;
            }
        }
        panic!("rocket never burst");
    }

    #[test]
    fn message_cycle_runs_end_to_end() {
        let mut s = show(5);
        s.on_key(' ');
        // Only the requested message; no cadence message may replace it.
        s.lifecycle_mut().set_countdown(u32::MAX);

        let mut held_since = None;
        for _ in 0..2000 {
            s.on_frame();
            if let lifecycle::Phase::Holding { since } = s.lifecycle().phase() {
                held_since = Some(since);
            }
            if held_since.is_some() && s.particles().messages.is_empty() {
                break;
            }
        }

        let since = held_since.expect("message never held");
        assert!(s.particles().messages.is_empty(), "message never dispersed");
        assert_eq!(s.tick() - since, Config::default().message.hold_ticks);
        assert_eq!(s.lifecycle().phase(), lifecycle::Phase::Idle);
    }

    #[test]
    fn resize_keeps_entities() {
        let mut s = show(6);
        s.launch_rocket(None);
        s.on_resize(100, 40);
        assert_eq!((s.width(), s.height()), (800.0, 320.0));
        assert_eq!(s.rockets().len(), 1);
        assert_eq!(s.canvas().cols(), 100);
    }

    #[test]
    fn render_writes_a_full_frame() {
        let mut s = show(7);
        s.on_key(' ');
        for _ in 0..30 {
            s.on_frame();
        }
        let mut out = Vec::new();
        s.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('▄').count(), 200 * 50);
    }
}
