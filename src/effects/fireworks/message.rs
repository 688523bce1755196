use super::entity::{Entity, Frame};
use super::random_range;
use crate::canvas::{Canvas, Rgb};
use fastrand::Rng;

/// Closer than this (and with no delay left) snaps onto the target.
const ARRIVAL_RADIUS: f32 = 2.0;
const MIN_SPEED: f32 = 0.5;
const MAX_SPEED: f32 = 8.0;
/// Distance at which travel reaches `MAX_SPEED`.
const FULL_SPEED_DISTANCE: f32 = 100.0;
const FADE_IN_RATE: f32 = 8.0;

/// One "pixel" of the message: flies to its target, then fades in.
#[derive(Clone, Debug)]
pub struct MessageParticle {
    pub x: f32,
    pub y: f32,
    pub tx: f32,
    pub ty: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: Rgb,
    pub size: f32,
    arrived: bool,
    arrival_tick: u64,
    alpha: f32,
    delay: f32,
}

impl MessageParticle {
    pub fn new(source: (f32, f32), target: (f32, f32), color: Rgb, rng: &mut Rng) -> Self {
        Self {
            x: source.0,
            y: source.1,
            tx: target.0,
            ty: target.1,
            vx: 0.0,
            vy: 0.0,
            color,
            size: random_range(rng, 3.0, 5.0),
            arrived: false,
            arrival_tick: 0,
            alpha: 0.0,
            delay: random_range(rng, 0.0, 60.0),
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    pub fn arrival_tick(&self) -> u64 {
        self.arrival_tick
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Advances one tick toward the target, or fades in once there.
    pub fn update_to_target(&mut self, tick: u64) {
        if self.arrived {
            self.alpha = (self.alpha + FADE_IN_RATE).min(255.0);
            return;
        }

        let dx = self.tx - self.x;
        let dy = self.ty - self.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if self.delay > 0.0 {
            self.delay = (self.delay - 1.0).max(0.0);
        } else if dist < ARRIVAL_RADIUS {
            self.x = self.tx;
            self.y = self.ty;
            self.vx = 0.0;
            self.vy = 0.0;
            self.arrived = true;
            self.arrival_tick = tick;
        } else {
            let speed = travel_speed(dist);
            self.vx = dx / dist * speed;
            self.vy = dy / dist * speed;
            self.x += self.vx;
            self.y += self.vy;
        }
    }

    pub fn at_target(&self) -> bool {
        self.arrived && self.alpha >= 255.0
    }
}

/// Maps distance 0..100 onto speed 0.5..8, clamped at both ends.
fn travel_speed(dist: f32) -> f32 {
    let t = (dist / FULL_SPEED_DISTANCE).clamp(0.0, 1.0);
    MIN_SPEED + (MAX_SPEED - MIN_SPEED) * t
}

impl Entity for MessageParticle {
    fn update(&mut self, frame: &Frame) {
        self.update_to_target(frame.tick);
    }

    fn draw(&self, canvas: &mut Canvas) {
        if self.alpha > 0.0 {
            canvas.fill_circle(self.x, self.y, self.size, self.color, self.alpha);
        }
    }

    /// Message particles leave only through a dispersal.
    fn is_expired(&self, _frame: &Frame) -> bool {
        false
    }
}
