use super::entity::{Entity, Frame};
use super::{GRAVITY, WIND, random_range};
use crate::canvas::{Canvas, Rgb};
use fastrand::Rng;

/// Falling below the bottom edge by this much kills a fragment.
const FLOOR_MARGIN: f32 = 200.0;

/// A free-flying, fading explosion particle.
#[derive(Clone, Debug)]
pub struct FragmentParticle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub color: Rgb,
    pub life: f32,
    pub age: f32,
    pub alpha: f32,
    pub dead: bool,
}

impl Default for FragmentParticle {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentParticle {
    /// A dead particle, ready to sit in the pool.
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            size: 3.0,
            color: (255, 255, 255),
            life: 80.0,
            age: 0.0,
            alpha: 255.0,
            dead: true,
        }
    }

    pub fn reset(&mut self, x: f32, y: f32, vx: f32, vy: f32, color: Rgb, rng: &mut Rng) {
        self.x = x;
        self.y = y;
        self.vx = vx;
        self.vy = vy;
        self.size = random_range(rng, 2.2, 5.2);
        self.color = color;
        self.life = random_range(rng, 60.0, 160.0);
        self.age = 0.0;
        self.alpha = 255.0;
        self.dead = false;
    }

    /// One physics tick. `floor` is the canvas height.
    pub fn step(&mut self, floor: f32) {
        self.age += 1.0;
        self.vy += GRAVITY;
        self.vx += WIND * 0.005;
        self.x += self.vx;
        self.y += self.vy;
        self.vx *= 0.995;
        self.vy *= 0.998;
        self.alpha = if self.life > 0.0 {
            (255.0 * (1.0 - self.age / self.life)).max(0.0)
        } else {
            0.0
        };

        if self.age > self.life || self.y > floor + FLOOR_MARGIN {
            self.dead = true;
        }
    }
}

impl Entity for FragmentParticle {
    fn update(&mut self, frame: &Frame) {
        self.step(frame.height);
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.fill_circle(self.x, self.y, self.size, self.color, self.alpha);
    }

    fn is_expired(&self, _frame: &Frame) -> bool {
        self.dead
    }
}
