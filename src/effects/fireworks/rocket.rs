use super::entity::{Entity, Frame};
use super::lifecycle::MessageLifecycle;
use super::particles::{Burst, Particles, random_color};
use super::{GRAVITY, WIND, random_range};
use crate::canvas::{Canvas, Rgb};
use fastrand::Rng;
use std::collections::VecDeque;

const TRAIL_LEN: usize = 20;
/// Upward speed below which the rocket counts as at its apex.
const APEX_VY: f32 = -1.0;

/// What a rocket left behind when it burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub fragments: usize,
    /// The burst that should turn into a message.
    pub triggers_message: bool,
}

#[derive(Clone, Debug)]
pub struct Rocket {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub color: Rgb,
    pub fuse_height: f32,
    trail: VecDeque<(f32, f32)>,
    age: u32,
    fuse_lit: bool,
    exploded: bool,
}

impl Rocket {
    /// Launches from just below the bottom edge. Without `x`, picks a spot
    /// in the central 70% of the width.
    pub fn new(x: Option<f32>, width: f32, height: f32, rng: &mut Rng) -> Self {
        Self {
            x: x.unwrap_or_else(|| random_range(rng, width * 0.15, width * 0.85)),
            y: height + random_range(rng, 10.0, 80.0),
            vx: random_range(rng, -0.4, 0.4),
            vy: random_range(rng, -8.5, -11.5),
            size: random_range(rng, 3.0, 5.0),
            color: (
                random_range(rng, 200.0, 255.0) as u8,
                random_range(rng, 140.0, 220.0) as u8,
                random_range(rng, 100.0, 200.0) as u8,
            ),
            fuse_height: random_range(rng, height * 0.2, height * 0.45),
            trail: VecDeque::with_capacity(TRAIL_LEN + 1),
            age: 0,
            fuse_lit: false,
            exploded: false,
        }
    }

    /// One tick of flight. Lights the fuse once the rocket climbs above
    /// `fuse_height` or stalls at its apex.
    pub fn step(&mut self) {
        if self.exploded {
            return;
        }

        self.age += 1;
        self.vy += GRAVITY * 0.02;
        self.vx += WIND * 0.001;
        self.x += self.vx;
        self.y += self.vy;

        self.trail.push_back((self.x, self.y));
        if self.trail.len() > TRAIL_LEN {
            self.trail.pop_front();
        }

        self.x += (self.age as f32 * 0.08).sin() * 0.3;

        if self.y < self.fuse_height || self.vy > APEX_VY {
            self.fuse_lit = true;
        }
    }

    pub fn ready_to_explode(&self) -> bool {
        self.fuse_lit && !self.exploded
    }

    pub fn exploded(&self) -> bool {
        self.exploded
    }

    pub fn trail(&self) -> &VecDeque<(f32, f32)> {
        &self.trail
    }

    /// Bursts the rocket. Counts toward the message cadence and, on the
    /// triggering explosion, spawns the dense message burst instead of an
    /// ordinary one. Returns `None` if the rocket already exploded.
    pub fn explode(
        &mut self,
        lifecycle: &mut MessageLifecycle,
        particles: &mut Particles,
        rng: &mut Rng,
    ) -> Option<Explosion> {
        if self.exploded {
            return None;
        }
        self.exploded = true;

        let triggers_message = lifecycle.register_explosion(rng);
        let burst = if triggers_message { Burst::message() } else { Burst::ordinary(rng) };
        let fragments = particles.burst(self.x, self.y, &burst, rng, |r| random_color(r, 120.0));

        Some(Explosion {
            x: self.x,
            y: self.y,
            fragments,
            triggers_message,
        })
    }

    pub fn offscreen(&self, width: f32) -> bool {
        self.y < -50.0 || self.x < -100.0 || self.x > width + 100.0
    }
}

impl Entity for Rocket {
    fn update(&mut self, _frame: &Frame) {
        self.step();
    }

    fn draw(&self, canvas: &mut Canvas) {
        // Newest to oldest, growing brighter and wider.
        let n = self.trail.len() as f32;
        for (i, &(tx, ty)) in self.trail.iter().rev().enumerate() {
            let t = (i + 1) as f32 / n;
            let alpha = 10.0 + (180.0 - 10.0) * t;
            let diameter = 1.2 + (4.6 - 1.2) * t;
            canvas.fill_circle(tx, ty, diameter, self.color, alpha);
        }

        canvas.fill_circle(self.x, self.y, self.size, self.color, 255.0);
    }

    fn is_expired(&self, frame: &Frame) -> bool {
        self.exploded || self.offscreen(frame.width)
    }
}
