//! Message cadence and the form / hold / disperse cycle.
//!
//! Ordinary explosions count down to the next message. The triggering
//! explosion's center becomes the anchor, the message particles fly to
//! their glyph targets, hold once every one of them is fully visible, and
//! finally burst apart in a single tick. Only one message exists at a time:
//! starting a new one first disperses whatever is on screen.

use super::entity::Frame;
use super::glyph::GlyphTarget;
use super::message::MessageParticle;
use super::particles::{Burst, Particles, jitter_color, random_color};
use super::random_range;
use crate::config::MessageConfig;
use fastrand::Rng;

/// Extra bursts scattered around the anchor on dispersal.
const SCATTER_BURSTS: usize = 10;
/// Per-channel color spread of dispersal puffs.
const PUFF_COLOR_SPREAD: f32 = 30.0;
/// Half-width of the fallback source box around the anchor.
const SOURCE_JITTER: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Forming,
    Holding { since: u64 },
    Dispersing,
}

/// Bursts produced by one dispersal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dispersal {
    pub particle_bursts: usize,
    pub anchor_bursts: usize,
    pub scatter_bursts: usize,
    pub fragments: usize,
}

impl Dispersal {
    pub fn total_bursts(&self) -> usize {
        self.particle_bursts + self.anchor_bursts + self.scatter_bursts
    }
}

pub struct MessageLifecycle {
    explosions_remaining: u32,
    pending: bool,
    anchor: (f32, f32),
    phase: Phase,
    hold_ticks: u64,
    cadence: (u32, u32),
}

impl MessageLifecycle {
    pub fn new(config: &MessageConfig, rng: &mut Rng) -> Self {
        let cadence = (config.cadence_min, config.cadence_max.max(config.cadence_min + 1));
        Self {
            explosions_remaining: rng.u32(cadence.0..cadence.1),
            pending: false,
            anchor: (0.0, 0.0),
            phase: Phase::Idle,
            hold_ticks: config.hold_ticks,
            cadence,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn anchor(&self) -> (f32, f32) {
        self.anchor
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn explosions_remaining(&self) -> u32 {
        self.explosions_remaining
    }

    pub fn set_countdown(&mut self, explosions: u32) {
        self.explosions_remaining = explosions;
    }

    /// Makes the next explosion a message explosion.
    pub fn request_message(&mut self) {
        self.pending = true;
    }

    fn redraw_countdown(&mut self, rng: &mut Rng) {
        self.explosions_remaining = rng.u32(self.cadence.0..self.cadence.1);
    }

    /// Counts one explosion. Returns true when this explosion must become
    /// a message; the pending flag is consumed either way.
    pub fn register_explosion(&mut self, rng: &mut Rng) -> bool {
        if !self.pending {
            self.explosions_remaining = self.explosions_remaining.saturating_sub(1);
            if self.explosions_remaining == 0 {
                self.pending = true;
                self.redraw_countdown(rng);
            }
        }
        std::mem::take(&mut self.pending)
    }

    /// Starts a new message around `anchor`, replacing any message still on
    /// screen (which is dispersed first, and its report returned).
    pub fn begin_forming(
        &mut self,
        anchor: (f32, f32),
        targets: Vec<GlyphTarget>,
        particles: &mut Particles,
        frame: &Frame,
        rng: &mut Rng,
    ) -> Option<Dispersal> {
        let forced = if particles.messages.is_empty() {
            None
        } else {
            log::info!("new message requested, dispersing the previous one");
            Some(self.disperse(particles, frame, rng))
        };

        self.anchor = anchor;

        // Pool positions are only needed once live fragments run out.
        let from_pool = targets.len().saturating_sub(particles.fragments.len());
        let mut pooled = particles
            .pool
            .iter()
            .filter(|f| {
                f.age > 0.0
                    && (0.0..=frame.width).contains(&f.x)
                    && (0.0..=frame.height).contains(&f.y)
            })
            .map(|f| (f.x, f.y))
            .take(from_pool)
            .collect::<Vec<_>>()
            .into_iter();

        let mut formed = Vec::with_capacity(targets.len());
        for target in targets {
            let source = if let Some(f) = particles.fragments.pop() {
                let pos = (f.x, f.y);
                particles.pool.release(f);
                pos
            } else if let Some(pos) = pooled.next() {
                pos
            } else {
                (
                    anchor.0 + random_range(rng, -SOURCE_JITTER, SOURCE_JITTER),
                    anchor.1 + random_range(rng, -SOURCE_JITTER, SOURCE_JITTER),
                )
            };
            formed.push(MessageParticle::new(source, (target.x, target.y), target.color, rng));
        }
        rng.shuffle(&mut formed);

        if formed.is_empty() {
            log::warn!("message produced no glyph targets, staying idle");
            self.phase = Phase::Idle;
        } else {
            log::info!(
                "forming message with {} particles at ({:.0}, {:.0})",
                formed.len(),
                anchor.0,
                anchor.1
            );
            self.phase = Phase::Forming;
        }
        particles.messages = formed;

        forced
    }

    /// Runs the per-tick transition checks. Call after every message
    /// particle has been advanced for `frame.tick`.
    pub fn advance(&mut self, particles: &mut Particles, frame: &Frame, rng: &mut Rng) -> Option<Dispersal> {
        if particles.messages.is_empty() {
            return None;
        }

        match self.phase {
            Phase::Forming => {
                if particles.messages.iter().all(MessageParticle::at_target) {
                    log::debug!("message formed at tick {}, holding", frame.tick);
                    self.phase = Phase::Holding { since: frame.tick };
                }
                None
            }
            Phase::Holding { since } if frame.tick.saturating_sub(since) >= self.hold_ticks => {
                Some(self.disperse(particles, frame, rng))
            }
            _ => None,
        }
    }

    /// The massive explosion: a puff at every message particle, a large
    /// burst at the anchor, and scattered puffs around it. Clears the
    /// message and restarts the cadence.
    pub fn disperse(&mut self, particles: &mut Particles, frame: &Frame, rng: &mut Rng) -> Dispersal {
        self.phase = Phase::Dispersing;
        let messages = std::mem::take(&mut particles.messages);
        let mut report = Dispersal::default();

        for p in &messages {
            let burst = Burst::small(rng);
            report.fragments += particles.burst(p.x, p.y, &burst, rng, |r| {
                jitter_color(r, p.color, PUFF_COLOR_SPREAD)
            });
            report.particle_bursts += 1;
        }

        let (ax, ay) = self.anchor;
        let burst = Burst::large(rng);
        report.fragments += particles.burst(ax, ay, &burst, rng, |r| random_color(r, 150.0));
        report.anchor_bursts += 1;

        let (reach_x, reach_y) = (frame.width / 3.0, frame.height / 3.0);
        for _ in 0..SCATTER_BURSTS {
            let x = ax + random_range(rng, -reach_x, reach_x);
            let y = ay + random_range(rng, -reach_y, reach_y);
            let base = random_color(rng, 150.0);
            let burst = Burst::small(rng);
            report.fragments += particles.burst(x, y, &burst, rng, |r| {
                jitter_color(r, base, PUFF_COLOR_SPREAD)
            });
            report.scatter_bursts += 1;
        }

        self.redraw_countdown(rng);
        self.phase = Phase::Idle;
        log::debug!(
            "message dispersed into {} bursts ({} fragments), next in {} explosions",
            report.total_bursts(),
            report.fragments,
            self.explosions_remaining
        );
        report
    }
}
