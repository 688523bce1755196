use super::fragment::FragmentParticle;
use super::message::MessageParticle;
use super::pool::ParticlePool;
use super::random_range;
use crate::canvas::Rgb;
use fastrand::Rng;
use std::f32::consts::TAU;

/// Fragments in the message-triggering burst.
pub const MESSAGE_BURST_COUNT: usize = 3000;
/// Fixed life of message-burst fragments.
pub const MESSAGE_BURST_LIFE: f32 = 240.0;

/// Shape of one radial burst of fragments.
#[derive(Clone, Copy, Debug)]
pub struct Burst {
    pub count: usize,
    pub speed: (f32, f32),
    pub life: (f32, f32),
    pub size: Option<(f32, f32)>,
    pub squash: f32, // vertical velocity factor
}

impl Burst {
    /// A regular rocket explosion.
    pub fn ordinary(rng: &mut Rng) -> Self {
        Self {
            count: rng.usize(80..280),
            speed: (1.8, 6.5),
            life: (40.0, 110.0),
            size: None,
            squash: 0.9,
        }
    }

    /// The dense, slow burst that precedes a message.
    pub fn message() -> Self {
        Self {
            count: MESSAGE_BURST_COUNT,
            speed: (0.6, 3.6),
            life: (MESSAGE_BURST_LIFE, MESSAGE_BURST_LIFE),
            size: None,
            squash: 0.9,
        }
    }

    /// Puff left behind by each dispersing message particle.
    pub fn small(rng: &mut Rng) -> Self {
        Self {
            count: rng.usize(5..10),
            speed: (2.0, 6.0),
            life: (60.0, 100.0),
            size: Some((2.0, 3.0)),
            squash: 1.0,
        }
    }

    /// Centerpiece of the dispersal.
    pub fn large(rng: &mut Rng) -> Self {
        Self {
            count: rng.usize(50..100),
            speed: (3.0, 10.0),
            life: (80.0, 150.0),
            size: Some((3.0, 5.0)),
            squash: 1.0,
        }
    }
}

/// Every particle collection the scene owns.
///
/// A particle lives in exactly one of these at a time; moving it means
/// moving the value.
pub struct Particles {
    pub fragments: Vec<FragmentParticle>,
    pub pool: ParticlePool,
    pub messages: Vec<MessageParticle>,
}

impl Particles {
    pub fn new(prefill: usize) -> Self {
        Self {
            fragments: Vec::new(),
            pool: ParticlePool::with_capacity(prefill),
            messages: Vec::new(),
        }
    }

    /// Spawns `burst.count` fragments at (x, y); returns how many.
    pub fn burst(
        &mut self,
        x: f32,
        y: f32,
        burst: &Burst,
        rng: &mut Rng,
        mut color: impl FnMut(&mut Rng) -> Rgb,
    ) -> usize {
        self.fragments.reserve(burst.count);
        for _ in 0..burst.count {
            let mut f = self.pool.acquire();
            let angle = rng.f32() * TAU;
            let power = random_range(rng, burst.speed.0, burst.speed.1);
            let c = color(rng);
            f.reset(x, y, angle.cos() * power, angle.sin() * power * burst.squash, c, rng);
            f.life = random_range(rng, burst.life.0, burst.life.1);
            if let Some((lo, hi)) = burst.size {
                f.size = random_range(rng, lo, hi);
            }
            self.fragments.push(f);
        }
        burst.count
    }

    /// Moves dead fragments back to the pool; returns how many.
    pub fn sweep_dead(&mut self) -> usize {
        let mut swept = 0;
        let mut i = 0;
        while i < self.fragments.len() {
            if self.fragments[i].dead {
                let f = self.fragments.swap_remove(i);
                self.pool.release(f);
                swept += 1;
            } else {
                i += 1;
            }
        }
        swept
    }
}

/// Random color with every channel in `[lo, 255)`.
pub fn random_color(rng: &mut Rng, lo: f32) -> Rgb {
    (
        random_range(rng, lo, 255.0) as u8,
        random_range(rng, lo, 255.0) as u8,
        random_range(rng, lo, 255.0) as u8,
    )
}

/// `base` with each channel nudged by up to ±`spread`, clamped.
pub fn jitter_color(rng: &mut Rng, base: Rgb, spread: f32) -> Rgb {
    let mut nudge = |c: u8| (c as f32 + random_range(rng, -spread, spread)).clamp(0.0, 255.0) as u8;
    (nudge(base.0), nudge(base.1), nudge(base.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_draws_from_pool_first() {
        let mut rng = Rng::with_seed(2);
        let mut particles = Particles::new(10);
        let burst = Burst { count: 25, ..Burst::message() };
        let n = particles.burst(50.0, 60.0, &burst, &mut rng, |r| random_color(r, 120.0));
        assert_eq!(n, 25);
        assert_eq!(particles.fragments.len(), 25);
        assert!(particles.pool.is_empty());
        assert!(particles.fragments.iter().all(|f| !f.dead && f.x == 50.0 && f.y == 60.0));
    }

    #[test]
    fn message_burst_life_is_fixed() {
        let mut rng = Rng::with_seed(4);
        let mut particles = Particles::new(0);
        particles.burst(0.0, 0.0, &Burst::message(), &mut rng, |r| random_color(r, 120.0));
        assert_eq!(particles.fragments.len(), MESSAGE_BURST_COUNT);
        assert!(particles.fragments.iter().all(|f| f.life == MESSAGE_BURST_LIFE));
    }

    #[test]
    fn burst_speeds_and_sizes_stay_in_range() {
        let mut rng = Rng::with_seed(8);
        let mut particles = Particles::new(0);
        let burst = Burst { count: 500, ..Burst::small(&mut rng) };
        particles.burst(0.0, 0.0, &burst, &mut rng, |_| (10, 20, 30));
        for f in &particles.fragments {
            let speed = (f.vx * f.vx + f.vy * f.vy).sqrt();
            assert!(speed >= 2.0 - 1e-3 && speed <= 6.0 + 1e-3);
            assert!((2.0..3.0).contains(&f.size));
            assert!((60.0..100.0).contains(&f.life));
        }
    }

    #[test]
    fn sweep_returns_dead_to_pool() {
        let mut rng = Rng::with_seed(6);
        let mut particles = Particles::new(0);
        let burst = Burst { count: 6, ..Burst::message() };
        particles.burst(0.0, 0.0, &burst, &mut rng, |_| (1, 2, 3));
        particles.fragments[0].dead = true;
        particles.fragments[3].dead = true;
        particles.fragments[5].dead = true;
        assert_eq!(particles.sweep_dead(), 3);
        assert_eq!(particles.fragments.len(), 3);
        assert_eq!(particles.pool.len(), 3);
        assert!(particles.fragments.iter().all(|f| !f.dead));
    }

    #[test]
    fn ordinary_and_dispersal_counts() {
        let mut rng = Rng::with_seed(12);
        for _ in 0..100 {
            assert!((80..280).contains(&Burst::ordinary(&mut rng).count));
            assert!((5..10).contains(&Burst::small(&mut rng).count));
            assert!((50..100).contains(&Burst::large(&mut rng).count));
        }
    }

    #[test]
    fn jittered_colors_clamp() {
        let mut rng = Rng::with_seed(13);
        for _ in 0..100 {
            let (r, g, b) = jitter_color(&mut rng, (250, 5, 128), 30.0);
            assert!(r >= 220);
            assert!(g <= 35);
            assert!((98..=158).contains(&b));
        }
    }
}
