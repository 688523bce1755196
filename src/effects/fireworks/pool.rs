use super::fragment::FragmentParticle;

/// Free list of dead fragments.
pub struct ParticlePool {
    free: Vec<FragmentParticle>,
}

impl ParticlePool {
    pub fn with_capacity(prefill: usize) -> Self {
        Self {
            free: (0..prefill).map(|_| FragmentParticle::new()).collect(),
        }
    }

    /// Pops a pooled fragment, or allocates one when the pool is dry.
    pub fn acquire(&mut self) -> FragmentParticle {
        self.free.pop().unwrap_or_default()
    }

    /// Pooled fragments, most recently released first.
    pub fn iter(&self) -> impl Iterator<Item = &FragmentParticle> {
        self.free.iter().rev()
    }

    pub fn release(&mut self, mut particle: FragmentParticle) {
        particle.dead = true;
        self.free.push(particle);
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefilled_pool_hands_out_then_allocates() {
        let mut pool = ParticlePool::with_capacity(2);
        assert_eq!(pool.len(), 2);
        let _a = pool.acquire();
        let _b = pool.acquire();
        assert!(pool.is_empty());
        let c = pool.acquire();
        assert!(c.dead);
        assert_eq!(pool.iter().count(), 0);
    }

    #[test]
    fn released_fragments_are_reused_last_in_first_out() {
        let mut pool = ParticlePool::with_capacity(0);
        let mut f = FragmentParticle::new();
        f.dead = false;
        f.x = 42.0;
        pool.release(f);
        pool.release(FragmentParticle::new());
        assert_eq!(pool.iter().next().map(|f| f.x), Some(0.0));
        let _newest = pool.acquire();
        assert_eq!(pool.len(), 1);
        let back = pool.acquire();
        assert_eq!(back.x, 42.0);
        assert!(back.dead);
    }
}
