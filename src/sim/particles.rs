//! Decorative particle bursts. Nothing here feeds back into gameplay.

use rand::Rng;

use super::consts::PARTICLE_GRAVITY;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    /// Remaining life as a 0..=1 ratio, used for alpha.
    pub fn fade(&self) -> f64 {
        if self.max_life == 0 {
            return 0.0;
        }
        self.life as f64 / self.max_life as f64
    }
}

/// Burst shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burst {
    Score,
    Collision,
}

struct BurstShape {
    count: usize,
    /// Velocity components are drawn from `±spread / 2`
    spread: f64,
    lift: f64,
    min_size: f64,
    size_range: f64,
    life: u32,
}

impl Burst {
    fn shape(self) -> BurstShape {
        match self {
            Burst::Score => BurstShape {
                count: 8,
                spread: 4.0,
                lift: -2.0,
                min_size: 2.0,
                size_range: 3.0,
                life: 30,
            },
            Burst::Collision => BurstShape {
                count: 20,
                spread: 8.0,
                lift: 0.0,
                min_size: 2.0,
                size_range: 4.0,
                life: 40,
            },
        }
    }

    pub fn count(self) -> usize {
        self.shape().count
    }

    pub fn life(self) -> u32 {
        self.shape().life
    }
}

#[derive(Debug, Clone, Default)]
pub struct Particles {
    live: Vec<Particle>,
}

impl Particles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }

    pub fn emit<R: Rng>(&mut self, burst: Burst, x: f64, y: f64, rng: &mut R) {
        let shape = burst.shape();
        self.live.reserve(shape.count);
        for _ in 0..shape.count {
            self.live.push(Particle {
                x,
                y,
                vx: (rng.random::<f64>() - 0.5) * shape.spread,
                vy: (rng.random::<f64>() - 0.5) * shape.spread + shape.lift,
                size: rng.random::<f64>() * shape.size_range + shape.min_size,
                life: shape.life,
                max_life: shape.life,
            });
        }
    }

    pub fn update(&mut self) {
        for p in &mut self.live {
            p.life = p.life.saturating_sub(1);
            p.x += p.vx;
            p.y += p.vy;
            p.vy += PARTICLE_GRAVITY;
        }
        self.live.retain(|p| p.life > 0);
    }
}
