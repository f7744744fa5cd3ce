//! Gated obstacles: spawning, scrolling, scoring, pruning and hit tests.

use log::debug;
use rand::Rng;

use super::consts::*;

/// Visual variant. Both share the same rectangular gap geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Bamboo,
    Torii,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    /// Bottom edge of the top barrier.
    pub top_height: f64,
    /// Top edge of the bottom barrier.
    pub bottom_y: f64,
    pub scored: bool,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn new(x: f64, top_height: f64, gap: f64, kind: ObstacleKind) -> Self {
        Self {
            x,
            top_height,
            bottom_y: top_height + gap,
            scored: false,
            kind,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + OBSTACLE_WIDTH
    }

    pub fn gap(&self) -> f64 {
        self.bottom_y - self.top_height
    }
}

/// Axis-aligned box given by its edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// True if `player` overlaps the obstacle's span and pokes out of its gap.
pub fn hits(player: &Hitbox, obstacle: &Obstacle) -> bool {
    let overlaps = player.right > obstacle.x && player.left < obstacle.right();
    overlaps && (player.top < obstacle.top_height || player.bottom > obstacle.bottom_y)
}

/// The ordered list of live obstacles, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Append a new obstacle at the right edge with a random gap placement.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, gap: f64) {
        let kind = if rng.random_bool(TORII_CHANCE) {
            ObstacleKind::Torii
        } else {
            ObstacleKind::Bamboo
        };
        let max_top = FLOOR_Y - gap - OBSTACLE_MIN_HEIGHT;
        let top = OBSTACLE_MIN_HEIGHT + rng.random::<f64>() * (max_top - OBSTACLE_MIN_HEIGHT);
        debug!("spawn {:?} top={:.1} gap={}", kind, top, gap);
        self.obstacles.push(Obstacle::new(FIELD_WIDTH, top, gap, kind));
    }

    pub fn advance(&mut self, speed: f64) {
        for o in &mut self.obstacles {
            o.x -= speed;
        }
    }

    /// Mark every obstacle whose right edge has passed `player_x`.
    /// Returns how many were newly scored.
    pub fn score_passed(&mut self, player_x: f64) -> u32 {
        let mut newly = 0;
        for o in self.obstacles.iter_mut().filter(|o| !o.scored) {
            if o.right() < player_x {
                o.scored = true;
                newly += 1;
            }
        }
        newly
    }

    /// Drop obstacles that have scrolled fully off the left edge.
    pub fn prune(&mut self) {
        self.obstacles.retain(|o| o.right() >= 0.0);
    }

    pub fn any_hit(&self, player: &Hitbox) -> bool {
        self.obstacles.iter().any(|o| hits(player, o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player_box(top: f64, left: f64) -> Hitbox {
        Hitbox {
            left,
            right: left + 22.0,
            top,
            bottom: top + 22.0,
        }
    }

    #[test]
    fn test_inside_gap_is_safe() {
        let o = Obstacle::new(100.0, 200.0, 200.0, ObstacleKind::Bamboo);
        assert!(!hits(&player_box(250.0, 110.0), &o));
    }

    #[test]
    fn test_above_or_below_gap_hits() {
        let o = Obstacle::new(100.0, 200.0, 200.0, ObstacleKind::Torii);
        assert!(hits(&player_box(190.0, 110.0), &o));
        assert!(hits(&player_box(390.0, 110.0), &o));
    }

    #[test]
    fn test_outside_span_never_hits() {
        let o = Obstacle::new(100.0, 200.0, 200.0, ObstacleKind::Bamboo);
        // Touching edges do not count as overlap
        assert!(!hits(&player_box(0.0, 160.0), &o));
        assert!(!hits(&player_box(0.0, 78.0), &o));
        assert!(!hits(&player_box(600.0, 300.0), &o));
    }

    #[test]
    fn test_spawn_geometry() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut field = ObstacleField::new();
        for _ in 0..200 {
            field.spawn(&mut rng, INITIAL_GAP);
        }
        let max_top = FLOOR_Y - INITIAL_GAP - OBSTACLE_MIN_HEIGHT;
        for o in field.as_slice() {
            assert_eq!(o.x, FIELD_WIDTH);
            assert!(o.top_height >= OBSTACLE_MIN_HEIGHT && o.top_height < max_top);
            assert!((o.gap() - INITIAL_GAP).abs() < 1e-9);
            assert!(!o.scored);
        }
        let torii = field
            .as_slice()
            .iter()
            .filter(|o| o.kind == ObstacleKind::Torii)
            .count();
        assert!(torii > 0 && torii < 100);
    }

    #[test]
    fn test_score_once() {
        let mut field = ObstacleField::new();
        field.push(Obstacle::new(61.0, 200.0, 200.0, ObstacleKind::Bamboo));
        assert_eq!(field.score_passed(PLAYER_X), 0);
        field.advance(3.0);
        assert_eq!(field.score_passed(PLAYER_X), 1);
        field.advance(3.0);
        assert_eq!(field.score_passed(PLAYER_X), 0);
        assert!(field.as_slice()[0].scored);
    }

    #[test]
    fn test_prune_off_screen() {
        let mut field = ObstacleField::new();
        field.push(Obstacle::new(-59.0, 200.0, 200.0, ObstacleKind::Bamboo));
        field.push(Obstacle::new(200.0, 200.0, 200.0, ObstacleKind::Bamboo));
        field.prune();
        assert_eq!(field.len(), 2);
        field.advance(2.0);
        field.prune();
        assert_eq!(field.len(), 1);
        assert_eq!(field.as_slice()[0].x, 198.0);
    }
}
