//! The world aggregate and its mode machine.

use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::consts::*;
use super::events::{Cue, GameEvent};
use super::obstacle::{Obstacle, ObstacleField};
use super::particles::{Burst, Particle, Particles};
use super::player::{Contact, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for the first flap
    Start,
    Playing,
    /// Run ended; restart is accepted once the debounce window has passed
    GameOver,
}

/// Tunables that change during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub obstacle_speed: f64,
    pub spawn_interval: u64,
    pub gap_height: f64,
    pub ramp_interval: u64,
    /// Ramp steps taken this run.
    pub ramp_steps: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            obstacle_speed: INITIAL_SPEED,
            spawn_interval: SPAWN_INTERVAL,
            gap_height: INITIAL_GAP,
            ramp_interval: RAMP_INTERVAL,
            ramp_steps: 0,
        }
    }
}

impl GameConfig {
    /// Take one difficulty step. Values are derived from the step count so
    /// repeated steps do not accumulate rounding error.
    pub fn ramp(&mut self) {
        self.ramp_steps += 1;
        let n = self.ramp_steps as f64;
        self.obstacle_speed = (INITIAL_SPEED + SPEED_STEP * n).min(MAX_SPEED);
        self.gap_height = (INITIAL_GAP - GAP_STEP * n).max(MIN_GAP);
    }
}

/// Read-only view handed to the renderer each frame.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub mode: Mode,
    pub score: u32,
    pub high_score: u32,
    pub player: &'a Player,
    pub obstacles: &'a [Obstacle],
    pub particles: &'a [Particle],
    pub summary_visible: bool,
    /// Ticks since the process started; for animation only.
    pub frame: u64,
}

pub struct World {
    pub mode: Mode,
    pub player: Player,
    pub obstacles: ObstacleField,
    pub particles: Particles,
    pub config: GameConfig,
    pub score: u32,
    pub high_score: u32,
    /// Ticks spent in `Playing` this run. Drives spawn and ramp cadence.
    run_ticks: u64,
    frame: u64,
    ticks_since_death: u32,
    summary_visible: bool,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl World {
    pub fn new(seed: u64, high_score: u32) -> Self {
        Self {
            mode: Mode::Start,
            player: Player::new(),
            obstacles: ObstacleField::new(),
            particles: Particles::new(),
            config: GameConfig::default(),
            score: 0,
            high_score,
            run_ticks: 0,
            frame: 0,
            ticks_since_death: 0,
            summary_visible: false,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn run_ticks(&self) -> u64 {
        self.run_ticks
    }

    pub fn ticks_since_death(&self) -> u32 {
        self.ticks_since_death
    }

    pub fn summary_visible(&self) -> bool {
        self.summary_visible
    }

    /// Whether a flap in `GameOver` would restart.
    pub fn can_restart(&self) -> bool {
        self.mode == Mode::GameOver
            && self.summary_visible
            && self.ticks_since_death >= REVEAL_DELAY_TICKS + RESTART_DEBOUNCE_TICKS
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            mode: self.mode,
            score: self.score,
            high_score: self.high_score,
            player: &self.player,
            obstacles: self.obstacles.as_slice(),
            particles: self.particles.as_slice(),
            summary_visible: self.summary_visible,
            frame: self.frame,
        }
    }

    /// The single player action.
    pub fn flap(&mut self) {
        match self.mode {
            Mode::Start => {
                info!("run started");
                self.mode = Mode::Playing;
                self.player.flap();
                self.events.push(GameEvent::Cue(Cue::Flap));
            }
            Mode::Playing => {
                self.player.flap();
                self.events.push(GameEvent::Cue(Cue::Flap));
            }
            Mode::GameOver => {
                if self.can_restart() {
                    self.reset();
                } else {
                    debug!("restart ignored, {} ticks since death", self.ticks_since_death);
                }
            }
        }
    }

    /// Return to `Start` with all run state at initial values.
    pub fn reset(&mut self) {
        self.mode = Mode::Start;
        self.score = 0;
        self.run_ticks = 0;
        self.ticks_since_death = 0;
        self.summary_visible = false;
        self.player.reset();
        self.obstacles.clear();
        self.particles.clear();
        self.config = GameConfig::default();
        self.push_scores();
        info!("reset to start screen");
    }

    /// One simulation step.
    pub fn tick(&mut self) {
        self.frame += 1;
        self.particles.update();

        match self.mode {
            Mode::Start => {}
            Mode::Playing => self.tick_playing(),
            Mode::GameOver => self.tick_game_over(),
        }
    }

    fn tick_playing(&mut self) {
        self.run_ticks += 1;

        if self.player.integrate() == Contact::Floor {
            self.trigger_game_over();
            return;
        }

        self.update_obstacles();
        if self.mode != Mode::Playing {
            return;
        }

        if self.run_ticks % self.config.ramp_interval == 0 {
            self.config.ramp();
            debug!(
                "difficulty step {}: speed={:.1} gap={}",
                self.config.ramp_steps, self.config.obstacle_speed, self.config.gap_height
            );
        }
    }

    fn update_obstacles(&mut self) {
        if self.run_ticks % self.config.spawn_interval == 0 {
            self.obstacles.spawn(&mut self.rng, self.config.gap_height);
        }

        self.obstacles.advance(self.config.obstacle_speed);

        for _ in 0..self.obstacles.score_passed(self.player.x) {
            self.score += 1;
            self.particles
                .emit(Burst::Score, self.player.x, self.player.y, &mut self.rng);
            self.events.push(GameEvent::Cue(Cue::Score));
            self.push_scores();
        }

        self.obstacles.prune();

        if self.obstacles.any_hit(&self.player.hitbox()) {
            self.trigger_game_over();
        }
    }

    fn trigger_game_over(&mut self) {
        info!("run over with score {}", self.score);
        self.mode = Mode::GameOver;
        self.ticks_since_death = 0;
        self.summary_visible = false;
        self.events.push(GameEvent::Cue(Cue::Hit));

        let (cx, cy) = self.player.center();
        self.particles.emit(Burst::Collision, cx, cy, &mut self.rng);

        if self.score > self.high_score {
            self.high_score = self.score;
            info!("new high score {}", self.high_score);
            self.events.push(GameEvent::NewHighScore(self.high_score));
            self.push_scores();
        }
    }

    fn tick_game_over(&mut self) {
        self.ticks_since_death = self.ticks_since_death.saturating_add(1);

        if self.ticks_since_death < DEATH_FALL_TICKS {
            self.player.tumble();
        }

        if self.ticks_since_death == REVEAL_DELAY_TICKS {
            self.summary_visible = true;
            self.events.push(GameEvent::Cue(Cue::GameOver));
            self.events.push(GameEvent::SummaryRevealed {
                score: self.score,
                high_score: self.high_score,
            });
        }
    }

    fn push_scores(&mut self) {
        self.events.push(GameEvent::ScoreChanged {
            score: self.score,
            high_score: self.high_score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ObstacleKind;

    fn playing() -> World {
        let mut w = World::new(42, 0);
        w.flap();
        w.drain_events();
        w
    }

    fn die(w: &mut World) {
        w.player.y = FLOOR_Y - w.player.height;
        w.player.velocity = 5.0;
        w.tick();
        assert_eq!(w.mode, Mode::GameOver);
    }

    #[test]
    fn test_start_to_playing() {
        let mut w = World::new(42, 0);
        assert_eq!(w.mode, Mode::Start);
        w.tick();
        assert_eq!(w.player.y, PLAYER_START_Y);
        w.flap();
        assert_eq!(w.mode, Mode::Playing);
        assert_eq!(w.player.velocity, FLAP_VELOCITY);
        assert_eq!(w.drain_events(), vec![GameEvent::Cue(Cue::Flap)]);
    }

    #[test]
    fn test_floor_contact_ends_run() {
        let mut w = playing();
        die(&mut w);
        assert_eq!(w.player.y, FLOOR_Y - w.player.height);
        let events = w.drain_events();
        assert!(events.contains(&GameEvent::Cue(Cue::Hit)));
        assert_eq!(w.particles.len(), Burst::Collision.count());
    }

    #[test]
    fn test_ceiling_is_not_fatal() {
        let mut w = playing();
        w.player.y = 1.0;
        w.tick();
        assert_eq!(w.mode, Mode::Playing);
        assert_eq!(w.player.y, 0.0);
        assert_eq!(w.player.velocity, 0.0);
    }

    #[test]
    fn test_spawn_cadence_is_run_scoped() {
        let mut w = World::new(42, 0);
        for _ in 0..250 {
            w.tick();
        }
        assert!(w.obstacles.is_empty());

        w.flap();
        for i in 1..=SPAWN_INTERVAL {
            w.player.y = 300.0;
            w.player.velocity = 0.0;
            w.tick();
            let expected = if i == SPAWN_INTERVAL { 1 } else { 0 };
            assert_eq!(w.obstacles.len(), expected);
        }
        assert_eq!(w.obstacles.as_slice()[0].x, FIELD_WIDTH - INITIAL_SPEED);
    }

    #[test]
    fn test_obstacle_hit_ends_run() {
        let mut w = playing();
        w.player.y = 300.0;
        w.player.velocity = 0.0;
        // Gap sits well below the player
        w.obstacles
            .push(Obstacle::new(PLAYER_X, 400.0, 150.0, ObstacleKind::Bamboo));
        w.tick();
        assert_eq!(w.mode, Mode::GameOver);
    }

    #[test]
    fn test_scoring_emits_burst_and_events() {
        let mut w = playing();
        w.player.y = 300.0;
        w.player.velocity = 0.0;
        w.obstacles.push(Obstacle::new(
            PLAYER_X - OBSTACLE_WIDTH + 1.0,
            100.0,
            400.0,
            ObstacleKind::Bamboo,
        ));
        w.tick();
        assert_eq!(w.score, 1);
        assert_eq!(w.particles.len(), Burst::Score.count());
        let events = w.drain_events();
        assert!(events.contains(&GameEvent::Cue(Cue::Score)));
        assert!(events.contains(&GameEvent::ScoreChanged {
            score: 1,
            high_score: 0
        }));
        w.tick();
        assert_eq!(w.score, 1);
    }

    #[test]
    fn test_high_score_only_on_record() {
        let mut w = World::new(1, 5);
        w.flap();
        w.score = 5;
        die(&mut w);
        assert_eq!(w.high_score, 5);
        assert!(!w
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::NewHighScore(_))));

        let mut w = World::new(1, 5);
        w.flap();
        w.score = 6;
        die(&mut w);
        assert_eq!(w.high_score, 6);
        assert!(w.drain_events().contains(&GameEvent::NewHighScore(6)));
    }

    #[test]
    fn test_post_death_fall_is_capped() {
        let mut w = playing();
        w.player.y = 0.0;
        w.player.velocity = 0.0;
        w.obstacles
            .push(Obstacle::new(PLAYER_X, 400.0, 150.0, ObstacleKind::Bamboo));
        w.tick();
        assert_eq!(w.mode, Mode::GameOver);

        // Falls and spins on every tick before the cap
        for n in 1..DEATH_FALL_TICKS {
            let (y, rotation) = (w.player.y, w.player.rotation);
            w.tick();
            assert_eq!(w.ticks_since_death(), n);
            assert!(w.player.y > y, "stopped falling at tick {}", n);
            assert!(w.player.rotation > rotation);
        }

        let y = w.player.y;
        let rotation = w.player.rotation;
        for _ in 0..5 {
            w.tick();
        }
        assert_eq!(w.player.y, y);
        assert_eq!(w.player.rotation, rotation);
        assert!(w.player.y <= FLOOR_Y - w.player.height);
        assert_eq!(w.mode, Mode::GameOver);
        assert!(w.obstacles.len() == 1 && w.score == 0);
    }

    #[test]
    fn test_ramp_leaves_existing_gaps() {
        let mut w = playing();
        // Behind every obstacle, so nothing collides or scores
        w.player.x = -2.0 * OBSTACLE_WIDTH;
        let hold = |w: &mut World| {
            w.player.y = 300.0;
            w.player.velocity = 0.0;
            w.tick();
        };

        for _ in 0..RAMP_INTERVAL {
            hold(&mut w);
        }
        assert_eq!(w.mode, Mode::Playing);
        assert_eq!(w.config.gap_height, INITIAL_GAP - GAP_STEP);
        assert!(w
            .obstacles
            .as_slice()
            .iter()
            .all(|o| (o.gap() - INITIAL_GAP).abs() < 1e-9));

        for _ in 0..SPAWN_INTERVAL {
            hold(&mut w);
        }
        let (newest, older) = w.obstacles.as_slice().split_last().unwrap();
        assert!((newest.gap() - (INITIAL_GAP - GAP_STEP)).abs() < 1e-9);
        assert!(!older.is_empty());
        for o in older {
            assert!((o.gap() - INITIAL_GAP).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reveal_and_debounce() {
        let mut w = playing();
        die(&mut w);
        w.drain_events();

        for _ in 1..REVEAL_DELAY_TICKS {
            w.tick();
        }
        assert!(!w.summary_visible());
        w.tick();
        assert!(w.summary_visible());
        let events = w.drain_events();
        assert!(events.contains(&GameEvent::Cue(Cue::GameOver)));

        for _ in 1..RESTART_DEBOUNCE_TICKS {
            w.tick();
        }
        w.flap();
        assert_eq!(w.mode, Mode::GameOver);

        w.tick();
        w.flap();
        assert_eq!(w.mode, Mode::Start);
    }

    #[test]
    fn test_ramp_steps() {
        let mut c = GameConfig::default();
        for n in 1..=40u32 {
            c.ramp();
            let n = n as f64;
            assert_eq!(c.obstacle_speed, (INITIAL_SPEED + SPEED_STEP * n).min(MAX_SPEED));
            assert_eq!(c.gap_height, (INITIAL_GAP - GAP_STEP * n).max(MIN_GAP));
        }
        assert_eq!(c.obstacle_speed, MAX_SPEED);
        assert_eq!(c.gap_height, MIN_GAP);
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut w = playing();
        w.score = 3;
        w.config.ramp();
        w.obstacles
            .push(Obstacle::new(300.0, 200.0, 200.0, ObstacleKind::Torii));
        die(&mut w);
        w.reset();

        assert_eq!(w.mode, Mode::Start);
        assert_eq!(w.score, 0);
        assert_eq!(w.high_score, 3);
        assert!(w.obstacles.is_empty());
        assert!(w.particles.is_empty());
        assert_eq!(w.player, Player::new());
        assert_eq!(w.config, GameConfig::default());
        assert_eq!(w.run_ticks(), 0);
    }
}
