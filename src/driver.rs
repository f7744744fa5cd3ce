//! Per-frame orchestration.
//!
//! Each frame renders the current snapshot first, then advances the world by
//! one tick, then routes the world's events to the screen, the cue sink and
//! the high score store.

use std::io;

use log::{info, warn};

use crate::highscore;
use crate::platform::{CueSink, KeyValueStore, Screen};
use crate::sim::{GameEvent, World};

pub struct FrameDriver<V: Screen, C: CueSink, S: KeyValueStore> {
    world: World,
    screen: V,
    cues: C,
    store: S,
}

impl<V: Screen, C: CueSink, S: KeyValueStore> FrameDriver<V, C, S> {
    /// Reads the high score once and pushes the initial score readouts.
    pub fn new(seed: u64, mut screen: V, cues: C, store: S) -> Self {
        let high_score = highscore::load(&store);
        screen.show_scores(0, high_score);
        Self {
            world: World::new(seed, high_score),
            screen,
            cues,
            store,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn screen(&self) -> &V {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut V {
        &mut self.screen
    }

    pub fn cues(&self) -> &C {
        &self.cues
    }

    pub fn cues_mut(&mut self) -> &mut C {
        &mut self.cues
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Input handler for every flap trigger.
    pub fn flap(&mut self) {
        self.world.flap();
        self.dispatch();
    }

    pub fn frame(&mut self) -> io::Result<()> {
        self.screen.render(&self.world.snapshot())?;
        self.world.tick();
        self.dispatch();
        Ok(())
    }

    fn dispatch(&mut self) {
        for event in self.world.drain_events() {
            match event {
                GameEvent::Cue(cue) => self.cues.play(cue),
                GameEvent::ScoreChanged { score, high_score } => {
                    self.screen.show_scores(score, high_score)
                }
                GameEvent::NewHighScore(score) => {
                    if let Err(e) = highscore::commit(&mut self.store, score) {
                        warn!("Could not save high score {}: {}", score, e);
                    }
                }
                GameEvent::SummaryRevealed { score, high_score } => {
                    info!("Game over: score {} (best {})", score, high_score);
                }
            }
        }
    }
}
