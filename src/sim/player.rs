//! Player kinematics and the vertical integrator.

use super::consts::*;
use super::obstacle::Hitbox;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    /// Display angle in radians, derived from velocity each tick.
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
}

/// Outcome of one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    Floor,
    Ceiling,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            x: PLAYER_X,
            y: PLAYER_START_Y,
            velocity: 0.0,
            rotation: 0.0,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Overrides the current velocity with the flap impulse.
    pub fn flap(&mut self) {
        self.velocity = FLAP_VELOCITY;
    }

    /// Advance one tick: gravity, position, tilt, then floor/ceiling clamps.
    ///
    /// Floor contact is reported but not acted on; the caller decides whether
    /// it ends the run.
    pub fn integrate(&mut self) -> Contact {
        self.velocity = (self.velocity + GRAVITY).min(MAX_FALL_SPEED);
        self.y += self.velocity;
        self.rotation = (self.velocity * ROTATION_SCALE).clamp(MIN_TILT, MAX_TILT);

        let mut contact = Contact::None;
        if self.y + self.height > FLOOR_Y {
            self.y = FLOOR_Y - self.height;
            contact = Contact::Floor;
        }
        if self.y < 0.0 {
            self.y = 0.0;
            self.velocity = 0.0;
            contact = Contact::Ceiling;
        }
        contact
    }

    /// Integrate, then tumble instead of tilting. Used for the post-death fall.
    pub fn tumble(&mut self) {
        let spin = self.rotation + DEATH_SPIN;
        self.integrate();
        self.rotation = spin;
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Collision box, inset by `HITBOX_PADDING` on every side.
    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            left: self.x + HITBOX_PADDING,
            right: self.x + self.width - HITBOX_PADDING,
            top: self.y + HITBOX_PADDING,
            bottom: self.y + self.height - HITBOX_PADDING,
        }
    }
}
