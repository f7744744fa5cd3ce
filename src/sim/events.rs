//! Events the world emits for the host to act on.

/// Named sound cues. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Flap,
    Score,
    Hit,
    GameOver,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Flap => "flap",
            Cue::Score => "score",
            Cue::Hit => "hit",
            Cue::GameOver => "gameOver",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Play a sound cue
    Cue(Cue),
    /// Current score or high score changed
    ScoreChanged { score: u32, high_score: u32 },
    /// A run ended above the previous high score; persist it
    NewHighScore(u32),
    /// The game-over summary became visible
    SummaryRevealed { score: u32, high_score: u32 },
}
