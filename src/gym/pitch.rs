use serde::{Deserialize, Serialize};
use strum::{EnumIter, VariantArray};

use crate::{
    env::{Environment, Step},
    State,
};

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 600.0;

const PLAYER_SIZE: f32 = 50.0;
const PLAYER_SPEED: f32 = 5.0;
const BALL_RADIUS: f32 = 20.0;
const KICK_STRENGTH: f32 = 5.0;
const FRICTION: f32 = 0.98;

const PLAYER_START: [f32; 2] = [WIDTH / 2.0, HEIGHT / 2.0];
const BALL_START: [f32; 2] = [WIDTH / 4.0, HEIGHT / 4.0];

/// Goal mouth on the right edge: x, y, width, height
const GOAL: [f32; 4] = [WIDTH - 10.0, HEIGHT / 2.0 - 50.0, 10.0, 100.0];

/// Features: player x/y, ball x/y, ball velocity x/y
pub type PitchState = State<6>;

#[derive(
    EnumIter, VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    fn delta(self) -> (f32, f32) {
        match self {
            Move::Up => (0.0, -PLAYER_SPEED),
            Move::Down => (0.0, PLAYER_SPEED),
            Move::Left => (-PLAYER_SPEED, 0.0),
            Move::Right => (PLAYER_SPEED, 0.0),
        }
    }
}

/// A square player, anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
struct Player {
    x: f32,
    y: f32,
}

impl Player {
    fn step(&mut self, action: Move) {
        let (dx, dy) = action.delta();
        self.x = (self.x + dx).clamp(0.0, WIDTH - PLAYER_SIZE);
        self.y = (self.y + dy).clamp(0.0, HEIGHT - PLAYER_SIZE);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ball {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    moving: bool,
}

impl Ball {
    fn at([x, y]: [f32; 2]) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            moving: false,
        }
    }

    /// Kick the ball away from the player's corner if they touch
    fn collide(&mut self, player: &Player) {
        let dx = self.x - player.x;
        let dy = self.y - player.y;
        let distance = dx.hypot(dy);
        if distance > BALL_RADIUS + PLAYER_SIZE {
            return;
        }

        let angle = dy.atan2(dx);
        let (sin, cos) = angle.sin_cos();
        self.vx = KICK_STRENGTH * cos;
        self.vy = KICK_STRENGTH * sin;
        let overlap = BALL_RADIUS + PLAYER_SIZE - distance;
        self.x += overlap * cos;
        self.y += overlap * sin;
        self.moving = true;
    }

    fn roll(&mut self) {
        if !self.moving {
            return;
        }
        self.x += self.vx;
        self.y += self.vy;
        self.vx *= FRICTION;
        self.vy *= FRICTION;

        if self.x - BALL_RADIUS < 0.0 {
            self.x = BALL_RADIUS;
            self.vx = -self.vx;
        } else if self.x + BALL_RADIUS > WIDTH {
            self.x = WIDTH - BALL_RADIUS;
            self.vx = -self.vx;
        }
        if self.y - BALL_RADIUS < 0.0 {
            self.y = BALL_RADIUS;
            self.vy = -self.vy;
        } else if self.y + BALL_RADIUS > HEIGHT {
            self.y = HEIGHT - BALL_RADIUS;
            self.vy = -self.vy;
        }
    }

    fn in_goal(&self) -> bool {
        let [gx, gy, gw, gh] = GOAL;
        self.x + BALL_RADIUS >= gx
            && self.x - BALL_RADIUS <= gx + gw
            && self.y + BALL_RADIUS >= gy
            && self.y - BALL_RADIUS <= gy + gh
    }
}

/// A headless pitch with one player, one ball and a goal on the right edge
///
/// Each step moves the player, resolves a kick, rolls the ball with friction and
/// checks the goal. Scoring yields a reward of 1 and ends the episode; every other
/// step yields 0. Nothing is drawn and no input is read.
///
/// Intended for use with a [QTableAgent](crate::algo::QTableAgent)
#[derive(Debug, Clone)]
pub struct Pitch {
    player: Player,
    ball: Ball,
    score: u32,
}

impl Pitch {
    pub fn new() -> Self {
        Self::with_positions(PLAYER_START, BALL_START)
    }

    /// Start from custom positions, given as `[x, y]`; [`reset`](Environment::reset)
    /// still returns to the standard kickoff
    pub fn with_positions([px, py]: [f32; 2], ball: [f32; 2]) -> Self {
        Self {
            player: Player { x: px, y: py },
            ball: Ball::at(ball),
            score: 0,
        }
    }

    /// Goals scored since the last reset
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The actions a player can take
    pub fn actions() -> Vec<Move> {
        Move::VARIANTS.to_vec()
    }
}

impl Default for Pitch {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Pitch {
    type State = PitchState;
    type Action = Move;

    fn observe(&self) -> Self::State {
        let Self { player, ball, .. } = self;
        State::new([player.x, player.y, ball.x, ball.y, ball.vx, ball.vy])
    }

    fn step(&mut self, action: Self::Action) -> Step<Self::State> {
        self.player.step(action);
        self.ball.collide(&self.player);
        self.ball.roll();

        let goal = self.ball.in_goal();
        if goal {
            self.score += 1;
            self.ball = Ball::at(BALL_START);
        }

        Step {
            state: self.observe(),
            reward: if goal { 1.0 } else { 0.0 },
            done: goal,
        }
    }

    fn reset(&mut self) -> Self::State {
        let [x, y] = PLAYER_START;
        self.player = Player { x, y };
        self.ball = Ball::at(BALL_START);
        self.score = 0;
        self.observe()
    }
}
