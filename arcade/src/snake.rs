use std::collections::VecDeque;
use std::time::Duration;

use engine::{GridGame, Rng, Vec2i};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BOARD_WIDTH: i32 = 20;
pub const BOARD_HEIGHT: i32 = 20;
pub const START: Vec2i = Vec2i::new(10, 10);
pub const FOOD_POINTS: u32 = 10;

const START_INTERVAL_MS: u64 = 200;
const MIN_INTERVAL_MS: u64 = 50;
const SPEEDUP_MS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> Vec2i {
        match self {
            Direction::Up => Vec2i::UP,
            Direction::Down => Vec2i::DOWN,
            Direction::Left => Vec2i::LEFT,
            Direction::Right => Vec2i::RIGHT,
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakeInput {
    Turn(Direction),
    TogglePause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Moved,
    Ate,
    Crashed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeSnapshot {
    pub body: Vec<Vec2i>,
    pub food: Option<Vec2i>,
    pub direction: Direction,
    pub score: u32,
    #[serde(with = "crate::serde_duration")]
    pub interval: Duration,
    pub paused: bool,
    pub game_over: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    body: VecDeque<Vec2i>,
    direction: Direction,
    food: Option<Vec2i>,
    rng: Rng,
    score: u32,
    #[serde(with = "crate::serde_duration")]
    interval: Duration,
    paused: bool,
    game_over: bool,
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        let mut snake = Self {
            body: VecDeque::from([START]),
            direction: Direction::Right,
            food: None,
            rng: Rng::new(seed),
            score: 0,
            interval: Duration::from_millis(START_INTERVAL_MS),
            paused: false,
            game_over: false,
        };
        snake.place_food();
        snake
    }

    pub fn head(&self) -> Vec2i {
        self.body.front().copied().unwrap_or(START)
    }

    pub fn body(&self) -> impl Iterator<Item = Vec2i> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Option<Vec2i> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn set_food_for_test(&mut self, food: Vec2i) {
        self.food = Some(food);
    }

    pub fn set_body_for_test(&mut self, body: &[Vec2i], direction: Direction) {
        self.body = body.iter().copied().collect();
        self.direction = direction;
    }

    /// Reversing onto the neck is rejected and leaves the heading unchanged.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if self.paused || self.game_over || direction == self.direction.reverse() {
            return false;
        }
        self.direction = direction;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.paused = !self.paused;
        true
    }

    pub fn advance(&mut self) -> TickOutcome {
        if self.paused || self.game_over {
            return TickOutcome::Idle;
        }

        let head = self.head() + self.direction.offset();
        let out_of_bounds =
            head.x < 0 || head.x >= BOARD_WIDTH || head.y < 0 || head.y >= BOARD_HEIGHT;
        if out_of_bounds || self.body.contains(&head) {
            debug!(score = self.score, len = self.body.len(), "snake crashed");
            self.game_over = true;
            return TickOutcome::Crashed;
        }

        self.body.push_front(head);
        if self.food == Some(head) {
            self.score += FOOD_POINTS;
            let faster = self.interval.as_millis() as u64;
            self.interval =
                Duration::from_millis(faster.saturating_sub(SPEEDUP_MS).max(MIN_INTERVAL_MS));
            self.place_food();
            return TickOutcome::Ate;
        }

        self.body.pop_back();
        TickOutcome::Moved
    }

    fn place_food(&mut self) {
        let free: Vec<Vec2i> = (0..BOARD_HEIGHT)
            .flat_map(|y| (0..BOARD_WIDTH).map(move |x| Vec2i::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        self.food = self.rng.pick(&free).copied();
        if self.food.is_none() {
            debug!(score = self.score, "board full, no room for food");
            self.game_over = true;
        }
    }
}

impl GridGame for Snake {
    type Input = SnakeInput;
    type Snapshot = SnakeSnapshot;

    fn apply_input(&mut self, input: SnakeInput) -> bool {
        match input {
            SnakeInput::Turn(direction) => self.turn(direction),
            SnakeInput::TogglePause => self.toggle_pause(),
        }
    }

    fn tick(&mut self) {
        self.advance();
    }

    fn is_over(&self) -> bool {
        self.game_over
    }

    fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            body: self.body.iter().copied().collect(),
            food: self.food,
            direction: self.direction,
            score: self.score,
            interval: self.interval,
            paused: self.paused,
            game_over: self.game_over,
        }
    }
}
