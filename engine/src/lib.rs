pub mod grid;
pub mod rng;

pub use grid::{Grid, Vec2i};
pub use rng::Rng;

/// Linear state history with a cursor. Recording while rewound drops the
/// redo branch; an optional capacity evicts the oldest frames.
#[derive(Debug, Clone)]
pub struct TimeMachine<State> {
    states: Vec<State>,
    frame: usize,
    capacity: Option<usize>,
}

impl<State> TimeMachine<State> {
    pub fn new(initial_state: State) -> Self {
        Self {
            states: vec![initial_state],
            frame: 0,
            capacity: None,
        }
    }

    pub fn with_capacity(initial_state: State, capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::new(initial_state)
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self) -> &State {
        &self.states[self.frame]
    }

    pub fn history(&self) -> &[State] {
        &self.states
    }

    pub fn can_rewind(&self) -> bool {
        self.frame > 0
    }

    pub fn can_forward(&self) -> bool {
        self.frame + 1 < self.states.len()
    }

    pub fn rewind(&mut self, frames: usize) -> usize {
        self.frame = self.frame.saturating_sub(frames);
        self.frame
    }

    pub fn forward(&mut self, frames: usize) -> usize {
        let max_frame = self.states.len().saturating_sub(1);
        self.frame = (self.frame + frames).min(max_frame);
        self.frame
    }

    pub fn record(&mut self, state: State) -> usize {
        self.states.truncate(self.frame + 1);
        self.states.push(state);
        if let Some(cap) = self.capacity {
            let overflow = self.states.len().saturating_sub(cap);
            if overflow > 0 {
                self.states.drain(..overflow);
            }
        }
        self.frame = self.states.len() - 1;
        self.frame
    }
}

/// Pure transition function: the runner owns history, the game owns rules.
pub trait GameLogic {
    type State;
    type Input;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State;
}

/// Shape shared by every board game: inputs and fixed-interval ticks mutate
/// a small grid until a terminal condition holds.
pub trait GridGame {
    type Input;
    type Snapshot;

    /// Returns `false` when the input was rejected and nothing changed.
    fn apply_input(&mut self, input: Self::Input) -> bool;

    /// One fixed-interval step. Turn-based games leave this a no-op.
    fn tick(&mut self) {}

    fn is_over(&self) -> bool;

    fn snapshot(&self) -> Self::Snapshot;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<I> {
    Input(I),
    Tick,
}

/// Lifts any clonable [`GridGame`] into a [`GameLogic`] so it can run under
/// a [`HeadlessRunner`].
#[derive(Debug, Clone)]
pub struct GridLogic<G> {
    initial: G,
}

impl<G> GridLogic<G> {
    pub fn new(initial: G) -> Self {
        Self { initial }
    }
}

impl<G> GameLogic for GridLogic<G>
where
    G: GridGame + Clone,
{
    type State = G;
    type Input = Step<G::Input>;

    fn initial_state(&self) -> Self::State {
        self.initial.clone()
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        match input {
            Step::Input(input) => {
                next.apply_input(input);
            }
            Step::Tick => next.tick(),
        }
        next
    }
}

#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    timemachine: TimeMachine<G::State>,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let initial_state = game.initial_state();
        Self {
            game,
            timemachine: TimeMachine::new(initial_state),
        }
    }

    pub fn with_history_limit(game: G, limit: usize) -> Self {
        let initial_state = game.initial_state();
        Self {
            game,
            timemachine: TimeMachine::with_capacity(initial_state, limit),
        }
    }

    pub fn frame(&self) -> usize {
        self.timemachine.frame()
    }

    pub fn state(&self) -> &G::State {
        self.timemachine.state()
    }

    pub fn history(&self) -> &[G::State] {
        self.timemachine.history()
    }

    pub fn timemachine(&self) -> &TimeMachine<G::State> {
        &self.timemachine
    }

    pub fn step(&mut self, input: G::Input) -> usize {
        let next_state = self.game.step(self.timemachine.state(), input);
        self.timemachine.record(next_state)
    }

    pub fn run<I>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = G::Input>,
    {
        let mut last_frame = self.frame();
        for input in inputs {
            last_frame = self.step(input);
        }
        last_frame
    }

    pub fn rewind(&mut self, frames: usize) -> usize {
        self.timemachine.rewind(frames)
    }

    pub fn forward(&mut self, frames: usize) -> usize {
        self.timemachine.forward(frames)
    }

    pub fn reset(&mut self) {
        self.timemachine = TimeMachine::new(self.game.initial_state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timemachine_rewind_and_branch() {
        let mut tm = TimeMachine::new(0);
        tm.record(1);
        tm.record(2);
        assert_eq!(tm.state(), &2);

        tm.rewind(1);
        assert_eq!(tm.state(), &1);

        tm.record(99);
        assert_eq!(tm.history(), &[0, 1, 99]);
        assert_eq!(tm.frame(), 2);
    }

    #[test]
    fn capacity_evicts_oldest_frames() {
        let mut tm = TimeMachine::with_capacity(0, 3);
        for n in 1..=5 {
            tm.record(n);
        }
        assert_eq!(tm.history(), &[3, 4, 5]);
        assert_eq!(tm.frame(), 2);
        assert_eq!(tm.state(), &5);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: i32,
        ticks: u32,
    }

    impl GridGame for Counter {
        type Input = i32;
        type Snapshot = i32;

        fn apply_input(&mut self, input: i32) -> bool {
            if input == 0 {
                return false;
            }
            self.value += input;
            true
        }

        fn tick(&mut self) {
            self.ticks += 1;
        }

        fn is_over(&self) -> bool {
            self.value >= 10
        }

        fn snapshot(&self) -> i32 {
            self.value
        }
    }

    #[test]
    fn grid_logic_routes_inputs_and_ticks() {
        let mut runner = HeadlessRunner::new(GridLogic::new(Counter { value: 0, ticks: 0 }));
        runner.run([Step::Input(4), Step::Tick, Step::Input(0), Step::Input(6)]);

        assert_eq!(runner.frame(), 4);
        assert_eq!(runner.state().snapshot(), 10);
        assert_eq!(runner.state().ticks, 1);
        assert!(runner.state().is_over());

        runner.rewind(1);
        assert_eq!(runner.state().snapshot(), 4);

        runner.reset();
        assert_eq!(runner.frame(), 0);
        assert_eq!(runner.state().value, 0);
    }
}
