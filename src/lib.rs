pub mod config;
pub mod frontend;
pub mod ic3;
pub mod logic;
pub mod sat;
pub mod transys;

pub use config::{Config, Reuse};
pub use ic3::IC3;

use logic::Cube;

/// Verdict of a model-checking run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum McResult {
    Safe,
    Unsafe,
}

/// A counterexample trace, initial state first. `inputs[i]` drives the
/// transition out of `states[i]`; the last one steps into the bad states.
#[derive(Clone, Debug, Default)]
pub struct Witness {
    pub states: Vec<Cube>,
    pub inputs: Vec<Cube>,
}
