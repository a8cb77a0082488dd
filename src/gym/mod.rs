pub mod pitch;

pub use pitch::{Move, Pitch, PitchState};
