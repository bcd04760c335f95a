//! The playback engine: sequencing decisions, the manual queue and the
//! controller state machine over a swappable media output.

mod controller;
mod error;
mod output;
mod queue;
mod sequencer;
mod types;

pub use controller::Player;
pub use error::PlayerError;
pub use output::{MediaOutput, RodioOutput};
pub use queue::PlayQueue;
pub use sequencer::{Decision, decide_next, decide_previous};
pub use types::{PlaybackState, RepeatMode};

#[cfg(test)]
mod tests;
