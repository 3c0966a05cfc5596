//! Playback Engine
//!
//! Replays register logs on a [`Ym3812`](crate::Ym3812) with sample-exact
//! timing:
//! - [`SampleClock`]: log ticks to output samples without drift
//! - [`TimerScheduler`]: host side of the chip's timers
//! - [`LogPlayer`]: drives the chip from a [`RegisterLog`](crate::RegisterLog)

pub mod log_player;
pub mod sample_clock;
pub mod scheduler;

pub use log_player::LogPlayer;
pub use sample_clock::SampleClock;
pub use scheduler::TimerScheduler;
