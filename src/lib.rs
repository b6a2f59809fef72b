//! Audio input sources bound to a fixed sample format.
//!
//! Every source owns an [`audio::AudioFormat`] set when it is built and never
//! changed afterwards, so encoders and packetizers can bind to it once.

pub mod audio;
pub mod cli;
pub mod config;
pub mod global;
