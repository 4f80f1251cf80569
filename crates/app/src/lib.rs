//! PawFortune engine.
//!
//! Everything between the terminal and the outside world:
//!
//! - [`config`] - environment configuration
//! - [`storage`] - size-bounded key-value store and its backends
//! - [`persistence`] - daily quota, profile and collection bookkeeping
//! - [`machine`] - the pure interaction state machine
//! - [`controller`] - runs state-machine effects
//! - [`gemini`] - fortune text and image generation
//! - [`card`] - PNG card export

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod card;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod machine;
pub mod persistence;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Controller, DEFAULT_SHAKE_DELAY, Report};
pub use error::AppError;
pub use generator::{FortuneGenerator, GenerationError};
pub use machine::{AppState, Effect, Event, Session, Transition, View};
pub use persistence::{Persistence, SaveOutcome};
