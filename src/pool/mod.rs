//! # Pool de Workers
//! src/pool/mod.rs

pub mod dispatcher;

pub use dispatcher::{current_interrupt, interruptible_sleep, Job, WorkDispatcher};
