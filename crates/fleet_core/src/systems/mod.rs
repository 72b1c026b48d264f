//! Tick systems: everything the runner executes when the clock advances.

pub mod lifecycle;
pub mod movement;
