//! Child process launching and control.

mod child;

pub use child::*;
