//! Scenario builders, run in order: primary, secondary, overflow.
mod overflow;
mod primary;
mod secondary;

pub use overflow::{OverflowBuilder, OverflowSizing};
pub use primary::PrimaryBuilder;
pub use secondary::SecondaryBuilder;
