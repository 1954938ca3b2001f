pub mod guard;
pub mod identity;

pub use guard::{Decision, Guard, protect, require};
