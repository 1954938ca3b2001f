pub mod concurrency;

pub use concurrency::{fan_in, worker_pool};
