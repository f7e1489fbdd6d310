pub mod limiter;
pub mod notifier;
pub mod utils;
pub mod web;
