pub mod types;

pub use types::{Launch, NewLaunch, Planet, DEFAULT_CUSTOMERS};
