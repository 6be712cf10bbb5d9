pub mod backend;
#[cfg(feature = "gemini")]
pub mod client;
pub mod mock;
pub mod prompts;
#[cfg(feature = "gemini")]
pub mod types;

pub use backend::*;
#[cfg(feature = "gemini")]
pub use client::*;
pub use mock::*;
