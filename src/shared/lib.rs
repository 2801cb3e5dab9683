// Declare modules at the root level
pub mod codec;
pub mod command_log;
pub mod directory;
pub mod domain;
pub mod error;
pub mod store;
pub mod time;

// Test utilities module (available in test and integration test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export everything under a shared namespace for external access
pub mod shared {
    pub use super::codec;
    pub use super::command_log;
    pub use super::directory;
    pub use super::domain;
    pub use super::error;
    pub use super::store;
    pub use super::time;
}

// Also re-export at root for convenience
pub use codec::*;
pub use command_log::*;
pub use directory::*;
pub use domain::*;
pub use error::*;
pub use store::*;
pub use time::*;
