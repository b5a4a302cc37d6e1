pub mod config;
pub mod diff_result;
pub mod error;
pub mod types;

pub use config::*;
pub use diff_result::*;
pub use error::*;
pub use types::*;
