pub mod config;
pub mod error;
pub mod types;

pub use error::{FclError, FclResult};
pub use types::{IdentityScheme, GENESIS_MARKER, ROOT_MARKER};
