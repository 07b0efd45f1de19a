// Re-export all model types for ease of use

pub mod court;
pub mod pagination;
pub mod user;

// Re-export commonly used types
pub use court::*;
pub use pagination::*;
pub use user::*;
