pub mod models;
pub mod round;

pub use models::*;
pub use round::Round;
