pub mod connection;
pub mod groups;
pub mod models;
pub mod participants;
pub mod rounds;
pub mod scores;
pub mod setup;

pub use connection::{create_pool, get_connection, DbConn, DbPool};
pub use models::*;
