// Database service module
// SQLite storage for collection records and their attributes

mod connection;
mod migrations;
mod schema;

pub use connection::Database;
