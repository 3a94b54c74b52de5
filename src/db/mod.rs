// Re-export the Database struct and other public items
pub mod core;
mod postings;
mod schema;
pub mod settings;

pub use self::core::Database;
