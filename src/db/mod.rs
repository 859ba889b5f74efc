// src/db/mod.rs
//
// Database module
//
// Provides:
// - Store configuration and connection pooling
// - Schema initialization
// - Database utilities

pub mod connection;
pub mod migrations;

pub use connection::{
    create_connection_pool, default_database_path, get_connection, get_database_path,
    ConnectionPool, PooledConn, StoreConfig, StoreLocation,
};

pub use migrations::{
    get_database_stats, initialize_database, verify_database_integrity, DatabaseStats,
};
