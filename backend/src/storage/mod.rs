//! # Storage Module
//!
//! Handles persistence of everything the engine reads: activities, config
//! snapshots, logs, vacation days, goals and the engine configuration.
//!
//! ## Key Responsibilities
//!
//! - **Storage Abstraction**: async traits the services depend on
//! - **File Storage**: CSV and YAML files under one data directory
//! - **Write Discipline**: writes are serialized per connection and land
//!   atomically (temp file + rename), so readers never see a half-written file
//! - **Invariants at the write boundary**: one log per activity and day,
//!   non-overlapping snapshot ranges
//!
//! ## Design Principles
//!
//! - **Repository Pattern**: clean separation between domain and data access
//! - **Dependency Inversion**: services are generic over `Connection`

pub mod traits;
pub mod csv;

pub use traits::*;
pub use self::csv::CsvConnection;
