//! Core domain layer for the Tracker API.
//!
//! This crate contains the domain models, port traits (interfaces), and the
//! connection pagination engine. It follows hexagonal architecture
//! principles - this is the innermost layer with no dependencies on
//! infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      tracker (binary)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │        tracker-graphql         │       tracker-storage      │
//! │     (API, localization)        │  (PostgreSQL, in-memory)   │
//! ├────────────────────────────────┴────────────────────────────┤
//! │                    tracker-core  ← YOU ARE HERE             │
//! │           (models, ports, pagination services)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (Organization, GuidanceTag, scans)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Cursor codec, argument validator, connection loader
//! - [`error`] - Pagination and source error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Record sources
//!
//! Each entity type is read through a [`ports::RecordSource`], which offers
//! a keyset window fetch and a total count over one filter context. The
//! [`ports::RecordSources`] factory hands out a source per entity and
//! parent.
//!
//! ## Connection loading
//!
//! [`services::ConnectionLoader`] validates Relay arguments, drives the
//! source and assembles a [`ports::Connection`]:
//!
//! 1. Reject bad `first`/`last`/`after`/`before`/`orderBy` before any I/O
//! 2. Count the candidate set (empty sets return immediately)
//! 3. Fetch one record past the limit in the scan direction
//! 4. Build edges with opaque cursors and compute page info

pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
