//! Domain model of the warden facility backend: entity types, the
//! [`store::FacilityStore`] trait, the error taxonomy, and the pure
//! predicates (window overlap, occupancy and stock thresholds, the
//! gender/room rule).
//!
//! Storage and HTTP live in the sibling crates, which all build on top of
//! this one.

pub mod error;
pub mod identity;
pub mod inventory;
pub mod prisoner;
pub mod room;
pub mod schedule;
pub mod score;
pub mod staff;
pub mod store;
pub mod visitation;

pub use error::{DomainError, Error, ErrorKind, Result};
