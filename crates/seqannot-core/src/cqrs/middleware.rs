//! Marker traits classifying mediator requests.
//!
//! Commands mutate store state inside one transaction; queries only read.
//! The split keeps write paths auditable at a glance.

/// A state-mutating request handled transactionally.
pub trait Command {}

/// A read-only request.
pub trait Query {}
