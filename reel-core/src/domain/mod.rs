//! Core domain types
//!
//! These types describe the remote video job as the client observes it. The
//! remote service owns every job; the client only ever holds a read copy that
//! is replaced on each refresh.

pub mod job;
pub mod model;
pub mod progress;
