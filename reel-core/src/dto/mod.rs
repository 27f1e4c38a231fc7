//! Data Transfer Objects for the video service API
//!
//! Request bodies, list queries and paginated responses. Jobs themselves are
//! returned as [`crate::domain::job::Job`].

pub mod video;
