//! Reel Core
//!
//! Core types shared by the Reel video generation client and CLI.
//!
//! This crate contains:
//! - Domain types: the remote video job, its status vocabulary, progress
//!   normalization and the model catalog
//! - DTOs: request and response shapes exchanged with the video service

pub mod domain;
pub mod dto;
