//! Core logic for Box Mock.
//!
//! This crate contains storage and payload logic with ZERO web or database
//! dependencies.
//!
//! # Modules
//!
//! - `storage` - Per-tenant blob store with atomic writes
//! - `folder` - Root folder invariant and tree assembly
//! - `sign` - Sign request signer and output file payloads

pub mod folder;
pub mod sign;
pub mod storage;
