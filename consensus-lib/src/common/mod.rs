//! # Common Module
//! Hashing helpers shared by the header, difficulty and signing code.

pub mod hashes;
