//! Deterministic, pure logic shared by discovery and replay.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod builder;
pub mod options;
pub mod replay;
pub mod sorter;
pub mod tree;
