//! Utility modules for studymap.

pub mod log;
