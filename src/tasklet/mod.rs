//! # Tasklet Module
//!
//! Tasklet implementations run by the steps of a job.
//! Tasklets are single-task operations that don't follow the chunk-oriented processing pattern.

pub mod xml;
