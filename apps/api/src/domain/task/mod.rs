// Task domain module
// A completed orchestration as it is stored and served back

#![allow(clippy::module_inception)]

pub mod task;

pub use task::TaskRecord;
