// Domain layer module exports
// Domain is independent of infrastructure concerns

pub mod repositories;
pub mod task;
