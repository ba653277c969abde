// Repository interfaces implemented by the infrastructure layer

pub mod task_repository;

pub use task_repository::TaskRepository;
