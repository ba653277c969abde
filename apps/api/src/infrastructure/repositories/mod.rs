// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory_task_repository;
pub mod postgres_task_repository;

pub use in_memory_task_repository::InMemoryTaskRepository;
pub use postgres_task_repository::PostgresTaskRepository;
