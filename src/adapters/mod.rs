pub mod in_memory_plan_repository;
pub mod in_memory_transaction_repository;
pub mod in_memory_user_repository;

pub use in_memory_plan_repository::InMemoryPlanRepository;
pub use in_memory_transaction_repository::InMemoryTransactionRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
