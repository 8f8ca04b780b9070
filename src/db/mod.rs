pub mod auth_repo;
pub mod business_repo;
pub mod user_repo;

pub use auth_repo::AuthRepository;
pub use business_repo::BusinessRepository;
pub use user_repo::UserRepository;
