// Repository modules
pub mod attendance_repository;
pub mod barrio_repository;
pub mod service_repository;
pub mod user_repository;
pub mod youth_repository;

// Re-export repository types
pub use attendance_repository::AttendanceRepository;
pub use barrio_repository::BarrioRepository;
pub use service_repository::ServiceRepository;
pub use user_repository::UserRepository;
pub use youth_repository::YouthRepository;
