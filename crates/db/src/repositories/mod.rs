//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod attendance_repo;
pub mod dashboard_repo;
pub mod invoice_repo;
pub mod leave_repo;
pub mod leave_template_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod review_repo;
pub mod session_repo;
pub mod task_repo;
pub mod template_repo;
pub mod user_repo;

pub use attendance_repo::AttendanceRepo;
pub use dashboard_repo::DashboardRepo;
pub use invoice_repo::InvoiceRepo;
pub use leave_repo::LeaveRepo;
pub use leave_template_repo::LeaveTemplateRepo;
pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;
pub use review_repo::ReviewRepo;
pub use session_repo::SessionRepo;
pub use task_repo::TaskRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;
