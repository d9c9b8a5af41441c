pub use super::audit_log::Entity as AuditLog;
pub use super::employees::Entity as Employees;
pub use super::users::Entity as Users;
