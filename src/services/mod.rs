pub mod audit;
pub use audit::{AuditRecorder, RequestContext};

pub mod hierarchy;
pub use hierarchy::{AssignmentRejection, ManagerAssignmentValidator};

pub mod employee_service;
pub use employee_service::{EmployeeError, EmployeeListRequest, EmployeeService};

pub mod employee_service_impl;
pub use employee_service_impl::SeaOrmEmployeeService;

pub mod auth_service;
pub use auth_service::{Actor, AuthError, AuthService, LoginResult, UserInfo};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;
