//! Domain service for the employee record lifecycle.
//!
//! Every mutating operation runs the same staged pipeline: sanitize →
//! validate → business-rule validate → persist → audit. Field-level
//! validation failures are collected and returned together; hierarchy and
//! uniqueness failures short-circuit.

use serde_json::Value;
use thiserror::Error;

use crate::api::types::{DeletedEmployeeSummary, EmployeeListResult, EmployeeStats};
use crate::models::employee::Employee;
use crate::services::audit::RequestContext;
use crate::services::hierarchy::AssignmentRejection;
use crate::validation::FieldError;

/// Errors specific to employee operations. Maps 1:1 onto the API error
/// taxonomy; the HTTP layer owns the status codes.
#[derive(Debug, Error)]
pub enum EmployeeError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid employee id format: {0}")]
    InvalidIdFormat(String),

    #[error("Employee not found: {0}")]
    NotFound(String),

    #[error("Employee id already in use: {0}")]
    DuplicateId(String),

    #[error("Email already in use: {0}")]
    DuplicateEmail(String),

    #[error("Invalid manager assignment: {0}")]
    InvalidManager(AssignmentRejection),

    #[error("Cannot delete employee: {0} employee(s) report to them")]
    HasDependents(u64),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for EmployeeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EmployeeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Listing parameters as they arrive from the query string; the
/// implementation clamps paging and applies the sort allow-list.
#[derive(Debug, Clone, Default)]
pub struct EmployeeListRequest {
    pub department: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Domain service trait for the employee lifecycle.
#[async_trait::async_trait]
pub trait EmployeeService: Send + Sync {
    /// Lists employees with filtering, search, sorting and pagination.
    async fn list(&self, request: EmployeeListRequest) -> Result<EmployeeListResult, EmployeeError>;

    /// Fetches a single employee by public id.
    ///
    /// # Errors
    ///
    /// [`EmployeeError::InvalidIdFormat`] when the id is not `EMP####`;
    /// [`EmployeeError::NotFound`] when no record exists.
    async fn get(&self, employee_id: &str) -> Result<Employee, EmployeeError>;

    /// Creates an employee from a raw JSON body.
    async fn create(&self, body: Value, ctx: &RequestContext) -> Result<Employee, EmployeeError>;

    /// Applies a partial update; keys absent from the body stay untouched.
    async fn update(
        &self,
        employee_id: &str,
        body: Value,
        ctx: &RequestContext,
    ) -> Result<Employee, EmployeeError>;

    /// Deletes an employee with no direct reports.
    ///
    /// # Errors
    ///
    /// [`EmployeeError::HasDependents`] carries the number of employees
    /// still referencing the target as their manager.
    async fn delete(
        &self,
        employee_id: &str,
        ctx: &RequestContext,
    ) -> Result<DeletedEmployeeSummary, EmployeeError>;

    /// Aggregate counts by status, department and employment type, plus
    /// hires within the last 30 days.
    async fn stats(&self) -> Result<EmployeeStats, EmployeeError>;
}
