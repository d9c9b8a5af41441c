//! `SeaORM` implementation of the `EmployeeService` trait.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::Set;
use sea_orm::sea_query::Order;
use serde_json::Value;

use crate::api::types::{DeletedEmployeeSummary, EmployeeListResult, EmployeeStats, PaginationMeta};
use crate::db::{EmployeePatch, EmployeeQuery, Store};
use crate::entities::employees;
use crate::models::employee::{
    Employee, EmployeePayload, EmployeeStatus, is_valid_employee_id,
};
use crate::sanitize::sanitize_payload;
use crate::services::audit::{
    ACTION_CREATE_EMPLOYEE, ACTION_DELETE_EMPLOYEE, ACTION_UPDATE_EMPLOYEE, AuditRecorder,
    RequestContext,
};
use crate::services::employee_service::{EmployeeError, EmployeeListRequest, EmployeeService};
use crate::services::hierarchy::ManagerAssignmentValidator;
use crate::validation::{self, FieldError};

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;
const RECENT_HIRE_DAYS: i64 = 30;

pub struct SeaOrmEmployeeService {
    store: Store,
    hierarchy: ManagerAssignmentValidator,
    audit: AuditRecorder,
}

impl SeaOrmEmployeeService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        let hierarchy = ManagerAssignmentValidator::new(store.clone());
        let audit = AuditRecorder::new(store.clone());
        Self {
            store,
            hierarchy,
            audit,
        }
    }

    async fn check_manager_assignment(
        &self,
        employee_id: Option<&str>,
        candidate_manager_id: &str,
    ) -> Result<(), EmployeeError> {
        let rejection = self
            .hierarchy
            .validate(employee_id, candidate_manager_id)
            .await?;
        match rejection {
            Some(r) => Err(EmployeeError::InvalidManager(r)),
            None => Ok(()),
        }
    }

    async fn assign_employee_id(
        &self,
        explicit: Option<&str>,
    ) -> Result<String, EmployeeError> {
        if let Some(id) = explicit
            && is_valid_employee_id(id)
            && self.store.get_employee(id).await?.is_none()
        {
            return Ok(id.to_string());
        }

        let highest = self.store.max_employee_number().await?;
        Ok(format!("EMP{:04}", highest + 1))
    }
}

/// Sort allow-list; anything else falls back to creation time.
fn sort_column(sort_by: Option<&str>) -> employees::Column {
    match sort_by {
        Some("employeeId") => employees::Column::EmployeeId,
        Some("firstName") => employees::Column::FirstName,
        Some("lastName") => employees::Column::LastName,
        Some("email") => employees::Column::Email,
        Some("department") => employees::Column::Department,
        Some("title") => employees::Column::Title,
        Some("salary") => employees::Column::Salary,
        Some("startDate") => employees::Column::StartDate,
        Some("status") => employees::Column::Status,
        _ => employees::Column::CreatedAt,
    }
}

fn sort_order(order: Option<&str>) -> Order {
    match order {
        Some("asc") => Order::Asc,
        _ => Order::Desc,
    }
}

/// The store reports both unique indexes through the same conflict signal;
/// tell them apart by the constraint named in the message.
fn classify_conflict(message: &str, employee_id: &str, email: &str) -> EmployeeError {
    if message.contains("UNIQUE") {
        if message.contains("employee_id") {
            return EmployeeError::DuplicateId(employee_id.to_string());
        }
        if message.contains("email") {
            return EmployeeError::DuplicateEmail(email.to_string());
        }
    }
    EmployeeError::Database(message.to_string())
}

fn decode_payload(body: &Value) -> Result<EmployeePayload, EmployeeError> {
    serde_json::from_value(body.clone()).map_err(|e| {
        EmployeeError::Validation(vec![FieldError {
            field: "body".to_string(),
            message: format!("Request body has an invalid shape: {e}"),
            rejected_value: None,
        }])
    })
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, EmployeeError> {
    value.ok_or_else(|| EmployeeError::Internal(format!("validated field missing: {field}")))
}

#[async_trait]
impl EmployeeService for SeaOrmEmployeeService {
    async fn list(
        &self,
        request: EmployeeListRequest,
    ) -> Result<EmployeeListResult, EmployeeError> {
        let limit = request
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let page = request.page.unwrap_or(1).max(1);

        let query = EmployeeQuery {
            department: request.department.filter(|d| !d.is_empty()),
            status: request.status.filter(|s| !s.is_empty()),
            search: request.search.filter(|s| !s.is_empty()),
            sort_by: sort_column(request.sort_by.as_deref()),
            sort_order: sort_order(request.sort_order.as_deref()),
            page,
            limit,
        };

        let (rows, total) = self.store.list_employees(&query).await?;
        let total_pages = total.div_ceil(limit);

        Ok(EmployeeListResult {
            employees: rows.into_iter().map(Employee::from).collect(),
            pagination: PaginationMeta {
                current_page: page,
                total_pages,
                total_employees: total,
                has_next_page: page < total_pages,
                has_prev_page: page > 1,
            },
        })
    }

    async fn get(&self, employee_id: &str) -> Result<Employee, EmployeeError> {
        if !is_valid_employee_id(employee_id) {
            return Err(EmployeeError::InvalidIdFormat(employee_id.to_string()));
        }

        self.store
            .get_employee(employee_id)
            .await?
            .map(Employee::from)
            .ok_or_else(|| EmployeeError::NotFound(employee_id.to_string()))
    }

    async fn create(&self, body: Value, ctx: &RequestContext) -> Result<Employee, EmployeeError> {
        let body = sanitize_payload(body);

        let errors = validation::run(&body, validation::creation_rules());
        if !errors.is_empty() {
            return Err(EmployeeError::Validation(errors));
        }

        let payload = decode_payload(&body)?;
        let personal = payload.personal_info.unwrap_or_default();
        let job = payload.job_info.unwrap_or_default();

        let explicit_id = payload.employee_id.as_deref();
        if let Some(Some(manager_id)) = &job.manager {
            // An explicit well-formed id participates in the self/cycle
            // checks even on create.
            let probe = explicit_id.filter(|id| is_valid_employee_id(id));
            self.check_manager_assignment(probe, manager_id).await?;
        }

        let email = require(personal.email, "personalInfo.email")?;
        if self.store.get_employee_by_email(&email).await?.is_some() {
            return Err(EmployeeError::DuplicateEmail(email));
        }

        let employee_id = self.assign_employee_id(explicit_id).await?;
        let now = Utc::now().to_rfc3339();
        let address = personal.address.unwrap_or_default();

        let model = employees::ActiveModel {
            employee_id: Set(employee_id.clone()),
            first_name: Set(require(personal.first_name, "personalInfo.firstName")?),
            last_name: Set(require(personal.last_name, "personalInfo.lastName")?),
            email: Set(email.clone()),
            phone: Set(personal.phone),
            date_of_birth: Set(personal.date_of_birth),
            street: Set(address.street),
            city: Set(address.city),
            state: Set(address.state),
            zip_code: Set(address.zip_code),
            title: Set(require(job.title, "jobInfo.title")?),
            department: Set(require(job.department, "jobInfo.department")?),
            manager_id: Set(job.manager.flatten()),
            start_date: Set(require(job.start_date, "jobInfo.startDate")?),
            salary: Set(require(job.salary, "jobInfo.salary")?),
            employment_type: Set(require(job.employment_type, "jobInfo.employmentType")?),
            status: Set(payload
                .status
                .unwrap_or_else(|| EmployeeStatus::Active.as_str().to_string())),
            created_by: Set(ctx.actor.clone()),
            updated_by: Set(ctx.actor.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let inserted = self
            .store
            .insert_employee(model)
            .await
            .map_err(|e| classify_conflict(&format!("{e:#}"), &employee_id, &email))?;

        self.audit
            .record(
                ctx,
                ACTION_CREATE_EMPLOYEE,
                Some(&inserted.employee_id),
                Some(&body),
            )
            .await;

        Ok(Employee::from(inserted))
    }

    async fn update(
        &self,
        employee_id: &str,
        body: Value,
        ctx: &RequestContext,
    ) -> Result<Employee, EmployeeError> {
        if !is_valid_employee_id(employee_id) {
            return Err(EmployeeError::InvalidIdFormat(employee_id.to_string()));
        }

        let Some(current) = self.store.get_employee(employee_id).await? else {
            return Err(EmployeeError::NotFound(employee_id.to_string()));
        };

        let body = sanitize_payload(body);

        let errors = validation::run(&body, validation::update_rules());
        if !errors.is_empty() {
            return Err(EmployeeError::Validation(errors));
        }

        let payload = decode_payload(&body)?;
        let personal = payload.personal_info.unwrap_or_default();
        let job = payload.job_info.unwrap_or_default();
        let address = personal.address.unwrap_or_default();

        if let Some(Some(manager_id)) = &job.manager {
            self.check_manager_assignment(Some(employee_id), manager_id)
                .await?;
        }

        let email = personal.email;
        if let Some(email) = &email
            && self
                .store
                .employee_email_in_use_by_other(email, employee_id)
                .await?
        {
            return Err(EmployeeError::DuplicateEmail(email.clone()));
        }

        let conflict_email = email.clone().unwrap_or_else(|| current.email.clone());
        let patch = EmployeePatch {
            first_name: personal.first_name,
            last_name: personal.last_name,
            email,
            phone: personal.phone,
            date_of_birth: personal.date_of_birth,
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            title: job.title,
            department: job.department,
            manager_id: job.manager,
            start_date: job.start_date,
            salary: job.salary,
            employment_type: job.employment_type,
            status: payload.status,
            updated_by: ctx.actor.clone(),
            updated_at: Utc::now().to_rfc3339(),
        };

        let updated = self
            .store
            .update_employee(current, patch)
            .await
            .map_err(|e| classify_conflict(&format!("{e:#}"), employee_id, &conflict_email))?;

        self.audit
            .record(
                ctx,
                ACTION_UPDATE_EMPLOYEE,
                Some(&updated.employee_id),
                Some(&body),
            )
            .await;

        Ok(Employee::from(updated))
    }

    async fn delete(
        &self,
        employee_id: &str,
        ctx: &RequestContext,
    ) -> Result<DeletedEmployeeSummary, EmployeeError> {
        if !is_valid_employee_id(employee_id) {
            return Err(EmployeeError::InvalidIdFormat(employee_id.to_string()));
        }

        let Some(current) = self.store.get_employee(employee_id).await? else {
            return Err(EmployeeError::NotFound(employee_id.to_string()));
        };

        let dependents = self.store.employee_dependents_count(employee_id).await?;
        if dependents > 0 {
            return Err(EmployeeError::HasDependents(dependents));
        }

        let removed = self.store.delete_employee(employee_id).await?;
        if !removed {
            return Err(EmployeeError::NotFound(employee_id.to_string()));
        }

        self.audit
            .record(ctx, ACTION_DELETE_EMPLOYEE, Some(employee_id), None)
            .await;

        Ok(DeletedEmployeeSummary {
            employee_id: current.employee_id,
            full_name: format!("{} {}", current.first_name, current.last_name),
        })
    }

    async fn stats(&self) -> Result<EmployeeStats, EmployeeError> {
        let total = self.store.count_employees().await?;
        let by_status = self.store.employees_by_status().await?;
        let by_department = self.store.employees_by_department().await?;
        let by_employment_type = self.store.employees_by_employment_type().await?;

        let cutoff = (Utc::now().date_naive() - chrono::Duration::days(RECENT_HIRE_DAYS))
            .format("%Y-%m-%d")
            .to_string();
        let recent_hires = self.store.employees_hired_since(&cutoff).await?;

        Ok(EmployeeStats {
            total_employees: total,
            by_status: by_status.into_iter().collect(),
            by_department: by_department.into_iter().collect(),
            by_employment_type: by_employment_type.into_iter().collect(),
            hires_last_30_days: recent_hires,
        })
    }
}
