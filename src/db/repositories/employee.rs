use anyhow::{Context, Result};
use sea_orm::sea_query::Order;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use crate::entities::{employees, prelude::*};

/// Query shape for the list endpoint: filters, allow-listed sort, paging.
#[derive(Debug, Clone)]
pub struct EmployeeQuery {
    pub department: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: employees::Column,
    pub sort_order: Order,
    /// 1-based.
    pub page: u64,
    pub limit: u64,
}

/// Partial update; only `Some` fields touch the row. `manager_id` uses a
/// nested option so an explicit null can clear the reference.
#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub manager_id: Option<Option<String>>,
    pub start_date: Option<String>,
    pub salary: Option<i64>,
    pub employment_type: Option<String>,
    pub status: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: String,
}

pub struct EmployeeRepository {
    conn: DatabaseConnection,
}

impl EmployeeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, employee_id: &str) -> Result<Option<employees::Model>> {
        Employees::find_by_id(employee_id)
            .one(&self.conn)
            .await
            .context("Failed to query employee by id")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<employees::Model>> {
        Employees::find()
            .filter(employees::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query employee by email")
    }

    /// True when another row (not `exclude_id`) already owns the email.
    pub async fn email_in_use_by_other(&self, email: &str, exclude_id: &str) -> Result<bool> {
        let count = Employees::find()
            .filter(employees::Column::Email.eq(email))
            .filter(employees::Column::EmployeeId.ne(exclude_id))
            .count(&self.conn)
            .await
            .context("Failed to check email conflict")?;
        Ok(count > 0)
    }

    /// Filtered, sorted, paginated listing. Returns the page plus the total
    /// row count for the same filter.
    pub async fn list(&self, query: &EmployeeQuery) -> Result<(Vec<employees::Model>, u64)> {
        let mut condition = Condition::all();

        if let Some(department) = &query.department {
            condition = condition.add(employees::Column::Department.eq(department));
        }
        if let Some(status) = &query.status {
            condition = condition.add(employees::Column::Status.eq(status));
        }
        if let Some(search) = &query.search {
            condition = condition.add(
                Condition::any()
                    .add(employees::Column::FirstName.contains(search))
                    .add(employees::Column::LastName.contains(search))
                    .add(employees::Column::Email.contains(search))
                    .add(employees::Column::EmployeeId.contains(search)),
            );
        }

        let base = Employees::find()
            .filter(condition)
            .order_by(query.sort_by, query.sort_order.clone());

        let paginator = base.paginate(&self.conn, query.limit);
        let total = paginator
            .num_items()
            .await
            .context("Failed to count employees")?;

        let rows = paginator
            .fetch_page(query.page.saturating_sub(1))
            .await
            .context("Failed to fetch employee page")?;

        Ok((rows, total))
    }

    /// Insert a fully-populated row. Unique-constraint violations bubble up
    /// with the backend message intact so the caller can tell which
    /// constraint fired.
    pub async fn insert(&self, model: employees::ActiveModel) -> Result<employees::Model> {
        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert employee")?;
        info!("Created employee {}", inserted.employee_id);
        Ok(inserted)
    }

    pub async fn update(
        &self,
        current: employees::Model,
        patch: EmployeePatch,
    ) -> Result<employees::Model> {
        let employee_id = current.employee_id.clone();
        let mut active: employees::ActiveModel = current.into();

        if let Some(v) = patch.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = patch.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = patch.email {
            active.email = Set(v);
        }
        if let Some(v) = patch.phone {
            active.phone = Set(Some(v));
        }
        if let Some(v) = patch.date_of_birth {
            active.date_of_birth = Set(Some(v));
        }
        if let Some(v) = patch.street {
            active.street = Set(Some(v));
        }
        if let Some(v) = patch.city {
            active.city = Set(Some(v));
        }
        if let Some(v) = patch.state {
            active.state = Set(Some(v));
        }
        if let Some(v) = patch.zip_code {
            active.zip_code = Set(Some(v));
        }
        if let Some(v) = patch.title {
            active.title = Set(v);
        }
        if let Some(v) = patch.department {
            active.department = Set(v);
        }
        if let Some(v) = patch.manager_id {
            active.manager_id = Set(v);
        }
        if let Some(v) = patch.start_date {
            active.start_date = Set(v);
        }
        if let Some(v) = patch.salary {
            active.salary = Set(v);
        }
        if let Some(v) = patch.employment_type {
            active.employment_type = Set(v);
        }
        if let Some(v) = patch.status {
            active.status = Set(v);
        }
        active.updated_by = Set(patch.updated_by);
        active.updated_at = Set(patch.updated_at);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update employee")?;
        info!("Updated employee {employee_id}");
        Ok(updated)
    }

    pub async fn delete(&self, employee_id: &str) -> Result<bool> {
        let result = Employees::delete_by_id(employee_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete employee")?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Deleted employee {employee_id}");
        }
        Ok(removed)
    }

    /// Number of employees whose manager reference points at `employee_id`.
    pub async fn dependents_count(&self, employee_id: &str) -> Result<u64> {
        Employees::find()
            .filter(employees::Column::ManagerId.eq(employee_id))
            .count(&self.conn)
            .await
            .context("Failed to count dependents")
    }

    /// Highest numeric suffix among stored `EMP####` ids; 0 when empty.
    /// Ids are fixed-width so the lexicographic maximum is the numeric one.
    pub async fn max_employee_number(&self) -> Result<u32> {
        let row = Employees::find()
            .order_by_desc(employees::Column::EmployeeId)
            .one(&self.conn)
            .await
            .context("Failed to query max employee id")?;

        Ok(row
            .and_then(|m| m.employee_id.strip_prefix("EMP").map(str::to_string))
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0))
    }

    pub async fn count(&self) -> Result<u64> {
        Employees::find()
            .count(&self.conn)
            .await
            .context("Failed to count employees")
    }

    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>> {
        self.count_grouped(employees::Column::Status).await
    }

    pub async fn count_by_department(&self) -> Result<Vec<(String, i64)>> {
        self.count_grouped(employees::Column::Department).await
    }

    pub async fn count_by_employment_type(&self) -> Result<Vec<(String, i64)>> {
        self.count_grouped(employees::Column::EmploymentType).await
    }

    async fn count_grouped(&self, column: employees::Column) -> Result<Vec<(String, i64)>> {
        Employees::find()
            .select_only()
            .column(column)
            .column_as(employees::Column::EmployeeId.count(), "count")
            .group_by(column)
            .into_tuple::<(String, i64)>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate employees")
    }

    /// Hires whose start date is on or after `cutoff` (`YYYY-MM-DD`; ISO
    /// dates compare correctly as strings).
    pub async fn hires_since(&self, cutoff: &str) -> Result<u64> {
        Employees::find()
            .filter(employees::Column::StartDate.gte(cutoff))
            .count(&self.conn)
            .await
            .context("Failed to count recent hires")
    }
}
