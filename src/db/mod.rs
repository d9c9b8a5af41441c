use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{audit_log, employees};

pub mod migrator;
pub mod repositories;

pub use repositories::audit::AuditEntry;
pub use repositories::employee::{EmployeePatch, EmployeeQuery};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn employee_repo(&self) -> repositories::employee::EmployeeRepository {
        repositories::employee::EmployeeRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn audit_repo(&self) -> repositories::audit::AuditRepository {
        repositories::audit::AuditRepository::new(self.conn.clone())
    }

    // Employees

    pub async fn get_employee(&self, employee_id: &str) -> Result<Option<employees::Model>> {
        self.employee_repo().get(employee_id).await
    }

    pub async fn get_employee_by_email(&self, email: &str) -> Result<Option<employees::Model>> {
        self.employee_repo().get_by_email(email).await
    }

    pub async fn employee_email_in_use_by_other(
        &self,
        email: &str,
        exclude_id: &str,
    ) -> Result<bool> {
        self.employee_repo()
            .email_in_use_by_other(email, exclude_id)
            .await
    }

    pub async fn list_employees(
        &self,
        query: &EmployeeQuery,
    ) -> Result<(Vec<employees::Model>, u64)> {
        self.employee_repo().list(query).await
    }

    pub async fn insert_employee(&self, model: employees::ActiveModel) -> Result<employees::Model> {
        self.employee_repo().insert(model).await
    }

    pub async fn update_employee(
        &self,
        current: employees::Model,
        patch: EmployeePatch,
    ) -> Result<employees::Model> {
        self.employee_repo().update(current, patch).await
    }

    pub async fn delete_employee(&self, employee_id: &str) -> Result<bool> {
        self.employee_repo().delete(employee_id).await
    }

    pub async fn employee_dependents_count(&self, employee_id: &str) -> Result<u64> {
        self.employee_repo().dependents_count(employee_id).await
    }

    pub async fn max_employee_number(&self) -> Result<u32> {
        self.employee_repo().max_employee_number().await
    }

    pub async fn count_employees(&self) -> Result<u64> {
        self.employee_repo().count().await
    }

    pub async fn employees_by_status(&self) -> Result<Vec<(String, i64)>> {
        self.employee_repo().count_by_status().await
    }

    pub async fn employees_by_department(&self) -> Result<Vec<(String, i64)>> {
        self.employee_repo().count_by_department().await
    }

    pub async fn employees_by_employment_type(&self) -> Result<Vec<(String, i64)>> {
        self.employee_repo().count_by_employment_type().await
    }

    pub async fn employees_hired_since(&self, cutoff: &str) -> Result<u64> {
        self.employee_repo().hires_since(cutoff).await
    }

    // Users

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: &str,
        security: Option<&SecurityConfig>,
    ) -> Result<User> {
        self.user_repo()
            .create(username, email, password, role, security)
            .await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        security: Option<&SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, security)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }

    // Audit

    pub async fn record_audit(&self, entry: AuditEntry) -> Result<()> {
        self.audit_repo().record(entry).await
    }

    pub async fn recent_audit_entries(&self, limit: u64) -> Result<Vec<audit_log::Model>> {
        self.audit_repo().recent(limit).await
    }
}
