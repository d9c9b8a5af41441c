//! Manager-assignment validation over the reporting graph.
//!
//! The manager graph is stored as weak references (each employee row holds
//! an optional `manager_id`), so nothing at the storage layer prevents a
//! reporting chain from looping back on itself. Every manager assignment is
//! checked here before it is persisted.

use std::collections::HashSet;

use anyhow::Result;
use thiserror::Error;

use crate::db::Store;
use crate::models::employee::EmployeeStatus;

/// Why a candidate manager assignment was refused. Checks run in this
/// order and stop at the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssignmentRejection {
    #[error("manager not found")]
    ManagerNotFound,

    #[error("manager is not an active employee")]
    ManagerInactive,

    #[error("an employee cannot be their own manager")]
    SelfReference,

    #[error("assignment would create a circular reporting chain")]
    CyclicHierarchy,
}

#[derive(Clone)]
pub struct ManagerAssignmentValidator {
    store: Store,
}

impl ManagerAssignmentValidator {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Decide whether `candidate_manager_id` may become the manager of
    /// `employee_id` (None for a create without an explicit id). Read-only;
    /// `Ok(None)` means the assignment is legal.
    ///
    /// The chain walk keeps a visited set rather than a depth bound: even if
    /// stored data already contains a cycle the walk terminates, because no
    /// id is ever followed twice.
    pub async fn validate(
        &self,
        employee_id: Option<&str>,
        candidate_manager_id: &str,
    ) -> Result<Option<AssignmentRejection>> {
        let Some(manager) = self.store.get_employee(candidate_manager_id).await? else {
            return Ok(Some(AssignmentRejection::ManagerNotFound));
        };

        if manager.status != EmployeeStatus::Active.as_str() {
            return Ok(Some(AssignmentRejection::ManagerInactive));
        }

        let Some(employee_id) = employee_id else {
            return Ok(None);
        };

        if employee_id == candidate_manager_id {
            return Ok(Some(AssignmentRejection::SelfReference));
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut cursor = Some(candidate_manager_id.to_string());

        while let Some(current) = cursor {
            if current == employee_id {
                return Ok(Some(AssignmentRejection::CyclicHierarchy));
            }
            if !visited.insert(current.clone()) {
                // Pre-existing corrupt chain; refuse rather than loop.
                return Ok(Some(AssignmentRejection::CyclicHierarchy));
            }

            cursor = match self.store.get_employee(&current).await? {
                Some(model) => model.manager_id,
                None => None,
            };
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Set;

    use crate::entities::employees;

    async fn test_store() -> Store {
        Store::new("sqlite::memory:").await.expect("in-memory store")
    }

    async fn seed(store: &Store, id: &str, manager: Option<&str>, status: &str) {
        let now = chrono::Utc::now().to_rfc3339();
        let model = employees::ActiveModel {
            employee_id: Set(id.to_string()),
            first_name: Set("Test".to_string()),
            last_name: Set(id.to_string()),
            email: Set(format!("{}@example.com", id.to_lowercase())),
            phone: Set(None),
            date_of_birth: Set(None),
            street: Set(None),
            city: Set(None),
            state: Set(None),
            zip_code: Set(None),
            title: Set("Engineer".to_string()),
            department: Set("Engineering".to_string()),
            manager_id: Set(manager.map(str::to_string)),
            start_date: Set("2024-01-01".to_string()),
            salary: Set(100_000),
            employment_type: Set("full-time".to_string()),
            status: Set(status.to_string()),
            created_by: Set(None),
            updated_by: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };
        store.insert_employee(model).await.expect("seed employee");
    }

    #[tokio::test]
    async fn test_manager_must_exist() {
        let store = test_store().await;
        let validator = ManagerAssignmentValidator::new(store);

        let rejection = validator.validate(None, "EMP0001").await.unwrap();
        assert_eq!(rejection, Some(AssignmentRejection::ManagerNotFound));
    }

    #[tokio::test]
    async fn test_manager_must_be_active() {
        let store = test_store().await;
        seed(&store, "EMP0001", None, "terminated").await;
        let validator = ManagerAssignmentValidator::new(store);

        let rejection = validator.validate(None, "EMP0001").await.unwrap();
        assert_eq!(rejection, Some(AssignmentRejection::ManagerInactive));
    }

    #[tokio::test]
    async fn test_self_reference_rejected() {
        let store = test_store().await;
        seed(&store, "EMP0001", None, "active").await;
        let validator = ManagerAssignmentValidator::new(store);

        let rejection = validator.validate(Some("EMP0001"), "EMP0001").await.unwrap();
        assert_eq!(rejection, Some(AssignmentRejection::SelfReference));
    }

    #[tokio::test]
    async fn test_two_node_cycle_rejected() {
        let store = test_store().await;
        seed(&store, "EMP0001", None, "active").await;
        seed(&store, "EMP0002", Some("EMP0001"), "active").await;
        let validator = ManagerAssignmentValidator::new(store);

        // EMP0002 reports to EMP0001; making EMP0002 the manager of EMP0001
        // would close the loop.
        let rejection = validator.validate(Some("EMP0001"), "EMP0002").await.unwrap();
        assert_eq!(rejection, Some(AssignmentRejection::CyclicHierarchy));
    }

    #[tokio::test]
    async fn test_deep_chain_cycle_rejected() {
        let store = test_store().await;
        seed(&store, "EMP0001", None, "active").await;
        seed(&store, "EMP0002", Some("EMP0001"), "active").await;
        seed(&store, "EMP0003", Some("EMP0002"), "active").await;
        let validator = ManagerAssignmentValidator::new(store);

        let rejection = validator.validate(Some("EMP0001"), "EMP0003").await.unwrap();
        assert_eq!(rejection, Some(AssignmentRejection::CyclicHierarchy));
    }

    #[tokio::test]
    async fn test_valid_assignment_accepted() {
        let store = test_store().await;
        seed(&store, "EMP0001", None, "active").await;
        seed(&store, "EMP0002", Some("EMP0001"), "active").await;
        seed(&store, "EMP0003", None, "active").await;
        let validator = ManagerAssignmentValidator::new(store);

        let rejection = validator.validate(Some("EMP0003"), "EMP0002").await.unwrap();
        assert_eq!(rejection, None);
    }

    #[tokio::test]
    async fn test_corrupt_chain_terminates() {
        let store = test_store().await;
        // EMP0001 and EMP0002 already form a loop in stored data; a walk
        // without the visited set would never finish.
        seed(&store, "EMP0001", Some("EMP0002"), "active").await;
        seed(&store, "EMP0002", Some("EMP0001"), "active").await;
        seed(&store, "EMP0003", None, "active").await;
        let validator = ManagerAssignmentValidator::new(store);

        let rejection = validator.validate(Some("EMP0003"), "EMP0001").await.unwrap();
        assert_eq!(rejection, Some(AssignmentRejection::CyclicHierarchy));
    }
}
