use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::employee::Employee;

/// `GET /employees` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListResult {
    pub employees: Vec<Employee>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_employees: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// `DELETE /employees/:id` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEmployeeSummary {
    pub employee_id: String,
    pub full_name: String,
}

/// `GET /employees/stats` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub total_employees: u64,
    pub by_status: BTreeMap<String, i64>,
    pub by_department: BTreeMap<String, i64>,
    pub by_employment_type: BTreeMap<String, i64>,
    pub hires_last_30_days: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
