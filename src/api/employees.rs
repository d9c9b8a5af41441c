use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use super::{ApiError, AppState};
use crate::api::types::{DeletedEmployeeSummary, EmployeeListResult, EmployeeStats};
use crate::models::employee::Employee;
use crate::services::{EmployeeListRequest, RequestContext};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
}

impl From<ListQuery> for EmployeeListRequest {
    fn from(query: ListQuery) -> Self {
        Self {
            department: query.department,
            status: query.status,
            search: query.search,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
            page: query.page,
            limit: query.limit,
        }
    }
}

/// GET /employees
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<EmployeeListResult>, ApiError> {
    let result = state.employee_service().list(query.into()).await?;
    Ok(Json(result))
}

/// GET /employees/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EmployeeStats>, ApiError> {
    let stats = state.employee_service().stats().await?;
    Ok(Json(stats))
}

/// GET /employees/{id}
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    let employee = state.employee_service().get(&id).await?;
    Ok(Json(employee))
}

/// POST /employees
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let employee = state.employee_service().create(body, &ctx).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PUT /employees/{id}
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Employee>, ApiError> {
    let employee = state.employee_service().update(&id, body, &ctx).await?;
    Ok(Json(employee))
}

/// DELETE /employees/{id}
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<DeletedEmployeeSummary>, ApiError> {
    let summary = state.employee_service().delete(&id, &ctx).await?;
    Ok(Json(summary))
}
