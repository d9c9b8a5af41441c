use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rosterd::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Default API key seeded by migration (must match m20260301_initial.rs)
const API_KEY: &str = "rosterd_default_api_key_please_regenerate";

async fn spawn_app_with(mut config: Config) -> Router {
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;

    let state = rosterd::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    rosterd::api::router(state).await
}

async fn spawn_app() -> Router {
    spawn_app_with(Config::default()).await
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", API_KEY);

    let request = if let Some(body) = body {
        builder = builder.header("Content-Type", "application/json");
        builder.body(Body::from(body.to_string())).unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

fn employee_body(first: &str, last: &str, email: &str) -> Value {
    json!({
        "personalInfo": {
            "firstName": first,
            "lastName": last,
            "email": email
        },
        "jobInfo": {
            "title": "Engineer",
            "department": "Engineering",
            "startDate": "2024-01-15",
            "salary": 100_000,
            "employmentType": "full-time"
        }
    })
}

async fn create_employee(app: &Router, body: Value) -> Value {
    let (status, json) = request(app, "POST", "/api/employees", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_assigns_sequential_ids() {
    let app = spawn_app().await;

    let first = create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;
    assert_eq!(first["employeeId"], "EMP0001");
    assert_eq!(first["status"], "active");
    assert_eq!(first["createdBy"], "admin");
    assert_eq!(first["updatedBy"], "admin");

    let second = create_employee(&app, employee_body("Alan", "Turing", "alan@example.com")).await;
    assert_eq!(second["employeeId"], "EMP0002");
}

#[tokio::test]
async fn test_create_with_explicit_id() {
    let app = spawn_app().await;

    let mut body = employee_body("Ada", "Lovelace", "ada@example.com");
    body["employeeId"] = json!("EMP0042");
    let created = create_employee(&app, body).await;
    assert_eq!(created["employeeId"], "EMP0042");

    // An already-used explicit id falls back to the next sequential one.
    let mut body = employee_body("Alan", "Turing", "alan@example.com");
    body["employeeId"] = json!("EMP0042");
    let created = create_employee(&app, body).await;
    assert_eq!(created["employeeId"], "EMP0043");

    // So does a malformed one.
    let mut body = employee_body("Grace", "Hopper", "grace@example.com");
    body["employeeId"] = json!("banana");
    let created = create_employee(&app, body).await;
    assert_eq!(created["employeeId"], "EMP0044");
}

#[tokio::test]
async fn test_create_rejects_duplicate_email() {
    let app = spawn_app().await;

    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/employees",
        Some(employee_body("Imposter", "Lovelace", "ada@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already in use: ada@example.com");
}

#[tokio::test]
async fn test_create_collects_all_validation_errors() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/employees",
        Some(json!({
            "personalInfo": { "email": "not-an-email" },
            "jobInfo": { "salary": -1 }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");

    let errors = body["errors"].as_array().expect("errors array");
    assert!(errors.len() >= 4, "expected all failures, got: {errors:?}");

    let fields: Vec<&str> = errors
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"personalInfo.firstName"));
    assert!(fields.contains(&"personalInfo.email"));
    assert!(fields.contains(&"jobInfo.salary"));
}

#[tokio::test]
async fn test_intern_salary_cap() {
    let app = spawn_app().await;

    let mut body = employee_body("Pat", "Intern", "pat@example.com");
    body["jobInfo"]["employmentType"] = json!("intern");
    body["jobInfo"]["salary"] = json!(60_000);

    let (status, response) = request(&app, "POST", "/api/employees", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let errors = response["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["field"], "jobInfo.salary");
    assert!(
        errors[0]["message"].as_str().unwrap().contains("$50000"),
        "should cite the cap: {}",
        errors[0]["message"]
    );
}

#[tokio::test]
async fn test_create_sanitizes_string_fields() {
    let app = spawn_app().await;

    let mut body = employee_body("Ada", "Lovelace", "ada@example.com");
    body["personalInfo"]["firstName"] = json!("  Ada<script>alert('x')</script>  ");

    let created = create_employee(&app, body).await;
    assert_eq!(created["personalInfo"]["firstName"], "Ada");
}

// ============================================================================
// Get
// ============================================================================

#[tokio::test]
async fn test_get_by_id() {
    let app = spawn_app().await;
    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;

    let (status, body) = request(&app, "GET", "/api/employees/EMP0001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["personalInfo"]["email"], "ada@example.com");

    let (status, body) = request(&app, "GET", "/api/employees/nonsense", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid employee id format"));

    let (status, _) = request(&app, "GET", "/api/employees/EMP9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_partial_update_leaves_other_fields_untouched() {
    let app = spawn_app().await;
    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;

    let (status, updated) = request(
        &app,
        "PUT",
        "/api/employees/EMP0001",
        Some(json!({ "jobInfo": { "title": "Principal Engineer" } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["jobInfo"]["title"], "Principal Engineer");
    // Everything not mentioned in the payload is unchanged.
    assert_eq!(updated["personalInfo"]["email"], "ada@example.com");
    assert_eq!(updated["personalInfo"]["firstName"], "Ada");
    assert_eq!(updated["jobInfo"]["salary"], 100_000);
    assert_eq!(updated["status"], "active");
}

#[tokio::test]
async fn test_update_validates_fields() {
    let app = spawn_app().await;
    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;

    let (status, body) = request(
        &app,
        "PUT",
        "/api/employees/EMP0001",
        Some(json!({ "personalInfo": { "email": "broken" } })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "personalInfo.email");
}

#[tokio::test]
async fn test_update_rejects_email_conflict_but_allows_own_email() {
    let app = spawn_app().await;
    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;
    create_employee(&app, employee_body("Alan", "Turing", "alan@example.com")).await;

    // Re-submitting your own email is not a conflict.
    let (status, _) = request(
        &app,
        "PUT",
        "/api/employees/EMP0001",
        Some(json!({ "personalInfo": { "email": "ada@example.com" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "PUT",
        "/api/employees/EMP0001",
        Some(json!({ "personalInfo": { "email": "alan@example.com" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already in use"));
}

#[tokio::test]
async fn test_status_transitions_are_unrestricted() {
    let app = spawn_app().await;
    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;

    let (status, body) = request(
        &app,
        "PUT",
        "/api/employees/EMP0001",
        Some(json!({ "status": "terminated" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "terminated");

    // Terminated employees can be reactivated; no transition order is enforced.
    let (status, body) = request(
        &app,
        "PUT",
        "/api/employees/EMP0001",
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
}

// ============================================================================
// Manager assignment
// ============================================================================

#[tokio::test]
async fn test_manager_must_exist_and_be_active() {
    let app = spawn_app().await;

    let mut body = employee_body("Ada", "Lovelace", "ada@example.com");
    body["jobInfo"]["manager"] = json!("EMP9999");
    let (status, response) = request(&app, "POST", "/api/employees", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["message"],
        "Invalid manager assignment: manager not found"
    );

    let mut inactive = employee_body("Former", "Boss", "former@example.com");
    inactive["status"] = json!("terminated");
    create_employee(&app, inactive).await;

    let mut body = employee_body("Alan", "Turing", "alan@example.com");
    body["jobInfo"]["manager"] = json!("EMP0001");
    let (status, response) = request(&app, "POST", "/api/employees", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["message"],
        "Invalid manager assignment: manager is not an active employee"
    );
}

#[tokio::test]
async fn test_self_reference_rejected() {
    let app = spawn_app().await;
    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;

    let (status, body) = request(
        &app,
        "PUT",
        "/api/employees/EMP0001",
        Some(json!({ "jobInfo": { "manager": "EMP0001" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid manager assignment: an employee cannot be their own manager"
    );
}

#[tokio::test]
async fn test_cycle_rejected() {
    let app = spawn_app().await;

    // A has no manager; B reports to A.
    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;
    let mut b = employee_body("Alan", "Turing", "alan@example.com");
    b["jobInfo"]["manager"] = json!("EMP0001");
    create_employee(&app, b).await;

    // Making B the manager of A would close the loop.
    let (status, body) = request(
        &app,
        "PUT",
        "/api/employees/EMP0001",
        Some(json!({ "jobInfo": { "manager": "EMP0002" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid manager assignment: assignment would create a circular reporting chain"
    );
}

#[tokio::test]
async fn test_manager_cleared_with_null() {
    let app = spawn_app().await;

    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;
    let mut b = employee_body("Alan", "Turing", "alan@example.com");
    b["jobInfo"]["manager"] = json!("EMP0001");
    let created = create_employee(&app, b).await;
    assert_eq!(created["jobInfo"]["manager"], "EMP0001");

    let (status, updated) = request(
        &app,
        "PUT",
        "/api/employees/EMP0002",
        Some(json!({ "jobInfo": { "manager": null } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["jobInfo"].get("manager").is_none());

    // With the reference gone the former manager can be deleted.
    let (status, _) = request(&app, "DELETE", "/api/employees/EMP0001", None).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_blocked_by_dependents() {
    let app = spawn_app().await;

    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;
    for (i, name) in ["Alan", "Grace"].iter().enumerate() {
        let mut body = employee_body(name, "Reports", &format!("report{i}@example.com"));
        body["jobInfo"]["manager"] = json!("EMP0001");
        create_employee(&app, body).await;
    }

    let (status, body) = request(&app, "DELETE", "/api/employees/EMP0001", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot delete employee: 2 employee(s) report to them"
    );
}

#[tokio::test]
async fn test_delete_returns_summary() {
    let app = spawn_app().await;
    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;

    let (status, body) = request(&app, "DELETE", "/api/employees/EMP0001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employeeId"], "EMP0001");
    assert_eq!(body["fullName"], "Ada Lovelace");

    let (status, _) = request(&app, "GET", "/api/employees/EMP0001", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_pagination() {
    let app = spawn_app().await;

    for i in 0..15 {
        create_employee(
            &app,
            employee_body("Eng", "Pager", &format!("eng{i}@example.com")),
        )
        .await;
    }

    let (status, body) = request(
        &app,
        "GET",
        "/api/employees?department=Engineering&page=2&limit=10",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employees"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["totalEmployees"], 15);
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["hasPrevPage"], true);
}

#[tokio::test]
async fn test_list_filters_and_search() {
    let app = spawn_app().await;

    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;
    let mut sales = employee_body("Alan", "Turing", "alan@example.com");
    sales["jobInfo"]["department"] = json!("Sales");
    create_employee(&app, sales).await;
    let mut terminated = employee_body("Grace", "Hopper", "grace@example.com");
    terminated["status"] = json!("terminated");
    create_employee(&app, terminated).await;

    let (_, body) = request(&app, "GET", "/api/employees?department=Sales", None).await;
    assert_eq!(body["employees"].as_array().unwrap().len(), 1);
    assert_eq!(body["employees"][0]["personalInfo"]["firstName"], "Alan");

    let (_, body) = request(&app, "GET", "/api/employees?status=terminated", None).await;
    assert_eq!(body["employees"].as_array().unwrap().len(), 1);
    assert_eq!(body["employees"][0]["personalInfo"]["firstName"], "Grace");

    // Case-insensitive free-text search across names, email and id
    let (_, body) = request(&app, "GET", "/api/employees?search=lovelace", None).await;
    assert_eq!(body["employees"].as_array().unwrap().len(), 1);
    assert_eq!(body["employees"][0]["employeeId"], "EMP0001");

    let (_, body) = request(&app, "GET", "/api/employees?search=EMP0002", None).await;
    assert_eq!(body["employees"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_sorting() {
    let app = spawn_app().await;

    create_employee(&app, employee_body("Bea", "Baker", "bea@example.com")).await;
    create_employee(&app, employee_body("Ann", "Abbot", "ann@example.com")).await;

    let (_, body) = request(
        &app,
        "GET",
        "/api/employees?sortBy=firstName&sortOrder=asc",
        None,
    )
    .await;
    assert_eq!(body["employees"][0]["personalInfo"]["firstName"], "Ann");
    assert_eq!(body["employees"][1]["personalInfo"]["firstName"], "Bea");

    let (_, body) = request(
        &app,
        "GET",
        "/api/employees?sortBy=firstName&sortOrder=desc",
        None,
    )
    .await;
    assert_eq!(body["employees"][0]["personalInfo"]["firstName"], "Bea");
}

// ============================================================================
// Stats
// ============================================================================

#[tokio::test]
async fn test_stats() {
    let app = spawn_app().await;

    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;
    let mut sales = employee_body("Alan", "Turing", "alan@example.com");
    sales["jobInfo"]["department"] = json!("Sales");
    sales["jobInfo"]["employmentType"] = json!("contract");
    create_employee(&app, sales).await;

    // One recent hire, started five days ago.
    let recent_start = (chrono::Utc::now().date_naive() - chrono::Duration::days(5))
        .format("%Y-%m-%d")
        .to_string();
    let mut recent = employee_body("Grace", "Hopper", "grace@example.com");
    recent["jobInfo"]["startDate"] = json!(recent_start);
    create_employee(&app, recent).await;

    let (status, body) = request(&app, "GET", "/api/employees/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalEmployees"], 3);
    assert_eq!(body["byStatus"]["active"], 3);
    assert_eq!(body["byDepartment"]["Engineering"], 2);
    assert_eq!(body["byDepartment"]["Sales"], 1);
    assert_eq!(body["byEmploymentType"]["full-time"], 2);
    assert_eq!(body["byEmploymentType"]["contract"], 1);
    assert_eq!(body["hiresLast30Days"], 1);
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_mutations_rate_limited_per_actor() {
    let mut config = Config::default();
    config.security.rate_limit.max_requests = 2;
    config.security.rate_limit.window_seconds = 3600;
    let app = spawn_app_with(config).await;

    create_employee(&app, employee_body("Ada", "Lovelace", "ada@example.com")).await;
    create_employee(&app, employee_body("Alan", "Turing", "alan@example.com")).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/employees",
        Some(employee_body("Grace", "Hopper", "grace@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["message"].as_str().unwrap().contains("Rate limit"));

    // Reads are not throttled.
    let (status, _) = request(&app, "GET", "/api/employees", None).await;
    assert_eq!(status, StatusCode::OK);
}
