//! Request validation pipeline.
//!
//! Each validator is a pure function over the full (already sanitized)
//! request body. Pipelines are ordered lists of validators; every validator
//! runs and all failures are collected, so a client gets the complete error
//! list in one round trip instead of fixing fields one at a time.
//!
//! Creation and update share the format and business rules; creation
//! additionally enforces required fields, while update treats every field
//! as optional.

use std::sync::OnceLock;

use chrono::{Months, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::models::employee::{Department, EmployeeStatus, EmploymentType};

pub const SALARY_MAX: i64 = 10_000_000;
pub const INTERN_SALARY_CAP: i64 = 50_000;
pub const AGE_MIN: u32 = 16;
pub const AGE_MAX: u32 = 100;

/// One rejected field, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub rejected_value: Option<Value>,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>, rejected_value: Option<&Value>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            rejected_value: rejected_value.cloned(),
        }
    }
}

/// A single pipeline stage: inspects the body, reports at most one failure.
pub type FieldValidator = fn(&Value) -> Option<FieldError>;

/// Run an ordered validator list, collecting every failure.
#[must_use]
pub fn run(body: &Value, rules: &[FieldValidator]) -> Vec<FieldError> {
    rules.iter().filter_map(|rule| rule(body)).collect()
}

/// Validators applied to `POST /employees` bodies.
#[must_use]
pub fn creation_rules() -> &'static [FieldValidator] {
    const RULES: &[FieldValidator] = &[
        first_name_required,
        last_name_required,
        email_required,
        title_required,
        department_required,
        start_date_required,
        salary_required,
        employment_type_required,
        first_name_format,
        last_name_format,
        email_format,
        phone_format,
        zip_code_format,
        date_of_birth_check,
        title_format,
        department_membership,
        employment_type_membership,
        status_membership,
        start_date_check,
        salary_range,
        intern_salary_cap,
    ];
    RULES
}

/// Validators applied to `PUT /employees/:id` bodies; every field optional.
#[must_use]
pub fn update_rules() -> &'static [FieldValidator] {
    const RULES: &[FieldValidator] = &[
        first_name_format,
        last_name_format,
        email_format,
        phone_format,
        zip_code_format,
        date_of_birth_check,
        title_format,
        department_membership,
        employment_type_membership,
        status_membership,
        start_date_check,
        salary_range,
        intern_salary_cap,
    ];
    RULES
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^\+?[\d\s()\-]{7,20}$")
}

fn zip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^\d{5}(-\d{4})?$")
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[A-Za-z][A-Za-z' \-]*$")
}

/// JSON-pointer lookup; dotted field labels are derived from the pointer.
fn lookup<'a>(body: &'a Value, pointer: &str) -> Option<&'a Value> {
    match body.pointer(pointer) {
        Some(Value::Null) | None => None,
        Some(v) => Some(v),
    }
}

fn field_label(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}

fn required(body: &Value, pointer: &str) -> Option<FieldError> {
    let label = field_label(pointer);
    match lookup(body, pointer) {
        None => Some(FieldError::new(&label, format!("{label} is required"), None)),
        Some(Value::String(s)) if s.is_empty() => Some(FieldError::new(
            &label,
            format!("{label} is required"),
            Some(&Value::String(s.clone())),
        )),
        Some(_) => None,
    }
}

fn string_field<'a>(
    body: &'a Value,
    pointer: &str,
) -> Result<Option<&'a str>, FieldError> {
    match lookup(body, pointer) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => {
            let label = field_label(pointer);
            Err(FieldError::new(
                &label,
                format!("{label} must be a string"),
                Some(other),
            ))
        }
    }
}

fn check_name(body: &Value, pointer: &str) -> Option<FieldError> {
    let value = match string_field(body, pointer) {
        Ok(Some(v)) => v,
        Ok(None) => return None,
        Err(e) => return Some(e),
    };
    let label = field_label(pointer);

    let length = value.chars().count();
    if !(1..=50).contains(&length) {
        return Some(FieldError::new(
            &label,
            format!("{label} must be between 1 and 50 characters"),
            lookup(body, pointer),
        ));
    }
    if !name_re().is_match(value) {
        return Some(FieldError::new(
            &label,
            format!("{label} may only contain letters, spaces, hyphens and apostrophes"),
            lookup(body, pointer),
        ));
    }
    None
}

fn check_regex(body: &Value, pointer: &str, re: &Regex, message: &str) -> Option<FieldError> {
    let value = match string_field(body, pointer) {
        Ok(Some(v)) => v,
        Ok(None) => return None,
        Err(e) => return Some(e),
    };
    if re.is_match(value) {
        None
    } else {
        let label = field_label(pointer);
        Some(FieldError::new(
            &label,
            format!("{label} {message}"),
            lookup(body, pointer),
        ))
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

// Required-field rules (creation only)

fn first_name_required(body: &Value) -> Option<FieldError> {
    required(body, "/personalInfo/firstName")
}

fn last_name_required(body: &Value) -> Option<FieldError> {
    required(body, "/personalInfo/lastName")
}

fn email_required(body: &Value) -> Option<FieldError> {
    required(body, "/personalInfo/email")
}

fn title_required(body: &Value) -> Option<FieldError> {
    required(body, "/jobInfo/title")
}

fn department_required(body: &Value) -> Option<FieldError> {
    required(body, "/jobInfo/department")
}

fn start_date_required(body: &Value) -> Option<FieldError> {
    required(body, "/jobInfo/startDate")
}

fn salary_required(body: &Value) -> Option<FieldError> {
    required(body, "/jobInfo/salary")
}

fn employment_type_required(body: &Value) -> Option<FieldError> {
    required(body, "/jobInfo/employmentType")
}

// Format and range rules (shared)

fn first_name_format(body: &Value) -> Option<FieldError> {
    check_name(body, "/personalInfo/firstName")
}

fn last_name_format(body: &Value) -> Option<FieldError> {
    check_name(body, "/personalInfo/lastName")
}

fn email_format(body: &Value) -> Option<FieldError> {
    check_regex(
        body,
        "/personalInfo/email",
        email_re(),
        "must be a valid email address",
    )
}

fn phone_format(body: &Value) -> Option<FieldError> {
    check_regex(
        body,
        "/personalInfo/phone",
        phone_re(),
        "must be a valid phone number",
    )
}

fn zip_code_format(body: &Value) -> Option<FieldError> {
    check_regex(
        body,
        "/personalInfo/address/zipCode",
        zip_re(),
        "must be a valid zip code",
    )
}

fn date_of_birth_check(body: &Value) -> Option<FieldError> {
    let pointer = "/personalInfo/dateOfBirth";
    let value = match string_field(body, pointer) {
        Ok(Some(v)) => v,
        Ok(None) => return None,
        Err(e) => return Some(e),
    };
    let label = field_label(pointer);

    let Some(dob) = parse_date(value) else {
        return Some(FieldError::new(
            &label,
            format!("{label} must be a valid date (YYYY-MM-DD)"),
            lookup(body, pointer),
        ));
    };

    let today = Utc::now().date_naive();
    if dob > today {
        return Some(FieldError::new(
            &label,
            format!("{label} cannot be in the future"),
            lookup(body, pointer),
        ));
    }

    let age = today.years_since(dob).unwrap_or(0);
    if !(AGE_MIN..=AGE_MAX).contains(&age) {
        return Some(FieldError::new(
            &label,
            format!("Employee age must be between {AGE_MIN} and {AGE_MAX}"),
            lookup(body, pointer),
        ));
    }
    None
}

fn title_format(body: &Value) -> Option<FieldError> {
    let pointer = "/jobInfo/title";
    let value = match string_field(body, pointer) {
        Ok(Some(v)) => v,
        Ok(None) => return None,
        Err(e) => return Some(e),
    };
    let length = value.chars().count();
    if !(1..=100).contains(&length) {
        let label = field_label(pointer);
        return Some(FieldError::new(
            &label,
            format!("{label} must be between 1 and 100 characters"),
            lookup(body, pointer),
        ));
    }
    None
}

fn department_membership(body: &Value) -> Option<FieldError> {
    let pointer = "/jobInfo/department";
    let value = match string_field(body, pointer) {
        Ok(Some(v)) => v,
        Ok(None) => return None,
        Err(e) => return Some(e),
    };
    if Department::parse(value).is_some() {
        None
    } else {
        let label = field_label(pointer);
        Some(FieldError::new(
            &label,
            format!("{label} must be one of the supported departments"),
            lookup(body, pointer),
        ))
    }
}

fn employment_type_membership(body: &Value) -> Option<FieldError> {
    let pointer = "/jobInfo/employmentType";
    let value = match string_field(body, pointer) {
        Ok(Some(v)) => v,
        Ok(None) => return None,
        Err(e) => return Some(e),
    };
    if EmploymentType::parse(value).is_some() {
        None
    } else {
        let label = field_label(pointer);
        Some(FieldError::new(
            &label,
            format!("{label} must be one of: full-time, part-time, contract, intern"),
            lookup(body, pointer),
        ))
    }
}

fn status_membership(body: &Value) -> Option<FieldError> {
    let pointer = "/status";
    let value = match string_field(body, pointer) {
        Ok(Some(v)) => v,
        Ok(None) => return None,
        Err(e) => return Some(e),
    };
    if EmployeeStatus::parse(value).is_some() {
        None
    } else {
        Some(FieldError::new(
            "status",
            "status must be one of: active, inactive, terminated",
            lookup(body, pointer),
        ))
    }
}

fn start_date_check(body: &Value) -> Option<FieldError> {
    let pointer = "/jobInfo/startDate";
    let value = match string_field(body, pointer) {
        Ok(Some(v)) => v,
        Ok(None) => return None,
        Err(e) => return Some(e),
    };
    let label = field_label(pointer);

    let Some(start) = parse_date(value) else {
        return Some(FieldError::new(
            &label,
            format!("{label} must be a valid date (YYYY-MM-DD)"),
            lookup(body, pointer),
        ));
    };

    let today = Utc::now().date_naive();
    let horizon = today
        .checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX);
    if start > horizon {
        return Some(FieldError::new(
            &label,
            format!("{label} cannot be more than one year in the future"),
            lookup(body, pointer),
        ));
    }
    None
}

fn salary_range(body: &Value) -> Option<FieldError> {
    let pointer = "/jobInfo/salary";
    let value = lookup(body, pointer)?;
    let label = field_label(pointer);

    let Some(salary) = value.as_i64() else {
        return Some(FieldError::new(
            &label,
            format!("{label} must be a number"),
            Some(value),
        ));
    };
    if !(0..=SALARY_MAX).contains(&salary) {
        return Some(FieldError::new(
            &label,
            format!("{label} must be between 0 and {SALARY_MAX}"),
            Some(value),
        ));
    }
    None
}

fn intern_salary_cap(body: &Value) -> Option<FieldError> {
    let employment_type = lookup(body, "/jobInfo/employmentType")?.as_str()?;
    if employment_type != EmploymentType::Intern.as_str() {
        return None;
    }

    let salary_value = lookup(body, "/jobInfo/salary")?;
    let salary = salary_value.as_i64()?;
    if salary > INTERN_SALARY_CAP {
        return Some(FieldError::new(
            "jobInfo.salary",
            format!("Intern salary cannot exceed ${INTERN_SALARY_CAP}"),
            Some(salary_value),
        ));
    }
    None
}
