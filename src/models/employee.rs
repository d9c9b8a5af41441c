use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::employees;

/// Public employee identifier shape: `EMP` followed by four digits.
pub fn is_valid_employee_id(id: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^EMP\d{4}$").expect("Invalid regex pattern defined in code"));
    re.is_match(id)
}

/// The ten departments an employee can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Engineering,
    Product,
    Design,
    Marketing,
    Sales,
    Finance,
    #[serde(rename = "Human Resources")]
    HumanResources,
    Operations,
    Legal,
    Support,
}

impl Department {
    pub const ALL: [Self; 10] = [
        Self::Engineering,
        Self::Product,
        Self::Design,
        Self::Marketing,
        Self::Sales,
        Self::Finance,
        Self::HumanResources,
        Self::Operations,
        Self::Legal,
        Self::Support,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Engineering => "Engineering",
            Self::Product => "Product",
            Self::Design => "Design",
            Self::Marketing => "Marketing",
            Self::Sales => "Sales",
            Self::Finance => "Finance",
            Self::HumanResources => "Human Resources",
            Self::Operations => "Operations",
            Self::Legal => "Legal",
            Self::Support => "Support",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.as_str() == value)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "full-time")]
    FullTime,
    #[serde(rename = "part-time")]
    PartTime,
    #[serde(rename = "contract")]
    Contract,
    #[serde(rename = "intern")]
    Intern,
}

impl EmploymentType {
    pub const ALL: [Self; 4] = [Self::FullTime, Self::PartTime, Self::Contract, Self::Intern];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
            Self::Intern => "intern",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Terminated,
}

impl EmployeeStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Terminated];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Terminated => "terminated",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire-shape employee record. Serializes to the nested camelCase JSON the
/// API exposes; the flat storage row maps into this via `From`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: String,
    pub personal_info: PersonalInfo,
    pub job_info: JobInfo,
    pub status: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Employee {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.personal_info.first_name, self.personal_info.last_name
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl Address {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.street.is_none() && self.city.is_none() && self.state.is_none() && self.zip_code.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub title: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    pub start_date: String,
    pub salary: i64,
    pub employment_type: String,
}

impl From<employees::Model> for Employee {
    fn from(model: employees::Model) -> Self {
        let address = Address {
            street: model.street,
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
        };

        Self {
            employee_id: model.employee_id,
            personal_info: PersonalInfo {
                first_name: model.first_name,
                last_name: model.last_name,
                email: model.email,
                phone: model.phone,
                date_of_birth: model.date_of_birth,
                address: if address.is_empty() { None } else { Some(address) },
            },
            job_info: JobInfo {
                title: model.title,
                department: model.department,
                manager: model.manager_id,
                start_date: model.start_date,
                salary: model.salary,
                employment_type: model.employment_type,
            },
            status: model.status,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Deserialization target for a sanitized and validated request body.
/// Every field is optional so the same shape serves create and partial
/// update; presence of a key is what decides whether a column is touched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeePayload {
    pub employee_id: Option<String>,
    pub personal_info: Option<PersonalInfoPayload>,
    pub job_info: Option<JobInfoPayload>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfoPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<AddressPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressPayload {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobInfoPayload {
    pub title: Option<String>,
    pub department: Option<String>,
    /// `None` = key absent (leave untouched); `Some(None)` = explicit null
    /// (clear the manager reference).
    #[serde(deserialize_with = "double_option")]
    pub manager: Option<Option<String>>,
    pub start_date: Option<String>,
    pub salary: Option<i64>,
    pub employment_type: Option<String>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_id_shape() {
        assert!(is_valid_employee_id("EMP0001"));
        assert!(is_valid_employee_id("EMP9999"));
        assert!(!is_valid_employee_id("EMP001"));
        assert!(!is_valid_employee_id("EMP00001"));
        assert!(!is_valid_employee_id("emp0001"));
        assert!(!is_valid_employee_id("EMPL001"));
        assert!(!is_valid_employee_id(""));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(Department::parse("Human Resources"), Some(Department::HumanResources));
        assert_eq!(Department::parse("HR"), None);
        assert_eq!(Department::ALL.len(), 10);

        assert_eq!(EmploymentType::parse("full-time"), Some(EmploymentType::FullTime));
        assert_eq!(EmploymentType::parse("fulltime"), None);

        assert_eq!(EmployeeStatus::parse("terminated"), Some(EmployeeStatus::Terminated));
        assert_eq!(EmployeeStatus::parse("fired"), None);
    }

    #[test]
    fn test_manager_double_option() {
        let absent: EmployeePayload = serde_json::from_value(serde_json::json!({
            "jobInfo": { "title": "Engineer" }
        }))
        .unwrap();
        assert_eq!(absent.job_info.unwrap().manager, None);

        let null: EmployeePayload = serde_json::from_value(serde_json::json!({
            "jobInfo": { "manager": null }
        }))
        .unwrap();
        assert_eq!(null.job_info.unwrap().manager, Some(None));

        let set: EmployeePayload = serde_json::from_value(serde_json::json!({
            "jobInfo": { "manager": "EMP0001" }
        }))
        .unwrap();
        assert_eq!(set.job_info.unwrap().manager, Some(Some("EMP0001".to_string())));
    }
}
