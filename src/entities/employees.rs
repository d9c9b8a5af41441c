use sea_orm::entity::prelude::*;

/// Employee record. The primary key is the public `EMP####` identifier;
/// `manager_id` is a weak reference to another row's `employee_id` and
/// carries no foreign-key ownership so reporting chains can be rewired
/// freely.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub employee_id: String,

    pub first_name: String,
    pub last_name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub phone: Option<String>,

    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,

    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,

    pub title: String,
    pub department: String,

    /// Weak reference to another employee's `employee_id`.
    pub manager_id: Option<String>,

    /// `YYYY-MM-DD`
    pub start_date: String,

    pub salary: i64,
    pub employment_type: String,
    pub status: String,

    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
