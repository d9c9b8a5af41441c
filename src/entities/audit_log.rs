use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub recorded_at: String,

    /// Username of the acting identity; None for anonymous actions.
    pub actor: Option<String>,

    /// Action tag, e.g. `CREATE_EMPLOYEE`.
    pub action: String,

    /// Target resource id, when the action has one.
    pub target_id: Option<String>,

    /// Sanitized request payload as JSON, for create/update actions only.
    pub payload: Option<String>,

    pub remote_addr: Option<String>,

    pub user_agent: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
