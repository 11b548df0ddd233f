//! Budgets: named, user-owned spending envelopes.
//!
//! A budget has any number of [`BudgetLimit`](crate::BudgetLimit)s, one per
//! exact period.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub name_norm: String,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_limits::Entity")]
    BudgetLimits,
}

impl Related<super::budget_limits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetLimits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            name: model.name,
            active: model.active,
        })
    }
}

impl ActiveModel {
    pub(crate) fn new(id: Uuid, user_id: &str, name: String, name_norm: String) -> Self {
        Self {
            id: ActiveValue::Set(id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            name: ActiveValue::Set(name),
            name_norm: ActiveValue::Set(name_norm),
            active: ActiveValue::Set(true),
        }
    }
}
