//! Transaction journals.
//!
//! A journal is one booking event (a purchase, a salary payment, a move between
//! two of the user's accounts). It owns two or more [`transactions`](super::transactions)
//! whose amounts sum to zero, and is the unit tags attach to.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    Withdrawal,
    Deposit,
    Transfer,
}

impl JournalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for JournalKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "withdrawal" => Ok(Self::Withdrawal),
            "deposit" => Ok(Self::Deposit),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidName(format!(
                "invalid journal kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_journals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub date: Date,
    pub description: Option<String>,
    pub budget_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::journal_tags::Entity")]
    JournalTags,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::journal_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new(
        id: Uuid,
        user_id: &str,
        kind: JournalKind,
        date: NaiveDate,
        description: Option<String>,
        budget_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: ActiveValue::Set(id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            kind: ActiveValue::Set(kind.as_str().to_string()),
            date: ActiveValue::Set(date),
            description: ActiveValue::Set(description),
            budget_id: ActiveValue::Set(budget_id.map(|id| id.to_string())),
        }
    }
}
