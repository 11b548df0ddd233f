//! Transactions: the postings of a journal.
//!
//! Each row moves a signed decimal `amount` on one account. A posting may carry
//! its own budget, which takes precedence over the journal's.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use rust_decimal::Decimal;

use crate::util::amount_to_storage;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub journal_id: String,
    pub account_id: String,
    pub amount: String,
    pub budget_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journals::Entity",
        from = "Column::JournalId",
        to = "super::journals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Journal,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Account,
}

impl Related<super::journals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journal.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new(
        journal_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
        budget_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            journal_id: ActiveValue::Set(journal_id.to_string()),
            account_id: ActiveValue::Set(account_id.to_string()),
            amount: ActiveValue::Set(amount_to_storage(amount)),
            budget_id: ActiveValue::Set(budget_id.map(|id| id.to_string())),
        }
    }
}
