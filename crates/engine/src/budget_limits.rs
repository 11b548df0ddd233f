//! Budget limits.
//!
//! A [`BudgetLimit`] caps a budget for one exact `[start_date, end_date]`
//! period. The triple `(budget_id, start_date, end_date)` is unique: a second
//! submission for the same period updates the existing row.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, RepeatFrequency,
    util::{amount_to_storage, parse_amount, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLimit {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount: Decimal,
    /// Set for limits stored through the repeating-limit entry point.
    pub repeat_freq: Option<RepeatFrequency>,
    pub repeats: bool,
}

impl BudgetLimit {
    pub(crate) fn new(
        budget_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            start_date,
            end_date,
            amount,
            repeat_freq: None,
            repeats: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub start_date: Date,
    pub end_date: Date,
    pub amount: String,
    pub repeat_freq: Option<String>,
    pub repeats: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budget,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BudgetLimit> for ActiveModel {
    fn from(limit: &BudgetLimit) -> Self {
        Self {
            id: ActiveValue::Set(limit.id.to_string()),
            budget_id: ActiveValue::Set(limit.budget_id.to_string()),
            start_date: ActiveValue::Set(limit.start_date),
            end_date: ActiveValue::Set(limit.end_date),
            amount: ActiveValue::Set(amount_to_storage(limit.amount)),
            repeat_freq: ActiveValue::Set(limit.repeat_freq.map(|f| f.as_str().to_string())),
            repeats: ActiveValue::Set(limit.repeats),
        }
    }
}

impl TryFrom<Model> for BudgetLimit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget limit")?,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            start_date: model.start_date,
            end_date: model.end_date,
            amount: parse_amount(&model.amount)?,
            repeat_freq: model
                .repeat_freq
                .as_deref()
                .map(RepeatFrequency::try_from)
                .transpose()?,
            repeats: model.repeats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(repeat_freq: Option<&str>) -> Model {
        Model {
            id: Uuid::new_v4().to_string(),
            budget_id: Uuid::new_v4().to_string(),
            start_date: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2017, 1, 31).unwrap(),
            amount: "100.50".to_string(),
            repeat_freq: repeat_freq.map(str::to_string),
            repeats: false,
        }
    }

    #[test]
    fn stored_rows_parse_amount_and_frequency() {
        let limit = BudgetLimit::try_from(model(Some("monthly"))).unwrap();
        assert_eq!(limit.amount, Decimal::new(10050, 2));
        assert_eq!(limit.repeat_freq, Some(RepeatFrequency::Monthly));
        assert!(matches!(
            BudgetLimit::try_from(model(Some("fortnightly"))),
            Err(EngineError::InvalidPeriod(_))
        ));
    }
}
