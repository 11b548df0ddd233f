use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, JournalKind, ResultEngine, UserContext, journal_tags, journals, transactions,
    util::checked_sum,
};

use super::{Engine, normalize_optional_text, with_tx};

/// One posting of a new journal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostingStore {
    pub account_id: Uuid,
    pub amount: Decimal,
    /// Overrides the journal budget for this posting.
    pub budget_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalStore {
    pub kind: JournalKind,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub budget_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub postings: Vec<PostingStore>,
}

impl Engine {
    /// Books a journal with its postings and tags.
    ///
    /// Postings must be at least two, non-zero, and sum to zero. Every
    /// referenced account, budget and tag must belong to the user.
    pub async fn store_journal(&self, ctx: &UserContext, data: JournalStore) -> ResultEngine<Uuid> {
        if data.postings.len() < 2 {
            return Err(EngineError::InvalidAmount(
                "a journal needs at least two postings".to_string(),
            ));
        }
        if data.postings.iter().any(|p| p.amount.is_zero()) {
            return Err(EngineError::InvalidAmount(
                "posting amount must not be zero".to_string(),
            ));
        }
        let total = checked_sum(data.postings.iter().map(|p| p.amount))?;
        if !total.is_zero() {
            return Err(EngineError::InvalidAmount(format!(
                "postings must balance, off by {total}"
            )));
        }

        let description = normalize_optional_text(data.description.as_deref());
        with_tx!(self, |db_tx| {
            let account_ids: Vec<Uuid> = data.postings.iter().map(|p| p.account_id).collect();
            self.require_accounts(&db_tx, ctx, &account_ids).await?;
            let mut budget_ids: Vec<Uuid> =
                data.postings.iter().filter_map(|p| p.budget_id).collect();
            budget_ids.extend(data.budget_id);
            self.require_budgets(&db_tx, ctx, &budget_ids).await?;
            self.require_tags(&db_tx, ctx, &data.tag_ids).await?;

            let journal_id = Uuid::new_v4();
            journals::ActiveModel::new(
                journal_id,
                &ctx.user_id,
                data.kind,
                data.date,
                description,
                data.budget_id,
            )
            .insert(&db_tx)
            .await?;

            for posting in &data.postings {
                transactions::ActiveModel::new(
                    journal_id,
                    posting.account_id,
                    posting.amount,
                    posting.budget_id,
                )
                .insert(&db_tx)
                .await?;
            }

            let mut seen = Vec::with_capacity(data.tag_ids.len());
            for tag_id in &data.tag_ids {
                if seen.contains(tag_id) {
                    continue;
                }
                seen.push(*tag_id);
                journal_tags::ActiveModel {
                    journal_id: ActiveValue::Set(journal_id.to_string()),
                    tag_id: ActiveValue::Set(tag_id.to_string()),
                }
                .insert(&db_tx)
                .await?;
            }

            tracing::debug!(journal = %journal_id, kind = data.kind.as_str(), "journal stored");
            Ok(journal_id)
        })
    }
}
