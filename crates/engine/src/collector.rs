//! Journal collector.
//!
//! A [`JournalQuery`] is a list of [`JournalFilter`]s composed before
//! execution. Filters that map onto columns run in SQL against
//! `transactions ⋈ transaction_journals`; the amount sign and opposing-account
//! filters need the loaded rows and run afterwards.
//!
//! Every query is scoped to one user through the journal's `user_id`.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{Condition, ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    ResultEngine, journal_tags, journals,
    journals::JournalKind,
    transactions,
    util::{parse_amount, parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountSign {
    Positive,
    Negative,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalFilter {
    /// Postings on one of these accounts. An empty list matches nothing.
    Accounts(Vec<Uuid>),
    /// Journal date within `[start, end]`.
    Range { start: NaiveDate, end: NaiveDate },
    Types(Vec<JournalKind>),
    /// Journals carrying at least one of these tags.
    Tags(Vec<Uuid>),
    /// Effective budget is one of these.
    Budgets(Vec<Uuid>),
    /// Neither the posting nor its journal has a budget.
    WithoutBudget,
    /// Keep only strictly positive or strictly negative amounts.
    Sign(AmountSign),
    /// Drop postings whose opposing account is one of these.
    OpposingNotIn(Vec<Uuid>),
}

/// One posting with the journal data reports need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectedTransaction {
    pub transaction_id: Uuid,
    pub journal_id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub kind: JournalKind,
    /// Posting budget, falling back to the journal budget.
    pub budget_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    /// Account of the first sibling posting with a different account.
    pub opposing_account_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JournalQuery {
    filters: Vec<JournalFilter>,
}

impl JournalQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: JournalFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn accounts(self, accounts: &[Uuid]) -> Self {
        self.filter(JournalFilter::Accounts(accounts.to_vec()))
    }

    pub fn range(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.filter(JournalFilter::Range { start, end })
    }

    pub fn types(self, kinds: &[JournalKind]) -> Self {
        self.filter(JournalFilter::Types(kinds.to_vec()))
    }

    pub fn tags(self, tags: &[Uuid]) -> Self {
        self.filter(JournalFilter::Tags(tags.to_vec()))
    }

    pub fn budgets(self, budgets: &[Uuid]) -> Self {
        self.filter(JournalFilter::Budgets(budgets.to_vec()))
    }

    pub fn without_budget(self) -> Self {
        self.filter(JournalFilter::WithoutBudget)
    }

    pub fn sign(self, sign: AmountSign) -> Self {
        self.filter(JournalFilter::Sign(sign))
    }

    pub fn opposing_not_in(self, accounts: &[Uuid]) -> Self {
        self.filter(JournalFilter::OpposingNotIn(accounts.to_vec()))
    }

    /// Runs the query for `user_id`, ordered by journal date.
    pub(crate) async fn fetch<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<Vec<CollectedTransaction>> {
        let mut select = transactions::Entity::find()
            .find_also_related(journals::Entity)
            .filter(journals::Column::UserId.eq(user_id.to_string()));

        for filter in &self.filters {
            select = match filter {
                JournalFilter::Accounts(accounts) => select.filter(
                    transactions::Column::AccountId.is_in(accounts.iter().map(Uuid::to_string)),
                ),
                JournalFilter::Range { start, end } => {
                    select.filter(journals::Column::Date.between(*start, *end))
                }
                JournalFilter::Types(kinds) => select.filter(
                    journals::Column::Kind.is_in(kinds.iter().map(|k| k.as_str().to_string())),
                ),
                JournalFilter::Tags(tags) => {
                    let journal_ids = tagged_journal_ids(db, tags).await?;
                    select.filter(transactions::Column::JournalId.is_in(journal_ids))
                }
                JournalFilter::Budgets(budgets) => {
                    let ids: Vec<String> = budgets.iter().map(Uuid::to_string).collect();
                    select.filter(
                        Condition::any()
                            .add(transactions::Column::BudgetId.is_in(ids.clone()))
                            .add(
                                Condition::all()
                                    .add(transactions::Column::BudgetId.is_null())
                                    .add(journals::Column::BudgetId.is_in(ids)),
                            ),
                    )
                }
                JournalFilter::WithoutBudget => select
                    .filter(transactions::Column::BudgetId.is_null())
                    .filter(journals::Column::BudgetId.is_null()),
                JournalFilter::Sign(_) | JournalFilter::OpposingNotIn(_) => select,
            };
        }

        let rows = select
            .order_by_asc(journals::Column::Date)
            .order_by_asc(transactions::Column::JournalId)
            .order_by_asc(transactions::Column::Id)
            .all(db)
            .await?;

        let journal_ids: Vec<String> = rows
            .iter()
            .map(|(tx, _)| tx.journal_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let tags_by_journal = tags_by_journal(db, &journal_ids).await?;
        let siblings = siblings_by_journal(db, &journal_ids).await?;

        let mut collected = Vec::with_capacity(rows.len());
        for (tx, journal) in rows {
            let Some(journal) = journal else { continue };
            let budget_id = match tx.budget_id.as_deref() {
                Some(id) => Some(parse_uuid(id, "budget")?),
                None => parse_optional_uuid(journal.budget_id.as_deref(), "budget")?,
            };
            let opposing_account_id = siblings
                .get(&tx.journal_id)
                .and_then(|postings| {
                    postings
                        .iter()
                        .find(|(id, account)| *id != tx.id && *account != tx.account_id)
                })
                .map(|(_, account)| parse_uuid(account, "account"))
                .transpose()?;
            let tag_ids = tags_by_journal
                .get(&tx.journal_id)
                .map(|tags| {
                    tags.iter()
                        .map(|tag| parse_uuid(tag, "tag"))
                        .collect::<ResultEngine<Vec<_>>>()
                })
                .transpose()?
                .unwrap_or_default();

            collected.push(CollectedTransaction {
                transaction_id: parse_uuid(&tx.id, "transaction")?,
                journal_id: parse_uuid(&tx.journal_id, "journal")?,
                account_id: parse_uuid(&tx.account_id, "account")?,
                amount: parse_amount(&tx.amount)?,
                date: journal.date,
                kind: JournalKind::try_from(journal.kind.as_str())?,
                budget_id,
                tag_ids,
                opposing_account_id,
            });
        }

        Ok(collected
            .into_iter()
            .filter(|tx| self.keeps(tx))
            .collect())
    }

    fn keeps(&self, tx: &CollectedTransaction) -> bool {
        self.filters.iter().all(|filter| match filter {
            JournalFilter::Sign(AmountSign::Positive) => tx.amount > Decimal::ZERO,
            JournalFilter::Sign(AmountSign::Negative) => tx.amount < Decimal::ZERO,
            JournalFilter::OpposingNotIn(accounts) => tx
                .opposing_account_id
                .is_none_or(|opposing| !accounts.contains(&opposing)),
            _ => true,
        })
    }
}

async fn tagged_journal_ids<C: ConnectionTrait>(db: &C, tags: &[Uuid]) -> ResultEngine<Vec<String>> {
    let links = journal_tags::Entity::find()
        .filter(journal_tags::Column::TagId.is_in(tags.iter().map(Uuid::to_string)))
        .all(db)
        .await?;
    Ok(links
        .into_iter()
        .map(|link| link.journal_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect())
}

async fn tags_by_journal<C: ConnectionTrait>(
    db: &C,
    journal_ids: &[String],
) -> ResultEngine<HashMap<String, Vec<String>>> {
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    if journal_ids.is_empty() {
        return Ok(out);
    }
    let links = journal_tags::Entity::find()
        .filter(journal_tags::Column::JournalId.is_in(journal_ids.iter().cloned()))
        .order_by_asc(journal_tags::Column::TagId)
        .all(db)
        .await?;
    for link in links {
        out.entry(link.journal_id).or_default().push(link.tag_id);
    }
    Ok(out)
}

/// `(transaction id, account id)` of every posting, per journal.
async fn siblings_by_journal<C: ConnectionTrait>(
    db: &C,
    journal_ids: &[String],
) -> ResultEngine<HashMap<String, Vec<(String, String)>>> {
    let mut out: HashMap<String, Vec<(String, String)>> = HashMap::new();
    if journal_ids.is_empty() {
        return Ok(out);
    }
    let postings = transactions::Entity::find()
        .filter(transactions::Column::JournalId.is_in(journal_ids.iter().cloned()))
        .order_by_asc(transactions::Column::Id)
        .all(db)
        .await?;
    for posting in postings {
        out.entry(posting.journal_id)
            .or_default()
            .push((posting.id, posting.account_id));
    }
    Ok(out)
}
