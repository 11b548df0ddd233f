use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, AccountKind, EngineError, ResultEngine, UserContext, accounts,
    util::{normalize_display_name, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates an account. Names are unique per user, ignoring case.
    pub async fn store_account(
        &self,
        ctx: &UserContext,
        name: &str,
        kind: AccountKind,
    ) -> ResultEngine<Account> {
        let name = normalize_display_name(name, "account name")?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, ctx).await?;
            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(ctx.user_id.clone()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(format!("account {name} already exists")));
            }

            let account = Account {
                id: Uuid::new_v4(),
                name,
                kind,
            };
            accounts::ActiveModel::new(&account, &ctx.user_id)
                .insert(&db_tx)
                .await?;
            tracing::debug!(account = %account.id, kind = kind.as_str(), "account created");
            Ok(account)
        })
    }

    /// All accounts of the user, sorted by name.
    pub async fn accounts(&self, ctx: &UserContext) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(ctx.user_id.clone()))
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    /// Ids of the user's asset accounts.
    pub(super) async fn asset_account_ids(
        &self,
        db: &DatabaseTransaction,
        ctx: &UserContext,
    ) -> ResultEngine<Vec<Uuid>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(ctx.user_id.clone()))
            .filter(accounts::Column::Kind.eq(AccountKind::Asset.as_str()))
            .all(db)
            .await?;
        models
            .iter()
            .map(|m| parse_uuid(&m.id, "account"))
            .collect()
    }
}
