use std::collections::HashSet;

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, UserContext, accounts, budgets, tags, users};

use super::Engine;

/// Generates a batch (`$require_all_fn`) and optionally a single
/// (`$require_fn`) lookup of rows owned by the calling user.
///
/// A row that exists but belongs to someone else is reported exactly like a
/// missing one.
macro_rules! impl_owned_lookup {
    ($require_fn:ident, $require_all_fn:ident, $entity:ident, $err_msg:literal) => {
        impl_owned_lookup!($require_all_fn, $entity, $err_msg);

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            ctx: &UserContext,
            id: Uuid,
        ) -> ResultEngine<$entity::Model> {
            $entity::Entity::find_by_id(id.to_string())
                .filter($entity::Column::UserId.eq(ctx.user_id.clone()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
    ($require_all_fn:ident, $entity:ident, $err_msg:literal) => {
        /// Loads every requested row, in the requested order. Duplicates are
        /// collapsed.
        pub(super) async fn $require_all_fn(
            &self,
            db: &DatabaseTransaction,
            ctx: &UserContext,
            ids: &[Uuid],
        ) -> ResultEngine<Vec<$entity::Model>> {
            let mut seen = HashSet::new();
            let unique: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
            let models = $entity::Entity::find()
                .filter($entity::Column::UserId.eq(ctx.user_id.clone()))
                .filter($entity::Column::Id.is_in(unique.iter().map(Uuid::to_string)))
                .all(db)
                .await?;
            if models.len() != unique.len() {
                return Err(EngineError::KeyNotFound($err_msg.to_string()));
            }
            let mut ordered = Vec::with_capacity(models.len());
            for id in unique {
                let id = id.to_string();
                if let Some(model) = models.iter().find(|m| m.id == id) {
                    ordered.push(model.clone());
                }
            }
            Ok(ordered)
        }
    };
}

impl Engine {
    impl_owned_lookup!(require_budget, require_budgets, budgets, "budget not exists");

    impl_owned_lookup!(require_tags, tags, "tag not exists");

    impl_owned_lookup!(require_accounts, accounts, "account not exists");

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        ctx: &UserContext,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(ctx.user_id.clone())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }
}
