use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Tag, UserContext, tags,
    util::{normalize_display_name, normalize_name_key},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a tag. Two tags whose normalized names match are duplicates.
    pub async fn store_tag(&self, ctx: &UserContext, tag: &str) -> ResultEngine<Tag> {
        let tag = normalize_display_name(tag, "tag")?;
        let tag_norm = normalize_name_key(&tag);
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, ctx).await?;
            let exists = tags::Entity::find()
                .filter(tags::Column::UserId.eq(ctx.user_id.clone()))
                .filter(tags::Column::TagNorm.eq(tag_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(format!("tag {tag} already exists")));
            }

            let created = Tag {
                id: Uuid::new_v4(),
                tag,
            };
            tags::ActiveModel::new(&created, &ctx.user_id, tag_norm)
                .insert(&db_tx)
                .await?;
            Ok(created)
        })
    }

    /// All tags of the user, sorted case-insensitively.
    pub async fn tags(&self, ctx: &UserContext) -> ResultEngine<Vec<Tag>> {
        let models = tags::Entity::find()
            .filter(tags::Column::UserId.eq(ctx.user_id.clone()))
            .all(&self.database)
            .await?;
        let mut out = models
            .into_iter()
            .map(Tag::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        out.sort_by_key(|t| t.tag.to_lowercase());
        Ok(out)
    }

    pub async fn find_tag(&self, ctx: &UserContext, tag_id: Uuid) -> ResultEngine<Option<Tag>> {
        tags::Entity::find_by_id(tag_id.to_string())
            .filter(tags::Column::UserId.eq(ctx.user_id.clone()))
            .one(&self.database)
            .await?
            .map(Tag::try_from)
            .transpose()
    }
}
