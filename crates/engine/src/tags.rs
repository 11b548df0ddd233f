use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A user-defined label attached to journals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub tag: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub tag: String,
    pub tag_norm: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_tags::Entity")]
    JournalTags,
}

impl Related<super::journal_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new(tag: &Tag, user_id: &str, tag_norm: String) -> Self {
        Self {
            id: ActiveValue::Set(tag.id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            tag: ActiveValue::Set(tag.tag.clone()),
            tag_norm: ActiveValue::Set(tag_norm),
        }
    }
}

impl TryFrom<Model> for Tag {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "tag")?,
            tag: model.tag,
        })
    }
}
