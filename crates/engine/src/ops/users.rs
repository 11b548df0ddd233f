use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, UserContext, users, util::normalize_display_name};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a login. The username becomes the owner key of every row
    /// the user creates and is kept exactly as given, minus surrounding
    /// whitespace.
    pub async fn store_user(&self, username: &str, password: &str) -> ResultEngine<UserContext> {
        let username = normalize_display_name(username, "username")?;
        if password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(format!(
                    "user {username} already exists"
                )));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password.to_string()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(user = %username, "user created");
            Ok(UserContext::new(username))
        })
    }
}
