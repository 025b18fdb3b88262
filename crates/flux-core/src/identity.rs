use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::now_ts;

use entity::user;

/// Per-request identity supplied by the authentication provider. The core
/// treats this as an opaque oracle and performs no verification itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

/// `None` means no session: every mutating operation rejects it up front.
pub fn require_identity(identity: Option<&Identity>) -> Result<&Identity> {
    identity.ok_or(Error::Unauthorized)
}

/// Upsert the local mirror row for this identity so joins and mail
/// lookups have something to resolve against.
pub async fn sync_user(db: &DatabaseConnection, identity: &Identity) -> Result<user::Model> {
    let now = now_ts();

    if let Some(existing) = user::Entity::find_by_id(identity.user_id.clone())
        .one(db)
        .await?
    {
        let unchanged = existing.name == identity.name
            && existing.email == identity.email
            && existing.image == identity.image;
        if unchanged {
            return Ok(existing);
        }

        let mut active: user::ActiveModel = existing.into();
        active.name = Set(identity.name.clone());
        active.email = Set(identity.email.clone());
        active.image = Set(identity.image.clone());
        active.updated_at = Set(now);
        return Ok(active.update(db).await?);
    }

    let active = user::ActiveModel {
        id: Set(identity.user_id.clone()),
        name: Set(identity.name.clone()),
        email: Set(identity.email.clone()),
        image: Set(identity.image.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(active.insert(db).await?)
}
