use sea_orm::DatabaseConnection;

use flux_core::config::DbConfig;
use flux_core::ops::workspaces::{self, CreateWorkspace, JoinWorkspace};
use flux_core::Identity;

use entity::workspace;
use entity::workspace_member::Role;

use migration::{Migrator, MigratorTrait};

/// Fresh in-memory database with the full migration history applied.
/// A single pooled connection keeps the in-memory database alive.
pub async fn setup() -> DatabaseConnection {
    let mut cfg = DbConfig::new("sqlite::memory:");
    cfg.max_connections = 1;
    cfg.min_connections = 1;

    let db = flux_core::db::connect(&cfg).await.expect("open sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

pub fn identity(user_id: &str, name: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        name: name.to_string(),
        email: format!("{user_id}@example.com"),
        image: None,
    }
}

pub async fn create_workspace(
    db: &DatabaseConnection,
    owner: &Identity,
    name: &str,
) -> workspace::Model {
    workspaces::create_workspace(
        db,
        Some(owner),
        CreateWorkspace {
            name: name.to_string(),
            slug: None,
        },
    )
    .await
    .expect("create workspace")
}

/// Join via the invite code (lands as VIEWER), then have the admin set
/// the requested role.
pub async fn add_member(
    db: &DatabaseConnection,
    admin: &Identity,
    ws: &workspace::Model,
    user: &Identity,
    role: Role,
) {
    workspaces::join_workspace(
        db,
        Some(user),
        JoinWorkspace {
            invite_code: ws.invite_code.clone(),
        },
    )
    .await
    .expect("join workspace");

    if role != Role::Viewer {
        workspaces::update_member_role(db, Some(admin), &ws.id, &user.user_id, role)
            .await
            .expect("set member role");
    }
}
