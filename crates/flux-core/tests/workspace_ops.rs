mod common;

use common::{add_member, create_workspace, identity, setup};

use flux_core::ops::access_requests::{self, RequestEditAccess};
use flux_core::ops::workspaces::{self, CreateWorkspace, JoinWorkspace, UpdateWorkspace};
use flux_core::Error;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use entity::workspace_member::Role;
use entity::{access_request, workspace, workspace_member};

#[tokio::test]
async fn creating_a_workspace_seeds_the_owner_as_admin() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");

    let ws = create_workspace(&db, &owner, "Acme Corp").await;
    assert_eq!(ws.slug, "acme-corp");
    assert_eq!(ws.owner_user_id, "u-owner");
    assert!(!ws.public_access);

    let members = workspaces::list_members(&db, Some(&owner), &ws.id)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, "u-owner");
    assert_eq!(members[0].role, Role::Admin);
}

#[tokio::test]
async fn creation_requires_a_session_and_a_name() {
    let db = setup().await;

    let err = workspaces::create_workspace(
        &db,
        None,
        CreateWorkspace {
            name: "Ghost".to_string(),
            slug: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    let owner = identity("u-owner", "Olive Owner");
    let err = workspaces::create_workspace(
        &db,
        Some(&owner),
        CreateWorkspace {
            name: "   ".to_string(),
            slug: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn duplicate_slugs_conflict() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");

    create_workspace(&db, &owner, "Acme").await;
    let err = workspaces::create_workspace(
        &db,
        Some(&owner),
        CreateWorkspace {
            name: "acme".to_string(),
            slug: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn the_owner_can_never_be_demoted_or_removed() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let err = workspaces::update_member_role(&db, Some(&owner), &ws.id, "u-owner", Role::Viewer)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let err = workspaces::remove_member(&db, Some(&owner), &ws.id, "u-owner")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    // The member table still holds the owner as ADMIN.
    let row = workspace_member::Entity::find()
        .filter(workspace_member::Column::WorkspaceId.eq(ws.id.clone()))
        .filter(workspace_member::Column::UserId.eq("u-owner"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.role, Role::Admin);
}

#[tokio::test]
async fn joining_by_invite_code_lands_as_viewer() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let guest = identity("u-guest", "Gus Guest");
    let member = workspaces::join_workspace(
        &db,
        Some(&guest),
        JoinWorkspace {
            invite_code: ws.invite_code.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(member.role, Role::Viewer);

    // Joining twice conflicts; a bad code is not found.
    let err = workspaces::join_workspace(
        &db,
        Some(&guest),
        JoinWorkspace {
            invite_code: ws.invite_code.clone(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let err = workspaces::join_workspace(
        &db,
        Some(&identity("u-other", "Otto")),
        JoinWorkspace {
            invite_code: "nope".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn only_admins_manage_members_and_settings() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let editor = identity("u-editor", "Eddy Editor");
    let viewer = identity("u-viewer", "Vic Viewer");
    add_member(&db, &owner, &ws, &editor, Role::Editor).await;
    add_member(&db, &owner, &ws, &viewer, Role::Viewer).await;

    let err =
        workspaces::update_member_role(&db, Some(&editor), &ws.id, &viewer.user_id, Role::Editor)
            .await
            .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let err = workspaces::update_workspace(
        &db,
        Some(&viewer),
        &ws.id,
        UpdateWorkspace {
            public_access: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let updated = workspaces::update_workspace(
        &db,
        Some(&owner),
        &ws.id,
        UpdateWorkspace {
            public_access: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(updated.public_access);
}

#[tokio::test]
async fn members_may_leave_but_cannot_remove_others() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let a = identity("u-a", "Anna");
    let b = identity("u-b", "Ben");
    add_member(&db, &owner, &ws, &a, Role::Viewer).await;
    add_member(&db, &owner, &ws, &b, Role::Viewer).await;

    let err = workspaces::remove_member(&db, Some(&a), &ws.id, &b.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    workspaces::remove_member(&db, Some(&a), &ws.id, &a.user_id)
        .await
        .unwrap();
    workspaces::remove_member(&db, Some(&owner), &ws.id, &b.user_id)
        .await
        .unwrap();

    let members = workspaces::list_members(&db, Some(&owner), &ws.id)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn regenerating_the_invite_code_invalidates_the_old_one() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;
    let old_code = ws.invite_code.clone();

    let refreshed = workspaces::regenerate_invite_code(&db, Some(&owner), &ws.id)
        .await
        .unwrap();
    assert_ne!(refreshed.invite_code, old_code);

    let err = workspaces::join_workspace(
        &db,
        Some(&identity("u-late", "Larry")),
        JoinWorkspace { invite_code: old_code },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn guests_see_public_workspaces_only() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    // No session on a private workspace: Unauthorized.
    let err = workspaces::get_workspace(&db, None, &ws.id).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    // A session without membership: Forbidden.
    let stranger = identity("u-stranger", "Sam");
    let err = workspaces::get_workspace(&db, Some(&stranger), &ws.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    workspaces::update_workspace(
        &db,
        Some(&owner),
        &ws.id,
        UpdateWorkspace {
            public_access: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(workspaces::get_workspace(&db, None, &ws.id).await.is_ok());
    assert!(workspaces::get_workspace_by_slug(&db, Some(&stranger), "acme")
        .await
        .is_ok());
}

#[tokio::test]
async fn list_workspaces_returns_memberships_only() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let other = identity("u-other", "Otto");

    let ws = create_workspace(&db, &owner, "Acme").await;
    create_workspace(&db, &other, "Beta").await;

    let mine = workspaces::list_workspaces(&db, Some(&owner)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, ws.id);
}

#[tokio::test]
async fn deleting_a_workspace_removes_its_access_requests() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let viewer = identity("u-viewer", "Vic Viewer");
    add_member(&db, &owner, &ws, &viewer, Role::Viewer).await;

    access_requests::request_edit_access(
        &db,
        Some(&viewer),
        RequestEditAccess {
            workspace_id: ws.id.clone(),
            message: None,
        },
    )
    .await
    .unwrap();

    // A non-admin cannot delete the workspace.
    let err = workspaces::delete_workspace(&db, Some(&viewer), &ws.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    workspaces::delete_workspace(&db, Some(&owner), &ws.id)
        .await
        .unwrap();

    // No orphaned requests remain queryable by workspace id.
    let leftover = access_request::Entity::find()
        .filter(access_request::Column::WorkspaceId.eq(ws.id.clone()))
        .all(&db)
        .await
        .unwrap();
    assert!(leftover.is_empty());

    assert!(workspace::Entity::find_by_id(ws.id.clone())
        .one(&db)
        .await
        .unwrap()
        .is_none());

    let members = workspace_member::Entity::find()
        .filter(workspace_member::Column::WorkspaceId.eq(ws.id))
        .all(&db)
        .await
        .unwrap();
    assert!(members.is_empty());
}
