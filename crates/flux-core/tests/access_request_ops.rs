mod common;

use common::{add_member, create_workspace, identity, setup};

use flux_core::ops::access_requests::{self, RequestEditAccess};
use flux_core::Error;

use entity::access_request::AccessRequestStatus;
use entity::workspace_member::Role;

fn request_for(workspace_id: &str) -> RequestEditAccess {
    RequestEditAccess {
        workspace_id: workspace_id.to_string(),
        message: Some("I'd like to help".to_string()),
    }
}

#[tokio::test]
async fn viewers_can_request_edit_access_once() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let viewer = identity("u-viewer", "Vic Viewer");
    add_member(&db, &owner, &ws, &viewer, Role::Viewer).await;

    let request = access_requests::request_edit_access(&db, Some(&viewer), request_for(&ws.id))
        .await
        .unwrap();
    assert_eq!(request.status, AccessRequestStatus::Pending);
    assert!(request.reviewed_by.is_none());

    let err = access_requests::request_edit_access(&db, Some(&viewer), request_for(&ws.id))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(err.to_string().contains("already pending"));
}

#[tokio::test]
async fn members_with_edit_access_are_rejected() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let editor = identity("u-editor", "Eddy Editor");
    add_member(&db, &owner, &ws, &editor, Role::Editor).await;

    for actor in [&owner, &editor] {
        let err = access_requests::request_edit_access(&db, Some(actor), request_for(&ws.id))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(err.to_string().contains("already have edit access"));
    }
}

#[tokio::test]
async fn non_members_cannot_request() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let stranger = identity("u-stranger", "Sam");
    let err = access_requests::request_edit_access(&db, Some(&stranger), request_for(&ws.id))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn approval_promotes_the_requester_and_stamps_the_reviewer() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let viewer = identity("u-viewer", "Vic Viewer");
    add_member(&db, &owner, &ws, &viewer, Role::Viewer).await;

    let request = access_requests::request_edit_access(&db, Some(&viewer), request_for(&ws.id))
        .await
        .unwrap();

    // Only admins review.
    let err = access_requests::approve_access_request(&db, Some(&viewer), &request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let reviewed = access_requests::approve_access_request(&db, Some(&owner), &request.id)
        .await
        .unwrap();
    assert_eq!(reviewed.status, AccessRequestStatus::Approved);
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("u-owner"));
    assert!(reviewed.reviewed_at.is_some());

    let members = flux_core::ops::workspaces::list_members(&db, Some(&owner), &ws.id)
        .await
        .unwrap();
    let promoted = members.iter().find(|m| m.user_id == viewer.user_id).unwrap();
    assert_eq!(promoted.role, Role::Editor);

    // A reviewed request cannot be reviewed again.
    let err = access_requests::deny_access_request(&db, Some(&owner), &request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // With edit access granted, further requests are rejected.
    let err = access_requests::request_edit_access(&db, Some(&viewer), request_for(&ws.id))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already have edit access"));
}

#[tokio::test]
async fn denial_keeps_the_viewer_role_and_allows_retry() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let viewer = identity("u-viewer", "Vic Viewer");
    add_member(&db, &owner, &ws, &viewer, Role::Viewer).await;

    let request = access_requests::request_edit_access(&db, Some(&viewer), request_for(&ws.id))
        .await
        .unwrap();
    let denied = access_requests::deny_access_request(&db, Some(&owner), &request.id)
        .await
        .unwrap();
    assert_eq!(denied.status, AccessRequestStatus::Denied);

    let members = flux_core::ops::workspaces::list_members(&db, Some(&owner), &ws.id)
        .await
        .unwrap();
    let unchanged = members.iter().find(|m| m.user_id == viewer.user_id).unwrap();
    assert_eq!(unchanged.role, Role::Viewer);

    // A denied request does not block a fresh ask.
    let retry = access_requests::request_edit_access(&db, Some(&viewer), request_for(&ws.id))
        .await
        .unwrap();
    assert_eq!(retry.status, AccessRequestStatus::Pending);
}

#[tokio::test]
async fn listing_requests_is_admin_only_and_filters_by_status() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let viewer = identity("u-viewer", "Vic Viewer");
    add_member(&db, &owner, &ws, &viewer, Role::Viewer).await;

    let request = access_requests::request_edit_access(&db, Some(&viewer), request_for(&ws.id))
        .await
        .unwrap();

    let err = access_requests::list_access_requests(&db, Some(&viewer), &ws.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let pending = access_requests::list_access_requests(
        &db,
        Some(&owner),
        &ws.id,
        Some(AccessRequestStatus::Pending),
    )
    .await
    .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, request.id);

    access_requests::deny_access_request(&db, Some(&owner), &request.id)
        .await
        .unwrap();
    let pending = access_requests::list_access_requests(
        &db,
        Some(&owner),
        &ws.id,
        Some(AccessRequestStatus::Pending),
    )
    .await
    .unwrap();
    assert!(pending.is_empty());
}
