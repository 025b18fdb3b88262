mod common;

use common::{add_member, create_workspace, identity, setup};

use flux_core::ops::activity;
use flux_core::ops::boards::{self, CreateBoard};
use flux_core::ops::tasks::{self, CreateTask, MoveTask};
use flux_core::Error;

use entity::task::TaskStatus;
use entity::workspace_member::Role;

#[tokio::test]
async fn mutations_append_typed_feed_entries() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let b = boards::create_board(
        &db,
        Some(&owner),
        CreateBoard {
            workspace_id: ws.id.clone(),
            name: "General".to_string(),
            slug: None,
            description: None,
            color: None,
        },
    )
    .await
    .unwrap();

    let t = tasks::create_task(
        &db,
        Some(&owner),
        CreateTask {
            board_id: b.id.clone(),
            title: "Ship v1".to_string(),
            description: None,
            status: None,
            priority: None,
            category_id: None,
        },
    )
    .await
    .unwrap();

    tasks::move_task(
        &db,
        Some(&owner),
        &t.id,
        MoveTask {
            status: TaskStatus::Todo,
            target_index: 0,
        },
    )
    .await
    .unwrap();

    let feed = activity::list_activity(&db, Some(&owner), &ws.id, None)
        .await
        .unwrap();
    let events: Vec<&str> = feed.iter().map(|e| e.event.as_str()).collect();

    for expected in ["workspace.created", "board.created", "task.created", "task.moved"] {
        assert!(events.contains(&expected), "missing {expected} in {events:?}");
    }

    let moved = feed.iter().find(|e| e.event == "task.moved").unwrap();
    assert_eq!(moved.task_id.as_deref(), Some(t.id.as_str()));
    assert_eq!(moved.user_id.as_deref(), Some("u-owner"));
    assert!(!moved.read);
}

#[tokio::test]
async fn the_feed_is_member_only() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let viewer = identity("u-viewer", "Vic Viewer");
    add_member(&db, &owner, &ws, &viewer, Role::Viewer).await;

    assert!(activity::list_activity(&db, Some(&viewer), &ws.id, None)
        .await
        .is_ok());

    let stranger = identity("u-stranger", "Sam");
    let err = activity::list_activity(&db, Some(&stranger), &ws.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let err = activity::list_activity(&db, None, &ws.id, None).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn marking_read_flips_every_unread_entry_once() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let touched = activity::mark_all_read(&db, Some(&owner), &ws.id)
        .await
        .unwrap();
    assert!(touched >= 1);

    let again = activity::mark_all_read(&db, Some(&owner), &ws.id)
        .await
        .unwrap();
    assert_eq!(again, 0);

    let feed = activity::list_activity(&db, Some(&owner), &ws.id, None)
        .await
        .unwrap();
    assert!(feed.iter().all(|e| e.read));
}

#[tokio::test]
async fn the_feed_honors_its_limit() {
    let db = setup().await;
    let owner = identity("u-owner", "Olive Owner");
    let ws = create_workspace(&db, &owner, "Acme").await;

    let b = boards::create_board(
        &db,
        Some(&owner),
        CreateBoard {
            workspace_id: ws.id.clone(),
            name: "General".to_string(),
            slug: None,
            description: None,
            color: None,
        },
    )
    .await
    .unwrap();

    for i in 0..5 {
        tasks::create_task(
            &db,
            Some(&owner),
            CreateTask {
                board_id: b.id.clone(),
                title: format!("Task {i}"),
                description: None,
                status: None,
                priority: None,
                category_id: None,
            },
        )
        .await
        .unwrap();
    }

    let feed = activity::list_activity(&db, Some(&owner), &ws.id, Some(3))
        .await
        .unwrap();
    assert_eq!(feed.len(), 3);
}
