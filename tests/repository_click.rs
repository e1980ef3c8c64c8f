mod common;

use std::sync::Arc;

use golinks::domain::click_event::ClickEvent;
use golinks::domain::entities::Role;
use golinks::domain::ownership::OwnershipGuard;
use golinks::domain::repositories::{ClickRepository, LinkRepository};
use golinks::error::StoreError;
use golinks::infrastructure::persistence::{
    SqlClickRepository, SqlLinkRepository, SqlOwnershipRepository,
};
use uuid::Uuid;

#[tokio::test]
async fn test_record_and_read_clicks() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", owner.id).await;
    let repo = SqlClickRepository::new(&t.db);

    let event = ClickEvent::new(
        link.id,
        Some(owner.id),
        Some("abc".to_string()),
        Some("curl/8.0"),
        None,
    );
    let click = repo.record_click(&event).await.unwrap();
    repo.record_click(&ClickEvent::new(link.id, None, None, None, Some("https://ref.example.com")))
        .await
        .unwrap();

    assert_eq!(click.link_id, link.id);
    assert_eq!(repo.count_for_link(link.id).await.unwrap(), 2);

    let recent = repo.recent_for_link(link.id, 10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent[0].clicked_at >= recent[1].clicked_at);
    assert!(
        recent
            .iter()
            .any(|c| c.user_id == Some(owner.id) && c.user_agent.as_deref() == Some("curl/8.0"))
    );

    assert_eq!(repo.recent_for_link(link.id, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_record_click_for_deleted_link() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", owner.id).await;
    SqlLinkRepository::new(&t.db).delete(link.id).await.unwrap();

    let result = SqlClickRepository::new(&t.db)
        .record_click(&ClickEvent::new(link.id, None, None, None, None))
        .await;

    assert!(matches!(
        result,
        Err(StoreError::NotFound { entity: "link", .. })
    ));
}

#[tokio::test]
async fn test_deleting_link_removes_clicks() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", owner.id).await;
    let repo = SqlClickRepository::new(&t.db);

    repo.record_click(&ClickEvent::new(link.id, None, None, None, None))
        .await
        .unwrap();
    SqlLinkRepository::new(&t.db).delete(link.id).await.unwrap();

    assert_eq!(repo.count_for_link(link.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_is_owner_or_admin() {
    let t = common::setup_db().await;
    let jane = common::create_test_user(&t.db, "Jane").await;
    let bob = common::create_test_user(&t.db, "Bob").await;
    let eve = common::create_test_user(&t.db, "Eve").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", jane.id).await;
    SqlLinkRepository::new(&t.db)
        .add_owner(link.id, bob.id)
        .await
        .unwrap();

    let guard = OwnershipGuard::new(Arc::new(SqlOwnershipRepository::new(&t.db)));

    assert!(guard.is_owner_or_admin(jane.id, link.id, Role::User).await.unwrap());
    assert!(guard.is_owner_or_admin(bob.id, link.id, Role::User).await.unwrap());
    assert!(!guard.is_owner_or_admin(eve.id, link.id, Role::User).await.unwrap());
    assert!(guard.is_owner_or_admin(eve.id, link.id, Role::Admin).await.unwrap());
    assert!(
        !guard
            .is_owner_or_admin(jane.id, Uuid::new_v4(), Role::User)
            .await
            .unwrap()
    );
}
