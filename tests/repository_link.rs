mod common;

use std::sync::Arc;

use golinks::domain::entities::{LinkUpdate, NewLink};
use golinks::domain::repositories::LinkRepository;
use golinks::error::StoreError;
use golinks::infrastructure::persistence::SqlLinkRepository;
use tokio::task::JoinSet;
use uuid::Uuid;

fn new_link(slug: &str, owner_id: Uuid) -> NewLink {
    NewLink {
        slug: slug.to_string(),
        url: "https://example.com/".to_string(),
        title: String::new(),
        description: String::new(),
        owner_id,
    }
}

#[tokio::test]
async fn test_create_link_with_primary_owner() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane Doe").await;
    let repo = SqlLinkRepository::new(&t.db);

    let link = repo.create(new_link("docs", owner.id)).await.unwrap();

    assert_eq!(link.slug, "docs");
    assert_eq!(link.owners.len(), 1);
    assert!(link.owners[0].is_primary);

    let primaries = common::count_rows(
        &t.db,
        "SELECT COUNT(*) FROM link_owners WHERE link_id = ? AND is_primary = 1",
        link.id,
    )
    .await;
    assert_eq!(primaries, 1);

    let found = repo.find_by_id(link.id).await.unwrap().unwrap();
    assert_eq!(found.primary_owner().unwrap().user_id, owner.id);
}

#[tokio::test]
async fn test_create_single_character_slug() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;

    let link = common::create_test_link(&t.db, "a", "https://example.com", owner.id).await;

    assert_eq!(link.slug, "a");
}

#[tokio::test]
async fn test_create_duplicate_slug_any_case() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let service = common::link_service(&t.db);

    service
        .create("wiki", "https://wiki.example.com", "", "", owner.id)
        .await
        .unwrap();

    let again = service
        .create("WIKI", "https://other.example.com", "", "", owner.id)
        .await;
    assert!(matches!(again, Err(StoreError::SlugTaken(slug)) if slug == "wiki"));

    // The repository itself compares case-insensitively too.
    let repo = SqlLinkRepository::new(&t.db);
    let mixed = repo.create(new_link("Wiki", owner.id)).await;
    assert!(matches!(mixed, Err(StoreError::SlugTaken(_))));

    assert_eq!(repo.count_all().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_with_unknown_owner_rolls_back() {
    let t = common::setup_db().await;
    let repo = SqlLinkRepository::new(&t.db);

    let result = repo.create(new_link("orphan", Uuid::new_v4())).await;

    assert!(matches!(
        result,
        Err(StoreError::NotFound { entity: "user", .. })
    ));
    assert!(repo.find_by_slug("orphan").await.unwrap().is_none());
    assert_eq!(repo.count_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_find_by_slug_case_insensitive() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "team-docs", "https://example.com", owner.id).await;

    let service = common::link_service(&t.db);
    let found = service.get_by_slug("Team-Docs").await.unwrap();

    assert_eq!(found.id, link.id);
    assert!(service.get_by_slug("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_list_by_owner_includes_co_owned() {
    let t = common::setup_db().await;
    let jane = common::create_test_user(&t.db, "Jane").await;
    let bob = common::create_test_user(&t.db, "Bob").await;
    let repo = SqlLinkRepository::new(&t.db);

    let janes = common::create_test_link(&t.db, "janes", "https://example.com/j", jane.id).await;
    let bobs = common::create_test_link(&t.db, "bobs", "https://example.com/b", bob.id).await;
    common::create_test_link(&t.db, "other", "https://example.com/o", bob.id).await;

    repo.add_owner(bobs.id, jane.id).await.unwrap();

    let links = repo.list_by_owner(jane.id).await.unwrap();
    let mut slugs: Vec<&str> = links.iter().map(|l| l.slug.as_str()).collect();
    slugs.sort();

    assert_eq!(slugs, vec!["bobs", "janes"]);
    assert!(links.iter().all(|l| l.is_owned_by(jane.id)));
    assert!(links.iter().any(|l| l.id == janes.id));
}

#[tokio::test]
async fn test_update_keeps_slug() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com/old", owner.id).await;
    let repo = SqlLinkRepository::new(&t.db);

    let updated = repo
        .update(
            link.id,
            LinkUpdate {
                url: "https://example.com/new".to_string(),
                title: "Docs".to_string(),
                description: "Team documentation".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.slug, "docs");
    assert_eq!(updated.url, "https://example.com/new");
    assert_eq!(updated.title, "Docs");
    assert_eq!(updated.owners.len(), 1);
    assert!(updated.updated_at >= link.updated_at);
}

#[tokio::test]
async fn test_update_missing_link() {
    let t = common::setup_db().await;
    let repo = SqlLinkRepository::new(&t.db);

    let result = repo
        .update(
            Uuid::new_v4(),
            LinkUpdate {
                url: "https://example.com".to_string(),
                title: String::new(),
                description: String::new(),
            },
        )
        .await;

    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_cascades_owners_and_tags() {
    let t = common::setup_db().await;
    let jane = common::create_test_user(&t.db, "Jane").await;
    let bob = common::create_test_user(&t.db, "Bob").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", jane.id).await;
    let repo = SqlLinkRepository::new(&t.db);

    repo.add_owner(link.id, bob.id).await.unwrap();
    repo.set_tags(link.id, vec!["a".to_string(), "b".to_string()])
        .await
        .unwrap();

    repo.delete(link.id).await.unwrap();

    assert!(repo.find_by_id(link.id).await.unwrap().is_none());
    let owners =
        common::count_rows(&t.db, "SELECT COUNT(*) FROM link_owners WHERE link_id = ?", link.id)
            .await;
    let tags =
        common::count_rows(&t.db, "SELECT COUNT(*) FROM link_tags WHERE link_id = ?", link.id)
            .await;
    assert_eq!(owners, 0);
    assert_eq!(tags, 0);

    let service = common::link_service(&t.db);
    assert!(service.get_by_id(link.id).await.unwrap_err().is_not_found());

    // Second delete is a clean NotFound.
    assert!(repo.delete(link.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_primary_owner_cannot_be_removed() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", owner.id).await;
    let repo = SqlLinkRepository::new(&t.db);

    let result = repo.remove_owner(link.id, owner.id).await;

    assert!(matches!(
        result,
        Err(StoreError::PrimaryOwnerImmutable { .. })
    ));
    let found = repo.find_by_id(link.id).await.unwrap().unwrap();
    assert_eq!(found.owners.len(), 1);
}

#[tokio::test]
async fn test_add_then_remove_co_owner() {
    let t = common::setup_db().await;
    let jane = common::create_test_user(&t.db, "Jane").await;
    let bob = common::create_test_user(&t.db, "Bob").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", jane.id).await;
    let repo = SqlLinkRepository::new(&t.db);

    repo.add_owner(link.id, bob.id).await.unwrap();

    let duplicate = repo.add_owner(link.id, bob.id).await;
    assert!(matches!(duplicate, Err(StoreError::DuplicateOwner { .. })));

    let with_bob = repo.find_by_id(link.id).await.unwrap().unwrap();
    assert_eq!(with_bob.owners.len(), 2);
    assert_eq!(with_bob.co_owners().count(), 1);

    repo.remove_owner(link.id, bob.id).await.unwrap();

    let without_bob = repo.find_by_id(link.id).await.unwrap().unwrap();
    assert!(!without_bob.is_owned_by(bob.id));

    let again = repo.remove_owner(link.id, bob.id).await;
    assert!(again.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_add_owner_unknown_user_or_link() {
    let t = common::setup_db().await;
    let jane = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", jane.id).await;
    let repo = SqlLinkRepository::new(&t.db);

    let unknown_user = repo.add_owner(link.id, Uuid::new_v4()).await;
    assert!(matches!(
        unknown_user,
        Err(StoreError::NotFound { entity: "user", .. })
    ));

    let unknown_link = repo.add_owner(Uuid::new_v4(), jane.id).await;
    assert!(matches!(
        unknown_link,
        Err(StoreError::NotFound { entity: "link", .. })
    ));
}

#[tokio::test]
async fn test_set_tags_is_idempotent() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", owner.id).await;
    let repo = SqlLinkRepository::new(&t.db);

    let desired = vec!["a".to_string(), "b".to_string()];
    let first = repo.set_tags(link.id, desired.clone()).await.unwrap();
    let second = repo.set_tags(link.id, desired).await.unwrap();

    assert_eq!(first, second);

    let rows =
        common::count_rows(&t.db, "SELECT COUNT(*) FROM link_tags WHERE link_id = ?", link.id)
            .await;
    assert_eq!(rows, 2);

    let found = repo.find_by_id(link.id).await.unwrap().unwrap();
    assert_eq!(found.tag_slugs(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_set_tags_replaces_and_dedups() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let link = common::create_test_link(&t.db, "docs", "https://example.com", owner.id).await;
    let repo = SqlLinkRepository::new(&t.db);

    repo.set_tags(link.id, vec!["Engineering Tools".to_string(), "Ops".to_string()])
        .await
        .unwrap();

    let tags = repo
        .set_tags(
            link.id,
            vec![
                "engineering tools".to_string(),
                "  ".to_string(),
                "Engineering  Tools".to_string(),
                "Onboarding".to_string(),
            ],
        )
        .await
        .unwrap();

    let slugs: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, vec!["engineering-tools", "onboarding"]);
    // First display name stored wins.
    assert_eq!(tags[0].name, "Engineering Tools");

    let cleared = repo.set_tags(link.id, Vec::new()).await.unwrap();
    assert!(cleared.is_empty());
    let found = repo.find_by_id(link.id).await.unwrap().unwrap();
    assert!(found.tags.is_empty());
}

#[tokio::test]
async fn test_set_tags_missing_link() {
    let t = common::setup_db().await;
    let repo = SqlLinkRepository::new(&t.db);

    let result = repo.set_tags(Uuid::new_v4(), vec!["a".to_string()]).await;

    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_all_succeed() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let repo = Arc::new(SqlLinkRepository::new(&t.db));

    let mut tasks = JoinSet::new();
    for i in 0..40 {
        let repo = repo.clone();
        tasks.spawn(async move { repo.create(new_link(&format!("p{i}"), owner.id)).await });
    }

    let mut failures = Vec::new();
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result.unwrap() {
            failures.push(e);
        }
    }

    assert!(failures.is_empty(), "failed creates: {failures:?}");
    assert_eq!(repo.count_all().await.unwrap(), 40);

    let primaries = common::count_rows(
        &t.db,
        "SELECT COUNT(*) FROM link_owners WHERE user_id = ? AND is_primary = 1",
        owner.id,
    )
    .await;
    assert_eq!(primaries, 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_set_tags_share_tags() {
    let t = common::setup_db().await;
    let owner = common::create_test_user(&t.db, "Jane").await;
    let repo = Arc::new(SqlLinkRepository::new(&t.db));

    let mut link_ids = Vec::new();
    for i in 0..20 {
        let link =
            common::create_test_link(&t.db, &format!("l{i}"), "https://example.com", owner.id)
                .await;
        link_ids.push(link.id);
    }

    let mut tasks = JoinSet::new();
    for link_id in link_ids.clone() {
        let repo = repo.clone();
        tasks.spawn(async move {
            repo.set_tags(link_id, vec!["Shared".to_string(), "Ops".to_string()])
                .await
        });
    }

    let mut failures = Vec::new();
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result.unwrap() {
            failures.push(e);
        }
    }
    assert!(failures.is_empty(), "failed set_tags: {failures:?}");

    let tags: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(t.db.pool())
        .await
        .unwrap();
    assert_eq!(tags, 2);

    for link_id in link_ids {
        let found = repo.find_by_id(link_id).await.unwrap().unwrap();
        assert_eq!(found.tag_slugs(), vec!["ops", "shared"]);
    }
}

#[tokio::test]
async fn test_lock_contention_is_retryable() {
    let t = common::setup_db().await;

    let holder = t.db.pool().begin_with("BEGIN IMMEDIATE").await.unwrap();

    let mut impatient = t.db.pool().acquire().await.unwrap();
    sqlx::query("PRAGMA busy_timeout = 0")
        .execute(&mut *impatient)
        .await
        .unwrap();
    let err = sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *impatient)
        .await
        .unwrap_err();

    let err = StoreError::from(err);
    assert!(err.is_retryable(), "expected a transient error, got {err:?}");
    assert!(matches!(err, StoreError::Transient(_)));

    holder.rollback().await.unwrap();
}
