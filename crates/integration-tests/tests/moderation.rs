use domains::{AppError, PageRequest};
use integration_tests::{harness, harness_with};
use services::search::MAX_SUGGESTIONS;
use services::tags::NewTag;
use services::views::SuggestionKind;
use services::ServiceSettings;

fn tag(name: &str) -> NewTag {
    NewTag { name: name.into(), description: None, color: None }
}

#[tokio::test]
async fn anonymous_wall_lifecycle() {
    let h = harness();
    let root = h.admin("root").await;
    let a = &h.services.anonymous;

    let first = a.send("hello wall", "192.168.0.7").await.unwrap();
    let second = a.send("second note", "192.168.0.8").await.unwrap();

    let stored = h.store.snapshot();
    assert!(stored.anonymous_messages.iter().all(|m| !m.ip_hash.contains("192.168")));
    let public = serde_json::to_value(&first).unwrap();
    assert!(public.get("ip_hash").is_none() && public.get("ipHash").is_none());

    let wall = a.list(PageRequest::default()).await.unwrap();
    assert_eq!(wall.items.iter().map(|m| m.id).collect::<Vec<_>>(), vec![second.id, first.id]);

    let removed = a.delete(&root, first.id).await.unwrap();
    assert!(removed.is_deleted);
    assert_eq!(removed.deleted_by, Some(root.id));
    assert!(matches!(a.delete(&root, first.id).await, Err(AppError::NotFound(..))));

    assert_eq!(a.list(PageRequest::default()).await.unwrap().total, 1);
    let everything = a.admin_list(&root, PageRequest::default()).await.unwrap();
    assert_eq!(everything.total, 2);
    // The record itself survives the soft delete.
    assert_eq!(h.store.snapshot().anonymous_messages.len(), 2);
}

#[tokio::test]
async fn anonymous_messages_are_validated() {
    let h = harness_with(ServiceSettings { forbidden_words: vec!["scam".into()], ..Default::default() });
    let ann = h.user("ann").await;
    let a = &h.services.anonymous;

    assert!(matches!(a.send("", "1.1.1.1").await, Err(AppError::ValidationError(_))));
    assert!(matches!(a.send(&"y".repeat(501), "1.1.1.1").await, Err(AppError::ValidationError(_))));
    assert!(matches!(a.send("total SCAM", "1.1.1.1").await, Err(AppError::ValidationError(_))));
    assert!(a.send(&"y".repeat(500), "1.1.1.1").await.is_ok());

    assert!(matches!(a.admin_list(&ann, PageRequest::default()).await, Err(AppError::Forbidden(_))));
    assert!(matches!(a.delete(&ann, 1).await, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn admin_views_require_the_admin_role() {
    let h = harness();
    let root = h.admin("root").await;
    let ann = h.user("ann").await;
    let post = h.post(&ann, "Counted").await;
    h.services.interactions.like(&root, post.id).await.unwrap();
    h.services.posts.get_by_slug(&post.slug, None, "8.8.8.8").await.unwrap();

    let admin = &h.services.admin;
    assert!(matches!(admin.stats(&ann).await, Err(AppError::Forbidden(_))));
    assert!(matches!(admin.users(&ann, PageRequest::default()).await, Err(AppError::Forbidden(_))));

    let stats = admin.stats(&root).await.unwrap();
    assert_eq!((stats.users, stats.posts, stats.likes), (2, 1, 1));
    assert_eq!((stats.users_today, stats.posts_today), (2, 1));
    assert_eq!((stats.total_views, stats.total_likes), (1, 1));

    let users = admin.users(&root, PageRequest::default()).await.unwrap();
    assert_eq!(users.total, 2);
    let posts = admin.posts(&root, PageRequest::default()).await.unwrap();
    assert_eq!(posts.items[0].id, post.id);
    assert_eq!(admin.comments(&root, PageRequest::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn tags_are_managed_by_admins() {
    let h = harness();
    let root = h.admin("root").await;
    let ann = h.user("ann").await;
    let t = &h.services.tags;

    assert!(matches!(t.create(&ann, tag("Rust")).await, Err(AppError::Forbidden(_))));
    let rust = t.create(&root, tag("Rust")).await.unwrap();
    assert!(rust.color.starts_with('#'));
    assert!(matches!(t.create(&root, tag("rust")).await, Err(AppError::Conflict(_))));
    let bad = NewTag { color: Some("red".into()), ..tag("Web") };
    assert!(matches!(t.create(&root, bad).await, Err(AppError::ValidationError(_))));
    t.create(&root, tag("async")).await.unwrap();

    let names: Vec<String> = t.list().await.unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["async", "Rust"]);

    h.post(&ann, "Tagged").await;
    assert_eq!(t.popular(1).await.unwrap()[0].name, "Rust");

    assert!(matches!(t.delete(&ann, rust.id).await, Err(AppError::Forbidden(_))));
    t.delete(&root, rust.id).await.unwrap();
    assert!(matches!(t.delete(&root, rust.id).await, Err(AppError::NotFound("tag", _))));
    // Posts keep the name.
    assert_eq!(h.store.snapshot().posts[0].tags, vec!["Rust"]);
}

#[tokio::test]
async fn search_finds_posts_users_and_suggestions() {
    let h = harness();
    let root = h.admin("root").await;
    let ann = h.user("rustacean").await;
    h.services.tags.create(&root, tag("Rust")).await.unwrap();
    for i in 0..10 {
        h.post(&ann, &format!("Rust note {i}")).await;
    }
    h.post(&ann, "Unrelated").await;

    let s = &h.services.search;
    assert!(matches!(s.posts("   ", PageRequest::default()).await, Err(AppError::ValidationError(_))));
    assert!(matches!(s.suggestions("").await, Err(AppError::ValidationError(_))));

    let posts = s.posts("RUST NOTE", PageRequest::default()).await.unwrap();
    assert_eq!(posts.total, 10);
    let users = s.users("rustac", PageRequest::default()).await.unwrap();
    assert_eq!(users.items.iter().map(|u| u.id).collect::<Vec<_>>(), vec![ann.id]);

    let suggestions = s.suggestions("rust").await.unwrap();
    assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
    assert!(suggestions.iter().all(|x| x.kind == SuggestionKind::Post && x.slug.is_some()));

    let few = s.suggestions("unrel").await.unwrap();
    assert_eq!(few.len(), 1);
    let tag_hit = s.suggestions("rus").await.unwrap();
    assert_eq!(tag_hit.len(), MAX_SUGGESTIONS);
    h.services.tags.create(&root, tag("Unrelenting")).await.unwrap();
    let mixed = s.suggestions("unrel").await.unwrap();
    assert_eq!(mixed.iter().map(|x| x.kind).collect::<Vec<_>>(), vec![SuggestionKind::Post, SuggestionKind::Tag]);
}
