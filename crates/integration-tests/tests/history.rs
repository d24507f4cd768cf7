use domains::document::HISTORY_LIMIT;
use domains::AppError;
use integration_tests::harness;

#[tokio::test]
async fn keeps_only_the_most_recent_visits() {
    let h = harness();
    let ann = h.user("ann").await;
    let reader = h.user("reader").await;
    let mut posts = Vec::new();
    for i in 0..7 {
        posts.push(h.post(&ann, &format!("Chapter {i}")).await);
    }

    for post in &posts {
        h.services.history.record(reader.id, post.id).await.unwrap();
    }

    let entries = h.services.history.list(reader.id).await.unwrap();
    assert_eq!(entries.len(), HISTORY_LIMIT);
    let visited: Vec<i64> = entries.iter().map(|e| e.post_id).collect();
    let expected: Vec<i64> = posts.iter().rev().take(HISTORY_LIMIT).map(|p| p.id).collect();
    assert_eq!(visited, expected);
    assert_eq!(h.store.snapshot().history.len(), HISTORY_LIMIT);
}

#[tokio::test]
async fn revisiting_moves_a_post_to_the_front() {
    let h = harness();
    let ann = h.user("ann").await;
    let a = h.post(&ann, "A").await;
    let b = h.post(&ann, "B").await;

    h.services.history.record(ann.id, a.id).await.unwrap();
    h.services.history.record(ann.id, b.id).await.unwrap();
    h.services.history.record(ann.id, a.id).await.unwrap();

    let entries = h.services.history.list(ann.id).await.unwrap();
    assert_eq!(entries.iter().map(|e| e.post_id).collect::<Vec<_>>(), vec![a.id, b.id]);
    assert_eq!(entries[0].slug, "a");
}

#[tokio::test]
async fn reading_by_slug_records_history_for_signed_in_readers() {
    let h = harness();
    let ann = h.user("ann").await;
    let bob = h.user("bob").await;
    let post = h.post(&ann, "Worth reading").await;

    h.services.posts.get_by_slug(&post.slug, None, "10.1.1.1").await.unwrap();
    assert!(h.store.snapshot().history.is_empty());

    h.services.posts.get_by_slug(&post.slug, Some(&bob), "10.1.1.1").await.unwrap();
    let entries = h.services.history.list(bob.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Worth reading");
}

#[tokio::test]
async fn clear_removes_only_the_callers_entries() {
    let h = harness();
    let ann = h.user("ann").await;
    let bob = h.user("bob").await;
    let post = h.post(&ann, "Shared").await;
    h.services.history.record(ann.id, post.id).await.unwrap();
    h.services.history.record(bob.id, post.id).await.unwrap();

    assert_eq!(h.services.history.clear(ann.id).await.unwrap(), 1);
    assert_eq!(h.services.history.clear(ann.id).await.unwrap(), 0);
    assert!(h.services.history.list(ann.id).await.unwrap().is_empty());
    assert_eq!(h.services.history.list(bob.id).await.unwrap().len(), 1);

    assert!(matches!(h.services.history.record(bob.id, 404).await, Err(AppError::NotFound("post", _))));
}
