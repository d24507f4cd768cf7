use domains::models::{NotificationKind, RelatedType};
use domains::{AppError, PageRequest};
use integration_tests::{harness, harness_with};
use services::comments::NewComment;
use services::notifications::NotificationQuery;
use services::ServiceSettings;

fn comment(text: &str) -> NewComment {
    NewComment { content: text.into(), parent_id: None }
}

fn reply(text: &str, parent: i64) -> NewComment {
    NewComment { content: text.into(), parent_id: Some(parent) }
}

#[tokio::test]
async fn comments_count_tracks_live_comments() {
    let h = harness();
    let ann = h.user("ann").await;
    let bob = h.user("bob").await;
    let post = h.post(&ann, "Talk").await;
    let c = &h.services.comments;

    let root = c.create(&bob, post.id, comment("first")).await.unwrap();
    let child = c.create(&ann, post.id, reply("answer", root.id)).await.unwrap();
    c.create(&bob, post.id, reply("deeper", child.id)).await.unwrap();
    let other = c.create(&ann, post.id, comment("second")).await.unwrap();

    let count = |doc: &domains::Document| doc.posts[0].comments_count as usize;
    let doc = h.store.snapshot();
    assert_eq!(count(&doc), 4);
    assert_eq!(count(&doc), doc.comments.len());

    // Removing the root takes both replies along.
    let report = c.delete(&bob, root.id).await.unwrap();
    assert_eq!(report.comments, 3);
    let doc = h.store.snapshot();
    assert_eq!(count(&doc), 1);
    assert_eq!(doc.comments[0].id, other.id);

    c.delete(&ann, other.id).await.unwrap();
    assert_eq!(count(&h.store.snapshot()), 0);
}

#[tokio::test]
async fn listing_is_oldest_first() {
    let h = harness();
    let ann = h.user("ann").await;
    let post = h.post(&ann, "Order").await;
    for text in ["a", "b", "c"] {
        h.services.comments.create(&ann, post.id, comment(text)).await.unwrap();
    }
    let listed = h.services.comments.list(post.id).await.unwrap();
    let texts: Vec<&str> = listed.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn reply_parent_must_be_on_the_same_post() {
    let h = harness();
    let ann = h.user("ann").await;
    let one = h.post(&ann, "One").await;
    let two = h.post(&ann, "Two").await;
    let parent = h.services.comments.create(&ann, one.id, comment("hi")).await.unwrap();

    let res = h.services.comments.create(&ann, two.id, reply("wrong post", parent.id)).await;
    assert!(matches!(res, Err(AppError::ValidationError(_))));
    let missing = h.services.comments.create(&ann, two.id, reply("ghost", 999)).await;
    assert!(matches!(missing, Err(AppError::NotFound("comment", _))));
}

#[tokio::test]
async fn content_rules() {
    let h = harness_with(ServiceSettings { forbidden_words: vec!["spam".into()], ..Default::default() });
    let ann = h.user("ann").await;
    let post = h.post(&ann, "Rules").await;
    let c = &h.services.comments;

    assert!(matches!(c.create(&ann, post.id, comment("   ")).await, Err(AppError::ValidationError(_))));
    assert!(matches!(
        c.create(&ann, post.id, comment(&"x".repeat(1001))).await,
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        c.create(&ann, post.id, comment("Buy SPAM")).await,
        Err(AppError::ValidationError(_))
    ));
    assert!(c.create(&ann, post.id, comment(&"x".repeat(1000))).await.is_ok());
    assert!(matches!(c.create(&ann, 404, comment("hi")).await, Err(AppError::NotFound("post", _))));
}

#[tokio::test]
async fn who_may_delete() {
    let h = harness();
    let author = h.user("author").await;
    let writer = h.user("writer").await;
    let stranger = h.user("stranger").await;
    let post = h.post(&author, "Thread").await;
    let c = &h.services.comments;

    let by_writer = c.create(&writer, post.id, comment("mine")).await.unwrap();
    assert!(matches!(c.delete(&stranger, by_writer.id).await, Err(AppError::Forbidden(_))));
    // The post author moderates their own thread.
    assert!(c.delete(&author, by_writer.id).await.is_ok());
    assert!(matches!(c.delete(&author, by_writer.id).await, Err(AppError::NotFound(..))));
}

#[tokio::test]
async fn comment_and_reply_notifications() {
    let h = harness();
    let author = h.user("author").await;
    let bob = h.user("bob").await;
    let cat = h.user("cat").await;
    let post = h.post(&author, "Notify").await;
    let c = &h.services.comments;

    let root = c.create(&bob, post.id, comment("first")).await.unwrap();
    c.create(&cat, post.id, reply("re", root.id)).await.unwrap();
    // Own comment on own post: nobody is told.
    c.create(&author, post.id, comment("thanks")).await.unwrap();

    let n = &h.services.notifications;
    let to_author = n.list(author.id, NotificationQuery::default()).await.unwrap();
    assert_eq!(to_author.total, 2);
    assert!(to_author.items.iter().all(|x| x.kind == NotificationKind::Comment));
    assert!(to_author.items.iter().all(|x| x.related_type == Some(RelatedType::Post)));

    let to_bob = n.list(bob.id, NotificationQuery::default()).await.unwrap();
    assert_eq!(to_bob.total, 1);
    assert_eq!(to_bob.items[0].kind, NotificationKind::Reply);
    assert_eq!(to_bob.items[0].related_id, Some(post.id));
}

#[tokio::test]
async fn comment_likes_and_user_listing() {
    let h = harness();
    let ann = h.user("ann").await;
    let post = h.post(&ann, "Likes").await;
    let c = h.services.comments.create(&ann, post.id, comment("like me")).await.unwrap();

    h.services.comments.like(c.id).await.unwrap();
    let liked = h.services.comments.like(c.id).await.unwrap();
    assert_eq!(liked.likes, 2);

    let mine = h.services.comments.by_user(ann.id, PageRequest::default()).await.unwrap();
    assert_eq!(mine.total, 1);
    assert!(matches!(h.services.comments.like(77).await, Err(AppError::NotFound("comment", _))));
}
