use domains::models::RelatedType;
use domains::AppError;
use integration_tests::harness;
use services::auth::LoginInput;
use services::comments::NewComment;

fn say(text: &str, parent_id: Option<i64>) -> NewComment {
    NewComment { content: text.into(), parent_id }
}

#[tokio::test]
async fn deleting_a_user_removes_everything_they_own() {
    let h = harness();
    let root = h.admin("root").await;
    let ann = h.user("ann").await;
    let bob = h.user("bob").await;

    let ann_post = h.post(&ann, "Ann writes").await;
    let bob_post = h.post(&bob, "Bob writes").await;

    // Bob's activity on Ann's post goes with it.
    h.services.comments.create(&bob, ann_post.id, say("nice", None)).await.unwrap();
    h.services.interactions.like(&bob, ann_post.id).await.unwrap();
    h.services.interactions.bookmark(&bob, ann_post.id).await.unwrap();

    // Ann's activity on Bob's post, including replies beneath her comment.
    let ann_comment = h.services.comments.create(&ann, bob_post.id, say("hello", None)).await.unwrap();
    h.services.comments.create(&bob, bob_post.id, say("hi back", Some(ann_comment.id))).await.unwrap();
    let kept = h.services.comments.create(&bob, bob_post.id, say("standalone", None)).await.unwrap();
    h.services.interactions.like(&ann, bob_post.id).await.unwrap();
    h.services.interactions.bookmark(&ann, bob_post.id).await.unwrap();
    h.services.follows.follow(&ann, bob.id).await.unwrap();
    h.services.follows.follow(&bob, ann.id).await.unwrap();
    h.services.history.record(ann.id, bob_post.id).await.unwrap();

    let login = h
        .services
        .auth
        .login(LoginInput { email: "ann@example.com".into(), password: "secret1".into() })
        .await
        .unwrap();

    let report = h.services.users.delete(&root, ann.id).await.unwrap();
    assert_eq!(report.users, 1);
    assert_eq!(report.posts, 1);
    assert_eq!(report.follows, 2);
    assert!(report.comments >= 3);

    let doc = h.store.snapshot();
    assert!(doc.users.iter().all(|u| u.id != ann.id));
    assert!(doc.posts.iter().all(|p| p.author_id != ann.id));
    assert!(doc.comments.iter().all(|c| c.author_id != ann.id && c.post_id != ann_post.id));
    assert_eq!(doc.comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![kept.id]);
    assert!(doc.likes.iter().all(|l| l.user_id != ann.id && l.post_id != ann_post.id));
    assert!(doc.bookmarks.is_empty());
    assert!(doc.follows.is_empty());
    assert!(doc.history.is_empty());
    assert!(doc
        .notifications
        .iter()
        .all(|n| n.user_id != ann.id && !n.is_about(RelatedType::User, ann.id)));

    // Counters on what survived are recomputed.
    let bob_post = doc.posts.iter().find(|p| p.id == bob_post.id).unwrap();
    assert_eq!(bob_post.comments_count, 1);
    assert_eq!(bob_post.likes_count, 0);
    assert_eq!(bob_post.bookmarks_count, 0);
    let bob = doc.users.iter().find(|u| u.id == bob.id).unwrap();
    assert_eq!((bob.followers_count, bob.following_count), (0, 0));

    assert!(matches!(
        h.services.auth.authenticate(&login.access_token).await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(h.sessions.is_empty());
}

#[tokio::test]
async fn only_admins_delete_users_and_never_themselves() {
    let h = harness();
    let root = h.admin("root").await;
    let ann = h.user("ann").await;
    let bob = h.user("bob").await;

    assert!(matches!(h.services.users.delete(&ann, bob.id).await, Err(AppError::Forbidden(_))));
    assert!(matches!(h.services.users.delete(&root, root.id).await, Err(AppError::Forbidden(_))));
    assert!(matches!(h.services.users.delete(&root, 404).await, Err(AppError::NotFound("user", _))));
    assert_eq!(h.store.snapshot().users.len(), 3);
}

#[tokio::test]
async fn deleting_a_post_clears_its_trail() {
    let h = harness();
    let ann = h.user("ann").await;
    let bob = h.user("bob").await;
    let post = h.post(&ann, "Short lived").await;
    let other = h.post(&ann, "Survivor").await;

    h.services.comments.create(&bob, post.id, say("first", None)).await.unwrap();
    h.services.interactions.like(&bob, post.id).await.unwrap();
    h.services.interactions.bookmark(&bob, post.id).await.unwrap();
    h.services.history.record(bob.id, post.id).await.unwrap();
    h.services.history.record(bob.id, other.id).await.unwrap();

    let report = h.services.posts.delete(&ann, post.id).await.unwrap();
    assert_eq!((report.posts, report.comments, report.likes, report.bookmarks), (1, 1, 1, 1));
    assert_eq!(report.history, 1);
    // The comment and like notifications pointed at the post.
    assert_eq!(report.notifications, 2);

    let doc = h.store.snapshot();
    assert_eq!(doc.posts.len(), 1);
    assert!(doc.notifications.is_empty());
    assert_eq!(doc.history.len(), 1);
}

#[tokio::test]
async fn writes_for_a_removed_account_are_refused() {
    let h = harness();
    let root = h.admin("root").await;
    let ann = h.user("ann").await;
    let bob = h.user("bob").await;
    let post = h.post(&ann, "Still here").await;
    h.services.users.delete(&root, bob.id).await.unwrap();
    let saves = h.store.saves();

    // `bob` is the account as a request resolved it just before removal.
    let unauthorized = |res: Result<(), AppError>| matches!(res, Err(AppError::Unauthorized(_)));
    assert!(unauthorized(h.services.comments.create(&bob, post.id, say("late", None)).await.map(drop)));
    assert!(unauthorized(h.services.interactions.like(&bob, post.id).await.map(drop)));
    assert!(unauthorized(h.services.interactions.bookmark(&bob, post.id).await.map(drop)));
    assert!(unauthorized(h.services.follows.follow(&bob, ann.id).await.map(drop)));
    assert!(unauthorized(h.services.history.record(bob.id, post.id).await));
    assert!(unauthorized(h.services.posts.create(&bob, integration_tests::new_post("Ghost")).await.map(drop)));
    assert!(unauthorized(
        h.services.posts.get_by_slug(&post.slug, Some(&bob), "10.0.0.9").await.map(drop)
    ));

    assert_eq!(h.store.saves(), saves);
    let doc = h.store.snapshot();
    assert!(doc.comments.iter().all(|c| c.author_id != bob.id));
    assert!(doc.likes.iter().all(|l| l.user_id != bob.id));
    assert!(doc.bookmarks.iter().all(|b| b.user_id != bob.id));
    assert!(doc.follows.iter().all(|f| f.follower_id != bob.id));
    assert!(doc.history.iter().all(|e| e.user_id != bob.id));
    assert!(doc.posts.iter().all(|p| p.author_id != bob.id));
    assert_eq!(doc.posts.iter().find(|p| p.id == post.id).unwrap().views_count, 0);
    assert_eq!(h.fresh(ann.id).await.followers_count, 0);
}
