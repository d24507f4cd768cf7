use domains::AppError;
use integration_tests::{harness, PNG_BYTES};
use services::auth::{LoginInput, PasswordChange, ProfileUpdate, RegisterInput};

fn register(email: &str) -> RegisterInput {
    RegisterInput { email: email.into(), password: "secret1".into(), username: None }
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let h = harness();
    h.services.auth.register(register("ann@example.com")).await.unwrap();

    let again = h.services.auth.register(register("ANN@example.com")).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert_eq!(h.store.snapshot().users.len(), 1);
}

#[tokio::test]
async fn username_defaults_to_email() {
    let h = harness();
    let user = h.services.auth.register(register("bob@example.com")).await.unwrap();
    assert_eq!(user.username, "bob@example.com");
    assert_eq!(user.id, 1);
}

#[tokio::test]
async fn rejects_bad_input_before_storing() {
    let h = harness();
    let short = RegisterInput { email: "c@example.com".into(), password: "12345".into(), username: None };
    assert!(matches!(h.services.auth.register(short).await, Err(AppError::ValidationError(_))));
    assert!(matches!(
        h.services.auth.register(register("not-an-email")).await,
        Err(AppError::ValidationError(_))
    ));
    assert_eq!(h.store.saves(), 0);
}

#[tokio::test]
async fn login_logout_cycle() {
    let h = harness();
    h.user("dora").await;

    let wrong = h
        .services
        .auth
        .login(LoginInput { email: "dora@example.com".into(), password: "nope!!".into() })
        .await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

    let ok = h
        .services
        .auth
        .login(LoginInput { email: "dora@example.com".into(), password: "secret1".into() })
        .await
        .unwrap();
    assert_eq!(ok.token_type, "bearer");
    let me = h.services.auth.authenticate(&ok.access_token).await.unwrap();
    assert_eq!(me.username, "dora");

    h.services.auth.logout(&ok.access_token).unwrap();
    assert!(matches!(
        h.services.auth.authenticate(&ok.access_token).await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(h.services.auth.logout(&ok.access_token).is_err());
}

#[tokio::test]
async fn profile_updates_keep_emails_unique() {
    let h = harness();
    let eve = h.user("eve").await;
    h.user("fay").await;

    let taken = h
        .services
        .auth
        .update_profile(eve.id, ProfileUpdate { email: Some("fay@example.com".into()), ..Default::default() })
        .await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));

    // Re-submitting one's own address is fine.
    let same = h
        .services
        .auth
        .update_profile(
            eve.id,
            ProfileUpdate {
                email: Some("eve@example.com".into()),
                bio: Some("hello".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.bio, "hello");

    let long_bio = "x".repeat(501);
    let res = h
        .services
        .auth
        .update_profile(eve.id, ProfileUpdate { bio: Some(long_bio), ..Default::default() })
        .await;
    assert!(matches!(res, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn password_change_requires_the_old_one() {
    let h = harness();
    let gus = h.user("gus").await;

    let bad = h
        .services
        .auth
        .change_password(gus.id, PasswordChange { old_password: "wrong1".into(), new_password: "newpass".into() })
        .await;
    assert!(matches!(bad, Err(AppError::Unauthorized(_))));

    h.services
        .auth
        .change_password(gus.id, PasswordChange { old_password: "secret1".into(), new_password: "newpass".into() })
        .await
        .unwrap();
    let login = h
        .services
        .auth
        .login(LoginInput { email: "gus@example.com".into(), password: "newpass".into() })
        .await;
    assert!(login.is_ok());
}

#[tokio::test]
async fn avatar_upload_lands_in_the_side_tree() {
    let h = harness();
    let hal = h.user("hal").await;

    let user = h
        .services
        .auth
        .set_avatar(hal.id, bytes::Bytes::from_static(PNG_BYTES), Some(mime_png()))
        .await
        .unwrap();
    assert_eq!(user.avatar.as_deref(), Some(format!("/static/avatars/{}.png", hal.id).as_str()));
    assert!(h.uploads.path().join("avatars").join(format!("{}.png", hal.id)).exists());

    let not_image = h
        .services
        .auth
        .set_avatar(hal.id, bytes::Bytes::from_static(b"plain text"), None)
        .await;
    assert!(matches!(not_image, Err(AppError::ValidationError(_))));
}

fn mime_png() -> mime::Mime {
    mime::IMAGE_PNG
}
