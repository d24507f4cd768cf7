//! Shared fixtures for the cross-crate suites in `tests/`.
//!
//! Services run against the in-memory document store, the real session
//! registry and local media storage in a temp dir. Password hashing is
//! replaced by [`PlainAuth`] so suites stay fast; the Argon2 adapter has its
//! own unit tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use auth_adapters::InMemorySessionStore;
use domains::models::{Role, User};
use domains::ports::{AuthProvider, DocumentStore};
use domains::Document;
use services::auth::RegisterInput;
use services::posts::NewPost;
use services::views::PostView;
use services::{Ports, ServiceSettings, Services};
use storage_adapters::{LocalMediaStorage, MemoryStore};
use tempfile::TempDir;

/// Reversible "hash" and sequential tokens. Test use only.
#[derive(Default)]
pub struct PlainAuth {
    next_token: AtomicU64,
}

impl AuthProvider for PlainAuth {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        Ok(format!("plain${password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain$") == Some(password)
    }

    fn generate_token(&self) -> String {
        format!("token-{}", self.next_token.fetch_add(1, Ordering::SeqCst))
    }

    fn hash_ip(&self, ip: &str) -> String {
        format!("{:x}", ip.bytes().fold(0xcbf29ce484222325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x100000001b3)))
    }
}

pub struct YieldingStore(pub Arc<MemoryStore>);

#[async_trait]
impl DocumentStore for YieldingStore {
    async fn load(&self) -> anyhow::Result<Document> {
        tokio::task::yield_now().await;
        self.0.load().await
    }

    async fn save(&self, doc: &Document) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.0.save(doc).await
    }
}

pub struct Harness {
    pub services: Services,
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<InMemorySessionStore>,
    pub uploads: TempDir,
}

pub fn harness() -> Harness {
    harness_with(ServiceSettings::default())
}

pub fn harness_with(settings: ServiceSettings) -> Harness {
    let store = Arc::new(MemoryStore::new(Document::default()));
    build(store.clone(), store, settings)
}

/// Like [`harness`], but every load and save yields to the scheduler first,
/// so concurrent mutations interleave at each await point.
pub fn contended_harness() -> Harness {
    let store = Arc::new(MemoryStore::new(Document::default()));
    build(store.clone(), Arc::new(YieldingStore(store)), ServiceSettings::default())
}

fn build(store: Arc<MemoryStore>, port: Arc<dyn DocumentStore>, settings: ServiceSettings) -> Harness {
    let uploads = tempfile::tempdir().expect("temp upload dir");
    let sessions = Arc::new(InMemorySessionStore::new());
    let services = Services::new(
        Ports {
            store: port,
            auth: Arc::new(PlainAuth::default()),
            sessions: sessions.clone(),
            media: Arc::new(LocalMediaStorage::new(uploads.path(), "/static")),
        },
        settings,
    );
    Harness { services, store, sessions, uploads }
}

impl Harness {
    /// Registers `<name>@example.com` with password `secret1`.
    pub async fn user(&self, name: &str) -> User {
        self.account(name, Role::User).await
    }

    pub async fn admin(&self, name: &str) -> User {
        self.account(name, Role::Admin).await
    }

    async fn account(&self, name: &str, role: Role) -> User {
        let input = RegisterInput {
            email: format!("{name}@example.com"),
            password: "secret1".into(),
            username: Some(name.into()),
        };
        let public = self.services.auth.create_account(input, role).await.expect("register");
        self.fresh(public.id).await
    }

    /// Current state of a user, counters included.
    pub async fn fresh(&self, user_id: i64) -> User {
        self.store
            .snapshot()
            .users
            .into_iter()
            .find(|u| u.id == user_id)
            .expect("user exists")
    }

    pub async fn post(&self, author: &User, title: &str) -> PostView {
        self.services
            .posts
            .create(author, new_post(title))
            .await
            .expect("create post")
    }
}

pub fn new_post(title: &str) -> NewPost {
    NewPost {
        title: title.into(),
        content: format!("Body of {title}."),
        summary: None,
        tags: vec!["Rust".into()],
        slug: None,
        cover: None,
        status: Default::default(),
    }
}

/// Smallest valid PNG header; enough for format sniffing.
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
];

#[cfg(feature = "web-axum")]
pub mod http {
    //! Router fixtures for `tower::ServiceExt::oneshot` suites.

    use super::*;
    use api_adapters::{router, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    pub struct TestApp {
        pub router: Router,
        pub store: Arc<MemoryStore>,
        pub uploads: TempDir,
    }

    pub fn app() -> TestApp {
        let h = harness();
        let router = router(AppState::new(h.services), h.uploads.path());
        TestApp { router, store: h.store, uploads: h.uploads }
    }

    impl TestApp {
        pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
            let resp = self.router.clone().oneshot(req).await.expect("infallible");
            let status = resp.status();
            let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }

        pub async fn json(&self, method: &str, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
            let mut req = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json");
            if let Some(t) = token {
                req = req.header("authorization", format!("Bearer {t}"));
            }
            self.send(req.body(Body::from(body.to_string())).expect("request")).await
        }

        pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut req = Request::builder().uri(uri);
            if let Some(t) = token {
                req = req.header("authorization", format!("Bearer {t}"));
            }
            self.send(req.body(Body::empty()).expect("request")).await
        }

        /// Registers and logs in; returns the bearer token.
        pub async fn login(&self, name: &str) -> String {
            let email = format!("{name}@example.com");
            let (status, _) = self
                .json(
                    "POST",
                    "/auth/register",
                    None,
                    serde_json::json!({ "email": email, "password": "secret1", "username": name }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            let (status, body) = self
                .json(
                    "POST",
                    "/auth/login",
                    None,
                    serde_json::json!({ "email": email, "password": "secret1" }),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            body["access_token"].as_str().expect("token").to_string()
        }
    }
}
