//! Harness that runs the real auth service in-process so the client
//! session can be exercised against it end to end.

use axum::{extract::Request, middleware, middleware::Next};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use minerva_api::auth::passwords::MIN_BCRYPT_COST;
use minerva_api::auth::{SqliteUserStore, TokenService};
use minerva_api::common::{db, AppState};
use minerva_client::{AuthApi, MemoryPreferences, MemorySecureStore, SessionManager};

pub const SECRET: &str = "e2e_secret_key";

pub struct LiveService {
    pub base_url: String,
    pub tokens: TokenService,
    requests: Arc<AtomicUsize>,
}

impl LiveService {
    /// Binds the full router on 127.0.0.1:0 over an in-memory database.
    /// Every request reaching the router is counted.
    pub async fn spawn() -> Self {
        let pool = db::connect("sqlite::memory:").await.expect("in-memory db");
        let tokens = TokenService::new(SECRET);
        let state = Arc::new(AppState::new(
            Arc::new(SqliteUserStore::new(pool)),
            tokens.clone(),
            MIN_BCRYPT_COST,
        ));

        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();
        let app = minerva_api::build_app(state, None).layer(middleware::from_fn(
            move |req: Request, next: Next| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    next.run(req).await
                }
            },
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

        Self {
            base_url: format!("http://{}", addr),
            tokens,
            requests,
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

pub struct Device {
    pub session: SessionManager,
    pub secure: Arc<MemorySecureStore>,
    pub prefs: Arc<MemoryPreferences>,
}

impl Device {
    /// Fresh install pointed at `base_url`
    pub async fn install(base_url: &str) -> Self {
        let secure = Arc::new(MemorySecureStore::new());
        let prefs = Arc::new(MemoryPreferences::new());
        let session =
            SessionManager::with_api(AuthApi::new(base_url), secure.clone(), prefs.clone()).await;
        Self {
            session,
            secure,
            prefs,
        }
    }
}
