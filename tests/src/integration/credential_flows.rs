//! # Credential Integration Flows
//!
//! The credential cache wired to the real HTTP issuer and management client,
//! against an in-process platform that counts how often it issues tokens.
//!
//! ## Flows Tested:
//!
//! 1. **Single flight over HTTP**: concurrent callers cause one token request
//! 2. **Ticket after token**: the ticket is requested with the cached token
//! 3. **Revoked token**: a management call that hits 40001 fails, and the
//!    caller's retry runs with a newly issued token
//! 4. **Short TTL**: a lifetime inside the expiry margin is never reused

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::{Query, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use shared_types::AccountConfig;
    use wx_03_credentials::{
        CredentialCache, CredentialProvider, HttpCredentialIssuer, SystemTimeSource,
        DEFAULT_EXPIRY_MARGIN,
    };
    use wx_05_management::{ManagementApi, ManagementClient};

    // =============================================================================
    // MOCK PLATFORM
    // =============================================================================

    struct Platform {
        ttl_secs: u64,
        token_calls: AtomicUsize,
        ticket_calls: AtomicUsize,
        /// When set, the first issued token is rejected by the menu endpoint.
        revoke_first: AtomicBool,
    }

    impl Platform {
        fn new(ttl_secs: u64) -> Arc<Self> {
            Arc::new(Self {
                ttl_secs,
                token_calls: AtomicUsize::new(0),
                ticket_calls: AtomicUsize::new(0),
                revoke_first: AtomicBool::new(false),
            })
        }

        fn current_token(&self) -> String {
            format!("ACCESS-{}", self.token_calls.load(Ordering::SeqCst))
        }
    }

    type Params = Query<HashMap<String, String>>;

    async fn token(State(platform): State<Arc<Platform>>, Query(q): Params) -> Json<Value> {
        if q.get("appid").map(String::as_str) != Some("wx1") {
            return Json(json!({"errcode": 40013, "errmsg": "invalid appid"}));
        }
        // Widen the window in which concurrent callers overlap.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let n = platform.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Json(json!({"access_token": format!("ACCESS-{n}"), "expires_in": platform.ttl_secs}))
    }

    async fn ticket(State(platform): State<Arc<Platform>>, Query(q): Params) -> Json<Value> {
        if q.get("access_token") != Some(&platform.current_token()) {
            return Json(json!({"errcode": 40001, "errmsg": "invalid credential"}));
        }
        platform.ticket_calls.fetch_add(1, Ordering::SeqCst);
        Json(json!({"errcode": 0, "errmsg": "ok", "ticket": "TICKET", "expires_in": platform.ttl_secs}))
    }

    async fn menu(State(platform): State<Arc<Platform>>, Query(q): Params) -> Json<Value> {
        let presented = q.get("access_token").cloned().unwrap_or_default();
        let revoked = platform.revoke_first.load(Ordering::SeqCst) && presented == "ACCESS-1";
        if revoked || presented != platform.current_token() {
            return Json(json!({"errcode": 40001, "errmsg": "invalid credential"}));
        }
        Json(json!({"menu": {"button": []}}))
    }

    async fn spawn_platform(platform: Arc<Platform>) -> String {
        let app = Router::new()
            .route("/cgi-bin/token", get(token))
            .route("/cgi-bin/ticket/getticket", get(ticket))
            .route("/cgi-bin/menu/get", get(menu))
            .with_state(platform);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn cache(base: &str) -> Arc<CredentialCache> {
        let account = AccountConfig::new("wx1", "secret", "token", false, None).unwrap();
        let issuer = HttpCredentialIssuer::new(base, &account, Duration::from_secs(5)).unwrap();
        Arc::new(CredentialCache::new(
            Arc::new(issuer),
            Arc::new(SystemTimeSource),
            DEFAULT_EXPIRY_MARGIN,
        ))
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_concurrent_callers_share_one_http_refresh() {
        let platform = Platform::new(7200);
        let cache = cache(&spawn_platform(Arc::clone(&platform)).await);

        let callers = (0..32).map(|_| {
            let cache = Arc::clone(&cache);
            async move { cache.access_token().await }
        });
        let tokens = futures::future::join_all(callers).await;

        assert!(tokens.iter().all(|t| t.as_deref() == Ok("ACCESS-1")));
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ticket_is_issued_with_cached_token() {
        let platform = Platform::new(7200);
        let cache = cache(&spawn_platform(Arc::clone(&platform)).await);

        assert_eq!(cache.capability_ticket().await.unwrap(), "TICKET");
        assert_eq!(cache.capability_ticket().await.unwrap(), "TICKET");
        assert_eq!(cache.access_token().await.unwrap(), "ACCESS-1");

        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 1);
        assert_eq!(platform.ticket_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_revoked_token_fails_once_then_caller_retry_succeeds() {
        let platform = Platform::new(7200);
        platform.revoke_first.store(true, Ordering::SeqCst);
        let base = spawn_platform(Arc::clone(&platform)).await;
        let cache = cache(&base);
        let provider: Arc<dyn CredentialProvider> = cache.clone();
        let client = ManagementClient::new(base, provider, Duration::from_secs(5)).unwrap();

        let err = client.get_menu().await.unwrap_err();
        assert_eq!(err.upstream_code(), Some(40001));
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 1);

        let menu = client.get_menu().await.unwrap();
        assert_eq!(menu["menu"]["button"], json!([]));
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.access_token().await.unwrap(), "ACCESS-2");
    }

    #[tokio::test]
    async fn test_lifetime_inside_margin_is_never_reused() {
        let platform = Platform::new(DEFAULT_EXPIRY_MARGIN.as_secs());
        let cache = cache(&spawn_platform(Arc::clone(&platform)).await);

        assert_eq!(cache.access_token().await.unwrap(), "ACCESS-1");
        assert_eq!(cache.access_token().await.unwrap(), "ACCESS-2");
        assert_eq!(platform.token_calls.load(Ordering::SeqCst), 2);
    }
}
