//! # Webhook Integration Flows
//!
//! Drives the full HTTP router built by `GatewayService` the way the platform
//! would: signed query, optional safe-mode envelope, reply decoded on the
//! platform side with its own codec.
//!
//! ## Flows Tested:
//!
//! 1. **Handshake**: signed GET echoes `echostr`, in both modes
//! 2. **Plaintext POST**: message reaches the handler, reply comes back as XML
//! 3. **Safe-mode POST**: envelope opened, reply sealed, platform can open it
//! 4. **Rejections**: tampered envelope, foreign app id, missing envelope
//!    signature, mode mismatch

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use tower::ServiceExt;

    use shared_types::AccountConfig;
    use wx_01_signature::compute_signature;
    use wx_02_envelope::{parse_message, ReplyContent, SecureEnvelopeCodec, StructuredMessage};
    use wx_04_gateway::{GatewayConfig, GatewayService, HandlerFn, MessageHandler, TimeSource};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const KEY: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG";
    const TOKEN: &str = "pamtest";
    const APP_ID: &str = "wxb11529c136998cb6";
    const TS: &str = "1409304348";
    const NONCE: &str = "xxxxxx";
    const REPLY_TIME: u64 = 1_700_000_000;

    const TEXT_MESSAGE: &str = "<xml><ToUserName><![CDATA[gh_account]]></ToUserName>\
        <FromUserName><![CDATA[user_openid]]></FromUserName>\
        <CreateTime>1348831860</CreateTime><MsgType><![CDATA[text]]></MsgType>\
        <Content><![CDATA[hello gateway]]></Content><MsgId>1234567890123456</MsgId></xml>";

    struct FixedClock;

    impl TimeSource for FixedClock {
        fn now(&self) -> u64 {
            REPLY_TIME
        }
    }

    fn config(safe_mode: bool) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.account.app_id = APP_ID.into();
        config.account.app_secret = "secret".into();
        config.account.token = TOKEN.into();
        config.account.safe_mode = safe_mode;
        config.account.encoding_aes_key = safe_mode.then(|| KEY.to_string());
        config
    }

    /// Handler that uppercases text and counts invocations.
    fn uppercase_handler(calls: Arc<AtomicUsize>) -> Arc<dyn MessageHandler> {
        Arc::new(HandlerFn(move |msg: StructuredMessage| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(msg.content().map(|c| ReplyContent::text(c.to_uppercase())))
            }
        }))
    }

    fn router(safe_mode: bool, calls: Arc<AtomicUsize>) -> Router {
        GatewayService::with_clock(
            config(safe_mode),
            uppercase_handler(calls),
            Arc::new(FixedClock),
        )
        .unwrap()
        .router()
    }

    /// The platform's side of the envelope: same account, same key.
    fn platform_codec(app_id: &str) -> SecureEnvelopeCodec {
        let account = AccountConfig::new(app_id, "secret", TOKEN, true, Some(KEY.into())).unwrap();
        SecureEnvelopeCodec::new(&account).unwrap()
    }

    fn signed_query() -> String {
        let signature = compute_signature(TOKEN, TS, NONCE);
        format!("signature={signature}&timestamp={TS}&nonce={NONCE}")
    }

    /// Encrypt `message` as the platform would, returning (body, msg_signature).
    fn platform_envelope(codec: &SecureEnvelopeCodec, message: &str) -> (String, String) {
        let sealed = parse_message(&codec.seal(message, TS, NONCE).unwrap()).unwrap();
        let encrypted = sealed.text("Encrypt").unwrap().to_string();
        let msg_signature = sealed.text("MsgSignature").unwrap().to_string();
        let body = format!(
            "<xml><ToUserName><![CDATA[gh_account]]></ToUserName>\
             <Encrypt><![CDATA[{encrypted}]]></Encrypt></xml>"
        );
        (body, msg_signature)
    }

    fn safe_post(body: String, msg_signature: &str) -> Request<Body> {
        Request::post(format!(
            "/wechat?{}&encrypt_type=aes&msg_signature={msg_signature}",
            signed_query()
        ))
        .body(Body::from(body))
        .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // =============================================================================
    // HANDSHAKE
    // =============================================================================

    #[tokio::test]
    async fn test_handshake_in_both_modes() {
        for safe_mode in [false, true] {
            let response = router(safe_mode, Arc::default())
                .oneshot(
                    Request::get(format!("/wechat?{}&echostr=5837397520665436492", signed_query()))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "safe_mode={safe_mode}");
            assert_eq!(body_string(response).await, "5837397520665436492");
        }
    }

    #[tokio::test]
    async fn test_forged_handshake_is_not_answered() {
        let response = router(false, Arc::default())
            .oneshot(
                Request::get(format!(
                    "/wechat?signature={}&timestamp={TS}&nonce={NONCE}&echostr=abc",
                    compute_signature("wrong-token", TS, NONCE)
                ))
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.is_empty());
    }

    // =============================================================================
    // PLAINTEXT MODE
    // =============================================================================

    #[tokio::test]
    async fn test_plaintext_message_round_trip() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = router(false, Arc::clone(&calls))
            .oneshot(
                Request::post(format!("/wechat?{}", signed_query()))
                    .body(Body::from(TEXT_MESSAGE))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );
        let reply = parse_message(&body_string(response).await).unwrap();
        assert_eq!(reply.to_user_name(), Some("user_openid"));
        assert_eq!(reply.from_user_name(), Some("gh_account"));
        assert_eq!(reply.create_time(), Some(REPLY_TIME));
        assert_eq!(reply.content(), Some("HELLO GATEWAY"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_encrypted_request_to_plaintext_account_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = router(false, Arc::clone(&calls))
            .oneshot(safe_post(TEXT_MESSAGE.to_string(), "anything"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    // =============================================================================
    // SAFE MODE
    // =============================================================================

    #[tokio::test]
    async fn test_safe_mode_round_trip() {
        let calls = Arc::new(AtomicUsize::new(0));
        let platform = platform_codec(APP_ID);
        let (body, msg_signature) = platform_envelope(&platform, TEXT_MESSAGE);

        let response = router(true, Arc::clone(&calls))
            .oneshot(safe_post(body, &msg_signature))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Platform opens the reply envelope with the advertised parameters.
        let raw = body_string(response).await;
        let envelope = parse_message(&raw).unwrap();
        assert!(envelope.text("Content").is_none());
        let inner = platform
            .open(
                envelope.text("MsgSignature"),
                envelope.text("TimeStamp").unwrap(),
                envelope.text("Nonce").unwrap(),
                &raw,
            )
            .unwrap();

        let reply = parse_message(&inner).unwrap();
        assert_eq!(reply.content(), Some("HELLO GATEWAY"));
        assert_eq!(reply.to_user_name(), Some("user_openid"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tampered_envelope_is_unauthorized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (body, msg_signature) = platform_envelope(&platform_codec(APP_ID), TEXT_MESSAGE);
        let tampered = body.replacen("<![CDATA[", "<![CDATA[A", 2);

        let response = router(true, Arc::clone(&calls))
            .oneshot(safe_post(tampered, &msg_signature))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_envelope_for_other_app_is_unauthorized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (body, msg_signature) =
            platform_envelope(&platform_codec("wx_some_other_app"), TEXT_MESSAGE);

        let response = router(true, Arc::clone(&calls))
            .oneshot(safe_post(body, &msg_signature))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_safe_post_without_msg_signature_is_unauthorized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (body, _) = platform_envelope(&platform_codec(APP_ID), TEXT_MESSAGE);

        let response = router(true, Arc::clone(&calls))
            .oneshot(
                Request::post(format!("/wechat?{}&encrypt_type=aes", signed_query()))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_plaintext_post_to_safe_account_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = router(true, Arc::clone(&calls))
            .oneshot(
                Request::post(format!("/wechat?{}", signed_query()))
                    .body(Body::from(TEXT_MESSAGE))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test]
    async fn test_concurrent_safe_mode_requests_are_independent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = router(true, Arc::clone(&calls));
        let platform = Arc::new(platform_codec(APP_ID));

        let requests = (0..16).map(|i| {
            let app = app.clone();
            let platform = Arc::clone(&platform);
            async move {
                let message = TEXT_MESSAGE.replace("hello gateway", &format!("message {i}"));
                let (body, msg_signature) = platform_envelope(&platform, &message);
                let response = app.oneshot(safe_post(body, &msg_signature)).await.unwrap();
                assert_eq!(response.status(), StatusCode::OK);

                let raw = body_string(response).await;
                let envelope = parse_message(&raw).unwrap();
                let inner = platform
                    .open(
                        envelope.text("MsgSignature"),
                        envelope.text("TimeStamp").unwrap(),
                        envelope.text("Nonce").unwrap(),
                        &raw,
                    )
                    .unwrap();
                let reply = parse_message(&inner).unwrap();
                assert_eq!(reply.content(), Some(format!("MESSAGE {i}").as_str()));
            }
        });

        futures::future::join_all(requests).await;
        assert_eq!(calls.load(Ordering::SeqCst), 16);
    }
}
