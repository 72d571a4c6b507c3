//! Test utilities for business layer testing with mock servers.
//!
//! This module provides helpers to set up a mock UseThisLink backend and drive
//! the modal commands (login, register, verify-otp, session, QR code) without
//! hitting a real server.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::TestContext;
//!
//! #[tokio::test]
//! async fn test_login() {
//!     let mut test_ctx = TestContext::new().await;
//!     test_ctx.mock_post("/api/login", ResponseTemplate::new(200)).await;
//!
//!     test_ctx.ctx.update::<LoginInput>(|input| {
//!         input.email = "a@b.com".to_owned();
//!         input.password = "pw".to_owned();
//!     });
//!     test_ctx.ctx.enqueue_command::<LoginCommand>();
//!     test_ctx.flush_and_wait().await;
//!
//!     let compute = test_ctx.ctx.cached::<LoginCompute>();
//!     // ... assert on compute.status
//! }
//! ```

#![cfg(all(test, not(target_arch = "wasm32")))]

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use utl_states::{StateCtx, Time};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{method, path},
};

use crate::{BusinessConfig, ModalView, build_state_ctx};

/// Test context that holds a mock server and a configured StateCtx.
pub struct TestContext {
    /// The mock server instance.
    pub mock_server: MockServer,
    /// The state context configured to use the mock server.
    pub ctx: StateCtx,
}

impl TestContext {
    /// Create a new test context with a fresh mock server.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like `new`, with a chance to adjust the config before it is registered.
    pub async fn with_config(adjust: impl FnOnce(&mut BusinessConfig)) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mock_server = MockServer::start().await;
        let mut config = BusinessConfig::new(mock_server.uri());
        adjust(&mut config);

        let mut ctx = build_state_ctx(config);
        ctx.update::<Time>(|time| *time = Time::new(fixed_now()));

        Self { mock_server, ctx }
    }

    /// Opens the dialog on the login panel without waiting for the delay.
    pub fn open_modal(&mut self) {
        self.ctx
            .update::<ModalView>(|view| view.open_login_modal(fixed_now(), chrono::Duration::zero()));
    }

    /// Flush all pending commands and wait for async tasks to complete.
    ///
    /// 1. Sync any pending compute updates
    /// 2. Flush command queue (spawns async tasks)
    /// 3. Await all tasks in the JoinSet, syncing after each completes
    pub async fn flush_and_wait(&mut self) {
        self.ctx.sync_computes();
        self.ctx.flush_commands();

        let timeout = Duration::from_secs(5);
        if tokio::time::timeout(timeout, self.ctx.await_tasks())
            .await
            .is_err()
        {
            panic!(
                "Timed out waiting for pending tasks ({} still in JoinSet)",
                self.ctx.task_count()
            );
        }
    }

    /// Every request the mock server has seen so far.
    pub async fn requests(&self) -> Vec<Request> {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
    }

    // =========================================================================
    // Mock endpoint helpers
    // =========================================================================

    pub async fn mock_post(&self, endpoint: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(response)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_get(&self, endpoint: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(response)
            .mount(&self.mock_server)
            .await;
    }

    /// `/api/login` as the backend answers it: empty 200, or plain-text errors.
    pub async fn mock_login(&self, status: u16, body: &str) {
        self.mock_post(
            "/api/login",
            ResponseTemplate::new(status).set_body_string(body),
        )
        .await;
    }

    pub async fn mock_register_ok(&self) {
        self.mock_post(
            "/api/register",
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "otp_sent"})),
        )
        .await;
    }

    pub async fn mock_json_error(&self, endpoint: &str, status: u16, error: &str) {
        self.mock_post(
            endpoint,
            ResponseTemplate::new(status).set_body_json(serde_json::json!({"error": error})),
        )
        .await;
    }
}

/// Frame clock value used by every test context.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header_regex, query_param};

    use super::*;
    use crate::{
        BannerStyle, CheckSessionCommand, FetchQrCodeCommand, FlowError, FlowStatus,
        LOGIN_FIELDS_REQUIRED, LoginCommand, LoginCompute, LoginInput, LogoutCommand, Navigation,
        OTP_REQUIRED, OtpCompute, OtpInput, OtpSuccess, PASSWORDS_DONT_MATCH, Panel,
        QrCodeUrlCompute, QrImageCompute, QrImageStatus, REGISTER_FIELDS_REQUIRED,
        REGISTRATION_FAILED, REGISTRATION_SUCCESSFUL, RegisterCommand, RegisterCompute,
        RegisterInput, SessionCompute, SessionStatus, ShareLink, VerifyOtpCommand,
        HISTORY_FAILED, HistoryCommand, HistoryCompute, HistoryStatus, ShortenCommand,
        ShortenCompute, ShortenInput, URL_REQUIRED,
    };

    fn fill_login(ctx: &mut StateCtx, email: &str, password: &str) {
        ctx.update::<LoginInput>(|input| {
            input.email = email.to_owned();
            input.password = password.to_owned();
        });
    }

    fn fill_register(ctx: &mut StateCtx, email: &str, password: &str, confirmation: &str) {
        ctx.update::<RegisterInput>(|input| {
            input.email = email.to_owned();
            input.password = password.to_owned();
            input.password_confirmation = confirmation.to_owned();
        });
    }

    fn banner(ctx: &StateCtx) -> Option<(String, BannerStyle)> {
        ctx.state::<ModalView>()
            .banner()
            .map(|banner| (banner.message.clone(), banner.style))
    }

    fn login_status(ctx: &StateCtx) -> FlowStatus {
        ctx.cached::<LoginCompute>()
            .map(|compute| compute.status.clone())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_context_creation() {
        let test_ctx = TestContext::new().await;
        assert!(!test_ctx.mock_server.uri().is_empty());
        assert_eq!(test_ctx.ctx.state::<ModalView>().panel(), Panel::Login);
    }

    // =========================================================================
    // Login
    // =========================================================================

    #[tokio::test]
    async fn test_login_with_empty_field_sends_nothing() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_login(200, "").await;
        fill_login(&mut test_ctx.ctx, "a@b.com", "");

        test_ctx.ctx.enqueue_command::<LoginCommand>();
        test_ctx.flush_and_wait().await;

        assert!(test_ctx.requests().await.is_empty());
        assert_eq!(
            banner(&test_ctx.ctx),
            Some((LOGIN_FIELDS_REQUIRED.to_owned(), BannerStyle::Plain))
        );
        assert!(matches!(
            login_status(&test_ctx.ctx),
            FlowStatus::Failed(FlowError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_rejected_shows_backend_text() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_login(401, "bad credentials\n").await;
        test_ctx.open_modal();
        fill_login(&mut test_ctx.ctx, "a@b.com", "wrong");

        test_ctx.ctx.enqueue_command::<LoginCommand>();
        test_ctx.flush_and_wait().await;

        let view = test_ctx.ctx.state::<ModalView>();
        assert!(view.is_open(), "modal must stay open");
        assert!(view.is_shaking());
        assert_eq!(
            banner(&test_ctx.ctx),
            Some(("bad credentials".to_owned(), BannerStyle::Plain))
        );

        let input = test_ctx.ctx.state::<LoginInput>();
        assert_eq!(input.email, "a@b.com");
        assert!(input.password.is_empty(), "password must be cleared");

        assert_eq!(
            login_status(&test_ctx.ctx),
            FlowStatus::Failed(FlowError::Backend {
                status: 401,
                message: "bad credentials".to_owned()
            })
        );
        assert_eq!(*test_ctx.ctx.state::<Navigation>(), Navigation::Stay);
    }

    #[tokio::test]
    async fn test_login_error_without_body_uses_default() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_login(500, "").await;
        fill_login(&mut test_ctx.ctx, "a@b.com", "pw");

        test_ctx.ctx.enqueue_command::<LoginCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(
            banner(&test_ctx.ctx).map(|(message, _)| message),
            Some(crate::LOGIN_FAILED.to_owned())
        );
    }

    #[tokio::test]
    async fn test_login_success_closes_modal_and_reloads() {
        let mut test_ctx = TestContext::new().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_json(serde_json::json!({"email": "a@b.com", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&test_ctx.mock_server)
            .await;
        test_ctx.open_modal();
        fill_login(&mut test_ctx.ctx, " a@b.com ", "pw");

        test_ctx.ctx.enqueue_command::<LoginCommand>();
        test_ctx.flush_and_wait().await;

        assert!(!test_ctx.ctx.state::<ModalView>().is_open());
        assert!(banner(&test_ctx.ctx).is_none());
        assert_eq!(*test_ctx.ctx.state::<Navigation>(), Navigation::Reload);
        assert_eq!(*test_ctx.ctx.state::<LoginInput>(), LoginInput::default());
        assert_eq!(login_status(&test_ctx.ctx), FlowStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_login_in_flight_is_not_resubmitted() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_post(
                "/api/login",
                ResponseTemplate::new(200).set_delay(Duration::from_millis(100)),
            )
            .await;
        fill_login(&mut test_ctx.ctx, "a@b.com", "pw");

        test_ctx.ctx.enqueue_command::<LoginCommand>();
        test_ctx.ctx.enqueue_command::<LoginCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(test_ctx.requests().await.len(), 1);
        assert_eq!(login_status(&test_ctx.ctx), FlowStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_login_transport_error() {
        // Nothing listens on port 9.
        let mut test_ctx =
            TestContext::with_config(|config| config.api_base_url = "http://127.0.0.1:9".to_owned())
                .await;
        fill_login(&mut test_ctx.ctx, "a@b.com", "pw");

        test_ctx.ctx.enqueue_command::<LoginCommand>();
        test_ctx.flush_and_wait().await;

        assert!(matches!(
            login_status(&test_ctx.ctx),
            FlowStatus::Failed(FlowError::Transport(_))
        ));
        assert!(banner(&test_ctx.ctx).is_some_and(|(message, _)| !message.is_empty()));
    }

    #[tokio::test]
    async fn test_session_cookie_is_kept_after_login() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_post(
                "/api/login",
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "UTL_SESSION=cookie-from-login; Path=/"),
            )
            .await;
        Mock::given(method("GET"))
            .and(path("/api/session"))
            .and(header_regex("cookie", "UTL_SESSION=cookie-from-login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"logged_in": true, "email": "a@b.com"})),
            )
            .mount(&test_ctx.mock_server)
            .await;
        fill_login(&mut test_ctx.ctx, "a@b.com", "pw");

        test_ctx.ctx.enqueue_command::<LoginCommand>();
        test_ctx.flush_and_wait().await;
        test_ctx.ctx.enqueue_command::<CheckSessionCommand>();
        test_ctx.flush_and_wait().await;

        let session = test_ctx.ctx.cached::<SessionCompute>().map(|c| c.status.clone());
        assert_eq!(
            session,
            Some(SessionStatus::SignedIn {
                email: "a@b.com".to_owned()
            })
        );
    }

    #[tokio::test]
    async fn test_session_cookie_stays_with_its_backend() {
        let mut signed_in = TestContext::new().await;
        signed_in
            .mock_post(
                "/api/login",
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "UTL_SESSION=other-backend; Path=/"),
            )
            .await;
        fill_login(&mut signed_in.ctx, "a@b.com", "pw");
        signed_in.ctx.enqueue_command::<LoginCommand>();
        signed_in.flush_and_wait().await;

        // Same host, different port.
        let mut fresh = TestContext::new().await;
        fresh
            .mock_get(
                "/api/session",
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"logged_in": false})),
            )
            .await;
        fresh.ctx.enqueue_command::<CheckSessionCommand>();
        fresh.flush_and_wait().await;

        let requests = fresh.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(
            requests[0].headers.get("cookie").is_none(),
            "a session cookie from another backend was sent"
        );
        assert_eq!(
            fresh.ctx.cached::<SessionCompute>().map(|c| c.status.clone()),
            Some(SessionStatus::SignedOut)
        );
    }

    // =========================================================================
    // Registration
    // =========================================================================

    #[tokio::test]
    async fn test_register_mismatch_sends_nothing() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_register_ok().await;
        test_ctx.ctx.update::<ModalView>(ModalView::show_register);
        fill_register(&mut test_ctx.ctx, "a@b.com", "pw1", "pw2");

        test_ctx.ctx.enqueue_command::<RegisterCommand>();
        test_ctx.flush_and_wait().await;

        assert!(test_ctx.requests().await.is_empty());
        assert_eq!(
            banner(&test_ctx.ctx),
            Some((PASSWORDS_DONT_MATCH.to_owned(), BannerStyle::Plain))
        );
        assert_eq!(test_ctx.ctx.state::<ModalView>().panel(), Panel::Register);
    }

    #[tokio::test]
    async fn test_register_empty_fields_sends_nothing() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_register_ok().await;
        fill_register(&mut test_ctx.ctx, "", "", "");

        test_ctx.ctx.enqueue_command::<RegisterCommand>();
        test_ctx.flush_and_wait().await;

        assert!(test_ctx.requests().await.is_empty());
        assert_eq!(
            banner(&test_ctx.ctx).map(|(message, _)| message),
            Some(REGISTER_FIELDS_REQUIRED.to_owned())
        );
    }

    #[tokio::test]
    async fn test_register_success_moves_to_otp() {
        let mut test_ctx = TestContext::new().await;
        Mock::given(method("POST"))
            .and(path("/api/register"))
            .and(body_json(serde_json::json!({"email": "a@b.com", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "otp_sent"})),
            )
            .expect(1)
            .mount(&test_ctx.mock_server)
            .await;
        test_ctx.ctx.update::<ModalView>(ModalView::show_register);
        fill_register(&mut test_ctx.ctx, "a@b.com", "pw", "pw");

        test_ctx.ctx.enqueue_command::<RegisterCommand>();
        test_ctx.flush_and_wait().await;

        let view = test_ctx.ctx.state::<ModalView>();
        assert_eq!(view.panel(), Panel::Otp);
        assert_eq!(view.title(), "Register with");
        assert!(view.banner().is_none());
        assert_eq!(test_ctx.ctx.state::<OtpInput>().email, "a@b.com");
        assert_eq!(*test_ctx.ctx.state::<RegisterInput>(), RegisterInput::default());
        assert!(matches!(
            test_ctx.ctx.cached::<RegisterCompute>().map(|c| &c.status),
            Some(FlowStatus::Succeeded)
        ));
    }

    #[tokio::test]
    async fn test_register_existing_account_is_emphasized() {
        let mut test_ctx = TestContext::new().await;
        let message = "An account with this email already exists. Please log in.";
        test_ctx.mock_json_error("/api/register", 409, message).await;
        test_ctx.ctx.update::<ModalView>(ModalView::show_register);
        fill_register(&mut test_ctx.ctx, "a@b.com", "pw", "pw");

        test_ctx.ctx.enqueue_command::<RegisterCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(
            banner(&test_ctx.ctx),
            Some((message.to_owned(), BannerStyle::Emphasized))
        );
        assert_eq!(test_ctx.ctx.state::<ModalView>().panel(), Panel::Register);
    }

    #[tokio::test]
    async fn test_register_plain_text_error_uses_default() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_post(
                "/api/register",
                ResponseTemplate::new(500).set_body_string("Failed to send OTP email\n"),
            )
            .await;
        fill_register(&mut test_ctx.ctx, "a@b.com", "pw", "pw");

        test_ctx.ctx.enqueue_command::<RegisterCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(
            banner(&test_ctx.ctx),
            Some((REGISTRATION_FAILED.to_owned(), BannerStyle::Plain))
        );
    }

    // =========================================================================
    // OTP
    // =========================================================================

    fn fill_otp(ctx: &mut StateCtx, code: &str) {
        ctx.update::<ModalView>(ModalView::show_otp);
        ctx.update::<OtpInput>(|input| {
            input.email = "a@b.com".to_owned();
            input.code = code.to_owned();
        });
    }

    #[tokio::test]
    async fn test_otp_empty_code_sends_nothing() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_post("/api/verify-otp", ResponseTemplate::new(200)).await;
        fill_otp(&mut test_ctx.ctx, "");

        test_ctx.ctx.enqueue_command::<VerifyOtpCommand>();
        test_ctx.flush_and_wait().await;

        assert!(test_ctx.requests().await.is_empty());
        assert_eq!(
            banner(&test_ctx.ctx).map(|(message, _)| message),
            Some(OTP_REQUIRED.to_owned())
        );
        assert_eq!(test_ctx.ctx.state::<ModalView>().panel(), Panel::Otp);
    }

    #[tokio::test]
    async fn test_otp_success_redirects_to_dashboard() {
        let mut test_ctx = TestContext::new().await;
        Mock::given(method("POST"))
            .and(path("/api/verify-otp"))
            .and(body_json(serde_json::json!({"email": "a@b.com", "otp": "123456"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&test_ctx.mock_server)
            .await;
        test_ctx.open_modal();
        fill_otp(&mut test_ctx.ctx, "123456");

        test_ctx.ctx.enqueue_command::<VerifyOtpCommand>();
        test_ctx.flush_and_wait().await;

        let view = test_ctx.ctx.state::<ModalView>();
        assert_ne!(view.panel(), Panel::Otp);
        assert!(!view.is_open());
        assert_eq!(
            *test_ctx.ctx.state::<Navigation>(),
            Navigation::Redirect("/dashboard".to_owned())
        );
        assert!(matches!(
            test_ctx.ctx.cached::<OtpCompute>().map(|c| &c.status),
            Some(FlowStatus::Succeeded)
        ));
    }

    #[tokio::test]
    async fn test_otp_success_can_return_to_login() {
        let mut test_ctx =
            TestContext::with_config(|config| config.otp_success = OtpSuccess::ReturnToLogin)
                .await;
        test_ctx.mock_post("/api/verify-otp", ResponseTemplate::new(200)).await;
        fill_otp(&mut test_ctx.ctx, "123456");

        test_ctx.ctx.enqueue_command::<VerifyOtpCommand>();
        test_ctx.flush_and_wait().await;

        let view = test_ctx.ctx.state::<ModalView>();
        assert_eq!(view.panel(), Panel::Login);
        assert_eq!(view.title(), "Login with");
        assert_eq!(
            banner(&test_ctx.ctx),
            Some((REGISTRATION_SUCCESSFUL.to_owned(), BannerStyle::Success))
        );
        assert_eq!(test_ctx.ctx.state::<LoginInput>().email, "a@b.com");
        assert_eq!(*test_ctx.ctx.state::<Navigation>(), Navigation::Stay);
    }

    #[tokio::test]
    async fn test_otp_failure_shows_json_error() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_json_error("/api/verify-otp", 400, "Invalid or expired OTP")
            .await;
        fill_otp(&mut test_ctx.ctx, "000000");

        test_ctx.ctx.enqueue_command::<VerifyOtpCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(
            banner(&test_ctx.ctx),
            Some(("Invalid or expired OTP".to_owned(), BannerStyle::Plain))
        );
        assert_eq!(test_ctx.ctx.state::<ModalView>().panel(), Panel::Otp);
    }

    // =========================================================================
    // Session
    // =========================================================================

    #[tokio::test]
    async fn test_check_session_signed_in() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_get(
                "/api/session",
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"logged_in": true, "email": "a@b.com"})),
            )
            .await;

        test_ctx.ctx.enqueue_command::<CheckSessionCommand>();
        test_ctx.flush_and_wait().await;

        let compute = test_ctx.ctx.cached::<SessionCompute>().cloned().unwrap_or_default();
        assert!(compute.is_signed_in());
        assert_eq!(compute.email(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_check_session_error_is_signed_out() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_get("/api/session", ResponseTemplate::new(500))
            .await;

        test_ctx.ctx.enqueue_command::<CheckSessionCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(
            test_ctx.ctx.cached::<SessionCompute>().map(|c| c.status.clone()),
            Some(SessionStatus::SignedOut)
        );
    }

    #[tokio::test]
    async fn test_logout_reloads_even_without_session() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_post(
                "/api/logout",
                ResponseTemplate::new(401).set_body_string("No session\n"),
            )
            .await;

        test_ctx.ctx.enqueue_command::<LogoutCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(*test_ctx.ctx.state::<Navigation>(), Navigation::Reload);
        assert_eq!(
            test_ctx.ctx.cached::<SessionCompute>().map(|c| c.status.clone()),
            Some(SessionStatus::SignedOut)
        );
    }

    // =========================================================================
    // QR code
    // =========================================================================

    #[tokio::test]
    async fn test_fetch_qr_code_for_share_link() {
        let mut test_ctx = TestContext::new().await;
        let png = vec![0x89_u8, b'P', b'N', b'G'];
        Mock::given(method("GET"))
            .and(path("/api/qrcode"))
            .and(query_param("data", "https://utl.example/abc"))
            .and(query_param("size", "150"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(png.clone()),
            )
            .expect(1)
            .mount(&test_ctx.mock_server)
            .await;

        test_ctx
            .ctx
            .update::<ShareLink>(|link| *link = ShareLink::new("https://utl.example/abc"));
        test_ctx.ctx.run_computed();
        test_ctx.ctx.sync_computes();

        let qr_url = test_ctx
            .ctx
            .cached::<QrCodeUrlCompute>()
            .and_then(|compute| compute.url.clone())
            .expect("QR URL derived from the link");
        assert!(qr_url.starts_with(&test_ctx.mock_server.uri()));

        test_ctx.ctx.enqueue_command::<FetchQrCodeCommand>();
        test_ctx.flush_and_wait().await;

        let compute = test_ctx.ctx.cached::<QrImageCompute>().cloned().unwrap_or_default();
        assert_eq!(compute.png_for(&qr_url), Some(png.as_slice()));
    }

    #[tokio::test]
    async fn test_fetch_qr_code_failure_is_reported() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_get(
                "/api/qrcode",
                ResponseTemplate::new(500).set_body_string("Failed to generate QR code\n"),
            )
            .await;
        test_ctx
            .ctx
            .update::<ShareLink>(|link| *link = ShareLink::new("https://utl.example/abc"));
        test_ctx.ctx.run_computed();
        test_ctx.ctx.sync_computes();

        test_ctx.ctx.enqueue_command::<FetchQrCodeCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(
            test_ctx.ctx.cached::<QrImageCompute>().map(|c| c.status.clone()),
            Some(QrImageStatus::Failed("Failed to generate QR code".to_owned()))
        );
    }

    // =========================================================================
    // Shortening and history
    // =========================================================================

    fn shorten_status(ctx: &StateCtx) -> FlowStatus {
        ctx.cached::<ShortenCompute>()
            .map(|compute| compute.status.clone())
            .unwrap_or_default()
    }

    async fn shorten_to(test_ctx: &mut TestContext, original_url: &str, short_url: &str) {
        Mock::given(method("POST"))
            .and(path("/shorten"))
            .and(body_json(serde_json::json!({"original_url": original_url})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"short_url": short_url})),
            )
            .expect(1)
            .mount(&test_ctx.mock_server)
            .await;
        test_ctx.ctx.update::<ShortenInput>(|input| {
            input.original_url = format!(" {original_url} ");
        });
        test_ctx.ctx.enqueue_command::<ShortenCommand>();
        test_ctx.flush_and_wait().await;
    }

    #[tokio::test]
    async fn test_shorten_fills_share_link() {
        let mut test_ctx = TestContext::new().await;

        shorten_to(&mut test_ctx, "example.com/page", "http://utl.example/abc123").await;

        assert_eq!(shorten_status(&test_ctx.ctx), FlowStatus::Succeeded);
        assert_eq!(
            test_ctx.ctx.state::<ShareLink>().url.as_deref(),
            Some("http://utl.example/abc123")
        );

        let history = test_ctx.ctx.cached::<HistoryCompute>().map(|h| h.entries().to_vec());
        let first = history.as_deref().and_then(<[_]>::first);
        assert_eq!(
            first.map(|entry| (entry.original_url.as_str(), entry.short_url.as_str())),
            Some(("example.com/page", "http://utl.example/abc123"))
        );

        // The QR code follows the new link.
        test_ctx.ctx.run_computed();
        test_ctx.ctx.sync_computes();
        assert!(
            test_ctx
                .ctx
                .cached::<QrCodeUrlCompute>()
                .and_then(|c| c.url.clone())
                .is_some_and(|url| url.contains("abc123"))
        );
    }

    #[tokio::test]
    async fn test_shorten_empty_url_sends_nothing() {
        let mut test_ctx = TestContext::new().await;

        test_ctx.ctx.enqueue_command::<ShortenCommand>();
        test_ctx.flush_and_wait().await;

        assert!(test_ctx.requests().await.is_empty());
        assert_eq!(
            shorten_status(&test_ctx.ctx),
            FlowStatus::Failed(FlowError::validation(URL_REQUIRED))
        );
        assert_eq!(test_ctx.ctx.state::<ShareLink>().url, None);
    }

    #[tokio::test]
    async fn test_shorten_rejected_shows_backend_text() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_post(
                "/shorten",
                ResponseTemplate::new(400).set_body_string("Invalid or incomplete domain\n"),
            )
            .await;
        test_ctx.ctx.update::<ShortenInput>(|input| {
            input.original_url = "localhost".to_owned();
        });

        test_ctx.ctx.enqueue_command::<ShortenCommand>();
        test_ctx.flush_and_wait().await;

        let status = shorten_status(&test_ctx.ctx);
        assert_eq!(
            status.error().map(ToString::to_string),
            Some("Invalid or incomplete domain".to_owned())
        );
        assert_eq!(test_ctx.ctx.state::<ShareLink>().url, None);
    }

    #[tokio::test]
    async fn test_start_new_link_resets_form() {
        let mut test_ctx = TestContext::new().await;
        shorten_to(&mut test_ctx, "example.com/page", "http://utl.example/abc123").await;

        crate::start_new_link(&mut test_ctx.ctx);
        test_ctx.ctx.sync_computes();

        assert_eq!(*test_ctx.ctx.state::<ShortenInput>(), ShortenInput::default());
        assert_eq!(test_ctx.ctx.state::<ShareLink>().url, None);
        assert_eq!(shorten_status(&test_ctx.ctx), FlowStatus::Idle);
        // History survives a reset.
        assert_eq!(
            test_ctx.ctx.cached::<HistoryCompute>().map(|h| h.entries().len()),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_history_is_loaded() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_get(
                "/api/history",
                ResponseTemplate::new(200).set_body_json(serde_json::json!([
                    {
                        "original_url": "http://example.com/b",
                        "short_url": "http://utl.example/bbb",
                        "expiry_date": "2026-04-01",
                        "is_logged_in": true,
                        "user_email": "a@b.com"
                    },
                    {
                        "original_url": "http://example.com/a",
                        "short_url": "http://utl.example/aaa",
                        "expiry_date": "2026-03-20",
                        "is_logged_in": false,
                        "user_email": ""
                    }
                ])),
            )
            .await;

        test_ctx.ctx.enqueue_command::<HistoryCommand>();
        test_ctx.flush_and_wait().await;

        let history = test_ctx
            .ctx
            .cached::<HistoryCompute>()
            .map(|h| h.entries().to_vec())
            .unwrap_or_default();
        let short_urls: Vec<&str> = history.iter().map(|e| e.short_url.as_str()).collect();
        assert_eq!(short_urls, ["http://utl.example/bbb", "http://utl.example/aaa"]);
        assert!(history[0].is_logged_in);
    }

    #[tokio::test]
    async fn test_history_failure_is_reported() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_get(
                "/api/history",
                ResponseTemplate::new(500).set_body_string("Failed to fetch history\n"),
            )
            .await;

        test_ctx.ctx.enqueue_command::<HistoryCommand>();
        test_ctx.flush_and_wait().await;

        assert_eq!(
            test_ctx.ctx.cached::<HistoryCompute>().map(|h| h.status.clone()),
            Some(HistoryStatus::Failed(HISTORY_FAILED.to_owned()))
        );
    }

    // =========================================================================
    // Modal opening
    // =========================================================================

    #[tokio::test]
    async fn test_register_modal_opens_after_delay() {
        let mut test_ctx = TestContext::new().await;

        crate::open_register_modal(&mut test_ctx.ctx);
        let view = test_ctx.ctx.state::<ModalView>();
        assert_eq!(view.panel(), Panel::Register);
        assert!(view.is_opening());
        assert!(!view.is_open());

        let halfway = fixed_now() + chrono::Duration::milliseconds(100);
        test_ctx.ctx.update::<ModalView>(|view| view.tick(halfway));
        assert!(!test_ctx.ctx.state::<ModalView>().is_open());

        let after = fixed_now() + chrono::Duration::milliseconds(230);
        test_ctx.ctx.update::<ModalView>(|view| view.tick(after));
        assert!(test_ctx.ctx.state::<ModalView>().is_open());
    }
}
