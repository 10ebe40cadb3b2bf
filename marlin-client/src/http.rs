//! HTTP transport and API client
//!
//! The transport seam executes prepared requests; the `ApiClient` above
//! it attaches the bearer token, classifies replies, and hosts the
//! session-expiry interceptor. Two transports are provided: a network
//! transport over reqwest and an in-process transport that drives an
//! axum router without a socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;

use shared::auth::{
    AckResponse, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    ResetPasswordRequest, ToggleTwoFactorRequest, TwoFactorStatusResponse, UserProfile,
    VerifyOtpRequest, VerifyOtpResponse,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::flow::FlowType;
use crate::routes::{Destination, Navigator};
use crate::session::SessionStore;

// ============================================================================
// Endpoint Table
// ============================================================================

/// Backend operations the client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    VerifyOtp(FlowType),
    ForgotPassword,
    ResetPassword,
    CurrentUser,
    ToggleTwoFactor,
    TwoFactorStatus,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::CurrentUser | Endpoint::TwoFactorStatus => Method::GET,
            Endpoint::ToggleTwoFactor => Method::PUT,
            _ => Method::POST,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::Login => "/users/login".to_string(),
            Endpoint::Register => "/users/register".to_string(),
            Endpoint::VerifyOtp(flow) => format!("/users/verify-otp?flowType={}", flow.tag()),
            Endpoint::ForgotPassword => "/users/forgot-password".to_string(),
            Endpoint::ResetPassword => "/users/reset-password".to_string(),
            Endpoint::CurrentUser => "/users/me".to_string(),
            Endpoint::ToggleTwoFactor => "/users/toggle-2fa".to_string(),
            Endpoint::TwoFactorStatus => "/users/two-factor-status".to_string(),
        }
    }

    /// The bearer token is attached everywhere except the login and
    /// registration entry points.
    pub fn attaches_token(&self) -> bool {
        !matches!(self, Endpoint::Login | Endpoint::Register)
    }

    /// Auth endpoints are expected to fail without implying an expired
    /// session; the expiry interceptor ignores them.
    pub fn expiry_exempt(&self) -> bool {
        matches!(
            self,
            Endpoint::Login
                | Endpoint::Register
                | Endpoint::VerifyOtp(_)
                | Endpoint::ForgotPassword
                | Endpoint::ResetPassword
        )
    }
}

// ============================================================================
// Transport Seam
// ============================================================================

/// A fully-prepared request handed to a transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Raw reply a transport hands back for classification.
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Executes prepared requests against a backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> ClientResult<ApiReply>;
}

/// Network transport over reqwest.
#[derive(Debug, Clone)]
pub struct NetworkTransport {
    client: reqwest::Client,
    base_url: String,
}

impl NetworkTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    async fn execute(&self, request: ApiRequest) -> ClientResult<ApiReply> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut req = self.client.request(request.method, url);
        if let Some(bearer) = &request.bearer {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", bearer));
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        let response = req.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(ApiReply { status, body })
    }
}

/// In-process transport that drives an axum `Router` without a socket.
///
/// Used for same-process backends and by the integration tests.
#[derive(Clone)]
pub struct InProcessTransport {
    router: axum::Router,
}

impl InProcessTransport {
    pub fn new(router: axum::Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn execute(&self, request: ApiRequest) -> ClientResult<ApiReply> {
        use tower::ServiceExt;

        let mut builder = http::Request::builder()
            .method(request.method)
            .uri(&request.path)
            .header(http::header::CONTENT_TYPE, "application/json");
        if let Some(bearer) = &request.bearer {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", bearer));
        }
        let body = match &request.body {
            Some(value) => axum::body::Body::from(serde_json::to_vec(value)?),
            None => axum::body::Body::empty(),
        };
        let req = builder
            .body(body)
            .map_err(|e| ClientError::Server(format!("Failed to build request: {}", e)))?;

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .map_err(|e| ClientError::Server(format!("In-process call failed: {}", e)))?;

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Server(format!("Failed to read body: {}", e)))?
            .to_vec();
        Ok(ApiReply { status, body })
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Backend API client.
///
/// Wraps a transport with bearer-token attachment and response
/// classification, and hosts the session-expiry interceptor: the first
/// authorization failure from a non-auth endpoint clears the session and
/// redirects to login exactly once, no matter how many concurrent calls
/// fail alongside it. The guard re-arms on the next successful reply.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    handling_expiry: AtomicBool,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            store,
            navigator,
            handling_expiry: AtomicBool::new(false),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let bearer = if endpoint.attaches_token() {
            self.store.token()
        } else {
            None
        };
        let request = ApiRequest {
            method: endpoint.method(),
            path: endpoint.path(),
            bearer,
            body,
        };
        let reply = self.transport.execute(request).await?;
        self.classify(endpoint, reply)
    }

    fn classify<T: DeserializeOwned>(&self, endpoint: Endpoint, reply: ApiReply) -> ClientResult<T> {
        if reply.status.is_success() {
            self.handling_expiry.store(false, Ordering::SeqCst);
            return Ok(serde_json::from_slice(&reply.body)?);
        }

        if reply.status == StatusCode::UNAUTHORIZED && !endpoint.expiry_exempt() {
            self.on_session_expired();
            return Err(ClientError::SessionExpired);
        }

        let message = error_message(&reply.body);
        if reply.status.is_client_error() {
            Err(ClientError::Rejected(message))
        } else {
            Err(ClientError::Server(message))
        }
    }

    /// Forced logout: at most one clear and one redirect per expiry.
    fn on_session_expired(&self) {
        if self.handling_expiry.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Session no longer valid, forcing logout");
        self.store.clear();
        self.navigator.redirect(Destination::Login);
    }

    // ========== Auth API ==========

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.send(Endpoint::Login, Some(serde_json::to_value(request)?))
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AckResponse> {
        self.send(Endpoint::Register, Some(serde_json::to_value(request)?))
            .await
    }

    /// Verify an OTP. The flow tag is mandatory; the server applies the
    /// matching challenge context.
    pub async fn verify_otp(
        &self,
        flow: FlowType,
        request: &VerifyOtpRequest,
    ) -> ClientResult<VerifyOtpResponse> {
        self.send(Endpoint::VerifyOtp(flow), Some(serde_json::to_value(request)?))
            .await
    }

    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> ClientResult<AckResponse> {
        self.send(Endpoint::ForgotPassword, Some(serde_json::to_value(request)?))
            .await
    }

    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> ClientResult<AckResponse> {
        self.send(Endpoint::ResetPassword, Some(serde_json::to_value(request)?))
            .await
    }

    // ========== Account API ==========

    pub async fn current_user(&self) -> ClientResult<UserProfile> {
        self.send(Endpoint::CurrentUser, None).await
    }

    pub async fn toggle_two_factor(
        &self,
        request: &ToggleTwoFactorRequest,
    ) -> ClientResult<AckResponse> {
        self.send(Endpoint::ToggleTwoFactor, Some(serde_json::to_value(request)?))
            .await
    }

    pub async fn two_factor_status(&self) -> ClientResult<TwoFactorStatusResponse> {
        self.send(Endpoint::TwoFactorStatus, None).await
    }
}

/// Error replies carry `{"message": "..."}`; fall back to the raw body.
fn error_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorReply {
        message: String,
    }
    if let Ok(reply) = serde_json::from_slice::<ErrorReply>(body) {
        return reply.message;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        "Something went wrong".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TokenStorage;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingNavigator {
        redirects: Mutex<Vec<Destination>>,
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, to: Destination) {
            self.redirects.lock().push(to);
        }
    }

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn execute(&self, _request: ApiRequest) -> ClientResult<ApiReply> {
            Ok(ApiReply {
                status: StatusCode::OK,
                body: b"{}".to_vec(),
            })
        }
    }

    fn client(dir: &TempDir) -> (ApiClient, Arc<SessionStore>, Arc<RecordingNavigator>) {
        let store = Arc::new(SessionStore::new(TokenStorage::new(dir.path())));
        let navigator = Arc::new(RecordingNavigator::default());
        let api = ApiClient::new(Arc::new(NullTransport), store.clone(), navigator.clone());
        (api, store, navigator)
    }

    fn reply(status: StatusCode, body: &str) -> ApiReply {
        ApiReply {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn unauthorized_on_protected_endpoint_forces_one_logout() {
        let dir = TempDir::new().unwrap();
        let (api, store, navigator) = client(&dir);
        store.commit("header.payload.signature");
        let version = store.version();

        for _ in 0..3 {
            let result: ClientResult<UserProfile> = api.classify(
                Endpoint::CurrentUser,
                reply(StatusCode::UNAUTHORIZED, r#"{"message": "Unauthorized"}"#),
            );
            assert!(matches!(result, Err(ClientError::SessionExpired)));
        }

        assert_eq!(store.version(), version + 1);
        assert!(store.read().token.is_none());
        assert_eq!(*navigator.redirects.lock(), vec![Destination::Login]);
    }

    #[test]
    fn unauthorized_on_auth_endpoints_is_a_plain_rejection() {
        let dir = TempDir::new().unwrap();
        let (api, store, navigator) = client(&dir);

        let result: ClientResult<LoginResponse> = api.classify(
            Endpoint::Login,
            reply(
                StatusCode::UNAUTHORIZED,
                r#"{"message": "Invalid email or password"}"#,
            ),
        );
        match result {
            Err(ClientError::Rejected(message)) => {
                assert_eq!(message, "Invalid email or password");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(store.version(), 0);
        assert!(navigator.redirects.lock().is_empty());
    }

    #[test]
    fn success_re_arms_the_expiry_guard() {
        let dir = TempDir::new().unwrap();
        let (api, store, navigator) = client(&dir);
        store.commit("header.payload.signature");

        let _: ClientResult<UserProfile> = api.classify(
            Endpoint::CurrentUser,
            reply(StatusCode::UNAUTHORIZED, "{}"),
        );
        let _: ClientResult<serde_json::Value> =
            api.classify(Endpoint::CurrentUser, reply(StatusCode::OK, "{}"));
        let _: ClientResult<UserProfile> = api.classify(
            Endpoint::CurrentUser,
            reply(StatusCode::UNAUTHORIZED, "{}"),
        );

        assert_eq!(
            *navigator.redirects.lock(),
            vec![Destination::Login, Destination::Login]
        );
    }

    #[test]
    fn server_errors_are_retryable() {
        let dir = TempDir::new().unwrap();
        let (api, _store, _navigator) = client(&dir);
        let result: ClientResult<serde_json::Value> = api.classify(
            Endpoint::CurrentUser,
            reply(StatusCode::INTERNAL_SERVER_ERROR, ""),
        );
        match result {
            Err(e) => {
                assert!(e.is_retryable());
                assert!(e.to_string().contains("Something went wrong"));
            }
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn network_transport_trims_the_base_url() {
        let config = crate::config::ClientConfig::new("https://bank.example.com/api/");
        let transport = NetworkTransport::new(&config).unwrap();
        assert_eq!(transport.base_url(), "https://bank.example.com/api");
    }

    #[test]
    fn endpoint_table_matches_the_contract() {
        assert!(!Endpoint::Login.attaches_token());
        assert!(!Endpoint::Register.attaches_token());
        assert!(Endpoint::VerifyOtp(FlowType::Login).attaches_token());
        assert!(Endpoint::CurrentUser.attaches_token());

        assert!(Endpoint::VerifyOtp(FlowType::PasswordReset).expiry_exempt());
        assert!(!Endpoint::CurrentUser.expiry_exempt());
        assert!(!Endpoint::ToggleTwoFactor.expiry_exempt());

        assert_eq!(
            Endpoint::VerifyOtp(FlowType::PasswordReset).path(),
            "/users/verify-otp?flowType=passwordReset"
        );
        assert_eq!(Endpoint::ToggleTwoFactor.method(), Method::PUT);
    }
}
