//! Marlin Client - session and authorization layer for the Marlin
//! banking web application.
//!
//! Authenticates against the banking backend, derives role and permission
//! claims from the bearer token, persists the session across restarts,
//! drives the OTP step-up flows (login, registration, password reset), and
//! answers route authorization queries for the UI shell.

pub mod claims;
pub mod config;
pub mod error;
pub mod flow;
pub mod guard;
pub mod http;
pub mod routes;
pub mod session;
pub mod storage;

pub use claims::{Claims, RoleId};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use flow::{AuthFlow, FlowProgress, FlowState, FlowType, OtpChallenge};
pub use guard::{Access, authorize, authorize_destination};
pub use self::http::{ApiClient, Endpoint, InProcessTransport, NetworkTransport, Transport};
pub use routes::{Destination, Navigator};
pub use session::{Session, SessionStore};
pub use storage::TokenStorage;

// Re-export shared wire types for convenience
pub use shared::auth::{
    AckResponse, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    ResetPasswordRequest, ToggleTwoFactorRequest, TwoFactorStatusResponse, UserProfile,
    VerifyOtpRequest, VerifyOtpResponse,
};
