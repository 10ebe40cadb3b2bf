//! Multi-step authentication flows
//!
//! Login, registration and password reset share one OTP verification
//! endpoint; a single state machine parameterized by the flow tag keeps
//! the discriminator threaded through every challenge round-trip. Step
//! failures leave the machine where it is so the user retries without
//! re-entering fields that were already accepted. Each operation takes
//! `&mut self` and suspends at one network call, so a second submission
//! cannot race an in-flight one.

use std::sync::Arc;

use shared::auth::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, VerifyOtpRequest,
};

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use crate::routes::{Destination, Navigator};
use crate::session::SessionStore;

/// Which challenge sequence an OTP submission belongs to. Serialized as
/// the `flowType` query parameter so the server applies the matching
/// challenge context; never omitted or inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    Login,
    Registration,
    PasswordReset,
}

impl FlowType {
    pub fn tag(&self) -> &'static str {
        match self {
            FlowType::Login => "login",
            FlowType::Registration => "registration",
            FlowType::PasswordReset => "passwordReset",
        }
    }
}

/// A pending step-up challenge. Owned by the flow that created it,
/// consumed by a successful verification, discarded on cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub flow: FlowType,
    pub email: String,
}

/// Current position in a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingOtp(OtpChallenge),
    /// Login finished; a session is committed.
    SessionReady,
    /// Registration finished; the user authenticates afresh at login.
    RegistrationComplete,
    /// Challenge accepted; the captured email and code are repeated on
    /// the set-new-password submission as a unit.
    PasswordResetAccepted { email: String, otp: String },
    /// Password reset submitted; the flow is finished.
    Completed,
}

/// What a successful step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowProgress {
    OtpSent,
    SessionReady { landing: Destination },
    RegistrationComplete,
    PasswordResetAccepted,
    PasswordChanged,
}

/// Orchestrates the login, registration and password-reset sequences.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use marlin_client::{ApiClient, AuthFlow, ClientConfig, Destination, Navigator, SessionStore};
///
/// struct ShellRouter;
///
/// impl Navigator for ShellRouter {
///     fn redirect(&self, _to: Destination) {
///         // hand off to the UI shell's router
///     }
/// }
///
/// # async fn example() -> Result<(), marlin_client::ClientError> {
/// let config = ClientConfig::new("https://localhost:7032/api");
/// let store = Arc::new(SessionStore::new(config.token_storage()));
/// store.hydrate();
///
/// let navigator: Arc<dyn Navigator> = Arc::new(ShellRouter);
/// let api = Arc::new(ApiClient::new(
///     Arc::new(config.build_transport()?),
///     store.clone(),
///     navigator.clone(),
/// ));
///
/// let mut flow = AuthFlow::new(api, store, navigator);
/// flow.login("user@bank.test", "hunter2").await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthFlow {
    api: Arc<ApiClient>,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    state: FlowState,
}

impl AuthFlow {
    pub fn new(
        api: Arc<ApiClient>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            store,
            navigator,
            state: FlowState::Idle,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Submit credentials. A completed login commits the session and
    /// lands on the dashboard; a step-up reply opens an OTP challenge.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<FlowProgress> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let reply = self.api.login(&request).await?;

        if let Some(token) = reply.token {
            return Ok(self.complete_login(&token, email));
        }

        if reply.message.is_some() {
            tracing::debug!(email = %email, "Login requires OTP verification");
            self.state = FlowState::AwaitingOtp(OtpChallenge {
                flow: FlowType::Login,
                email: email.to_string(),
            });
            return Ok(FlowProgress::OtpSent);
        }

        Err(ClientError::InvalidResponse(
            "Login reply carried neither a token nor a challenge".to_string(),
        ))
    }

    /// Submit a registration. The account is created server-side and an
    /// OTP goes to the given email; no session exists until the user logs
    /// in after verification.
    pub async fn register(&mut self, request: RegisterRequest) -> ClientResult<FlowProgress> {
        let email = request.email.clone();
        self.api.register(&request).await?;
        tracing::debug!(email = %email, "Registration submitted, OTP sent");
        self.state = FlowState::AwaitingOtp(OtpChallenge {
            flow: FlowType::Registration,
            email,
        });
        Ok(FlowProgress::OtpSent)
    }

    /// Request a password-reset OTP for the given email.
    pub async fn forgot_password(&mut self, email: &str) -> ClientResult<FlowProgress> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.api.forgot_password(&request).await?;
        tracing::debug!(email = %email, "Password-reset OTP sent");
        self.state = FlowState::AwaitingOtp(OtpChallenge {
            flow: FlowType::PasswordReset,
            email: email.to_string(),
        });
        Ok(FlowProgress::OtpSent)
    }

    /// Submit the OTP for the pending challenge. Retries are unlimited;
    /// any lockout is a server concern.
    pub async fn verify_otp(&mut self, otp: &str) -> ClientResult<FlowProgress> {
        let challenge = match &self.state {
            FlowState::AwaitingOtp(challenge) => challenge.clone(),
            _ => {
                return Err(ClientError::InvalidState(
                    "No OTP challenge is pending".to_string(),
                ));
            }
        };

        let request = VerifyOtpRequest {
            email: challenge.email.clone(),
            otp: otp.to_string(),
        };
        let reply = self.api.verify_otp(challenge.flow, &request).await?;

        if !reply.is_success {
            return Err(ClientError::Rejected(
                reply.message.unwrap_or_else(|| "Invalid OTP".to_string()),
            ));
        }

        match challenge.flow {
            FlowType::Registration => {
                tracing::info!(email = %challenge.email, "Registration verified");
                self.state = FlowState::RegistrationComplete;
                self.navigator.redirect(Destination::Login);
                Ok(FlowProgress::RegistrationComplete)
            }
            FlowType::Login => match (reply.token, reply.message) {
                (Some(token), _) => Ok(self.complete_login(&token, &challenge.email)),
                // A success carrying a message but no token is the
                // password-flow completion signal.
                (None, Some(_)) => Ok(self.accept_password_reset(challenge.email, otp)),
                (None, None) => Err(ClientError::InvalidResponse(
                    "OTP reply carried neither a token nor a completion signal".to_string(),
                )),
            },
            FlowType::PasswordReset => Ok(self.accept_password_reset(challenge.email, otp)),
        }
    }

    /// Submit the new password, repeating the email and OTP captured by
    /// the accepted challenge.
    pub async fn reset_password(&mut self, new_password: &str) -> ClientResult<FlowProgress> {
        let (email, otp) = match &self.state {
            FlowState::PasswordResetAccepted { email, otp } => (email.clone(), otp.clone()),
            _ => {
                return Err(ClientError::InvalidState(
                    "No accepted password-reset challenge".to_string(),
                ));
            }
        };

        let request = ResetPasswordRequest {
            email,
            new_password: new_password.to_string(),
            otp,
        };
        self.api.reset_password(&request).await?;
        tracing::info!("Password reset complete");
        self.state = FlowState::Completed;
        self.navigator.redirect(Destination::Login);
        Ok(FlowProgress::PasswordChanged)
    }

    /// Abandon the current attempt and discard any pending challenge.
    pub fn cancel(&mut self) {
        if let FlowState::AwaitingOtp(challenge) = &self.state {
            tracing::debug!(flow = challenge.flow.tag(), "OTP challenge discarded");
        }
        self.state = FlowState::Idle;
    }

    fn complete_login(&mut self, token: &str, email: &str) -> FlowProgress {
        self.store.commit(token);
        tracing::info!(email = %email, "Login complete");
        self.state = FlowState::SessionReady;
        self.navigator.redirect(Destination::Dashboard);
        FlowProgress::SessionReady {
            landing: Destination::Dashboard,
        }
    }

    fn accept_password_reset(&mut self, email: String, otp: &str) -> FlowProgress {
        tracing::debug!(email = %email, "Password-reset challenge accepted");
        self.state = FlowState::PasswordResetAccepted {
            email,
            otp: otp.to_string(),
        };
        self.navigator.redirect(Destination::ResetPassword);
        FlowProgress::PasswordResetAccepted
    }
}
