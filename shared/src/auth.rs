//! Auth API types
//!
//! Request and response bodies for the `/users/*` endpoints.

use serde::{Deserialize, Serialize};

// =============================================================================
// Requests
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub mobile_no: String,
    pub address: String,
    pub date_of_birth: String,
    pub account_type: String,
}

/// OTP verification request; the flow tag travels as a query parameter,
/// not in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Forgot-password request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request; repeats the email and OTP captured during the
/// challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
    pub otp: String,
}

/// Two-factor preference update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleTwoFactorRequest {
    pub enabled: bool,
}

// =============================================================================
// Responses
// =============================================================================

/// Login response: a completed login carries a token, a step-up challenge
/// carries only a server message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// OTP verification response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub is_success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Generic acknowledgement. Older backend revisions reply with `success`,
/// newer ones with `isSuccess`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(default, rename = "isSuccess", alias = "success")]
    pub is_success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Two-factor preference status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorStatusResponse {
    pub two_factor_enabled: bool,
}

/// Current user profile from `/users/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_no: String,
    pub address: String,
    pub date_of_birth: String,
    pub role_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_accepts_challenge_shape() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"message": "OTP Sent for Verification to registered email"}"#)
                .unwrap();
        assert!(resp.token.is_none());
        assert!(resp.message.is_some());
    }

    #[test]
    fn ack_response_accepts_both_success_spellings() {
        let old: AckResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        let new: AckResponse =
            serde_json::from_str(r#"{"isSuccess": true, "message": "ok"}"#).unwrap();
        assert!(old.is_success);
        assert!(new.is_success);
    }

    #[test]
    fn requests_serialize_in_camel_case() {
        let req = ResetPasswordRequest {
            email: "user@bank.test".to_string(),
            new_password: "n3wpass".to_string(),
            otp: "123456".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["newPassword"], "n3wpass");
        assert_eq!(value["otp"], "123456");
    }

    #[test]
    fn profile_deserializes_from_backend_shape() {
        let profile: UserProfile = serde_json::from_str(
            r#"{
                "userId": 7,
                "firstName": "Morgan",
                "lastName": "Reyes",
                "email": "manager@bank.test",
                "mobileNo": "5550100",
                "address": "12 Quay St",
                "dateOfBirth": "1990-04-02",
                "roleId": 2
            }"#,
        )
        .unwrap();
        assert_eq!(profile.user_id, 7);
        assert_eq!(profile.role_id, 2);
    }
}
