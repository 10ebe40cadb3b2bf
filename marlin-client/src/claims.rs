//! Bearer token claims
//!
//! Structural decode of the token payload into a typed claims record.
//! Signature trust is delegated to the server that issued the token and
//! re-validates it on every call; the client never rejects on expiry.

use std::collections::BTreeSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Numeric role identifier carried in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoleId(pub i64);

impl RoleId {
    pub const SUPERADMIN: RoleId = RoleId(1);
    pub const BANK_MANAGER: RoleId = RoleId(2);
    pub const CUSTOMER: RoleId = RoleId(3);

    /// Display name for dashboards and analytics. Never an authorization
    /// input; route decisions use the permission set.
    pub fn name(&self) -> &'static str {
        match self.0 {
            1 => "superadmin",
            2 => "bankmanager",
            _ => "customer",
        }
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::CUSTOMER
    }
}

/// Claims decoded from a bearer token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    pub role_id: RoleId,
    pub permissions: BTreeSet<String>,
    /// Expiry as unix seconds, informational only
    pub expires_at: Option<u64>,
}

impl Claims {
    /// Decode the payload segment of a three-part dot-delimited token.
    ///
    /// The payload must carry a `RoleId` field (integer, numeric strings
    /// tolerated) and a `Permission` field (array of strings); unknown
    /// fields are ignored. Anything missing or malformed degrades to the
    /// default claims (customer role, no permissions) so a bad token can
    /// never break navigation.
    pub fn from_token(token: &str) -> Self {
        match Self::decode(token) {
            Some(claims) => claims,
            None => {
                tracing::warn!("Malformed bearer token payload, using default claims");
                Self::default()
            }
        }
    }

    fn decode(token: &str) -> Option<Self> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return None;
        }

        let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
        let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;

        let role_id = payload.get("RoleId").and_then(role_value)?;
        let permissions = payload
            .get("Permission")?
            .as_array()?
            .iter()
            .filter_map(|p| p.as_str().map(str::to_owned))
            .collect();
        let expires_at = payload.get("exp").and_then(serde_json::Value::as_u64);

        Some(Self {
            role_id: RoleId(role_id),
            permissions,
            expires_at,
        })
    }
}

fn role_value(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
