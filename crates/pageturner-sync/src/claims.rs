//! Admin flag read from the token payload, for [`RoleSource::TokenClaim`].
//!
//! The signature is NOT verified: the client has no key, and the flag only
//! decides which views are offered. The backend still authorizes every
//! admin call.
//!
//! [`RoleSource::TokenClaim`]: crate::config::RoleSource::TokenClaim

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::Value;
use tracing::{debug, warn};

/// Returns true if the token's payload carries an admin claim.
///
/// Recognized: `isAdmin: true`, `is_admin: true`, `role: "admin"`, and the
/// same under a nested `user` object. An undecodable token is not admin.
pub fn admin_claim(token: &str) -> bool {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let claims = match decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            warn!(error = %e, "Token payload unreadable, treating as non-admin");
            return false;
        }
    };

    let is_admin = has_admin_flag(&claims)
        || claims.get("user").map(has_admin_flag).unwrap_or(false);
    debug!(is_admin, "Read role from token");
    is_admin
}

fn has_admin_flag(claims: &Value) -> bool {
    let flag = |key: &str| claims.get(key).and_then(Value::as_bool).unwrap_or(false);
    flag("isAdmin")
        || flag("is_admin")
        || claims
            .get("role")
            .and_then(Value::as_str)
            .is_some_and(|role| role.eq_ignore_ascii_case("admin"))
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    use super::*;

    fn token(claims: Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    #[test]
    fn test_recognized_claims() {
        assert!(admin_claim(&token(json!({ "isAdmin": true }))));
        assert!(admin_claim(&token(json!({ "is_admin": true }))));
        assert!(admin_claim(&token(json!({ "role": "Admin" }))));
        assert!(admin_claim(&token(json!({ "user": { "id": "u1", "isAdmin": true } }))));
    }

    #[test]
    fn test_non_admin_claims() {
        assert!(!admin_claim(&token(json!({ "isAdmin": false }))));
        assert!(!admin_claim(&token(json!({ "role": "customer", "exp": 1 }))));
        assert!(!admin_claim(&token(json!({ "user": { "id": "u1" } }))));
    }

    #[test]
    fn test_opaque_token_is_not_admin() {
        assert!(!admin_claim("user-token"));
        assert!(!admin_claim(""));
    }
}
