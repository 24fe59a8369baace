use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use std::env;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn set_env_vars() {
    unsafe {
        env::set_var("SUPABASE_JWT_SECRET", SECRET);
    }
}

fn make_token(secret: &str, claims: serde_json::Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn base_claims() -> serde_json::Value {
    json!({
        "sub": "123e4567-e89b-12d3-a456-426614174000",
        "aud": "authenticated",
        "role": "authenticated",
        "email": "test@example.com",
        "exp": 9_999_999_999usize,
    })
}

#[test]
fn test_validate_supabase_jwt_success() {
    set_env_vars();

    let token = make_token(SECRET, base_claims());

    let claims = validate_supabase_jwt(&token).expect("Valid token should pass");
    assert_eq!(claims.sub, "123e4567-e89b-12d3-a456-426614174000");
    assert_eq!(claims.email.as_deref(), Some("test@example.com"));
}

#[test]
fn test_validate_supabase_jwt_expired() {
    set_env_vars();

    let mut claims = base_claims();
    claims["exp"] = json!(1usize);
    let token = make_token(SECRET, claims);

    assert!(validate_supabase_jwt(&token).is_err());
}

#[test]
fn test_validate_supabase_jwt_invalid_signature() {
    set_env_vars();

    let token = make_token("wrongsecret", base_claims());

    assert!(validate_supabase_jwt(&token).is_err());
}

#[test]
fn plain_user_token_is_not_admin() {
    set_env_vars();

    let token = make_token(SECRET, base_claims());
    let claims = validate_supabase_jwt(&token).unwrap();

    let user = AuthUser {
        user_id: Uuid::parse_str(&claims.sub).unwrap(),
        email: claims.email,
        role: claims.role,
        roles: claims.app_metadata.unwrap_or_default().roles,
    };

    assert!(!user.is_admin());
}

#[test]
fn admin_role_claim_grants_admin() {
    set_env_vars();

    let mut claims = base_claims();
    claims["app_metadata"] = json!({ "roles": ["admin"] });
    let token = make_token(SECRET, claims);

    let parsed = validate_supabase_jwt(&token).unwrap();
    let user = AuthUser {
        user_id: Uuid::parse_str(&parsed.sub).unwrap(),
        email: parsed.email,
        role: parsed.role,
        roles: parsed.app_metadata.unwrap_or_default().roles,
    };

    assert!(user.is_admin());
}

#[test]
fn service_role_token_is_admin() {
    set_env_vars();

    let mut claims = base_claims();
    claims["aud"] = json!("service_role");
    claims["role"] = json!("service_role");
    let token = make_token(SECRET, claims);

    let parsed = validate_supabase_jwt(&token).unwrap();
    let user = AuthUser {
        user_id: Uuid::parse_str(&parsed.sub).unwrap(),
        email: parsed.email,
        role: parsed.role,
        roles: Vec::new(),
    };

    assert!(user.is_admin());
}
