use super::*;

// =============================================================================
// User decoding
// =============================================================================

#[test]
fn user_from_backend_numeric_id_and_username() {
    let user: User = serde_json::from_str(r#"{"id": 7, "email": "juan@mail.com", "username": "juan"}"#).unwrap();
    assert_eq!(user.id, "7");
    assert_eq!(user.email, "juan@mail.com");
    assert_eq!(user.name, "juan");
    assert!(user.role.is_none());
}

#[test]
fn user_reads_rol_or_role() {
    let user: User = serde_json::from_str(r#"{"id": "u1", "email": "a@b.co", "username": "a", "rol": "admin"}"#).unwrap();
    assert_eq!(user.role, Some(Role::Admin));

    let user: User = serde_json::from_str(r#"{"id": "u1", "email": "a@b.co", "name": "a", "role": "Consultor"}"#).unwrap();
    assert_eq!(user.name, "a");
    assert_eq!(user.role, Some(Role::Consultor));
}

#[test]
fn user_blank_role_is_none() {
    let user: User = serde_json::from_str(r#"{"id": 1, "email": "a@b.co", "username": "a", "rol": "  "}"#).unwrap();
    assert!(user.role.is_none());
}

#[test]
fn user_serializes_local_field_names() {
    let user = User { id: "3".into(), email: "a@b.co".into(), name: "Ana".into(), role: Some(Role::Admin) };
    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json, serde_json::json!({"id": "3", "email": "a@b.co", "name": "Ana", "role": "Admin"}));

    let back: User = serde_json::from_value(json).unwrap();
    assert_eq!(back, user);
}

// =============================================================================
// Cookie store
// =============================================================================

#[test]
fn session_cookie_attributes() {
    let cookie = session_cookie("tok".into(), true);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.max_age(), Some(Duration::days(7)));
}

#[test]
fn cleared_cookie_expires_immediately() {
    let cookie = cleared_session_cookie(false);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    assert_eq!(cookie.secure(), Some(false));
}

#[test]
fn cookie_store_round_trip() {
    let mut store = CookieTokenStore::new(CookieJar::new(), false);
    assert_eq!(store.token(), None);

    store.store("abc");
    assert_eq!(store.token().as_deref(), Some("abc"));

    store.clear();
    assert_eq!(store.token(), None);

    let jar = store.into_jar();
    let cookie = jar.get(COOKIE_NAME).unwrap();
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}

#[test]
fn empty_cookie_value_is_no_token() {
    let jar = CookieJar::new().add(Cookie::new(COOKIE_NAME, ""));
    assert_eq!(token_from_jar(&jar), None);
}
