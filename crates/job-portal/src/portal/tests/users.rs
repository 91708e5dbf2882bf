use super::common::*;
use crate::portal::store::UserRepository;
use crate::portal::{
    AccessDenied, ErrorKind, LoginRequest, Portal, PortalError, ProfileUpdate, Role, UserId,
};
use std::sync::Arc;

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn registration_defaults_to_job_seeker_and_issues_a_usable_token() {
    let (portal, store) = build_portal();
    let session = portal
        .users
        .register(registration("Sam", "  Sam@Example.com ", None))
        .expect("registered");

    assert_eq!(session.user.role, Role::JobSeeker);
    assert_eq!(session.user.email, "sam@example.com");
    assert!(!session.user.is_blocked);

    let actor = portal
        .users
        .authenticate(&session.token)
        .expect("token authenticates");
    assert_eq!(actor.id, session.user.id);
    assert_eq!(actor.role, Role::JobSeeker);

    let stored = store
        .fetch_user(&session.user.id)
        .expect("fetch")
        .expect("present");
    assert!(stored.password_hash.as_str().starts_with("$argon2id$"));
}

#[test]
fn duplicate_email_conflicts_regardless_of_case() {
    let (portal, _) = build_portal();
    portal
        .users
        .register(registration("Sam", "sam@example.com", None))
        .expect("registered");

    let err = portal
        .users
        .register(registration("Samuel", "SAM@example.com", None))
        .expect_err("email taken");
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn registration_validates_its_fields() {
    let (portal, _) = build_portal();

    let mut short_password = registration("Sam", "sam@example.com", None);
    short_password.password = "12345".to_string();
    let mut unknown_role = registration("Sam", "sam@example.com", None);
    unknown_role.role = Some("owner".to_string());
    let bad_email = registration("Sam", "sam.example.com", None);
    let short_name = registration("S", "sam@example.com", None);

    for candidate in [short_password, unknown_role, bad_email, short_name] {
        let err = portal
            .users
            .register(candidate)
            .expect_err("invalid registration");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

#[test]
fn login_rejects_bad_credentials_uniformly() {
    let (portal, _) = build_portal();
    sign_up(&portal, "Sam", Role::JobSeeker);

    for request in [
        login("sam@example.com", "wrong-pass"),
        login("nobody@example.com", "secret-pass"),
    ] {
        match portal.users.login(request) {
            Err(PortalError::Unauthorized(message)) => assert_eq!(message, "invalid credentials"),
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    let session = portal
        .users
        .login(login("SAM@example.com", "secret-pass"))
        .expect("valid credentials");
    assert_eq!(session.user.name, "Sam");
}

#[test]
fn blocked_accounts_cannot_sign_in_or_use_old_tokens() {
    let (portal, _) = build_portal();
    let (admin, _) = sign_up(&portal, "Ada", Role::Admin);
    let (seeker, token) = sign_up(&portal, "Sam", Role::JobSeeker);

    let blocked = portal
        .users
        .toggle_block(&admin, &seeker.id)
        .expect("admin blocks");
    assert!(blocked.is_blocked);

    match portal.users.login(login("sam@example.com", "secret-pass")) {
        Err(PortalError::Unauthorized(message)) => assert_eq!(message, "account is blocked"),
        other => panic!("expected blocked login, got {other:?}"),
    }
    assert_eq!(
        portal
            .users
            .authenticate(&token)
            .expect_err("blocked token")
            .kind(),
        ErrorKind::Unauthorized
    );

    let unblocked = portal
        .users
        .toggle_block(&admin, &seeker.id)
        .expect("admin unblocks");
    assert!(!unblocked.is_blocked);
    portal
        .users
        .authenticate(&token)
        .expect("token valid again");
}

#[test]
fn admins_cannot_block_themselves() {
    let (portal, store) = build_portal();
    let (admin, _) = sign_up(&portal, "Ada", Role::Admin);

    match portal.users.toggle_block(&admin, &admin.id) {
        Err(PortalError::Forbidden(AccessDenied::SelfBlock)) => {}
        other => panic!("expected self-block denial, got {other:?}"),
    }
    let stored = store.fetch_user(&admin.id).expect("fetch").expect("present");
    assert!(!stored.is_blocked);
}

#[test]
fn toggle_block_checks_role_then_target() {
    let (portal, _) = build_portal();
    let (admin, _) = sign_up(&portal, "Ada", Role::Admin);
    let (recruiter, _) = sign_up(&portal, "Rita", Role::Recruiter);

    let err = portal
        .users
        .toggle_block(&recruiter, &admin.id)
        .expect_err("admins only");
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = portal
        .users
        .toggle_block(&admin, &UserId::from("missing"))
        .expect_err("unknown user");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn garbage_tokens_are_unauthorized() {
    let (portal, _) = build_portal();
    assert_eq!(
        portal
            .users
            .authenticate("not-a-token")
            .expect_err("garbage")
            .kind(),
        ErrorKind::Unauthorized
    );
}

#[test]
fn profile_updates_keep_emails_unique() {
    let (portal, _) = build_portal();
    let (sam, _) = sign_up(&portal, "Sam", Role::JobSeeker);
    sign_up(&portal, "Rita", Role::Recruiter);

    let err = portal
        .users
        .update_profile(
            &sam,
            ProfileUpdate {
                email: Some("rita@example.com".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .expect_err("email taken");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let profile = portal
        .users
        .update_profile(
            &sam,
            ProfileUpdate {
                name: Some("Samantha".to_string()),
                email: Some("sam@example.com".to_string()),
            },
        )
        .expect("own email is fine");
    assert_eq!(profile.name, "Samantha");
    assert_eq!(portal.users.me(&sam).expect("me").name, "Samantha");
}

#[test]
fn email_conflicts_from_the_store_keep_their_message() {
    let store = Arc::new(LostRaceStore::default());
    let portal = Portal::new(store, cheap_hasher(), tokens());
    let (sam, _) = sign_up(&portal, "Sam", Role::JobSeeker);
    sign_up(&portal, "Rita", Role::Recruiter);

    match portal
        .users
        .register(registration("Rita Again", "RITA@example.com", None))
    {
        Err(PortalError::Conflict(message)) => {
            assert_eq!(message, "an account with this email already exists")
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    match portal.users.update_profile(
        &sam,
        ProfileUpdate {
            email: Some("rita@example.com".to_string()),
            ..ProfileUpdate::default()
        },
    ) {
        Err(PortalError::Conflict(message)) => assert_eq!(message, "email is already in use"),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(portal.users.me(&sam).expect("me").email, "sam@example.com");
}

#[test]
fn listing_users_requires_admin() {
    let (portal, _) = build_portal();
    let (admin, _) = sign_up(&portal, "Ada", Role::Admin);
    let (seeker, _) = sign_up(&portal, "Sam", Role::JobSeeker);

    let users = portal.users.list_users(&admin).expect("admin lists");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Sam");

    let err = portal
        .users
        .list_users(&seeker)
        .expect_err("admins only");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}
