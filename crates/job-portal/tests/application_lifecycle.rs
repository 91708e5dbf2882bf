//! End-to-end application lifecycle through the public `Portal` facade: postings, submissions,
//! recruiter decisions, and the admin view, all against the in-memory store.

mod common {
    use std::sync::Arc;

    use job_portal::portal::{
        Actor, InMemoryPortalStore, JobDraft, JobView, PasswordHasher, Portal, Registration, Role,
        TokenService,
    };

    pub(super) fn portal() -> Portal<InMemoryPortalStore> {
        Portal::new(
            Arc::new(InMemoryPortalStore::default()),
            PasswordHasher::with_params(8, 1, 1).expect("valid params"),
            TokenService::new("integration-secret", 1),
        )
    }

    /// Registers through the public API and resolves the returned token, as a client would.
    pub(super) fn account(portal: &Portal<InMemoryPortalStore>, name: &str, role: &str) -> Actor {
        let session = portal
            .users
            .register(Registration {
                name: name.to_string(),
                email: format!("{}@jobs.test", name.to_lowercase()),
                password: "hunter22".to_string(),
                role: Some(role.to_string()),
            })
            .expect("registration succeeds");
        let actor = portal
            .users
            .authenticate(&session.token)
            .expect("fresh token authenticates");
        assert_eq!(Some(actor.role), Role::parse(role));
        actor
    }

    pub(super) fn posting(
        portal: &Portal<InMemoryPortalStore>,
        recruiter: &Actor,
        title: &str,
    ) -> JobView {
        portal
            .jobs
            .create_job(
                recruiter,
                JobDraft {
                    title: title.to_string(),
                    description: "Ship features across the hiring platform".to_string(),
                    location: "Lisbon".to_string(),
                    salary: "EUR 60k".to_string(),
                    company: "Globex".to_string(),
                },
            )
            .expect("posting succeeds")
    }
}

use common::*;
use job_portal::portal::{ApplicationStatus, ErrorKind, PageParams};

#[test]
fn seeker_applies_and_recruiter_accepts() {
    let portal = portal();
    let recruiter = account(&portal, "Rita", "recruiter");
    let seeker = account(&portal, "Sam", "jobseeker");
    let job = posting(&portal, &recruiter, "Platform Engineer");

    let application = portal
        .applications
        .apply(&seeker, &job.id)
        .expect("application accepted");
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.user_id.id, seeker.id);

    let decided = portal
        .applications
        .set_status(&recruiter, &application.id, "accepted")
        .expect("owner decides");
    assert_eq!(decided.status, ApplicationStatus::Accepted);

    let mine = portal
        .applications
        .my_applications(&seeker, &PageParams::default())
        .expect("seeker listing");
    assert_eq!(mine.total, 1);
    assert_eq!(mine.items[0].status, ApplicationStatus::Accepted);
    assert_eq!(
        mine.items[0].job_id.document().map(|job| job.company.as_str()),
        Some("Globex")
    );
}

#[test]
fn deactivated_postings_stop_accepting_applications() {
    let portal = portal();
    let recruiter = account(&portal, "Rita", "recruiter");
    let early = account(&portal, "Sam", "jobseeker");
    let late = account(&portal, "Lee", "jobseeker");
    let job = posting(&portal, &recruiter, "Platform Engineer");

    portal
        .applications
        .apply(&early, &job.id)
        .expect("applied while open");
    portal
        .jobs
        .delete_job(&recruiter, &job.id)
        .expect("owner closes the posting");

    let err = portal
        .applications
        .apply(&late, &job.id)
        .expect_err("posting closed");
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let applicants = portal
        .applications
        .job_applicants(&recruiter, &job.id, &PageParams::default())
        .expect("owner still sees earlier applicants");
    assert_eq!(applicants.total, 1);
}

#[test]
fn admins_observe_but_never_decide() {
    let portal = portal();
    let recruiter = account(&portal, "Rita", "recruiter");
    let seeker = account(&portal, "Sam", "jobseeker");
    let admin = account(&portal, "Ada", "admin");
    let job = posting(&portal, &recruiter, "Platform Engineer");
    let application = portal
        .applications
        .apply(&seeker, &job.id)
        .expect("applied");

    let everything = portal
        .applications
        .all_applications(&admin, &PageParams::default())
        .expect("admin listing");
    assert_eq!(everything.total, 1);

    let err = portal
        .applications
        .set_status(&admin, &application.id, "rejected")
        .expect_err("admins do not own jobs");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let err = portal
        .jobs
        .delete_job(&admin, &job.id)
        .expect_err("admins do not own jobs");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn blocked_seekers_lose_access_immediately() {
    let portal = portal();
    let admin = account(&portal, "Ada", "admin");
    let seeker = account(&portal, "Sam", "jobseeker");

    let session = portal
        .users
        .login(job_portal::portal::LoginRequest {
            email: "sam@jobs.test".to_string(),
            password: "hunter22".to_string(),
        })
        .expect("login before block");

    portal
        .users
        .toggle_block(&admin, &seeker.id)
        .expect("admin blocks");
    let err = portal
        .users
        .authenticate(&session.token)
        .expect_err("blocked");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}
