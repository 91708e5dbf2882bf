use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::portal::domain::{Application, ApplicationId, Job, JobId, User, UserId};
use crate::portal::listing::{JobFilter, PageWindow};
use crate::portal::store::{
    ApplicationRepository, ApplicationScope, JobRepository, RepositoryError, SearchResult,
    UserRepository,
};
use crate::portal::{
    Actor, InMemoryPortalStore, JobDraft, JobView, PasswordHasher, Portal, Registration, Role,
    TokenService,
};

pub(super) const TEST_SECRET: &str = "portal-test-secret";

pub(super) fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::with_params(8, 1, 1).expect("valid argon2 params")
}

pub(super) fn tokens() -> TokenService {
    TokenService::new(TEST_SECRET, 30)
}

pub(super) fn build_portal() -> (Portal<InMemoryPortalStore>, Arc<InMemoryPortalStore>) {
    let store = Arc::new(InMemoryPortalStore::default());
    let portal = Portal::new(store.clone(), cheap_hasher(), tokens());
    (portal, store)
}

pub(super) fn registration(name: &str, email: &str, role: Option<Role>) -> Registration {
    Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: "secret-pass".to_string(),
        role: role.map(|role| role.label().to_string()),
    }
}

/// Register an account and return its actor plus session token.
pub(super) fn sign_up<S>(portal: &Portal<S>, name: &str, role: Role) -> (Actor, String)
where
    S: crate::portal::PortalStore + 'static,
{
    let email = format!("{}@example.com", name.to_lowercase());
    let session = portal
        .users
        .register(registration(name, &email, Some(role)))
        .expect("registration succeeds");
    let actor = Actor::new(session.user.id.clone(), session.user.role);
    (actor, session.token)
}

pub(super) fn draft(title: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: format!("{title} working on the payments platform"),
        location: "Remote".to_string(),
        salary: "$120k".to_string(),
        company: "Acme".to_string(),
    }
}

pub(super) fn post_job<S>(portal: &Portal<S>, recruiter: &Actor, title: &str) -> JobView
where
    S: crate::portal::PortalStore + 'static,
{
    portal
        .jobs
        .create_job(recruiter, draft(title))
        .expect("job posted")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose duplicate lookups never see existing applications or emails, as when a concurrent
/// request inserts between the pre-check and the write.
#[derive(Default, Clone)]
pub(super) struct LostRaceStore {
    pub(super) inner: InMemoryPortalStore,
}

impl UserRepository for LostRaceStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        self.inner.insert_user(user)
    }

    fn update_user(&self, user: User) -> Result<User, RepositoryError> {
        self.inner.update_user(user)
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.fetch_user(id)
    }

    fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(None)
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.inner.list_users()
    }
}

impl JobRepository for LostRaceStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.inner.insert_job(job)
    }

    fn update_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.inner.update_job(job)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.fetch_job(id)
    }

    fn search_jobs(
        &self,
        filter: &JobFilter,
        window: PageWindow,
    ) -> Result<SearchResult<Job>, RepositoryError> {
        self.inner.search_jobs(filter, window)
    }
}

impl ApplicationRepository for LostRaceStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        self.inner.insert_application(application)
    }

    fn update_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        self.inner.update_application(application)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch_application(id)
    }

    fn find_application(
        &self,
        _job_id: &JobId,
        _applicant_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }

    fn search_applications(
        &self,
        scope: &ApplicationScope,
        window: PageWindow,
    ) -> Result<SearchResult<Application>, RepositoryError> {
        self.inner.search_applications(scope, window)
    }
}
