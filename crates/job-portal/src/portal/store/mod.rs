pub mod memory;

use super::domain::{Application, ApplicationId, Job, JobId, User, UserId};
use super::listing::{JobFilter, PageWindow};

pub const UNIQUE_USER_EMAIL: &str = "users.email";
pub const UNIQUE_APPLICATION_PAIR: &str = "applications.job_id+applicant_id";

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("unique constraint {0} violated")]
    Conflict(&'static str),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Records matching a query, cut to a page window, plus the size of the full match set.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Which applications a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationScope {
    All,
    Applicant(UserId),
    Job(JobId),
}

impl ApplicationScope {
    pub fn includes(&self, application: &Application) -> bool {
        match self {
            ApplicationScope::All => true,
            ApplicationScope::Applicant(user_id) => &application.applicant_id == user_id,
            ApplicationScope::Job(job_id) => &application.job_id == job_id,
        }
    }
}

/// Account storage. Emails are unique across all accounts.
pub trait UserRepository: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<User, RepositoryError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    /// All accounts, newest first.
    fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
}

/// Posting storage.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// Matching postings ordered newest first.
    fn search_jobs(
        &self,
        filter: &JobFilter,
        window: PageWindow,
    ) -> Result<SearchResult<Job>, RepositoryError>;
}

/// Application storage. The (job, applicant) pair is unique; inserting a second application for
/// the same pair must fail with [`RepositoryError::Conflict`] atomically.
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn update_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn find_application(
        &self,
        job_id: &JobId,
        applicant_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError>;
    /// Applications in scope ordered by `applied_at`, newest first.
    fn search_applications(
        &self,
        scope: &ApplicationScope,
        window: PageWindow,
    ) -> Result<SearchResult<Application>, RepositoryError>;
}

/// Everything the portal services need from a backing store.
pub trait PortalStore: UserRepository + JobRepository + ApplicationRepository {}

impl<T> PortalStore for T where T: UserRepository + JobRepository + ApplicationRepository {}
