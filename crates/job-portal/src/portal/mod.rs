//! Job postings, applications, and accounts for the job board.
//!
//! Services are generic over a [`PortalStore`] so the lifecycle rules can be exercised against the
//! in-memory store in tests and swapped for a database-backed store without touching the rules.

pub mod applications;
pub mod auth;
pub mod authorization;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod jobs;
pub mod listing;
pub mod router;
pub mod store;
pub mod users;
mod validation;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use applications::ApplicationService;
pub use auth::{PasswordHasher, SessionClaims, TokenService};
pub use authorization::{AccessDenied, Decision};
pub use dashboard::{ApplicationCounts, DashboardView};
pub use domain::{
    Actor, Application, ApplicationId, ApplicationStatus, ApplicationView, Job, JobDraft, JobId,
    JobPatch, JobSummary, JobView, PasswordDigest, Populated, Role, User, UserId, UserProfile,
    UserSummary,
};
pub use error::{ErrorKind, PortalError};
pub use jobs::JobService;
pub use listing::{JobFilter, JobListingQuery, Page, PageParams, PageWindow, TextSearch};
pub use router::portal_router;
pub use store::memory::InMemoryPortalStore;
pub use store::{
    ApplicationRepository, ApplicationScope, JobRepository, PortalStore, RepositoryError,
    SearchResult, UserRepository,
};
pub use users::{LoginRequest, ProfileUpdate, Registration, Session, UserService};

/// Facade bundling the account, job, and application services over one store.
pub struct Portal<S> {
    pub users: UserService<S>,
    pub jobs: JobService<S>,
    pub applications: ApplicationService<S>,
    store: Arc<S>,
}

impl<S> Portal<S>
where
    S: PortalStore + 'static,
{
    pub fn new(store: Arc<S>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            users: UserService::new(store.clone(), hasher, tokens),
            jobs: JobService::new(store.clone()),
            applications: ApplicationService::new(store.clone()),
            store,
        }
    }
}
