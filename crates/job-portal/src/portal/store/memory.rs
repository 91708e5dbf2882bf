use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{
    ApplicationRepository, ApplicationScope, JobRepository, RepositoryError, SearchResult,
    UserRepository, UNIQUE_APPLICATION_PAIR, UNIQUE_USER_EMAIL,
};
use crate::portal::domain::{Application, ApplicationId, Job, JobId, User, UserId};
use crate::portal::listing::{JobFilter, PageWindow};

/// Process-local store. A single lock guards all collections, so each call (including the
/// unique-constraint checks) is atomic.
#[derive(Default, Clone)]
pub struct InMemoryPortalStore {
    state: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    sequence: u64,
    users: HashMap<UserId, Stored<User>>,
    emails: HashMap<String, UserId>,
    jobs: HashMap<JobId, Stored<Job>>,
    applications: HashMap<ApplicationId, Stored<Application>>,
    pairs: HashMap<(JobId, UserId), ApplicationId>,
}

struct Stored<T> {
    sequence: u64,
    record: T,
}

impl StoreState {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

impl InMemoryPortalStore {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

/// Newest first by timestamp; later inserts win ties.
fn newest_first<'a, T: Clone + 'a>(
    records: impl Iterator<Item = &'a Stored<T>>,
    timestamp: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut matched: Vec<&Stored<T>> = records.collect();
    matched.sort_by(|a, b| {
        timestamp(&b.record)
            .cmp(&timestamp(&a.record))
            .then(b.sequence.cmp(&a.sequence))
    });
    matched.into_iter().map(|stored| stored.record.clone()).collect()
}

fn windowed<T>(ordered: Vec<T>, window: PageWindow) -> SearchResult<T> {
    let total = ordered.len() as u64;
    SearchResult {
        items: window.slice(ordered),
        total,
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserRepository for InMemoryPortalStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut state = self.lock()?;
        let key = email_key(&user.email);
        if state.emails.contains_key(&key) || state.users.contains_key(&user.id) {
            return Err(RepositoryError::Conflict(UNIQUE_USER_EMAIL));
        }

        let sequence = state.next_sequence();
        state.emails.insert(key, user.id.clone());
        state.users.insert(
            user.id.clone(),
            Stored {
                sequence,
                record: user.clone(),
            },
        );
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut state = self.lock()?;
        let previous_email = match state.users.get(&user.id) {
            Some(stored) => email_key(&stored.record.email),
            None => return Err(RepositoryError::NotFound),
        };

        let key = email_key(&user.email);
        if key != previous_email {
            if state.emails.contains_key(&key) {
                return Err(RepositoryError::Conflict(UNIQUE_USER_EMAIL));
            }
            state.emails.remove(&previous_email);
            state.emails.insert(key, user.id.clone());
        }

        if let Some(stored) = state.users.get_mut(&user.id) {
            stored.record = user.clone();
        }
        Ok(user)
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.users.get(id).map(|stored| stored.record.clone()))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .emails
            .get(&email_key(email))
            .and_then(|id| state.users.get(id))
            .map(|stored| stored.record.clone()))
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let state = self.lock()?;
        Ok(newest_first(state.users.values(), |user| user.created_at))
    }
}

impl JobRepository for InMemoryPortalStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut state = self.lock()?;
        if state.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict("jobs.id"));
        }

        let sequence = state.next_sequence();
        state.jobs.insert(
            job.id.clone(),
            Stored {
                sequence,
                record: job.clone(),
            },
        );
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut state = self.lock()?;
        match state.jobs.get_mut(&job.id) {
            Some(stored) => {
                stored.record = job.clone();
                Ok(job)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.jobs.get(id).map(|stored| stored.record.clone()))
    }

    fn search_jobs(
        &self,
        filter: &JobFilter,
        window: PageWindow,
    ) -> Result<SearchResult<Job>, RepositoryError> {
        let state = self.lock()?;
        let matched = state
            .jobs
            .values()
            .filter(|stored| filter.matches(&stored.record));
        Ok(windowed(newest_first(matched, |job| job.created_at), window))
    }
}

impl ApplicationRepository for InMemoryPortalStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut state = self.lock()?;
        let pair = (
            application.job_id.clone(),
            application.applicant_id.clone(),
        );
        if state.pairs.contains_key(&pair) {
            return Err(RepositoryError::Conflict(UNIQUE_APPLICATION_PAIR));
        }
        if state.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict("applications.id"));
        }

        let sequence = state.next_sequence();
        state.pairs.insert(pair, application.id.clone());
        state.applications.insert(
            application.id.clone(),
            Stored {
                sequence,
                record: application.clone(),
            },
        );
        Ok(application)
    }

    fn update_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut state = self.lock()?;
        let previous_pair = match state.applications.get(&application.id) {
            Some(stored) => (
                stored.record.job_id.clone(),
                stored.record.applicant_id.clone(),
            ),
            None => return Err(RepositoryError::NotFound),
        };

        let pair = (
            application.job_id.clone(),
            application.applicant_id.clone(),
        );
        if pair != previous_pair {
            if state.pairs.contains_key(&pair) {
                return Err(RepositoryError::Conflict(UNIQUE_APPLICATION_PAIR));
            }
            state.pairs.remove(&previous_pair);
            state.pairs.insert(pair, application.id.clone());
        }

        if let Some(stored) = state.applications.get_mut(&application.id) {
            stored.record = application.clone();
        }
        Ok(application)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .applications
            .get(id)
            .map(|stored| stored.record.clone()))
    }

    fn find_application(
        &self,
        job_id: &JobId,
        applicant_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let state = self.lock()?;
        let pair = (job_id.clone(), applicant_id.clone());
        Ok(state
            .pairs
            .get(&pair)
            .and_then(|id| state.applications.get(id))
            .map(|stored| stored.record.clone()))
    }

    fn search_applications(
        &self,
        scope: &ApplicationScope,
        window: PageWindow,
    ) -> Result<SearchResult<Application>, RepositoryError> {
        let state = self.lock()?;
        let matched = state
            .applications
            .values()
            .filter(|stored| scope.includes(&stored.record));
        Ok(windowed(
            newest_first(matched, |application| application.applied_at),
            window,
        ))
    }
}
