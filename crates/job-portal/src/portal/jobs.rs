use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use super::authorization::{can_create_job, can_mutate_job, require_role};
use super::domain::{Actor, Job, JobDraft, JobId, JobPatch, JobView, Role, UserId, UserSummary};
use super::error::PortalError;
use super::listing::{JobFilter, JobListingQuery, Page, PageParams, PageWindow};
use super::store::{JobRepository, UserRepository};

/// Posting management plus the public listing.
pub struct JobService<S> {
    store: Arc<S>,
}

impl<S> JobService<S>
where
    S: JobRepository + UserRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_job(&self, actor: &Actor, draft: JobDraft) -> Result<JobView, PortalError> {
        can_create_job(actor).into_result()?;
        let draft = draft.validated()?;

        let now = Utc::now();
        let job = Job {
            id: JobId::generate(),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            salary: draft.salary,
            company: draft.company,
            created_by: actor.id.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert_job(job)?;
        tracing::info!(job_id = %stored.id, recruiter = %actor.id, "job posted");

        self.view(stored)
    }

    /// Public listing of active postings.
    pub fn list_jobs(&self, query: &JobListingQuery) -> Result<Page<JobView>, PortalError> {
        let (filter, window) = query.build()?;
        self.search(&filter, window)
    }

    /// Deactivated postings are reported as missing.
    pub fn get_job(&self, id: &JobId) -> Result<JobView, PortalError> {
        let job = self.load(id)?;
        if !job.is_active {
            return Err(PortalError::NotFound("job"));
        }
        self.view(job)
    }

    pub fn update_job(
        &self,
        actor: &Actor,
        id: &JobId,
        patch: JobPatch,
    ) -> Result<JobView, PortalError> {
        let mut job = self.load(id)?;
        can_mutate_job(actor, &job).into_result()?;

        patch.validated()?.apply_to(&mut job);
        job.updated_at = Utc::now();
        let stored = self.store.update_job(job)?;
        tracing::debug!(job_id = %stored.id, "job updated");

        self.view(stored)
    }

    /// Soft delete: the record stays and only stops being listed.
    pub fn delete_job(&self, actor: &Actor, id: &JobId) -> Result<Job, PortalError> {
        let mut job = self.load(id)?;
        can_mutate_job(actor, &job).into_result()?;

        job.is_active = false;
        job.updated_at = Utc::now();
        let stored = self.store.update_job(job)?;
        tracing::info!(job_id = %stored.id, recruiter = %actor.id, "job deactivated");

        Ok(stored)
    }

    /// Every posting the recruiter created, including deactivated ones.
    pub fn my_jobs(&self, actor: &Actor, params: &PageParams) -> Result<Page<JobView>, PortalError> {
        require_role(actor, Role::Recruiter, "listing your jobs").into_result()?;
        let window = PageWindow::from_params(params)?;
        self.search(&JobFilter::created_by(actor.id.clone()), window)
    }

    fn search(&self, filter: &JobFilter, window: PageWindow) -> Result<Page<JobView>, PortalError> {
        let found = self.store.search_jobs(filter, window)?;
        let mut creators: HashMap<UserId, Option<UserSummary>> = HashMap::new();

        Page::new(found.items, found.total, window).try_map(|job| -> Result<JobView, PortalError> {
            let creator = match creators.get(&job.created_by).cloned() {
                Some(cached) => cached,
                None => {
                    let summary = self.creator(&job.created_by)?;
                    creators.insert(job.created_by.clone(), summary.clone());
                    summary
                }
            };
            Ok(job.view(creator))
        })
    }

    fn view(&self, job: Job) -> Result<JobView, PortalError> {
        let creator = self.creator(&job.created_by)?;
        Ok(job.view(creator))
    }

    fn creator(&self, id: &UserId) -> Result<Option<UserSummary>, PortalError> {
        Ok(self.store.fetch_user(id)?.map(|user| user.summary()))
    }

    fn load(&self, id: &JobId) -> Result<Job, PortalError> {
        self.store
            .fetch_job(id)?
            .ok_or(PortalError::NotFound("job"))
    }
}
