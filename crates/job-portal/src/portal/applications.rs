//! Application lifecycle: submitting an application and moving it between review states.
//!
//! Checks run in a fixed order so callers can rely on the error they get back: a missing record
//! is always reported before a permission problem, and a permission problem before bad input.

use std::sync::Arc;

use chrono::Utc;

use super::authorization::{
    can_administer, can_apply, can_decide_application, can_view_applicants_of, require_role,
};
use super::domain::{
    Actor, Application, ApplicationId, ApplicationStatus, ApplicationView, Job, JobId, JobSummary,
    Role, UserSummary,
};
use super::error::PortalError;
use super::listing::{Page, PageParams, PageWindow};
use super::store::{ApplicationScope, PortalStore, RepositoryError};

/// Which related records to embed in application responses.
#[derive(Debug, Clone, Copy)]
struct Embed {
    job: bool,
    applicant: bool,
}

pub struct ApplicationService<S> {
    store: Arc<S>,
}

impl<S> ApplicationService<S>
where
    S: PortalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Submit a pending application for an active job.
    ///
    /// The duplicate pre-check only avoids a pointless insert; the store's unique pair constraint
    /// settles concurrent submissions, and its conflict is reported the same way.
    pub fn apply(&self, actor: &Actor, job_id: &JobId) -> Result<ApplicationView, PortalError> {
        can_apply(actor).into_result()?;
        let job = self.load_job(job_id)?;
        if !job.is_active {
            return Err(PortalError::InvalidState(
                "job is no longer active".to_string(),
            ));
        }
        if self.store.find_application(&job.id, &actor.id)?.is_some() {
            return Err(already_applied());
        }

        let now = Utc::now();
        let application = Application {
            id: ApplicationId::generate(),
            job_id: job.id.clone(),
            applicant_id: actor.id.clone(),
            status: ApplicationStatus::Pending,
            applied_at: now,
            updated_at: now,
        };
        let stored = match self.store.insert_application(application) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict(_)) => return Err(already_applied()),
            Err(err) => return Err(err.into()),
        };
        tracing::info!(
            application_id = %stored.id,
            job_id = %job.id,
            applicant = %actor.id,
            "application submitted"
        );

        Ok(stored.view(Some(job.summary()), None))
    }

    /// Overwrite the status of an application on one of the actor's jobs.
    ///
    /// Any of the three statuses may follow any other, and re-setting the current status succeeds.
    pub fn set_status(
        &self,
        actor: &Actor,
        id: &ApplicationId,
        status: &str,
    ) -> Result<ApplicationView, PortalError> {
        let mut application = self
            .store
            .fetch_application(id)?
            .ok_or(PortalError::NotFound("application"))?;
        let job = self.load_job(&application.job_id)?;
        can_decide_application(actor, &application, &job).into_result()?;

        let status = ApplicationStatus::parse(status).ok_or_else(|| {
            PortalError::invalid_input("status must be one of pending, accepted, rejected")
        })?;
        let previous = application.status;
        application.status = status;
        application.updated_at = Utc::now();
        let stored = self.store.update_application(application)?;
        tracing::info!(
            application_id = %stored.id,
            from = %previous,
            to = %stored.status,
            "application status set"
        );

        let applicant = self.applicant(&stored)?;
        Ok(stored.view(Some(job.summary()), applicant))
    }

    pub fn my_applications(
        &self,
        actor: &Actor,
        params: &PageParams,
    ) -> Result<Page<ApplicationView>, PortalError> {
        require_role(actor, Role::JobSeeker, "listing your applications").into_result()?;
        self.search(
            &ApplicationScope::Applicant(actor.id.clone()),
            params,
            Embed {
                job: true,
                applicant: false,
            },
        )
    }

    pub fn job_applicants(
        &self,
        actor: &Actor,
        job_id: &JobId,
        params: &PageParams,
    ) -> Result<Page<ApplicationView>, PortalError> {
        require_role(actor, Role::Recruiter, "viewing applicants").into_result()?;
        let job = self.load_job(job_id)?;
        can_view_applicants_of(actor, &job).into_result()?;

        self.search(
            &ApplicationScope::Job(job.id),
            params,
            Embed {
                job: false,
                applicant: true,
            },
        )
    }

    pub fn all_applications(
        &self,
        actor: &Actor,
        params: &PageParams,
    ) -> Result<Page<ApplicationView>, PortalError> {
        can_administer(actor).into_result()?;
        self.search(
            &ApplicationScope::All,
            params,
            Embed {
                job: true,
                applicant: true,
            },
        )
    }

    fn search(
        &self,
        scope: &ApplicationScope,
        params: &PageParams,
        embed: Embed,
    ) -> Result<Page<ApplicationView>, PortalError> {
        let window = PageWindow::from_params(params)?;
        let found = self.store.search_applications(scope, window)?;

        Page::new(found.items, found.total, window).try_map(
            |application| -> Result<ApplicationView, PortalError> {
                let job = if embed.job {
                    self.job_summary(&application.job_id)?
                } else {
                    None
                };
                let applicant = if embed.applicant {
                    self.applicant(&application)?
                } else {
                    None
                };
                Ok(application.view(job, applicant))
            },
        )
    }

    fn job_summary(&self, id: &JobId) -> Result<Option<JobSummary>, PortalError> {
        Ok(self.store.fetch_job(id)?.map(|job| job.summary()))
    }

    fn applicant(&self, application: &Application) -> Result<Option<UserSummary>, PortalError> {
        Ok(self
            .store
            .fetch_user(&application.applicant_id)?
            .map(|user| user.summary()))
    }

    fn load_job(&self, id: &JobId) -> Result<Job, PortalError> {
        self.store
            .fetch_job(id)?
            .ok_or(PortalError::NotFound("job"))
    }
}

fn already_applied() -> PortalError {
    PortalError::Conflict("you have already applied for this job".to_string())
}
