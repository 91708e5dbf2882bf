use serde::Serialize;

use super::domain::{Actor, ApplicationStatus, ApplicationView, JobSummary, Role};
use super::error::PortalError;
use super::listing::{JobFilter, PageParams, PageWindow};
use super::store::{ApplicationScope, PortalStore};
use super::Portal;

const RECENT: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationCounts {
    pub total: u64,
    pub pending: u64,
    pub accepted: u64,
    pub rejected: u64,
}

impl ApplicationCounts {
    fn record(&mut self, status: ApplicationStatus) {
        self.total += 1;
        match status {
            ApplicationStatus::Pending => self.pending += 1,
            ApplicationStatus::Accepted => self.accepted += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }
}

/// Landing page contents, one shape per role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum DashboardView {
    JobSeeker {
        applications: ApplicationCounts,
        recent: Vec<ApplicationView>,
    },
    Recruiter {
        posted: u64,
        active: u64,
        applicants: u64,
        recent_jobs: Vec<JobSummary>,
    },
    Admin {
        users: u64,
        blocked_users: u64,
        jobs: u64,
        active_jobs: u64,
        applications: u64,
    },
}

impl<S> Portal<S>
where
    S: PortalStore + 'static,
{
    pub fn dashboard(&self, actor: &Actor) -> Result<DashboardView, PortalError> {
        match actor.role {
            Role::JobSeeker => self.job_seeker_dashboard(actor),
            Role::Recruiter => self.recruiter_dashboard(actor),
            Role::Admin => self.admin_dashboard(),
        }
    }

    fn job_seeker_dashboard(&self, actor: &Actor) -> Result<DashboardView, PortalError> {
        let mut applications = ApplicationCounts::default();
        let all = self.store.search_applications(
            &ApplicationScope::Applicant(actor.id.clone()),
            PageWindow::everything(),
        )?;
        for application in &all.items {
            applications.record(application.status);
        }

        let recent = self
            .applications
            .my_applications(actor, &PageParams::new(1, RECENT))?
            .items;

        Ok(DashboardView::JobSeeker {
            applications,
            recent,
        })
    }

    fn recruiter_dashboard(&self, actor: &Actor) -> Result<DashboardView, PortalError> {
        let owned = self.store.search_jobs(
            &JobFilter::created_by(actor.id.clone()),
            PageWindow::everything(),
        )?;

        let mut applicants = 0;
        for job in &owned.items {
            applicants += self
                .store
                .search_applications(&ApplicationScope::Job(job.id.clone()), single())?
                .total;
        }

        Ok(DashboardView::Recruiter {
            posted: owned.total,
            active: owned.items.iter().filter(|job| job.is_active).count() as u64,
            applicants,
            recent_jobs: owned
                .items
                .iter()
                .take(RECENT as usize)
                .map(|job| job.summary())
                .collect(),
        })
    }

    fn admin_dashboard(&self) -> Result<DashboardView, PortalError> {
        let users = self.store.list_users()?;
        let jobs = self.store.search_jobs(&JobFilter::default(), single())?;
        let active_jobs = self.store.search_jobs(&JobFilter::active(), single())?;
        let applications = self
            .store
            .search_applications(&ApplicationScope::All, single())?;

        Ok(DashboardView::Admin {
            users: users.len() as u64,
            blocked_users: users.iter().filter(|user| user.is_blocked).count() as u64,
            jobs: jobs.total,
            active_jobs: active_jobs.total,
            applications: applications.total,
        })
    }
}

/// Used where only the total matters.
fn single() -> PageWindow {
    PageWindow::first(1)
}
