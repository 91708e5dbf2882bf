//! Pure allow/deny rules over actors and entities.
//!
//! Nothing here touches the store: callers load the entities first, so a missing entity is
//! reported as not-found before any of these rules run.

use super::domain::{Actor, Application, Job, Role, User};

/// Reason an otherwise valid request was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("{action} requires the {required} role")]
    RoleRequired { action: &'static str, required: Role },
    #[error("not authorized to {action}")]
    NotOwner { action: &'static str },
    #[error("cannot block your own account")]
    SelfBlock,
}

/// Outcome of an authorization rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(AccessDenied),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AccessDenied> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }

    fn when(allowed: bool, reason: AccessDenied) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(reason)
        }
    }
}

pub fn require_role(actor: &Actor, required: Role, action: &'static str) -> Decision {
    Decision::when(
        actor.role == required,
        AccessDenied::RoleRequired { action, required },
    )
}

pub fn can_create_job(actor: &Actor) -> Decision {
    require_role(actor, Role::Recruiter, "posting a job")
}

/// Only the creator may edit or deactivate a posting; admins get no exemption.
pub fn can_mutate_job(actor: &Actor, job: &Job) -> Decision {
    Decision::when(
        job.created_by == actor.id,
        AccessDenied::NotOwner {
            action: "modify this job",
        },
    )
}

pub fn can_view_applicants_of(actor: &Actor, job: &Job) -> Decision {
    Decision::when(
        job.created_by == actor.id,
        AccessDenied::NotOwner {
            action: "view applicants for this job",
        },
    )
}

pub fn can_apply(actor: &Actor) -> Decision {
    require_role(actor, Role::JobSeeker, "applying for a job")
}

/// `job` must be the posting the application refers to.
pub fn can_decide_application(actor: &Actor, application: &Application, job: &Job) -> Decision {
    Decision::when(
        application.job_id == job.id && job.created_by == actor.id,
        AccessDenied::NotOwner {
            action: "update this application",
        },
    )
}

pub fn can_administer(actor: &Actor) -> Decision {
    require_role(actor, Role::Admin, "managing users")
}

pub fn can_toggle_block(actor: &Actor, target: &User) -> Decision {
    match can_administer(actor) {
        Decision::Allow if actor.id == target.id => Decision::Deny(AccessDenied::SelfBlock),
        decision => decision,
    }
}
