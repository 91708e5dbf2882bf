use clap::Args;
use job_portal::error::AppError;
use job_portal::portal::{
    Actor, InMemoryPortalStore, JobDraft, JobListingQuery, LoginRequest, PasswordHasher, Portal,
    PortalError, Registration, TokenService,
};
use serde::Serialize;
use std::sync::Arc;

const DEMO_PASSWORD: &str = "demo-password";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Free-text search run against the seeded board.
    #[arg(long, default_value = "rust")]
    pub(crate) search: String,
    /// Print each role's dashboard as JSON at the end.
    #[arg(long)]
    pub(crate) dashboards: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { search, dashboards } = args;

    let portal = Portal::new(
        Arc::new(InMemoryPortalStore::default()),
        PasswordHasher::default(),
        TokenService::new("job-portal-demo", 1),
    );

    println!("Job board demo (in-memory store)");
    let recruiter = sign_up(&portal, "Rita Recruiter", "rita@demo.test", "recruiter")?;
    let seeker = sign_up(&portal, "Sam Seeker", "sam@demo.test", "jobseeker")?;
    let admin = sign_up(&portal, "Ada Admin", "ada@demo.test", "admin")?;

    let postings = [
        ("Rust Platform Engineer", "Berlin", "EUR 90k", "Ferrous Labs"),
        ("Backend Developer (Rust)", "Remote", "$130k", "Crabworks"),
        ("Frontend Engineer", "London", "GBP 70k", "Pixel & Co"),
    ];
    let mut job_ids = Vec::with_capacity(postings.len());
    for (title, location, salary, company) in postings {
        let job = portal.jobs.create_job(
            &recruiter,
            JobDraft {
                title: title.to_string(),
                description: format!("{company} is hiring a {title} to join a small team."),
                location: location.to_string(),
                salary: salary.to_string(),
                company: company.to_string(),
            },
        )?;
        println!("- Posted {} at {} ({})", job.title, job.company, job.id.as_str());
        job_ids.push(job.id);
    }

    let listing = portal.jobs.list_jobs(&JobListingQuery {
        search: Some(search.clone()),
        ..JobListingQuery::default()
    })?;
    println!(
        "\nSearch {:?}: {} of {} active postings",
        search,
        listing.count(),
        listing.total
    );
    for job in &listing.items {
        println!("  - {} | {} | {}", job.title, job.location, job.salary);
    }

    let Some(target) = job_ids.first() else {
        return Ok(());
    };
    let application = portal.applications.apply(&seeker, target)?;
    println!(
        "\nSam applied to {} -> status {}",
        target.as_str(),
        application.status
    );
    report("Applying twice", portal.applications.apply(&seeker, target))?;

    if let Some(closing) = job_ids.last() {
        portal.jobs.delete_job(&recruiter, closing)?;
        println!("Rita closed {}", closing.as_str());
        report(
            "Applying to a closed posting",
            portal.applications.apply(&seeker, closing),
        )?;
    }

    report(
        "Admin deciding an application",
        portal
            .applications
            .set_status(&admin, &application.id, "accepted"),
    )?;
    let decided = portal
        .applications
        .set_status(&recruiter, &application.id, "accepted")?;
    println!("Rita marked the application {}", decided.status);

    let blocked = portal.users.toggle_block(&admin, &seeker.id)?;
    println!(
        "\nAda blocked {} (blocked: {})",
        blocked.email, blocked.is_blocked
    );
    report(
        "Sam signing in while blocked",
        portal.users.login(LoginRequest {
            email: "sam@demo.test".to_string(),
            password: DEMO_PASSWORD.to_string(),
        }),
    )?;

    if dashboards {
        println!("\nDashboards");
        for (label, actor) in [("recruiter", &recruiter), ("admin", &admin)] {
            println!("{label}:\n{}", pretty(&portal.dashboard(actor)?)?);
        }
    }

    Ok(())
}

fn sign_up(
    portal: &Portal<InMemoryPortalStore>,
    name: &str,
    email: &str,
    role: &str,
) -> Result<Actor, AppError> {
    let session = portal.users.register(Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: Some(role.to_string()),
    })?;
    println!("- Registered {} as {}", session.user.email, role);
    Ok(Actor::new(session.user.id, session.user.role))
}

/// Prints a rejection the walkthrough expects; anything that succeeds is reported as such.
fn report<T>(step: &str, outcome: Result<T, PortalError>) -> Result<(), AppError> {
    match outcome {
        Ok(_) => println!("  {step}: unexpectedly allowed"),
        Err(PortalError::Unavailable(reason)) => {
            return Err(PortalError::Unavailable(reason).into())
        }
        Err(err) => println!("  {step}: rejected ({:?}: {err})", err.kind()),
    }
    Ok(())
}

fn pretty<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|err| AppError::Io(err.into()))
}
