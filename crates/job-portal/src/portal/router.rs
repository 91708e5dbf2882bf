use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::domain::{Actor, ApplicationId, JobDraft, JobId, JobPatch, UserId};
use super::error::PortalError;
use super::listing::{JobListingQuery, Page, PageParams};
use super::store::PortalStore;
use super::users::{LoginRequest, ProfileUpdate, Registration, Session};
use super::Portal;

type PortalState<S> = State<Arc<Portal<S>>>;
type Body<T> = Result<Json<T>, JsonRejection>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplyRequest {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub status: String,
}

/// Router exposing the job board REST API under `/api`.
pub fn portal_router<S>(portal: Arc<Portal<S>>) -> Router
where
    S: PortalStore + 'static,
{
    Router::new()
        .route("/api", get(banner_handler))
        .route("/api/health", get(health_handler))
        .route("/api/users/register", post(register_handler::<S>))
        .route("/api/users/login", post(login_handler::<S>))
        .route("/api/users/me", get(me_handler::<S>))
        .route("/api/users/profile", put(update_profile_handler::<S>))
        .route("/api/users", get(list_users_handler::<S>))
        .route("/api/users/:id/block", put(toggle_block_handler::<S>))
        .route("/api/dashboard", get(dashboard_handler::<S>))
        .route(
            "/api/jobs",
            get(list_jobs_handler::<S>).post(create_job_handler::<S>),
        )
        .route("/api/jobs/my-jobs", get(my_jobs_handler::<S>))
        .route(
            "/api/jobs/:id",
            get(get_job_handler::<S>)
                .put(update_job_handler::<S>)
                .delete(delete_job_handler::<S>),
        )
        .route(
            "/api/applications",
            get(all_applications_handler::<S>).post(apply_handler::<S>),
        )
        .route(
            "/api/applications/my-applications",
            get(my_applications_handler::<S>),
        )
        .route(
            "/api/applications/job/:job_id",
            get(job_applicants_handler::<S>),
        )
        .route(
            "/api/applications/:id/status",
            put(set_status_handler::<S>),
        )
        .with_state(portal)
}

async fn banner_handler() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Job Portal API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn register_handler<S>(
    State(portal): PortalState<S>,
    payload: Body<Registration>,
) -> Result<Response, PortalError>
where
    S: PortalStore + 'static,
{
    let registration = body(payload)?;
    let session = blocking(move || portal.users.register(registration)).await?;
    Ok((StatusCode::CREATED, session_body(session)).into_response())
}

pub(crate) async fn login_handler<S>(
    State(portal): PortalState<S>,
    payload: Body<LoginRequest>,
) -> Result<Response, PortalError>
where
    S: PortalStore + 'static,
{
    let request = body(payload)?;
    let session = blocking(move || portal.users.login(request)).await?;
    Ok(session_body(session).into_response())
}

async fn me_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let user = portal.users.me(&actor)?;
    Ok(Json(json!({ "success": true, "user": user })))
}

async fn update_profile_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    payload: Body<ProfileUpdate>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let user = portal.users.update_profile(&actor, body(payload)?)?;
    Ok(Json(json!({ "success": true, "user": user })))
}

async fn list_users_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let users = portal.users.list_users(&actor)?;
    Ok(Json(json!({
        "success": true,
        "count": users.len(),
        "users": users,
    })))
}

async fn toggle_block_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let user = portal.users.toggle_block(&actor, &UserId(id))?;
    let message = if user.is_blocked {
        "User blocked successfully"
    } else {
        "User unblocked successfully"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "user": user,
    })))
}

async fn dashboard_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let dashboard = portal.dashboard(&actor)?;
    Ok(Json(json!({ "success": true, "dashboard": dashboard })))
}

pub(crate) async fn list_jobs_handler<S>(
    State(portal): PortalState<S>,
    Query(query): Query<JobListingQuery>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let page = portal.jobs.list_jobs(&query)?;
    Ok(Json(page_body("jobs", page)))
}

async fn create_job_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    payload: Body<JobDraft>,
) -> Result<Response, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let job = portal.jobs.create_job(&actor, body(payload)?)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "job": job })),
    )
        .into_response())
}

async fn my_jobs_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let page = portal.jobs.my_jobs(&actor, &params)?;
    Ok(Json(page_body("jobs", page)))
}

async fn get_job_handler<S>(
    State(portal): PortalState<S>,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let job = portal.jobs.get_job(&JobId(id))?;
    Ok(Json(json!({ "success": true, "job": job })))
}

async fn update_job_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Body<JobPatch>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let job = portal.jobs.update_job(&actor, &JobId(id), body(payload)?)?;
    Ok(Json(json!({ "success": true, "job": job })))
}

async fn delete_job_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    portal.jobs.delete_job(&actor, &JobId(id))?;
    Ok(Json(json!({
        "success": true,
        "message": "Job deleted successfully",
    })))
}

pub(crate) async fn apply_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    payload: Body<ApplyRequest>,
) -> Result<Response, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let request = body(payload)?;
    let application = portal
        .applications
        .apply(&actor, &JobId(request.job_id))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "application": application })),
    )
        .into_response())
}

async fn all_applications_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let page = portal.applications.all_applications(&actor, &params)?;
    Ok(Json(page_body("applications", page)))
}

async fn my_applications_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let page = portal.applications.my_applications(&actor, &params)?;
    Ok(Json(page_body("applications", page)))
}

async fn job_applicants_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let page = portal
        .applications
        .job_applicants(&actor, &JobId(job_id), &params)?;
    Ok(Json(page_body("applications", page)))
}

pub(crate) async fn set_status_handler<S>(
    State(portal): PortalState<S>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Body<StatusRequest>,
) -> Result<Json<Value>, PortalError>
where
    S: PortalStore + 'static,
{
    let actor = authenticate(&portal, &headers)?;
    let request = body(payload)?;
    let application =
        portal
            .applications
            .set_status(&actor, &ApplicationId(id), &request.status)?;
    Ok(Json(json!({ "success": true, "application": application })))
}

/// Resolve the `Authorization: Bearer <token>` header into an actor.
fn authenticate<S>(portal: &Portal<S>, headers: &HeaderMap) -> Result<Actor, PortalError>
where
    S: PortalStore + 'static,
{
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| PortalError::unauthorized("not authorized, no token"))?;

    portal.users.authenticate(token)
}

fn body<T>(payload: Body<T>) -> Result<T, PortalError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| PortalError::invalid_input(rejection.body_text()))
}

/// Password hashing is CPU bound, so it runs off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, PortalError>
where
    F: FnOnce() -> Result<T, PortalError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|err| {
        tracing::error!(error = %err, "blocking task failed");
        PortalError::Unavailable("worker task failed".to_string())
    })?
}

fn session_body(session: Session) -> Json<Value> {
    Json(json!({
        "success": true,
        "token": session.token,
        "user": session.user,
    }))
}

fn page_body<T: Serialize>(key: &str, page: Page<T>) -> Value {
    let mut payload = json!({
        "success": true,
        "count": page.count(),
        "total": page.total,
        "pages": page.pages,
        "currentPage": page.current_page,
    });
    payload[key] = json!(page.items);
    payload
}
