use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, DateRange, Money, SubsidyCategory, UserId};
use super::installments::LaptopInstallmentPlan;
use super::repository::{RepositoryError, SubsidyRepository};
use super::service::{ApplicationRequest, ReviewDecision, SubsidyService, SubsidyServiceError};
use crate::workflows::export::to_csv_string;

/// Router builder exposing entitlement queries and the application workflow.
pub fn subsidy_router<R>(service: Arc<SubsidyService<R>>) -> Router
where
    R: SubsidyRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/subsidies/users/:user_id/limits",
            get(limits_handler::<R>),
        )
        .route("/api/v1/subsidies/applications", post(submit_handler::<R>))
        .route(
            "/api/v1/subsidies/applications/:application_id",
            get(application_handler::<R>),
        )
        .route(
            "/api/v1/subsidies/applications/:application_id/status",
            post(status_handler::<R>),
        )
        .route(
            "/api/v1/subsidies/applications/:application_id/installments",
            get(progress_handler::<R>).post(installment_handler::<R>),
        )
        .route("/api/v1/subsidies/laptop/schedule", get(schedule_handler))
        .route(
            "/api/v1/subsidies/usage/:category/export",
            get(usage_export_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfParams {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitPayload {
    pub(crate) user_id: UserId,
    pub(crate) category: SubsidyCategory,
    #[serde(default)]
    pub(crate) invoice_amount: Option<Money>,
    #[serde(default)]
    pub(crate) application_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DecisionKind {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusPayload {
    pub(crate) actor: UserId,
    pub(crate) decision: DecisionKind,
    #[serde(default)]
    pub(crate) approved_amount: Option<Money>,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InstallmentPayload {
    pub(crate) actor: UserId,
    #[serde(default)]
    pub(crate) received_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleParams {
    pub(crate) invoice_amount: Money,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsageParams {
    pub(crate) from: NaiveDate,
    pub(crate) to: NaiveDate,
}

fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) async fn limits_handler<R>(
    State(service): State<Arc<SubsidyService<R>>>,
    Path(user_id): Path<String>,
    Query(params): Query<AsOfParams>,
) -> Response
where
    R: SubsidyRepository + 'static,
{
    match service.limit_status(&UserId(user_id), today_or_local(params.today)) {
        Ok(status) => (StatusCode::OK, axum::Json(status)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<SubsidyService<R>>>,
    axum::Json(payload): axum::Json<SubmitPayload>,
) -> Response
where
    R: SubsidyRepository + 'static,
{
    let today = today_or_local(payload.application_date);
    let request = ApplicationRequest {
        user_id: payload.user_id,
        category: payload.category,
        invoice_amount: payload.invoice_amount,
    };
    match service.submit(request, today) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn application_handler<R>(
    State(service): State<Arc<SubsidyService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SubsidyRepository + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<SubsidyService<R>>>,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<StatusPayload>,
) -> Response
where
    R: SubsidyRepository + 'static,
{
    let decision = match payload.decision {
        DecisionKind::Approve => ReviewDecision::Approve {
            approved_amount: payload.approved_amount,
        },
        DecisionKind::Reject => ReviewDecision::Reject,
    };
    match service.change_status(
        &ApplicationId(application_id),
        decision,
        &payload.actor,
        today_or_local(payload.today),
    ) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn installment_handler<R>(
    State(service): State<Arc<SubsidyService<R>>>,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<InstallmentPayload>,
) -> Response
where
    R: SubsidyRepository + 'static,
{
    match service.record_installment(
        &ApplicationId(application_id),
        &payload.actor,
        today_or_local(payload.received_date),
    ) {
        Ok(installment) => (StatusCode::CREATED, axum::Json(installment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn progress_handler<R>(
    State(service): State<Arc<SubsidyService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SubsidyRepository + 'static,
{
    match service.laptop_progress(&ApplicationId(application_id)) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn schedule_handler(Query(params): Query<ScheduleParams>) -> Response {
    if params.invoice_amount.is_sign_negative() {
        return error_response(SubsidyServiceError::InvalidAmount(params.invoice_amount));
    }
    let plan = LaptopInstallmentPlan::calculate(params.invoice_amount);
    (StatusCode::OK, axum::Json(plan)).into_response()
}

pub(crate) async fn usage_export_handler<R>(
    State(service): State<Arc<SubsidyService<R>>>,
    Path(category): Path<String>,
    Query(params): Query<UsageParams>,
) -> Response
where
    R: SubsidyRepository + 'static,
{
    let Some(category) = SubsidyCategory::from_label(&category) else {
        let payload = json!({ "error": format!("unknown subsidy category '{category}'") });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };

    let rows = match service.usage_report(category, DateRange::new(params.from, params.to)) {
        Ok(rows) => rows,
        Err(err) => return error_response(err),
    };

    match to_csv_string(&rows) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) fn error_response(err: SubsidyServiceError) -> Response {
    let status = match &err {
        SubsidyServiceError::UnknownEmployee(_)
        | SubsidyServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SubsidyServiceError::MissingHireDate(_)
        | SubsidyServiceError::MissingInvoice
        | SubsidyServiceError::MissingApprovedAmount
        | SubsidyServiceError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubsidyServiceError::Ineligible { .. }
        | SubsidyServiceError::InvalidTransition { .. }
        | SubsidyServiceError::NotLaptop(_)
        | SubsidyServiceError::NotApproved(_)
        | SubsidyServiceError::InstallmentsComplete(_)
        | SubsidyServiceError::Repository(RepositoryError::Conflict)
        | SubsidyServiceError::Repository(RepositoryError::OutOfSequence { .. }) => {
            StatusCode::CONFLICT
        }
        SubsidyServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = match &err {
        SubsidyServiceError::Ineligible { category, reason } => json!({
            "error": err.to_string(),
            "category": category.label(),
            "reason": reason.label(),
        }),
        _ => json!({ "error": err.to_string() }),
    };
    (status, axum::Json(payload)).into_response()
}
