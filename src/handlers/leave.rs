use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{
    CalendarQuery, LeaveApplicationFilter, RejectLeaveInput, StatisticsQuery, SubmitLeaveInput,
    UpdateReasonInput,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::leave::{LeaveStatus, LeaveType};
use crate::middleware::CorrelationId;
use crate::services::UserContext;

#[derive(Debug, Deserialize)]
pub struct LeaveListQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<String>,
}

impl LeaveListQuery {
    fn into_filter(self) -> Result<LeaveApplicationFilter, AppError> {
        let leave_type = match self.leave_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(LeaveType::parse(value)?),
        };

        Ok(LeaveApplicationFilter {
            user_id: self.user_id,
            status: self.status,
            leave_type,
        })
    }
}

/// Preview the day count and balance effect of a submission
pub async fn calculate_leave(
    ctx: UserContext,
    state: web::Data<AppState>,
    input: web::Json<SubmitLeaveInput>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let calculation = state
        .leave_service
        .calculate(&ctx, input.into_inner(), today)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(calculation)))
}

/// Submit a new leave application
pub async fn submit_leave(
    ctx: UserContext,
    state: web::Data<AppState>,
    correlation_id: CorrelationId,
    input: web::Json<SubmitLeaveInput>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    log::debug!(
        "Leave submission from {} (correlation_id={})",
        ctx.user_id(),
        correlation_id.0
    );

    let application = state
        .leave_service
        .submit(&ctx, input.into_inner(), today)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        application,
        "Leave application submitted successfully.",
    )))
}

pub async fn list_leave(
    ctx: UserContext,
    state: web::Data<AppState>,
    query: web::Query<LeaveListQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;
    let applications = state.leave_service.list(&ctx, filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(applications)))
}

pub async fn get_leave(
    ctx: UserContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let application = state.leave_service.get(&ctx, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(application)))
}

pub async fn approve_leave(
    ctx: UserContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let application = state
        .leave_service
        .approve(&ctx, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        application,
        "Leave application approved.",
    )))
}

pub async fn reject_leave(
    ctx: UserContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<RejectLeaveInput>,
) -> Result<HttpResponse, AppError> {
    let application = state
        .leave_service
        .reject(&ctx, path.into_inner(), &input.reason)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        application,
        "Leave application rejected.",
    )))
}

pub async fn cancel_leave(
    ctx: UserContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let application = state
        .leave_service
        .cancel(&ctx, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        application,
        "Leave application cancelled.",
    )))
}

/// Leave totals for a year, defaulting to the current one
pub async fn leave_statistics(
    ctx: UserContext,
    state: web::Data<AppState>,
    query: web::Query<StatisticsQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let year = query.year.unwrap_or_else(|| Local::now().year());
    let statistics = state
        .leave_service
        .statistics(&ctx, query.user_id, year)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(statistics)))
}

/// Users who will be asked to decide the caller's leave
pub async fn leave_approvers(
    ctx: UserContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let approvers = state.leave_service.approvers_for(&ctx).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(approvers)))
}

pub async fn update_leave_reason(
    ctx: UserContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateReasonInput>,
) -> Result<HttpResponse, AppError> {
    let application = state
        .leave_service
        .update_reason(&ctx, path.into_inner(), &input)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        application,
        "Reason updated.",
    )))
}

/// Approved leave per employee over a date window, current month by default
pub async fn leave_calendar(
    _ctx: UserContext,
    state: web::Data<AppState>,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let rows = state.leave_service.calendar(&query, today).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(rows)))
}
