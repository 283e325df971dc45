use actix_web::{HttpResponse, web};
use chrono::Local;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{BalanceAdjustmentInput, CompOffCreditInput, HistoryQuery};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn balance_history(
    ctx: UserContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let history = state
        .balance_service
        .history(&ctx, path.into_inner(), query.limit)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(history)))
}

/// Manually adjust a user's annual balance (admin and HR only)
pub async fn adjust_balance(
    ctx: UserContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<BalanceAdjustmentInput>,
) -> Result<HttpResponse, AppError> {
    let entry = state
        .balance_service
        .adjust(&ctx, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        entry,
        "Leave balance adjusted.",
    )))
}

pub async fn credit_comp_off(
    ctx: UserContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<CompOffCreditInput>,
) -> Result<HttpResponse, AppError> {
    let entry = state
        .balance_service
        .credit_comp_off(&ctx, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        entry,
        "Compensatory leave credited.",
    )))
}

/// Run this month's accrual now instead of waiting for the background task
pub async fn run_accrual(
    ctx: UserContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let summary = state
        .balance_service
        .run_monthly_accrual_as(&ctx, Local::now().date_naive())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}
