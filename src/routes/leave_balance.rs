use actix_web::web;

use crate::handlers::leave_balance;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave-balance")
            .route("/accrual", web::post().to(leave_balance::run_accrual))
            .route(
                "/{user_id}/history",
                web::get().to(leave_balance::balance_history),
            )
            .route(
                "/{user_id}/adjust",
                web::post().to(leave_balance::adjust_balance),
            )
            .route(
                "/{user_id}/comp-off",
                web::post().to(leave_balance::credit_comp_off),
            ),
    );
}
