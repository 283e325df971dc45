use actix_web::web;

use crate::handlers::leave;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave")
            .route("", web::post().to(leave::submit_leave))
            .route("", web::get().to(leave::list_leave))
            .route("/calculate", web::post().to(leave::calculate_leave))
            .route("/statistics", web::get().to(leave::leave_statistics))
            .route("/approvers", web::get().to(leave::leave_approvers))
            .route("/calendar", web::get().to(leave::leave_calendar))
            .route("/{id}", web::get().to(leave::get_leave))
            .route("/{id}/approve", web::post().to(leave::approve_leave))
            .route("/{id}/reject", web::post().to(leave::reject_leave))
            .route("/{id}/cancel", web::post().to(leave::cancel_leave))
            .route("/{id}/reason", web::patch().to(leave::update_leave_reason)),
    );
}
