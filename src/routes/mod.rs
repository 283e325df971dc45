use actix_web::web;

pub mod leave;
pub mod leave_balance;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(leave::configure)
            .configure(leave_balance::configure),
    );
}
