use actix_web::{Responder, get, post, web};

use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::sla as sla_service;

#[post("/sla/checks")]
pub async fn run_checks(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(sla_service::run_checks(repo.get_ref(), &user), "run SLA checks")
}

#[get("/sla/dashboard")]
pub async fn dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        sla_service::dashboard(repo.get_ref(), &user),
        "compute the SLA dashboard",
    )
}
