use actix_web::{Responder, get, post, web};

use crate::forms::commissions::{CloseSettlementForm, GenerateCommissionsForm, PaySettlementForm};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::commissions as commissions_service;

#[get("/work-orders/{work_order_id}/commissions/simulate")]
pub async fn simulate(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        commissions_service::simulate(repo.get_ref(), &user, work_order_id.into_inner()),
        "simulate commissions",
    )
}

/// The body is optional; without a trigger every trigger is tried in order.
#[post("/work-orders/{work_order_id}/commissions")]
pub async fn generate(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: Option<web::Json<GenerateCommissionsForm>>,
) -> impl Responder {
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    respond_created(
        commissions_service::generate(repo.get_ref(), &user, work_order_id.into_inner(), form),
        "generate commissions",
    )
}

#[post("/receivables/{receivable_id}/release-commissions")]
pub async fn release_by_payment(
    receivable_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        commissions_service::release_by_payment(repo.get_ref(), &user, receivable_id.into_inner()),
        "release commissions",
    )
}

#[post("/commissions/settlements")]
pub async fn close_settlement(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CloseSettlementForm>,
) -> impl Responder {
    respond_created(
        commissions_service::close_settlement(repo.get_ref(), &user, form),
        "close a settlement",
    )
}

#[post("/commissions/settlements/{settlement_id}/approve")]
pub async fn approve_settlement(
    settlement_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        commissions_service::approve_settlement(repo.get_ref(), &user, settlement_id.into_inner()),
        "approve a settlement",
    )
}

#[post("/commissions/settlements/{settlement_id}/pay")]
pub async fn pay_settlement(
    settlement_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: Option<web::Json<PaySettlementForm>>,
) -> impl Responder {
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    respond(
        commissions_service::pay_settlement(
            repo.get_ref(),
            &user,
            settlement_id.into_inner(),
            form,
        ),
        "pay a settlement",
    )
}
