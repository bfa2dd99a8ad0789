use actix_web::{HttpResponse, Responder, post, web};

use crate::forms::work_orders::{
    AddItemForm, AssignTechnicianForm, ChangeStatusForm, CreateWorkOrderForm,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{error_response, respond, respond_created};
use crate::services::work_orders as work_orders_service;

#[post("/work-orders")]
pub async fn create_work_order(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateWorkOrderForm>,
) -> impl Responder {
    respond_created(
        work_orders_service::create_work_order(repo.get_ref(), &user, form),
        "create a work order",
    )
}

#[post("/work-orders/{work_order_id}/items")]
pub async fn add_item(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AddItemForm>,
) -> impl Responder {
    respond_created(
        work_orders_service::add_item(repo.get_ref(), &user, work_order_id.into_inner(), form),
        "add a work order item",
    )
}

#[post("/work-orders/{work_order_id}/status")]
pub async fn change_status(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ChangeStatusForm>,
) -> impl Responder {
    respond(
        work_orders_service::change_status(
            repo.get_ref(),
            &user,
            work_order_id.into_inner(),
            form,
        ),
        "change work order status",
    )
}

#[post("/work-orders/{work_order_id}/technicians")]
pub async fn assign_technician(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AssignTechnicianForm>,
) -> impl Responder {
    match work_orders_service::assign_technician(
        repo.get_ref(),
        &user,
        work_order_id.into_inner(),
        form,
    ) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err, "assign a technician"),
    }
}
