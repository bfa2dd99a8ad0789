//! JSON handlers mounted under `/api/v1`.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::dto::ErrorResponse;
use crate::repository::errors::RepositoryError;
use crate::services::{ServiceError, ServiceResult};

pub mod access;
pub mod commissions;
pub mod reconciliation;
pub mod sla;
pub mod work_orders;

/// Maps a service failure to its status code and `{"error": ...}` body.
///
/// Only failures the caller cannot fix are logged, with `action` naming what
/// was being attempted.
pub fn error_response(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            HttpResponse::Forbidden().json(ErrorResponse::new("Permissão insuficiente."))
        }
        ServiceError::NotFound | ServiceError::Repository(RepositoryError::NotFound) => {
            HttpResponse::NotFound().json(ErrorResponse::new("Registro não encontrado."))
        }
        ServiceError::Form(message) => {
            HttpResponse::UnprocessableEntity().json(ErrorResponse::new(message))
        }
        ServiceError::TypeConstraint(message) => {
            HttpResponse::UnprocessableEntity().json(ErrorResponse::new(message))
        }
        ServiceError::Conflict(message) => {
            HttpResponse::Conflict().json(ErrorResponse::new(message))
        }
        ServiceError::Repository(RepositoryError::ConstraintViolation(message)) => {
            log::warn!("Constraint violated while trying to {action}: {message}");
            HttpResponse::Conflict()
                .json(ErrorResponse::new("Registro em conflito com dados existentes."))
        }
        err => {
            log::error!("Failed to {action}: {err}");
            HttpResponse::InternalServerError().json(ErrorResponse::new("Erro interno."))
        }
    }
}

/// `200 OK` with the value as JSON, or the mapped error.
pub fn respond<T: Serialize>(result: ServiceResult<T>, action: &str) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => error_response(err, action),
    }
}

/// Like [`respond`] with `201 Created`.
pub fn respond_created<T: Serialize>(result: ServiceResult<T>, action: &str) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Created().json(value),
        Err(err) => error_response(err, action),
    }
}

/// Registers every handler; the caller decides the mount point.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(access::my_permissions)
        .service(access::list_permissions)
        .service(access::list_roles)
        .service(access::sync_role_permissions)
        .service(access::assign_role)
        .service(work_orders::create_work_order)
        .service(work_orders::add_item)
        .service(work_orders::change_status)
        .service(work_orders::assign_technician)
        .service(commissions::simulate)
        .service(commissions::generate)
        .service(commissions::release_by_payment)
        .service(commissions::close_settlement)
        .service(commissions::approve_settlement)
        .service(commissions::pay_settlement)
        .service(sla::run_checks)
        .service(sla::dashboard)
        // Literal paths before `{id}` patterns.
        .service(reconciliation::summary)
        .service(reconciliation::search_titles)
        .service(reconciliation::import_statement)
        .service(reconciliation::export_statement)
        .service(reconciliation::suggestions)
        .service(reconciliation::match_entry)
        .service(reconciliation::unmatch_entry)
        .service(reconciliation::ignore_entry)
        .service(reconciliation::learn_rule)
        .service(reconciliation::create_rule);
}
