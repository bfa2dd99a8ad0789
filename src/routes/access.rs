use actix_web::{Responder, get, post, put, web};

use crate::forms::access::{AssignRoleForm, SyncRolePermissionsForm};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::access as access_service;

#[get("/me/permissions")]
pub async fn my_permissions(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        access_service::my_permissions(repo.get_ref(), &user),
        "list the caller's permissions",
    )
}

#[get("/iam/permissions")]
pub async fn list_permissions(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        access_service::list_permissions(repo.get_ref(), &user),
        "list permissions",
    )
}

#[get("/iam/roles")]
pub async fn list_roles(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(access_service::list_roles(repo.get_ref(), &user), "list roles")
}

#[put("/iam/roles/{role_id}/permissions")]
pub async fn sync_role_permissions(
    role_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SyncRolePermissionsForm>,
) -> impl Responder {
    respond(
        access_service::sync_role_permissions(repo.get_ref(), &user, role_id.into_inner(), form),
        "sync role permissions",
    )
}

#[post("/iam/users/{user_id}/roles")]
pub async fn assign_role(
    user_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AssignRoleForm>,
) -> impl Responder {
    respond(
        access_service::assign_role(repo.get_ref(), &user, user_id.into_inner(), form),
        "assign a role",
    )
}
