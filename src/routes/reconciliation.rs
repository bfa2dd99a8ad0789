use actix_multipart::form::MultipartForm;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder, get, post, web};

use crate::forms::reconciliation::{
    CreateRuleForm, ImportStatementForm, MatchEntryForm, SearchTitlesQuery, SuggestionsQuery,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{error_response, respond, respond_created};
use crate::services::reconciliation as reconciliation_service;

#[post("/bank-statements")]
pub async fn import_statement(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<ImportStatementForm>,
) -> impl Responder {
    respond_created(
        reconciliation_service::import_statement(repo.get_ref(), &user, form),
        "import a bank statement",
    )
}

#[get("/bank-statements/summary")]
pub async fn summary(user: AuthenticatedUser, repo: web::Data<DieselRepository>) -> impl Responder {
    respond(
        reconciliation_service::summary(repo.get_ref(), &user),
        "summarize reconciliation",
    )
}

#[get("/bank-statements/{statement_id}/export")]
pub async fn export_statement(
    statement_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match reconciliation_service::export_statement(repo.get_ref(), &user, statement_id.into_inner())
    {
        Ok(export) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(export.filename)],
            })
            .body(export.content),
        Err(err) => error_response(err, "export a bank statement"),
    }
}

#[get("/bank-statement-entries/search-titles")]
pub async fn search_titles(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<SearchTitlesQuery>,
) -> impl Responder {
    respond(
        reconciliation_service::search_titles(repo.get_ref(), &user, query),
        "search open titles",
    )
}

#[get("/bank-statement-entries/{entry_id}/suggestions")]
pub async fn suggestions(
    entry_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<SuggestionsQuery>,
) -> impl Responder {
    respond(
        reconciliation_service::suggestions(repo.get_ref(), &user, entry_id.into_inner(), query),
        "suggest matches",
    )
}

#[post("/bank-statement-entries/{entry_id}/match")]
pub async fn match_entry(
    entry_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<MatchEntryForm>,
) -> impl Responder {
    respond(
        reconciliation_service::match_entry(repo.get_ref(), &user, entry_id.into_inner(), form),
        "match an entry",
    )
}

#[post("/bank-statement-entries/{entry_id}/unmatch")]
pub async fn unmatch_entry(
    entry_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        reconciliation_service::unmatch_entry(repo.get_ref(), &user, entry_id.into_inner()),
        "unmatch an entry",
    )
}

#[post("/bank-statement-entries/{entry_id}/ignore")]
pub async fn ignore_entry(
    entry_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        reconciliation_service::ignore_entry(repo.get_ref(), &user, entry_id.into_inner()),
        "ignore an entry",
    )
}

#[get("/bank-statement-entries/{entry_id}/learn-rule")]
pub async fn learn_rule(
    entry_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        reconciliation_service::learn_rule(repo.get_ref(), &user, entry_id.into_inner()),
        "propose a rule",
    )
}

#[post("/reconciliation-rules")]
pub async fn create_rule(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateRuleForm>,
) -> impl Responder {
    respond_created(
        reconciliation_service::create_rule(repo.get_ref(), &user, form),
        "create a reconciliation rule",
    )
}
