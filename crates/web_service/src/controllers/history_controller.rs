//! History CRUD endpoints and the model catalog.

use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::dto::{
    DeleteChatResponse, PageQuery, SaveChatRequest, SaveChatResponse, UpdateChatResponse,
};
use crate::error::AppError;
use crate::server::AppState;

/// Page size used when only an offset is given.
const DEFAULT_PAGE_SIZE: usize = 50;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_chats)
        .service(get_chat)
        .service(save_chat)
        .service(update_chat)
        .service(delete_chat)
        .service(clear_chats)
        .service(list_models);
}

/// List stored chats, most recently updated first. `limit`/`offset` switch
/// to paginated mode; a short page means there are no further pages.
#[get("/history")]
pub async fn list_chats(
    query: web::Query<PageQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chats = match (query.limit, query.offset) {
        (None, None) => state.history.list().await?,
        (limit, offset) => {
            state
                .history
                .list_page(limit.unwrap_or(DEFAULT_PAGE_SIZE), offset.unwrap_or(0))
                .await?
        }
    };
    Ok(HttpResponse::Ok().json(chats))
}

#[get("/history/{id}")]
pub async fn get_chat(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chat = state.history.get_by_id(&id).await?;
    Ok(HttpResponse::Ok().json(chat))
}

/// Create a new record. An empty message list is not saved and reports
/// `saved: false` rather than an error.
#[post("/history")]
pub async fn save_chat(
    request: web::Json<SaveChatRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let SaveChatRequest { messages, model } = request.into_inner();
    let model = model.unwrap_or_else(|| state.config.default_model().to_string());

    let chat = state.history.save(&messages, &model).await?;
    Ok(HttpResponse::Ok().json(SaveChatResponse {
        saved: chat.is_some(),
        chat,
    }))
}

#[put("/history/{id}")]
pub async fn update_chat(
    id: web::Path<String>,
    request: web::Json<SaveChatRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let SaveChatRequest { messages, model } = request.into_inner();
    let model = model.unwrap_or_else(|| state.config.default_model().to_string());

    let updated = state.history.update(&id, &messages, &model).await?;
    Ok(HttpResponse::Ok().json(UpdateChatResponse { updated }))
}

#[delete("/history/{id}")]
pub async fn delete_chat(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let deleted = state.session.delete(&id).await?;
    Ok(HttpResponse::Ok().json(DeleteChatResponse { deleted }))
}

#[delete("/history")]
pub async fn clear_chats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let cleared = state.history.clear_all().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "cleared": cleared })))
}

#[get("/models")]
pub async fn list_models() -> HttpResponse {
    HttpResponse::Ok().json(chat_core::models())
}
