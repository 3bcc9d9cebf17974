//! Session controller endpoints: the "current conversation" pointer.

use actix_web::{get, post, web, HttpResponse};

use crate::dto::{ReplaceMessagesRequest, SaveChatResponse, SwitchModelRequest};
use crate::error::AppError;
use crate::server::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(get_session)
        .service(new_conversation)
        .service(switch_model)
        .service(replace_messages)
        .service(save_session)
        .service(load_conversation);
}

#[get("/session")]
pub async fn get_session(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.session.view().await)
}

/// Start a fresh conversation; the outgoing transcript is saved first when
/// it has messages.
#[post("/session/new")]
pub async fn new_conversation(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.session.new_conversation().await?;
    Ok(HttpResponse::Ok().json(state.session.view().await))
}

/// Switch models. The transcript carries over as an unsaved draft.
#[post("/session/model")]
pub async fn switch_model(
    request: web::Json<SwitchModelRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let model = request.into_inner().model;
    if model.is_empty() {
        return Err(AppError::InvalidInput("model must not be empty".to_string()));
    }

    state.session.switch_model(model).await?;
    Ok(HttpResponse::Ok().json(state.session.view().await))
}

/// Replace the in-memory transcript. Schedules the debounced autosave.
#[post("/session/messages")]
pub async fn replace_messages(
    request: web::Json<ReplaceMessagesRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    state
        .session
        .replace_messages(request.into_inner().messages)
        .await;
    HttpResponse::Ok().json(state.session.view().await)
}

/// Explicit save, bypassing the debounce.
#[post("/session/save")]
pub async fn save_session(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let chat = state.session.save_current().await?;
    Ok(HttpResponse::Ok().json(SaveChatResponse {
        saved: chat.is_some(),
        chat,
    }))
}

/// Load a stored conversation into the session.
#[post("/session/load/{id}")]
pub async fn load_conversation(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chat = state.session.load(&id).await?;
    Ok(HttpResponse::Ok().json(chat))
}
