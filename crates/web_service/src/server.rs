use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use chat_core::Config;
use history_store::ChatHistoryStore;
use llm_client::{provider_for_model, LlmProvider};
use log::{error, info};

use crate::controllers::{chat_controller, history_controller, session_controller};
use crate::services::SessionService;

/// Resolves a model id to its transport. Behind a trait so tests can swap
/// in a scripted provider.
pub trait ProviderResolver: Send + Sync {
    fn provider_for(&self, model: &str) -> llm_client::Result<Arc<dyn LlmProvider>>;
}

/// Default resolver: routes through the configured API keys.
pub struct ConfigProviderResolver {
    config: Config,
}

impl ConfigProviderResolver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ProviderResolver for ConfigProviderResolver {
    fn provider_for(&self, model: &str) -> llm_client::Result<Arc<dyn LlmProvider>> {
        provider_for_model(&self.config, model)
    }
}

pub struct AppState {
    pub config: Config,
    pub history: Arc<dyn ChatHistoryStore>,
    pub providers: Arc<dyn ProviderResolver>,
    pub session: SessionService,
}

impl AppState {
    pub fn new(
        config: Config,
        history: Arc<dyn ChatHistoryStore>,
        providers: Arc<dyn ProviderResolver>,
    ) -> Self {
        let session = SessionService::new(history.clone(), config.default_model());
        Self {
            config,
            history,
            providers,
            session,
        }
    }
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(chat_controller::config)
        .configure(history_controller::config)
        .configure(session_controller::config);
}

pub async fn run(
    config: Config,
    history: Arc<dyn ChatHistoryStore>,
    port: u16,
) -> Result<(), String> {
    info!("Starting web service...");

    let providers: Arc<dyn ProviderResolver> =
        Arc::new(ConfigProviderResolver::new(config.clone()));
    let app_state = web::Data::new(AppState::new(config, history, providers));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind(format!("127.0.0.1:{port}"))
    .map_err(|e| format!("Failed to bind server: {e}"))?
    .run();

    info!("Web service listening on http://127.0.0.1:{port}");

    if let Err(e) = server.await {
        error!("Web server error: {}", e);
        return Err(format!("Web server error: {e}"));
    }

    Ok(())
}
