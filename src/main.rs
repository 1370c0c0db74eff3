//src/main.rs

use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use painel::config::{AppState, Settings};
use painel::routes::build_router;

const SESSION_SWEEP_SECS: u64 = 600;

#[tokio::main]
async fn main() {
    // RUST_LOG sobrescreve o filtro padrão
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("painel=info")),
        )
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env().expect("Falha ao carregar a configuração.");
    let bind_addr = settings.bind_addr.clone();

    let app_state = AppState::new(settings)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    tracing::info!("🔗 API de assinaturas em {}", app_state.settings.api_url);

    // Sessões com cookie vencido ou sem tokens saem da memória
    app_state
        .sessions
        .spawn_eviction(app_state.settings.session_ttl, Duration::from_secs(SESSION_SWEEP_SECS));

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Painel escutando em {}", bind_addr);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
