use fridgemate::{app, db, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fridgemate::init_tracing("fridgemate=debug,axum=info,tower_http=info");

    let state = AppState::init().await?;

    if let Some(pool) = &state.db {
        if let Err(e) = db::run_migrations(pool).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }
    }

    let config = state.config.clone();
    let router = app::build_app(state);
    app::serve(&config, router).await
}
