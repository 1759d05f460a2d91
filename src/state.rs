use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::ai::client::ChatClient;
use crate::ai::recipes::OpenAiRecipes;
use crate::ai::vision::OpenAiVision;
use crate::ai::{RecipeModel, VisionModel};
use crate::config::AppConfig;
use crate::data::local::LocalStore;
use crate::data::remote::PgStore;
use crate::data::store::FridgeStore;
use crate::data::DataService;
use crate::session::{self, Action, FridgeState};
use crate::storage::LocalStorage;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub data: DataService,
    pub vision: Arc<dyn VisionModel>,
    pub storage: LocalStorage,
    pub session: Arc<RwLock<FridgeState>>,
    pub db: Option<sqlx::PgPool>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let storage = LocalStorage::open(&config.data_dir)?;

        let db = match &config.backend {
            Some(backend) => Some(crate::db::lazy_pool(backend)?),
            None => {
                info!("DATABASE_URL/DATABASE_PASSWORD not set; running on local data");
                None
            }
        };

        let chat = ChatClient::new(&config.openai)?;
        if !chat.is_configured() {
            info!("OPENAI_API_KEY not set; recipe generation will use samples");
        }
        let vision: Arc<dyn VisionModel> =
            Arc::new(OpenAiVision::new(chat.clone(), &config.openai.vision_model));
        let recipes: Arc<dyn RecipeModel> =
            Arc::new(OpenAiRecipes::new(chat, &config.openai.recipe_model));

        Ok(Self::from_parts(config, db, storage, vision, recipes))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        db: Option<sqlx::PgPool>,
        storage: LocalStorage,
        vision: Arc<dyn VisionModel>,
        recipes: Arc<dyn RecipeModel>,
    ) -> Self {
        let remote = db
            .clone()
            .map(|pool| Arc::new(PgStore::new(pool)) as Arc<dyn FridgeStore>);
        Self::assemble(config, db, remote, storage, vision, recipes)
    }

    fn assemble(
        config: Arc<AppConfig>,
        db: Option<sqlx::PgPool>,
        remote: Option<Arc<dyn FridgeStore>>,
        storage: LocalStorage,
        vision: Arc<dyn VisionModel>,
        recipes: Arc<dyn RecipeModel>,
    ) -> Self {
        let local = Arc::new(LocalStore::new(storage.clone())) as Arc<dyn FridgeStore>;
        let data = DataService::new(remote, local, recipes);
        let session = Arc::new(RwLock::new(session::restore(&storage)));

        Self {
            config,
            data,
            vision,
            storage,
            session,
            db,
        }
    }

    /// Runs one transition under the write lock and persists its effects.
    ///
    /// The file writes run on the blocking pool but still inside the lock,
    /// so blobs land in transition order.
    pub async fn dispatch(&self, action: Action) -> FridgeState {
        let mut guard = self.session.write().await;
        let (next, effects) = session::reduce(&guard, action);
        if !effects.is_empty() {
            let storage = self.storage.clone();
            if let Err(e) =
                tokio::task::spawn_blocking(move || session::apply_effects(&storage, effects)).await
            {
                warn!(error = %e, "session persistence task failed; keeping in-memory state");
            }
        }
        *guard = next.clone();
        next
    }

    pub async fn snapshot(&self) -> FridgeState {
        self.session.read().await.clone()
    }

    /// Local-only state over a fresh temp dir with scripted models.
    #[cfg(test)]
    pub fn fake() -> (tempfile::TempDir, Self) {
        Self::fake_with(Arc::new(fakes::FakeVision), Arc::new(fakes::FakeRecipes))
    }

    #[cfg(test)]
    pub fn fake_with(
        vision: Arc<dyn VisionModel>,
        recipes: Arc<dyn RecipeModel>,
    ) -> (tempfile::TempDir, Self) {
        Self::fake_parts(None, vision, recipes)
    }

    /// Like [`AppState::fake`] but with `remote` standing in for the backend.
    #[cfg(test)]
    pub fn fake_with_backend(remote: Arc<dyn FridgeStore>) -> (tempfile::TempDir, Self) {
        Self::fake_parts(
            Some(remote),
            Arc::new(fakes::FakeVision),
            Arc::new(fakes::FakeRecipes),
        )
    }

    #[cfg(test)]
    fn fake_parts(
        remote: Option<Arc<dyn FridgeStore>>,
        vision: Arc<dyn VisionModel>,
        recipes: Arc<dyn RecipeModel>,
    ) -> (tempfile::TempDir, Self) {
        use crate::config::{OpenAiConfig, PredictConfig};

        let dir = tempfile::tempdir().expect("tempdir");
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            data_dir: dir.path().to_path_buf(),
            backend: None,
            openai: OpenAiConfig {
                api_key: None,
                base_url: "http://127.0.0.1:9".into(),
                vision_model: "gpt-4o".into(),
                recipe_model: "gpt-4o-mini".into(),
            },
            predict: PredictConfig {
                endpoint: "http://127.0.0.1:9/predict".into(),
                frames_dir: None,
            },
        });
        let storage = LocalStorage::open(dir.path()).expect("local storage");
        let state = Self::assemble(config, None, remote, storage, vision, recipes);
        (dir, state)
    }
}
