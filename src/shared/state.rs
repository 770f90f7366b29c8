use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domains::{
    events::Event,
    notes::Note,
    orders::Order,
    posts::Post,
    products::Product,
    tasks::Task,
    user::services::{
        AuthService, JwtConfig, JwtService, PasswordConfig, PasswordService, UserService,
    },
};
use crate::shared::models::User;
use crate::shared::store::{MemoryStore, RecordStore};
use crate::system::config::AppConfig;
use crate::system::database::DatabaseService;

/// One store per collection.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn RecordStore<User>>,
    pub tasks: Arc<dyn RecordStore<Task>>,
    pub notes: Arc<dyn RecordStore<Note>>,
    pub posts: Arc<dyn RecordStore<Post>>,
    pub events: Arc<dyn RecordStore<Event>>,
    pub orders: Arc<dyn RecordStore<Order>>,
    pub products: Arc<dyn RecordStore<Product>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryStore::<User>::new()),
            tasks: Arc::new(MemoryStore::<Task>::new()),
            notes: Arc::new(MemoryStore::<Note>::new()),
            posts: Arc::new(MemoryStore::<Post>::new()),
            events: Arc::new(MemoryStore::<Event>::new()),
            orders: Arc::new(MemoryStore::<Order>::new()),
            products: Arc::new(MemoryStore::<Product>::new()),
        }
    }
}

/// Everything a handler may need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
    pub database: Option<DatabaseService>,
    pub tokens: Arc<JwtService>,
    pub users: UserService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        stores: Stores,
        database: Option<DatabaseService>,
    ) -> Result<Self> {
        let passwords = PasswordService::new(PasswordConfig {
            bcrypt_cost: config.auth.bcrypt_cost,
        })
        .context("Failed to initialize password hashing")?;
        let tokens = Arc::new(JwtService::new(JwtConfig::from(&config.auth)));

        let users = UserService::new(stores.users.clone(), passwords);
        let auth = AuthService::new(users.clone(), tokens.clone());

        Ok(Self {
            config: Arc::new(config),
            stores,
            database,
            tokens,
            users,
            auth,
        })
    }

    pub fn storage(&self) -> &'static str {
        if self.database.is_some() {
            "mongodb"
        } else {
            "memory"
        }
    }
}
