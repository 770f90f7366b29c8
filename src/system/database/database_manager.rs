use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bson::doc;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::{info, warn};

use crate::domains::{
    events::Event, notes::Note, orders::Order, posts::Post, products::Product, tasks::Task,
};
use crate::shared::models::User;
use crate::shared::state::Stores;
use crate::shared::store::{MongoStore, Record};
use crate::system::config::DatabaseConfig;

/// One MongoDB connection and the database it serves.
#[derive(Debug, Clone)]
pub struct DatabaseService {
    client: Client,
    database: Database,
}

impl DatabaseService {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Initializing database connection...");

        let uri = config.connection_string();
        let mut client_options = ClientOptions::parse(uri.as_str())
            .await
            .context("Failed to parse MongoDB connection string")?;

        let timeout = Duration::from_secs(config.connection_timeout);
        client_options.max_pool_size = Some(config.max_connections);
        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);

        let client =
            Client::with_options(client_options).context("Failed to create MongoDB client")?;

        // A URI without a path still needs a database to work in
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&config.database));

        database
            .run_command(doc! { "ping": 1 })
            .await
            .with_context(|| format!("Failed to ping database {}", database.name()))?;

        info!(database = database.name(), "Connected to database");
        Ok(Self { client, database })
    }

    pub fn name(&self) -> &str {
        self.database.name()
    }

    /// Stores for every collection, with their indexes in place.
    pub async fn stores(&self) -> Result<Stores> {
        Ok(Stores {
            users: self.store::<User>().await?,
            tasks: self.store::<Task>().await?,
            notes: self.store::<Note>().await?,
            posts: self.store::<Post>().await?,
            events: self.store::<Event>().await?,
            orders: self.store::<Order>().await?,
            products: self.store::<Product>().await?,
        })
    }

    async fn store<T: Record>(&self) -> Result<Arc<MongoStore<T>>> {
        let store = MongoStore::<T>::new(&self.database);
        store
            .ensure_indexes()
            .await
            .with_context(|| format!("Failed to create indexes for {}", T::COLLECTION))?;
        Ok(Arc::new(store))
    }

    pub async fn health_check(&self) -> bool {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "database health check failed");
                false
            }
        }
    }

    pub async fn close(self) {
        info!("Closing database connection...");
        self.client.shutdown().await;
    }
}
