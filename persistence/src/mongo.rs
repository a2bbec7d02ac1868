use std::future::Future;

use async_trait::async_trait;
use futures::TryStreamExt;
use job_scraper::{Vacancy, VacancyStore};
use log;
use mongodb::bson::{self, Document};
use mongodb::{Client, Database};

use crate::config::DbConfig;
use crate::error::{Error, Result};
use crate::query::SalaryQuery;
use crate::tunnel::SshTunnel;

fn tunnel_uri(local_port: u16) -> String {
    format!("mongodb://127.0.0.1:{}/?directConnection=true", local_port)
}

/// Drop `value` on the blocking pool, its `Drop` may join threads and wait on the network
async fn drop_blocking<T: Send + 'static>(value: T) {
    if let Err(e) = tokio::task::spawn_blocking(move || drop(value)).await {
        log::error!("closing ssh tunnel failed: {}", e);
    }
}

/// Vacancy collections in a mongodb instance that is only reachable through ssh.
/// Every operation opens its own tunnel and closes it before returning.
#[derive(Debug, Clone)]
pub struct MongoStore {
    config: DbConfig,
}

impl MongoStore {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self> {
        DbConfig::from_env().map(Self::new)
    }

    /// Run `body` against the configured database while a tunnel is open.
    /// The tunnel is closed on every exit path, including errors returned by `body`.
    pub async fn with_tunnel<F, Fut, T>(&self, body: F) -> Result<T>
    where
        F: FnOnce(Database) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let tunnel_config = self.config.tunnel.clone();
        let tunnel = tokio::task::spawn_blocking(move || SshTunnel::open(&tunnel_config)).await??;
        let client = Client::with_uri_str(tunnel_uri(tunnel.local_port())).await?;
        let result = body(client.database(&self.config.database)).await;
        client.shutdown().await;
        drop_blocking(tunnel).await;
        result
    }

    /// Insert every vacancy that has no identical document in `collection` yet
    pub async fn insert_objects(&self, collection: &str, vacancies: &[Vacancy]) -> Result<usize> {
        let inserted = self
            .with_tunnel(|db| async move {
                let collection = db.collection::<Vacancy>(collection);
                let mut inserted = 0;
                for vacancy in vacancies {
                    let filter = bson::to_document(vacancy)?;
                    if collection.count_documents(filter, None).await? == 0 {
                        collection.insert_one(vacancy, None).await?;
                        inserted += 1;
                    }
                }
                Ok::<_, Error>(inserted)
            })
            .await?;
        log::info!(
            "inserted {} of {} vacancies into '{}'",
            inserted,
            vacancies.len(),
            collection
        );
        Ok(inserted)
    }

    pub async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Vacancy>> {
        log::debug!("querying '{}' with {}", collection, filter);
        self.with_tunnel(|db| async move {
            let cursor = db.collection::<Vacancy>(collection).find(filter, None).await?;
            let vacancies: Vec<Vacancy> = cursor.try_collect().await?;
            Ok::<_, Error>(vacancies)
        })
        .await
    }

    pub async fn find_by_salary(&self, collection: &str, query: &SalaryQuery) -> Result<Vec<Vacancy>> {
        self.find(collection, query.to_filter()).await
    }
}

#[async_trait]
impl VacancyStore for MongoStore {
    type E = Error;

    async fn save(&self, collection: &str, vacancies: &[Vacancy]) -> Result<usize> {
        self.insert_objects(collection, vacancies).await
    }
}
