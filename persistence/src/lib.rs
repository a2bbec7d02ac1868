pub mod config;
pub mod error;
pub mod file;
pub mod mongo;
pub mod query;
pub mod tunnel;

use job_scraper::Vacancy;
use log;

pub use config::{DbConfig, TunnelConfig};
pub use error::{Error, Result};
pub use file::{merge, FileStore};
pub use mongo::MongoStore;
pub use query::SalaryQuery;
pub use tunnel::SshTunnel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    File,
    Database,
}

/// File collections, plus the database ones when one is configured
#[derive(Debug, Clone)]
pub struct Persistence {
    files: FileStore,
    database: Option<MongoStore>,
}

impl Persistence {
    pub fn new(files: FileStore, database: Option<MongoStore>) -> Self {
        Self { files, database }
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    fn database(&self) -> Result<&MongoStore> {
        self.database.as_ref().ok_or(Error::NoDatabase)
    }

    /// Merge `vacancies` into `collection` without creating duplicates, returns how many were new
    pub async fn save(
        &self,
        collection: &str,
        vacancies: &[Vacancy],
        destination: Destination,
    ) -> Result<usize> {
        log::debug!(
            "saving {} vacancies to '{}' ({:?})",
            vacancies.len(),
            collection,
            destination
        );
        match destination {
            Destination::File => self.files.save(collection, vacancies).await,
            Destination::Database => self.database()?.insert_objects(collection, vacancies).await,
        }
    }

    pub async fn find_by_salary(
        &self,
        collection: &str,
        query: &SalaryQuery,
        destination: Destination,
    ) -> Result<Vec<Vacancy>> {
        match destination {
            Destination::File => Ok(self.files.find_by_salary(collection, query).await),
            Destination::Database => self.database()?.find_by_salary(collection, query).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::query::test::vacancy;

    #[tokio::test]
    async fn test_file_destination() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(FileStore::new(dir.path()), None);
        let vacancies = vec![
            vacancy("a", Some(120000), None),
            vacancy("b", None, None),
        ];
        let added = persistence
            .save("headhunter", &vacancies, Destination::File)
            .await
            .unwrap();
        assert_eq!(added, 2);
        let found = persistence
            .find_by_salary("headhunter", &SalaryQuery::default(), Destination::File)
            .await
            .unwrap();
        assert_eq!(found, vacancies);
    }

    #[tokio::test]
    async fn test_database_destination_without_config() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(FileStore::new(dir.path()), None);
        let result = persistence
            .save("superjob", &[], Destination::Database)
            .await;
        assert!(matches!(result, Err(Error::NoDatabase)));
        let result = persistence
            .find_by_salary("superjob", &SalaryQuery::without_salary(), Destination::Database)
            .await;
        assert!(matches!(result, Err(Error::NoDatabase)));
    }
}
