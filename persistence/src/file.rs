use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use job_scraper::{Vacancy, VacancyStore};
use log;

use crate::error::{Error, Result};
use crate::query::SalaryQuery;

/// Append `new` vacancies to `existing`, skipping any that are already present.
/// Returns the number of appended vacancies.
pub fn merge(existing: &mut Vec<Vacancy>, new: &[Vacancy]) -> usize {
    let mut seen: HashSet<Vacancy> = existing.iter().cloned().collect();
    let before = existing.len();
    for vacancy in new {
        if seen.insert(vacancy.clone()) {
            existing.push(vacancy.clone());
        }
    }
    existing.len() - before
}

/// One pretty printed JSON array per collection, `<dir>/<collection>_vacancies.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}_vacancies.json", collection))
    }

    /// Stored vacancies of `collection`. A missing or unreadable file is an empty collection.
    pub async fn load(&self, collection: &str) -> Vec<Vacancy> {
        let path = self.path(collection);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) => {
                log::debug!("no stored vacancies at {}: {}", path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&data) {
            Ok(vacancies) => vacancies,
            Err(e) => {
                log::warn!(
                    "ignoring unreadable vacancy file {}: {}",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Merge `vacancies` into the stored collection and rewrite the whole file
    pub async fn save(&self, collection: &str, vacancies: &[Vacancy]) -> Result<usize> {
        let mut stored = self.load(collection).await;
        let added = merge(&mut stored, vacancies);
        let json = serde_json::to_string_pretty(&stored)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path(collection);
        tokio::fs::write(&path, json).await?;
        log::info!(
            "saved {} new vacancies to {} ({} total)",
            added,
            path.display(),
            stored.len()
        );
        Ok(added)
    }

    pub async fn find_by_salary(&self, collection: &str, query: &SalaryQuery) -> Vec<Vacancy> {
        query.apply(&self.load(collection).await)
    }
}

#[async_trait]
impl VacancyStore for FileStore {
    type E = Error;

    async fn save(&self, collection: &str, vacancies: &[Vacancy]) -> Result<usize> {
        FileStore::save(self, collection, vacancies).await
    }
}
