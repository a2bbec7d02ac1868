pub mod client;
pub mod extractor;
pub mod headhunter;
pub mod salary;
pub mod superjob;
pub mod types;

use async_trait::async_trait;

pub use extractor::{Extractor, Scraper};
pub use headhunter::Headhunter;
pub use superjob::Superjob;
pub use types::{Error, PartialVacancy, SalaryRange, Source, Vacancy};

/// Destination for the vacancies of a finished scrape
#[async_trait]
pub trait VacancyStore: Sync {
    type E: std::error::Error + Send + Sync;

    /// Merge `vacancies` into `collection`, returns how many were new
    async fn save(&self, collection: &str, vacancies: &[Vacancy]) -> Result<usize, Self::E>;
}
