use std::path::Path;

use persistence::{Destination, FileStore, MongoStore, Persistence, SalaryQuery};

use crate::Target;

pub async fn find(
    data_dir: &Path,
    site: Target,
    query: SalaryQuery,
    database: bool,
) -> persistence::Result<()> {
    let (db, destination) = if database {
        (Some(MongoStore::from_env()?), Destination::Database)
    } else {
        (None, Destination::File)
    };
    let persistence = Persistence::new(FileStore::new(data_dir), db);
    let collection = site.source().collection();
    let vacancies = persistence
        .find_by_salary(collection, &query, destination)
        .await?;
    log::info!(
        "{} vacancies in '{}' match {:?}",
        vacancies.len(),
        collection,
        query
    );
    println!("{}", serde_json::to_string_pretty(&vacancies)?);
    Ok(())
}
