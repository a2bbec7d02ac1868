use std::io::{self, BufRead, Write};
use std::path::Path;

use job_scraper::{Extractor, Headhunter, Scraper, Superjob, Vacancy};
use persistence::{Destination, FileStore, MongoStore, Persistence};

use crate::Target;

fn prompt_search() -> io::Result<String> {
    print!("Enter a search phrase for vacancies: ");
    io::stdout().flush()?;
    let mut search = String::new();
    io::stdin().lock().read_line(&mut search)?;
    Ok(search.trim().to_owned())
}

/// Scrape every page of one site and merge the results into its file collection
async fn scrape_site<E: Extractor>(
    extractor: E,
    search: &str,
    files: &FileStore,
) -> persistence::Result<Vec<Vacancy>> {
    let mut scraper = Scraper::new(extractor);
    let added = scraper.parse(search, files).await?;
    log::info!(
        "{}: {} vacancies scraped from {} pages, {} new",
        scraper.extractor().source().collection(),
        scraper.vacancies().len(),
        scraper.responses().len(),
        added
    );
    Ok(scraper.vacancies().to_vec())
}

pub async fn scrape(
    data_dir: &Path,
    search: Option<String>,
    sites: Vec<Target>,
    database: bool,
) -> persistence::Result<()> {
    let search = match search {
        Some(search) => search,
        None => prompt_search()?,
    };
    let sites = if sites.is_empty() {
        Target::ALL.to_vec()
    } else {
        sites
    };
    let db = if database {
        Some(MongoStore::from_env()?)
    } else {
        None
    };
    let persistence = Persistence::new(FileStore::new(data_dir), db);

    // sites run one after another
    for site in sites {
        let vacancies = match site {
            Target::Headhunter => scrape_site(Headhunter, &search, persistence.files()).await?,
            Target::Superjob => scrape_site(Superjob, &search, persistence.files()).await?,
        };
        if database {
            let collection = site.source().collection();
            persistence
                .save(collection, &vacancies, Destination::Database)
                .await?;
        }
    }
    Ok(())
}
