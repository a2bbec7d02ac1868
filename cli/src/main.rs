mod find;
mod scrape;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use job_scraper::Source;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the `<site>_vacancies.json` files
    #[clap(long, default_value = ".", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape vacancies and merge them into the stored collections
    Scrape {
        /// Search phrase, asked for on stdin when missing
        #[clap(long)]
        search: Option<String>,
        /// Job boards to scrape, all of them by default
        #[clap(long, value_enum)]
        site: Vec<Target>,
        /// Also store the results in the database
        #[clap(long)]
        database: bool,
    },
    /// Print stored vacancies filtered by salary
    Find {
        #[clap(long, value_enum)]
        site: Target,
        /// Either salary bound above this value
        #[clap(long)]
        gt: Option<i64>,
        /// Either salary bound below this value
        #[clap(long)]
        lt: Option<i64>,
        /// Only vacancies without any salary bound
        #[clap(long)]
        only_without_salary: bool,
        /// Query the database instead of the files
        #[clap(long)]
        database: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Headhunter,
    Superjob,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Headhunter, Target::Superjob];

    pub fn source(self) -> Source {
        match self {
            Target::Headhunter => Source::Headhunter,
            Target::Superjob => Source::Superjob,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();
    let args = Cli::parse();
    let result = match args.command {
        Commands::Scrape {
            search,
            site,
            database,
        } => scrape::scrape(&args.data_dir, search, site, database).await,
        Commands::Find {
            site,
            gt,
            lt,
            only_without_salary,
            database,
        } => {
            let query = persistence::SalaryQuery {
                gt,
                lt,
                only_without_salary,
            };
            find::find(&args.data_dir, site, query, database).await
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scrape_defaults() {
        let cli = Cli::try_parse_from(["cli", "scrape", "--search", "rust developer"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("."));
        match cli.command {
            Commands::Scrape {
                search,
                site,
                database,
            } => {
                assert_eq!(search.as_deref(), Some("rust developer"));
                assert!(site.is_empty());
                assert!(!database);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_find_arguments() {
        let cli = Cli::try_parse_from([
            "cli", "--data-dir", "/tmp/jobs", "find", "--site", "superjob", "--gt", "100000",
            "--lt", "350000", "--database",
        ])
        .unwrap();
        match cli.command {
            Commands::Find {
                site,
                gt,
                lt,
                only_without_salary,
                database,
            } => {
                assert_eq!(site.source().collection(), "superjob");
                assert_eq!((gt, lt), (Some(100000), Some(350000)));
                assert!(!only_without_salary);
                assert!(database);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
