use std::time::Duration;

use log;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::client::{Request, Response, RetryClient, ReqwestTransport, Transport};
use crate::salary::normalize;
use crate::types::{Error, PartialVacancy, Source, Vacancy};
use crate::VacancyStore;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.82 Safari/537.36";
pub const RETRY_COUNT: u32 = 10;
pub const RETRY_SLEEP: Duration = Duration::from_secs(5);

/// The site specific half of a [`Scraper`]
pub trait Extractor: Send + Sync {
    fn source(&self) -> Source;

    fn base_url(&self) -> &'static str;

    fn search_path(&self) -> &'static str;

    /// Query parameters for page `page_index`. `next_params` are the parameters taken from the
    /// previous page's next-page link, if the site provides them.
    fn query(
        &self,
        search: &str,
        page_index: u32,
        next_params: Vec<(String, String)>,
    ) -> Vec<(String, String)>;

    fn extract(&self, doc: &Html) -> Vec<PartialVacancy>;

    /// `Some` if the page links to a following one, carrying whatever parameters the link holds
    fn next_page_params(&self, doc: &Html) -> Option<Vec<(String, String)>>;

    fn has_next_page(&self, doc: &Html) -> bool {
        self.next_page_params(doc).is_some()
    }
}

pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e:?}"))
}

pub(crate) fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_owned()
}

/// Anchor `href` at `base`: only the path of the link is kept, query and fragment are dropped
pub fn absolute_link(base: &str, href: &str) -> Result<String, Error> {
    let base = Url::parse(base).map_err(|_| Error::InvalidUrl(base.to_owned()))?;
    let link = base
        .join(href)
        .map_err(|_| Error::InvalidUrl(href.to_owned()))?;
    let mut anchored = base
        .join(link.path())
        .map_err(|_| Error::InvalidUrl(href.to_owned()))?;
    anchored.set_query(None);
    anchored.set_fragment(None);
    Ok(anchored.into())
}

/// Drives an [`Extractor`] over all result pages of a search
pub struct Scraper<E, T = ReqwestTransport> {
    extractor: E,
    client: RetryClient<T>,
    responses: Vec<Option<Response>>,
    vacancies: Vec<Vacancy>,
}

impl<E: Extractor> Scraper<E, ReqwestTransport> {
    pub fn new(extractor: E) -> Self {
        Self::with_client(extractor, RetryClient::new(RETRY_COUNT, RETRY_SLEEP))
    }
}

impl<E: Extractor, T: Transport> Scraper<E, T> {
    pub fn with_client(extractor: E, client: RetryClient<T>) -> Self {
        Self {
            extractor,
            client,
            responses: Vec::new(),
            vacancies: Vec::new(),
        }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub fn client(&self) -> &RetryClient<T> {
        &self.client
    }

    /// Every response received so far in request order, `None` where all retries failed
    pub fn responses(&self) -> &[Option<Response>] {
        &self.responses
    }

    pub fn vacancies(&self) -> &[Vacancy] {
        &self.vacancies
    }

    /// Request one result page and append the outcome to the response log
    pub async fn request(
        &mut self,
        search: &str,
        page_index: u32,
        next_params: Vec<(String, String)>,
    ) -> Option<&Response> {
        let url = format!(
            "{}{}",
            self.extractor.base_url(),
            self.extractor.search_path()
        );
        let request = Request::get(url)
            .params(self.extractor.query(search, page_index, next_params))
            .header("user-agent", USER_AGENT);
        let resp = self.client.send(&request).await;
        self.responses.push(resp);
        self.responses.last().and_then(Option::as_ref)
    }

    fn read_page(&self, body: &str) -> (Vec<PartialVacancy>, Option<Vec<(String, String)>>) {
        let doc = Html::parse_document(body);
        (
            self.extractor.extract(&doc),
            self.extractor.next_page_params(&doc),
        )
    }

    /// Walk all result pages for `search`, collecting vacancies until a page has no next-page
    /// link or a page could not be fetched. Returns the number of vacancies added.
    pub async fn scrape(&mut self, search: &str) -> usize {
        let search = search.split_whitespace().collect::<Vec<_>>().join(" ");
        let source = self.extractor.source();
        let before = self.vacancies.len();
        let mut page_index = 0;
        let mut next_params = Vec::new();
        loop {
            let body = match self.request(&search, page_index, next_params).await {
                Some(resp) => resp.body.clone(),
                None => {
                    log::error!(
                        "{} page {} unavailable, stopping with partial results",
                        source.collection(),
                        page_index
                    );
                    break;
                }
            };
            let (records, next) = self.read_page(&body);
            log::info!(
                "{} page {}: {} vacancies",
                source.collection(),
                page_index,
                records.len()
            );
            self.vacancies
                .extend(records.into_iter().map(|partial| Vacancy {
                    salary: normalize(&partial.raw_salary, partial.frequency.as_deref()),
                    name: partial.name,
                    link: partial.link,
                    source,
                }));
            match next {
                Some(params) => {
                    page_index += 1;
                    next_params = params;
                }
                None => break,
            }
        }
        self.vacancies.len() - before
    }

    /// Scrape all pages for `search` and hand the collected vacancies to `store`
    pub async fn parse<S: VacancyStore + ?Sized>(
        &mut self,
        search: &str,
        store: &S,
    ) -> Result<usize, S::E> {
        self.scrape(search).await;
        store
            .save(self.extractor.source().collection(), &self.vacancies)
            .await
    }
}
