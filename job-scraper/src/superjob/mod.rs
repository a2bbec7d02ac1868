use lazy_static::lazy_static;
use log;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::extractor::{absolute_link, element_text, selector, Extractor};
use crate::types::{PartialVacancy, Source};

pub const BASE_URL: &str = "https://superjob.ru";

lazy_static! {
    static ref VACANCY: Selector = selector(r#"[class^="jNMYr GPKTZ _1tH7S"]"#);
    static ref TITLE_LINK: Selector = selector(r#"[class^="icMQ_ _6AfZ9"]"#);
    static ref SALARY: Selector = selector(r#"[class^="_1OuF_ _1qw9T"]"#);
    static ref SALARY_AMOUNT: Selector = selector(r#"[class^="_3mfro _2Wp8I"]"#);
    static ref SALARY_FREQUENCY: Selector = selector(r#"[class^="_3mfro PlM3e"]"#);
    static ref PAGER: Selector = selector(r#"[class^="_3zucV L1p51"]"#);
    static ref NEXT: Selector = selector(r#"[rel="next"]"#);
}

fn without_nbsp(text: String) -> String {
    text.replace('\u{a0}', "").trim().to_owned()
}

/// Amount and pay frequency of the salary block, empty amount if the block is missing
fn salary(vacancy: ElementRef) -> (String, Option<String>) {
    let Some(block) = vacancy.select(&SALARY).next() else {
        return (String::new(), None);
    };
    let amount = block
        .select(&SALARY_AMOUNT)
        .next()
        .map(|el| without_nbsp(el.text().collect()))
        .unwrap_or_default();
    let frequency = block
        .select(&SALARY_FREQUENCY)
        .next()
        .map(|el| without_nbsp(el.text().collect()));
    (amount, frequency)
}

/// Decoded `key=value` pairs of the query part of `href`, relative links are resolved against the site
fn query_pairs(href: &str) -> Vec<(String, String)> {
    let url = match Url::parse(BASE_URL).and_then(|base| base.join(href)) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("superjob.ru unusable next page link '{}': {}", href, e);
            return Vec::new();
        }
    };
    url.query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// superjob.ru search results, paged by following the `rel="next"` link of the pager
#[derive(Debug, Default, Clone, Copy)]
pub struct Superjob;

impl Extractor for Superjob {
    fn source(&self) -> Source {
        Source::Superjob
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn search_path(&self) -> &'static str {
        "/vacancy/search/"
    }

    fn query(
        &self,
        search: &str,
        _page_index: u32,
        next_params: Vec<(String, String)>,
    ) -> Vec<(String, String)> {
        if !next_params.is_empty() {
            return next_params;
        }
        vec![
            ("keywords".to_owned(), search.to_owned()),
            ("noGeo".to_owned(), "1".to_owned()),
        ]
    }

    fn extract(&self, doc: &Html) -> Vec<PartialVacancy> {
        doc.select(&VACANCY)
            .filter_map(|vacancy| {
                let Some(title) = vacancy.select(&TITLE_LINK).next() else {
                    log::warn!("superjob.ru vacancy without title, skipping");
                    return None;
                };
                let Some(href) = title.value().attr("href") else {
                    log::warn!(
                        "superjob.ru vacancy '{}' without link, skipping",
                        element_text(title)
                    );
                    return None;
                };
                let link = match absolute_link(BASE_URL, href) {
                    Ok(link) => link,
                    Err(e) => {
                        log::warn!("skipping superjob.ru vacancy: {}", e);
                        return None;
                    }
                };
                let (raw_salary, frequency) = salary(vacancy);
                Some(PartialVacancy {
                    name: element_text(title),
                    raw_salary,
                    frequency,
                    link,
                })
            })
            .collect()
    }

    fn next_page_params(&self, doc: &Html) -> Option<Vec<(String, String)>> {
        let next = doc.select(&PAGER).next()?.select(&NEXT).next()?;
        let params = query_pairs(next.value().attr("href")?);
        if params.is_empty() {
            log::warn!("superjob.ru next page link without query, stopping");
            return None;
        }
        Some(params)
    }
}
