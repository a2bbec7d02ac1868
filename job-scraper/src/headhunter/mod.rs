use lazy_static::lazy_static;
use log;
use scraper::{Html, Selector};

use crate::extractor::{absolute_link, element_text, selector, Extractor};
use crate::salary::MONTHLY;
use crate::types::{PartialVacancy, Source};

pub const BASE_URL: &str = "https://hh.ru";

lazy_static! {
    static ref VACANCY: Selector =
        selector(r#"div[class^="vacancy-serp-item__row vacancy-serp-item__row_header"]"#);
    static ref HEADER: Selector =
        selector(r#"[class^="bloko-section-header-3 bloko-section-header-3_lite"]"#);
    static ref TITLE_LINK: Selector = selector(r#"[class^="bloko-link"]"#);
    static ref PAGER_NEXT: Selector = selector(r#"a[data-qa="pager-next"]"#);
}

/// hh.ru salaries are grouped with (non-breaking) spaces, the normalizer wants them gone
fn clean_salary(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// hh.ru search results, paged with a plain `page` index
#[derive(Debug, Default, Clone, Copy)]
pub struct Headhunter;

impl Extractor for Headhunter {
    fn source(&self) -> Source {
        Source::Headhunter
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn search_path(&self) -> &'static str {
        "/search/vacancy/"
    }

    fn query(
        &self,
        search: &str,
        page_index: u32,
        _next_params: Vec<(String, String)>,
    ) -> Vec<(String, String)> {
        let mut params = vec![("text".to_owned(), search.to_owned())];
        if page_index > 0 {
            params.push(("page".to_owned(), page_index.to_string()));
        }
        params
    }

    fn extract(&self, doc: &Html) -> Vec<PartialVacancy> {
        doc.select(&VACANCY)
            .filter_map(|row| {
                let mut headers = row.select(&HEADER);
                let Some(title) = headers.next().and_then(|h| h.select(&TITLE_LINK).next())
                else {
                    log::warn!("hh.ru vacancy without title, skipping");
                    return None;
                };
                let Some(href) = title.value().attr("href") else {
                    log::warn!("hh.ru vacancy '{}' without link, skipping", element_text(title));
                    return None;
                };
                let link = match absolute_link(BASE_URL, href) {
                    Ok(link) => link,
                    Err(e) => {
                        log::warn!("skipping hh.ru vacancy: {}", e);
                        return None;
                    }
                };
                let raw_salary = headers
                    .next()
                    .map(|salary| clean_salary(&salary.text().collect::<String>()))
                    .unwrap_or_default();
                Some(PartialVacancy {
                    name: element_text(title),
                    raw_salary,
                    frequency: Some(MONTHLY.to_owned()),
                    link,
                })
            })
            .collect()
    }

    fn next_page_params(&self, doc: &Html) -> Option<Vec<(String, String)>> {
        doc.select(&PAGER_NEXT).next().map(|_| Vec::new())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div class="vacancy-serp">
  <div class="vacancy-serp-item__row vacancy-serp-item__row_header">
    <span class="bloko-section-header-3 bloko-section-header-3_lite">
      <a class="bloko-link HH-LinkModifier" href="https://spb.hh.ru/vacancy/43075234?query=rust">Rust developer</a>
    </span>
    <div class="bloko-section-header-3 bloko-section-header-3_lite">от 150&nbsp;000 руб.</div>
  </div>
  <div class="vacancy-serp-item__row vacancy-serp-item__row_header">
    <span class="bloko-section-header-3 bloko-section-header-3_lite">
      <a class="bloko-link" href="https://hh.ru/vacancy/43000001">Backend engineer</a>
    </span>
  </div>
  <div class="vacancy-serp-item__row vacancy-serp-item__row_header">
    <span class="bloko-section-header-3 bloko-section-header-3_lite">No link here</span>
  </div>
  <div class="vacancy-serp-item__row vacancy-serp-item__row_header">
    <span class="bloko-section-header-3 bloko-section-header-3_lite">
      <a class="bloko-link" href="/vacancy/43000002">Team lead</a>
    </span>
    <div class="bloko-section-header-3 bloko-section-header-3_lite">200 000-250 000 руб.</div>
  </div>
</div>
<a class="bloko-button" data-qa="pager-next" href="/search/vacancy?text=rust&page=1">дальше</a>
</body></html>
"#;

    #[test]
    fn test_extract_rows() {
        let doc = Html::parse_document(PAGE);
        let vacancies = Headhunter.extract(&doc);
        assert_eq!(vacancies.len(), 3);

        assert_eq!(vacancies[0].name, "Rust developer");
        assert_eq!(vacancies[0].link, "https://hh.ru/vacancy/43075234");
        assert_eq!(vacancies[0].raw_salary, "от150000руб.");
        assert_eq!(vacancies[0].frequency.as_deref(), Some(MONTHLY));

        assert_eq!(vacancies[1].raw_salary, "");
        assert_eq!(vacancies[2].link, "https://hh.ru/vacancy/43000002");
        assert_eq!(vacancies[2].raw_salary, "200000-250000руб.");
    }

    #[test]
    fn test_pager() {
        let doc = Html::parse_document(PAGE);
        assert!(Headhunter.has_next_page(&doc));
        let last = Html::parse_document("<html><body><div>nothing</div></body></html>");
        assert!(!Headhunter.has_next_page(&last));
    }

    #[test]
    fn test_query() {
        assert_eq!(
            Headhunter.query("rust developer", 0, Vec::new()),
            vec![("text".to_owned(), "rust developer".to_owned())]
        );
        assert_eq!(
            Headhunter.query("rust", 2, Vec::new())[1],
            ("page".to_owned(), "2".to_owned())
        );
    }
}
