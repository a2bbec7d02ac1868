use job_scraper::Vacancy;
use mongodb::bson::{doc, Bson, Document};

/// Salary filter over a vacancy collection.
///
/// `gt` matches vacancies where either bound is above it, `lt` where either bound is below it.
/// Both together must hold at once, none matches everything. `only_without_salary` overrides
/// the bounds and matches vacancies without `min` and `max`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalaryQuery {
    pub gt: Option<i64>,
    pub lt: Option<i64>,
    pub only_without_salary: bool,
}

fn either_bound(op: &str, value: i64) -> Document {
    doc! {
        "$or": [
            { "salary.min": { op: value } },
            { "salary.max": { op: value } },
        ]
    }
}

impl SalaryQuery {
    pub fn new(gt: Option<i64>, lt: Option<i64>) -> Self {
        Self {
            gt,
            lt,
            only_without_salary: false,
        }
    }

    pub fn without_salary() -> Self {
        Self {
            gt: None,
            lt: None,
            only_without_salary: true,
        }
    }

    pub fn to_filter(&self) -> Document {
        if self.only_without_salary {
            return doc! {
                "$and": [
                    { "salary.max": Bson::Null },
                    { "salary.min": Bson::Null },
                ]
            };
        }
        match (self.gt, self.lt) {
            (None, None) => Document::new(),
            (Some(gt), None) => either_bound("$gt", gt),
            (None, Some(lt)) => either_bound("$lt", lt),
            (Some(gt), Some(lt)) => doc! {
                "$and": [either_bound("$gt", gt), either_bound("$lt", lt)]
            },
        }
    }

    /// Same semantics as [`SalaryQuery::to_filter`], evaluated in memory
    pub fn matches(&self, vacancy: &Vacancy) -> bool {
        let salary = &vacancy.salary;
        if self.only_without_salary {
            return salary.is_unspecified();
        }
        let bounds = [salary.min, salary.max];
        let above = |gt: i64| bounds.iter().flatten().any(|&b| b > gt);
        let below = |lt: i64| bounds.iter().flatten().any(|&b| b < lt);
        self.gt.map_or(true, above) && self.lt.map_or(true, below)
    }

    pub fn apply<'a, I>(&self, vacancies: I) -> Vec<Vacancy>
    where
        I: IntoIterator<Item = &'a Vacancy>,
    {
        vacancies
            .into_iter()
            .filter(|v| self.matches(v))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use job_scraper::{SalaryRange, Source};

    use super::*;

    pub(crate) fn vacancy(name: &str, min: Option<i64>, max: Option<i64>) -> Vacancy {
        let salary = if min.is_none() && max.is_none() {
            SalaryRange::default()
        } else {
            SalaryRange {
                min,
                max,
                currency: Some("руб.".to_owned()),
                frequency: Some("месяц".to_owned()),
            }
        };
        Vacancy {
            name: name.to_owned(),
            salary,
            link: format!("https://hh.ru/vacancy/{name}"),
            source: Source::Headhunter,
        }
    }

    fn fixture() -> Vec<Vacancy> {
        vec![
            vacancy("junior", Some(40000), Some(60000)),
            vacancy("middle", Some(120000), Some(180000)),
            vacancy("senior-from", Some(300000), None),
            vacancy("lead-from", Some(400000), None),
            vacancy("up-to", None, Some(90000)),
            vacancy("wide", Some(80000), Some(500000)),
            vacancy("secret", None, None),
        ]
    }

    fn names(vacancies: &[Vacancy]) -> Vec<&str> {
        vacancies.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_between() {
        let found = SalaryQuery::new(Some(100000), Some(350000)).apply(&fixture());
        assert_eq!(names(&found), vec!["middle", "senior-from", "wide"]);
    }

    #[test]
    fn test_lower_bound_only() {
        let found = SalaryQuery::new(Some(350000), None).apply(&fixture());
        assert_eq!(names(&found), vec!["lead-from", "wide"]);
    }

    #[test]
    fn test_upper_bound_only() {
        let found = SalaryQuery::new(None, Some(70000)).apply(&fixture());
        assert_eq!(names(&found), vec!["junior"]);
    }

    #[test]
    fn test_no_bounds_is_everything() {
        assert_eq!(SalaryQuery::default().apply(&fixture()).len(), 7);
        assert_eq!(SalaryQuery::default().to_filter(), Document::new());
    }

    #[test]
    fn test_without_salary() {
        let query = SalaryQuery {
            gt: Some(1),
            ..SalaryQuery::without_salary()
        };
        assert_eq!(names(&query.apply(&fixture())), vec!["secret"]);
    }

    #[test]
    fn test_filter_documents() {
        assert_eq!(
            SalaryQuery::new(Some(100000), Some(350000)).to_filter(),
            doc! {
                "$and": [
                    { "$or": [ { "salary.min": { "$gt": 100000_i64 } }, { "salary.max": { "$gt": 100000_i64 } } ] },
                    { "$or": [ { "salary.min": { "$lt": 350000_i64 } }, { "salary.max": { "$lt": 350000_i64 } } ] },
                ]
            }
        );
        assert_eq!(
            SalaryQuery::without_salary().to_filter(),
            doc! { "$and": [ { "salary.max": null }, { "salary.min": null } ] }
        );
    }
}
