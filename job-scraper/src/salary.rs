use lazy_static::lazy_static;
use log;
use regex::Regex;

use crate::types::SalaryRange;

/// Pay frequency both sites use for monthly salaries
pub const MONTHLY: &str = "месяц";

const UP_TO: &str = "до";
const FROM: &str = "от";

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// Splits `raw` into the text between numbers and the numbers themselves.
/// There is always one more text token than there are numbers, text tokens may be empty.
/// `None` if a digit run does not fit an `i64`.
fn split_runs(raw: &str) -> Option<(Vec<&str>, Vec<i64>)> {
    let text = NUMBER.split(raw).map(str::trim).collect();
    let numbers = NUMBER
        .find_iter(raw)
        .map(|m| m.as_str().parse().ok())
        .collect::<Option<Vec<i64>>>()?;
    Some((text, numbers))
}

fn currency(token: Option<&&str>) -> Option<String> {
    token.filter(|t| !t.is_empty()).map(|t| (*t).to_owned())
}

/// Parse a free-form salary string like `"от 80000 руб."` into a [`SalaryRange`].
///
/// * `"до N cur"` -> only `max`, currency is the token right after the number
/// * `"от N cur"` -> only `min`, currency is the last token
/// * `"N-M cur"` -> `min` and `max` for monthly pay, only `min` for any other frequency
/// * no numbers, or a number too large to store -> empty range
pub fn normalize(raw: &str, frequency: Option<&str>) -> SalaryRange {
    let Some((text, numbers)) = split_runs(raw) else {
        log::warn!("salary '{}' holds an out of range number, leaving it empty", raw);
        return SalaryRange::default();
    };
    let Some(&first) = numbers.first() else {
        return SalaryRange::default();
    };
    let frequency_owned = frequency.map(String::from);
    match text.first().copied() {
        Some(UP_TO) => SalaryRange {
            min: None,
            max: Some(first),
            currency: currency(text.get(1)),
            frequency: frequency_owned,
        },
        Some(FROM) => SalaryRange {
            min: Some(first),
            max: None,
            currency: currency(text.last()),
            frequency: frequency_owned,
        },
        _ => {
            // other frequencies (per shift, per hour) keep the lower bound only
            let max = if frequency == Some(MONTHLY) {
                numbers.get(1).copied()
            } else {
                None
            };
            SalaryRange {
                min: Some(first),
                max,
                currency: currency(text.last()),
                frequency: frequency_owned,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_digits_is_empty() {
        for raw in ["", "з/п не указана", "до", "от руб.", "по договорённости"] {
            assert!(normalize(raw, Some(MONTHLY)).is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_up_to() {
        let salary = normalize("до 50000 руб", Some(MONTHLY));
        assert_eq!(salary.min, None);
        assert_eq!(salary.max, Some(50000));
        assert_eq!(salary.currency.as_deref(), Some("руб"));
        assert_eq!(salary.frequency.as_deref(), Some(MONTHLY));
    }

    #[test]
    fn test_up_to_without_spaces() {
        let salary = normalize("до50000руб.", Some(MONTHLY));
        assert_eq!(salary.max, Some(50000));
        assert_eq!(salary.currency.as_deref(), Some("руб."));
    }

    #[test]
    fn test_from() {
        let salary = normalize("от 80000 руб", Some(MONTHLY));
        assert_eq!(salary.min, Some(80000));
        assert_eq!(salary.max, None);
        assert_eq!(salary.currency.as_deref(), Some("руб"));
    }

    #[test]
    fn test_up_to_currency_is_indexed_from_is_last() {
        // two numbers after a marker: the branches pick different currency tokens
        let up_to = normalize("до 100 USD 200 EUR", None);
        assert_eq!(up_to.currency.as_deref(), Some("USD"));
        let from = normalize("от 100 USD 200 EUR", None);
        assert_eq!(from.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_monthly_range() {
        let salary = normalize("100000-150000 руб", Some(MONTHLY));
        assert_eq!(salary.min, Some(100000));
        assert_eq!(salary.max, Some(150000));
        assert_eq!(salary.currency.as_deref(), Some("руб"));
    }

    #[test]
    fn test_non_monthly_range_keeps_min_only() {
        let salary = normalize("2000-3000 руб.", Some("смена"));
        assert_eq!(salary.min, Some(2000));
        assert_eq!(salary.max, None);
        assert_eq!(salary.frequency.as_deref(), Some("смена"));

        let salary = normalize("2000-3000 руб.", None);
        assert_eq!(salary.max, None);
        assert_eq!(salary.frequency, None);
    }

    #[test]
    fn test_single_number_without_marker() {
        let salary = normalize("70000руб.", Some(MONTHLY));
        assert_eq!(salary.min, Some(70000));
        assert_eq!(salary.max, None);
        assert_eq!(salary.currency.as_deref(), Some("руб."));
    }

    #[test]
    fn test_out_of_range_number_is_empty() {
        assert!(normalize("100000-99999999999999999999 руб", Some(MONTHLY)).is_empty());
        assert!(normalize("до 99999999999999999999 руб", Some(MONTHLY)).is_empty());
    }

    #[test]
    fn test_bare_number_has_no_currency() {
        let salary = normalize("70000", Some(MONTHLY));
        assert_eq!(salary.min, Some(70000));
        assert_eq!(salary.currency, None);
    }
}
