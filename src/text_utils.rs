use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

const ISO_FORMAT: &str = "%Y-%m-%d";
// Tried in order, month names must be written in full
const NAMED_MONTH_FORMATS: [&str; 3] = ["%d %B %Y", "%B %d, %Y", "%B %d %Y"];

lazy_static! {
    static ref RE_INVALID_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
    static ref RE_UNDERSCORES: Regex = Regex::new(r"_+").unwrap();
    static ref RE_ISO_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

pub fn parse_date(buf: &str) -> Option<NaiveDate> {
    let buf = buf.trim();
    if buf.is_empty() {
        return None;
    }

    if RE_ISO_DATE.is_match(buf) {
        return NaiveDate::parse_from_str(buf, ISO_FORMAT).ok();
    }

    // chrono's %B also takes "Jan", which would move undated posts under a date
    NAMED_MONTH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(buf, fmt).ok())
        .filter(|date| has_full_month_name(buf, date))
}

fn has_full_month_name(buf: &str, date: &NaiveDate) -> bool {
    let month = date.format("%B").to_string();
    buf.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
        .all(|word| word.eq_ignore_ascii_case(&month))
}

/// Replaces everything outside `[A-Za-z0-9_]` with underscores and collapses runs of them.
pub fn slugify(title: &str) -> String {
    let replaced = RE_INVALID_CHARS.replace_all(title, "_");
    RE_UNDERSCORES.replace_all(&replaced, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2012-09-15").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2012, 9, 15));

        let date = parse_date("25 January 2012").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2012, 1, 25));

        let date = parse_date("March 3, 2012").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2012, 3, 3));

        let date = parse_date("April 1 2012").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2012, 4, 1));

        let date = parse_date(" 1 April 2012 ").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2012, 4, 1));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("12/13/1344"), None);
        assert_eq!(parse_date("2012-13-01"), None);
        assert_eq!(parse_date("sometime in 2012"), None);
    }

    #[test]
    fn test_parse_date_strict() {
        assert_eq!(parse_date("24 Jan 2012"), None);
        assert_eq!(parse_date("Sept 3, 2012"), None);
        assert_eq!(parse_date("2012-1-5"), None);
        assert_eq!(parse_date("12-01-05"), None);

        let date = parse_date("24 january 2012").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2012, 1, 24));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Some Post"), "Some_Post");
        assert_eq!(slugify("Test tEsT TEST"), "Test_tEsT_TEST");
        assert_eq!(slugify("What?! Really..."), "What_Really_");
        assert_eq!(slugify("a__b"), "a_b");
        assert_eq!(slugify("!!!"), "_");
    }
}
