use crate::error::PlaceError;

/// Parse a page range string like "1,3-5" into a sorted list of 1-based
/// page numbers.
///
/// Tokens are comma-separated; each is a single page or `a-b`. Open ends
/// default to the first and last page (`"-3"`, `"2-"`). Pages outside
/// `[1, page_count]` are dropped rather than rejected, so the result may be
/// empty. Returns an error only for tokens that are not numbers.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>, PlaceError> {
    let mut pages = Vec::new();
    let last = page_count as i64;

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start_str, end_str)) = part.split_once('-') {
            let start = match start_str.trim() {
                "" => 1,
                s => parse_page_number(s)?,
            };
            let end = match end_str.trim() {
                "" => last,
                s => parse_page_number(s)?,
            };

            for p in start.max(1)..=end.min(last) {
                pages.push(p as usize);
            }
        } else {
            let page = parse_page_number(part)?;
            if (1..=last).contains(&page) {
                pages.push(page as usize);
            }
        }
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

fn parse_page_number(token: &str) -> Result<i64, PlaceError> {
    token
        .parse()
        .map_err(|_| PlaceError::InvalidPageRange(format!("invalid page number: '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page() {
        assert_eq!(parse_page_range("1", 5).unwrap(), vec![1]);
        assert_eq!(parse_page_range("3", 5).unwrap(), vec![3]);
    }

    #[test]
    fn page_range() {
        assert_eq!(parse_page_range("2-4", 5).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn mixed() {
        assert_eq!(
            parse_page_range("1-3,7,10-12", 12).unwrap(),
            vec![1, 2, 3, 7, 10, 11, 12]
        );
    }

    #[test]
    fn open_ends() {
        assert_eq!(parse_page_range("-2", 5).unwrap(), vec![1, 2]);
        assert_eq!(parse_page_range("4-", 5).unwrap(), vec![4, 5]);
        assert_eq!(parse_page_range("-", 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn clipped_to_page_count() {
        assert_eq!(parse_page_range("3-9", 5).unwrap(), vec![3, 4, 5]);
        assert_eq!(parse_page_range("0-2", 5).unwrap(), vec![1, 2]);
        assert_eq!(parse_page_range("0,6", 5).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn reversed_range_selects_nothing() {
        assert!(parse_page_range("4-2", 5).unwrap().is_empty());
    }

    #[test]
    fn duplicates_removed_and_sorted() {
        assert_eq!(parse_page_range("3,1,1-2", 5).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn whitespace_tolerance() {
        assert_eq!(parse_page_range(" 1 , 3 - 5 ", 5).unwrap(), vec![1, 3, 4, 5]);
    }

    #[test]
    fn garbage_is_error() {
        let err = parse_page_range("1,x", 5).unwrap_err();
        assert!(matches!(err, PlaceError::InvalidPageRange(_)));
        assert!(parse_page_range("1-2-3", 5).is_err());
    }

    #[test]
    fn huge_upper_bound_is_clipped() {
        assert_eq!(parse_page_range("2-1000000000", 3).unwrap(), vec![2, 3]);
    }
}
