use std::num::NonZeroUsize;

use serde::Serialize;

/// One page of an ordered collection. `number` is 1-based.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    /// Size of the whole collection, not of this page.
    pub count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<usize>,
    pub previous_page_number: Option<usize>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}

/// Parses the raw `page` query value. Anything that is not an integer means "no page".
/// Integers too wide for `i64` saturate, so they still clamp to the first or last page.
pub fn parse_page_number(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// Slices `items` into the requested page.
///
/// Missing page -> 1, below 1 -> 1, past the end -> last page. An empty
/// collection still has one (empty) page.
pub fn paginate<T>(items: Vec<T>, page_size: NonZeroUsize, requested: Option<i64>) -> Page<T> {
    let size = page_size.get();
    let count = items.len();
    let num_pages = count.div_ceil(size).max(1);

    let number = match requested {
        Some(n) if n > 1 => usize::try_from(n).unwrap_or(usize::MAX).min(num_pages),
        _ => 1,
    };

    let object_list = items.into_iter().skip((number - 1) * size).take(size).collect();

    let has_next = number < num_pages;
    let has_previous = number > 1;
    Page {
        object_list,
        number,
        num_pages,
        count,
        has_next,
        has_previous,
        next_page_number: has_next.then_some(number + 1),
        previous_page_number: has_previous.then_some(number - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn thirteen_items_ten_per_page() {
        let items: Vec<u32> = (0..13).collect();
        let first = paginate(items.clone(), size(10), Some(1));
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next);
        assert_eq!(first.next_page_number, Some(2));

        let second = paginate(items, size(10), Some(2));
        assert_eq!(second.object_list, vec![10, 11, 12]);
        assert!(!second.has_next);
        assert_eq!(second.previous_page_number, Some(1));
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), size(10), Some(3));
        assert_eq!(page.num_pages, 1);
        assert_eq!(page.number, 1);
        assert!(page.is_empty());
        assert_eq!(page.count, 0);
    }

    #[test]
    fn out_of_range_requests_are_clamped() {
        let items: Vec<u32> = (0..25).collect();
        let first = paginate(items.clone(), size(10), Some(1));
        let last = paginate(items.clone(), size(10), Some(3));

        for requested in [None, Some(0), Some(-4), Some(i64::MIN)] {
            let page = paginate(items.clone(), size(10), requested);
            assert_eq!(page.number, 1);
            assert_eq!(page.object_list, first.object_list);
        }
        for requested in [Some(4), Some(1000), Some(i64::MAX)] {
            let page = paginate(items.clone(), size(10), requested);
            assert_eq!(page.number, 3);
            assert_eq!(page.object_list, last.object_list);
        }

        let huge = parse_page_number(Some("99999999999999999999"));
        assert_eq!(paginate(items.clone(), size(10), huge).number, 3);
        let tiny = parse_page_number(Some("-99999999999999999999"));
        assert_eq!(paginate(items, size(10), tiny).number, 1);
    }

    #[test]
    fn pages_concatenate_to_input() {
        for len in [0usize, 1, 9, 10, 11, 30, 31] {
            for n in [1usize, 3, 10] {
                let items: Vec<usize> = (0..len).collect();
                let expected_pages = if len == 0 { 1 } else { len.div_ceil(n) };
                let mut joined = Vec::new();
                for p in 1..=expected_pages {
                    let page = paginate(items.clone(), size(n), Some(p as i64));
                    assert_eq!(page.num_pages, expected_pages);
                    joined.extend(page.object_list);
                }
                assert_eq!(joined, items, "len={} size={}", len, n);
            }
        }
    }

    #[test]
    fn non_numeric_page_means_first() {
        assert_eq!(parse_page_number(Some("abc")), None);
        assert_eq!(parse_page_number(Some("1.5")), None);
        assert_eq!(parse_page_number(Some(" 2 ")), Some(2));
        assert_eq!(parse_page_number(Some("-1")), Some(-1));
        assert_eq!(parse_page_number(None), None);
        assert_eq!(parse_page_number(Some("")), None);
        assert_eq!(parse_page_number(Some("-")), None);
        assert_eq!(parse_page_number(Some("9999999999999999999x")), None);
    }

    #[test]
    fn oversized_numbers_saturate() {
        assert_eq!(parse_page_number(Some("99999999999999999999")), Some(i64::MAX));
        assert_eq!(parse_page_number(Some(" +99999999999999999999 ")), Some(i64::MAX));
        assert_eq!(parse_page_number(Some("-99999999999999999999")), Some(i64::MIN));
    }
}
