//! Property-Based Tests for pagination and filtering
//!
//! Uses proptest to check paging arithmetic and filter matching over
//! generated inputs.

use proptest::prelude::*;

use crate::models::requests::ListParams;
use crate::models::responses::total_pages;
use crate::models::{Book, BookFilter, PagedResult};

// == Strategies ==
fn word_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,12}".prop_map(|s| s)
}

fn book_with_title(title: String) -> Book {
    Book {
        id: "id".to_string(),
        title,
        author: "Author".to_string(),
        published_year: "2000-01-01".to_string(),
        genre: "Fiction".to_string(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // skip = (page - 1) * limit for every valid page and limit
    #[test]
    fn prop_skip_formula(page in 1u64..10_000, limit in 1u64..1_000) {
        prop_assert_eq!(ListParams::new(page, limit).skip(), (page - 1) * limit);
    }

    // totalPages = ceil(totalBooks / limit), including totalBooks = 0
    #[test]
    fn prop_total_pages_is_ceiling(total in 0u64..100_000, limit in 1u64..1_000) {
        let pages = total_pages(total, limit);
        prop_assert!(pages * limit >= total);
        prop_assert!(pages == 0 || (pages - 1) * limit < total);
        if total == 0 {
            prop_assert_eq!(pages, 0);
        }

        let result = PagedResult::new(Vec::new(), total, 1, limit);
        prop_assert_eq!(result.total_pages, pages);
    }

    // Every page of a fully walked listing holds at most `limit` books and
    // together the pages cover every book exactly once
    #[test]
    fn prop_pages_partition_results(total in 0usize..60, limit in 1u64..12) {
        let pages = total_pages(total as u64, limit);
        let mut seen = 0usize;
        for page in 1..=pages {
            let params = ListParams::new(page, limit);
            let on_page = total
                .saturating_sub(params.skip() as usize)
                .min(limit as usize);
            prop_assert!(on_page as u64 <= limit);
            prop_assert!(on_page > 0);
            seen += on_page;
        }
        prop_assert_eq!(seen, total);
    }

    // A title matches any case variant of any of its substrings
    #[test]
    fn prop_filter_case_insensitive_substring(
        prefix in word_strategy(),
        needle in word_strategy(),
        suffix in word_strategy(),
        upper in any::<bool>(),
    ) {
        let book = book_with_title(format!("{} {}{}", prefix, needle, suffix));
        let query = if upper { needle.to_uppercase() } else { needle.to_lowercase() };

        let filter = BookFilter::new(Some(query), None, None);
        prop_assert!(filter.matches(&book));
    }

    // A needle longer than the title never matches
    #[test]
    fn prop_filter_rejects_longer_needle(title in word_strategy(), extra in word_strategy()) {
        let book = book_with_title(title.clone());
        let filter = BookFilter::new(Some(format!("{}{}", title, extra)), None, None);
        prop_assert!(!filter.matches(&book));
    }
}
