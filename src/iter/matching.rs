//! Short-circuiting predicate queries.

/// True if any element satisfies `predicate`; false on empty input.
pub fn any_match<I, P>(items: I, mut predicate: P) -> bool
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    items.into_iter().any(|item| predicate(&item))
}

/// True if every element satisfies `predicate`; true on empty input.
pub fn all_match<I, P>(items: I, mut predicate: P) -> bool
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    items.into_iter().all(|item| predicate(&item))
}

/// True if no element satisfies `predicate`; true on empty input.
pub fn none_match<I, P>(items: I, predicate: P) -> bool
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    !any_match(items, predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Movie {
        rating: f64,
        hd_available: bool,
    }

    fn catalogue() -> Vec<Movie> {
        vec![
            Movie { rating: 8.8, hd_available: true },
            Movie { rating: 9.0, hd_available: true },
            Movie { rating: 8.6, hd_available: true },
            Movie { rating: 4.2, hd_available: false },
        ]
    }

    #[test]
    fn test_movie_queries() {
        let movies = catalogue();

        // strictly greater: 9.0 is not a blockbuster
        assert!(!any_match(&movies, |m| m.rating > 9.0));
        assert!(!all_match(&movies, |m| m.hd_available));
        assert!(none_match(&movies, |m| m.rating < 3.0));
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<i32> = Vec::new();
        assert!(!any_match(&empty, |_| true));
        assert!(all_match(&empty, |_| false));
        assert!(none_match(&empty, |_| true));
    }

    #[test]
    fn test_short_circuits() {
        let mut calls = 0;
        assert!(any_match(1..100, |&x| {
            calls += 1;
            x == 3
        }));
        assert_eq!(calls, 3);
    }
}
