//! OData query options.
//!
//! Only the paging options `$skip` and `$top` are honored on collection
//! reads. Unknown options are ignored, as are malformed values, keeping
//! the permissive posture the original pipeline took toward this fixture.

/// Paging options extracted from a request's query string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub skip: Option<usize>,
    pub top: Option<usize>,
}

impl QueryOptions {
    /// Parse from a raw query string (without the leading `?`).
    #[must_use]
    pub fn parse(query: Option<&str>) -> Self {
        let mut options = Self::default();
        let Some(query) = query else {
            return options;
        };
        for pair in query.split('&') {
            let mut parts = pair.splitn(2, '=');
            let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            match name {
                "$skip" => options.skip = value.parse().ok(),
                "$top" => options.top = value.parse().ok(),
                _ => {}
            }
        }
        options
    }

    /// Apply `$skip` then `$top` to a collection read.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip.unwrap_or(0))
            .take(self.top.unwrap_or(usize::MAX))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skip_and_top() {
        let options = QueryOptions::parse(Some("$skip=1&$top=2"));
        assert_eq!(options.skip, Some(1));
        assert_eq!(options.top, Some(2));
    }

    #[test]
    fn test_parse_ignores_unknown_and_malformed() {
        let options = QueryOptions::parse(Some("$filter=x&$top=abc&$skip=3"));
        assert_eq!(options.skip, Some(3));
        assert_eq!(options.top, None);

        assert_eq!(QueryOptions::parse(None), QueryOptions::default());
        assert_eq!(QueryOptions::parse(Some("")), QueryOptions::default());
    }

    #[test]
    fn test_apply_pages_in_order() {
        let options = QueryOptions {
            skip: Some(1),
            top: Some(2),
        };
        assert_eq!(options.apply(vec![1, 2, 3, 4]), vec![2, 3]);

        let unbounded = QueryOptions::default();
        assert_eq!(unbounded.apply(vec![1, 2, 3]), vec![1, 2, 3]);

        let past_end = QueryOptions {
            skip: Some(10),
            top: None,
        };
        assert_eq!(past_end.apply(vec![1, 2, 3]), Vec::<i32>::new());
    }
}
