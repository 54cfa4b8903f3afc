use nucleo_matcher::{
    Config, Matcher, Utf32Str,
    pattern::{CaseMatching, Normalization, Pattern},
};

/// Returns the indices of `items` matching `query`, best match first.
/// An empty query keeps every item in its original order.
pub fn rank<T>(query: &str, items: &[T], key: impl Fn(&T) -> String) -> Vec<usize> {
    if query.trim().is_empty() {
        return (0..items.len()).collect();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
    let mut buf = Vec::new();

    let mut scored: Vec<(usize, u32)> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let haystack = key(item);
            pattern
                .score(Utf32Str::new(&haystack, &mut buf), &mut matcher)
                .map(|score| (i, score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_keeps_order() {
        let items = ["b", "a"];
        assert_eq!(rank("", &items, |s| s.to_string()), vec![0, 1]);
    }

    #[test]
    fn filters_out_non_matches() {
        let items = ["Road Trip", "Focus Beats", "Rainy Day"];
        let hits = rank("focus", &items, |s| s.to_string());
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn matches_ignore_case() {
        let items = ["lofi nights", "LOFI MORNINGS", "jazz"];
        let hits = rank("LoFi", &items, |s| s.to_string());
        assert_eq!(hits.len(), 2);
        assert!(!hits.contains(&2));
    }
}
