use citypulse_core::CommentRecord;

/// Orders records by score, highest first, and keeps at most `limit` of them.
///
/// The sort is stable, so records with equal scores keep their retrieval order.
pub fn rank(mut records: Vec<CommentRecord>, limit: usize) -> Vec<CommentRecord> {
    records.sort_by(|a, b| b.score.cmp(&a.score));
    records.truncate(limit);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use citypulse_core::Topic;

    fn record(body: &str, score: i64) -> CommentRecord {
        CommentRecord {
            topic: Topic::new("metro strike"),
            community: "r/all".to_string(),
            post_title: "Metro workers walk out".to_string(),
            comment_body: body.to_string(),
            author: "rider".to_string(),
            score,
            post_age_days: 1,
            comment_age_days: 1,
        }
    }

    fn bodies(records: &[CommentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.comment_body.as_str()).collect()
    }

    #[test]
    fn test_sorts_descending_and_truncates() {
        let ranked = rank(
            vec![record("a", 1), record("b", 12), record("c", -4), record("d", 7)],
            3,
        );
        assert_eq!(bodies(&ranked), vec!["b", "d", "a"]);
    }

    #[test]
    fn test_equal_scores_keep_retrieval_order() {
        let ranked = rank(
            vec![record("first", 5), record("second", 5), record("top", 9), record("third", 5)],
            10,
        );
        assert_eq!(bodies(&ranked), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_sorted_input_is_unchanged_up_to_limit() {
        let sorted = vec![record("a", 9), record("b", 3), record("c", 0), record("d", -1)];
        assert_eq!(rank(sorted.clone(), 10), sorted);
        assert_eq!(rank(sorted.clone(), 2), sorted[..2].to_vec());
    }

    #[test]
    fn test_ranking_is_repeatable() {
        let input = vec![record("x", 2), record("y", 2), record("z", 8)];
        assert_eq!(rank(input.clone(), 2), rank(input, 2));
    }

    #[test]
    fn test_empty_input_and_zero_limit() {
        assert!(rank(Vec::new(), 5).is_empty());
        assert!(rank(vec![record("a", 1)], 0).is_empty());
    }
}
