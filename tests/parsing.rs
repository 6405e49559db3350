use matchedge::parse::{pair_scores, parse_score_list};

#[test]
fn parses_comma_separated_scores() {
    assert_eq!(parse_score_list("2,1,3").unwrap(), vec![2, 1, 3]);
    assert_eq!(parse_score_list(" 4 , 0 ").unwrap(), vec![4, 0]);
}

#[test]
fn rejects_empty_input() {
    assert!(parse_score_list("").is_err());
    assert!(parse_score_list("   ").is_err());
}

#[test]
fn rejects_non_numeric_tokens() {
    assert!(parse_score_list("1,two,3").is_err());
    assert!(parse_score_list("1,,3").is_err());
    assert!(parse_score_list("1.5").is_err());
}

#[test]
fn rejects_negative_scores() {
    assert!(parse_score_list("2,-1").is_err());
}

#[test]
fn pairs_equal_lists_without_truncation() {
    let parsed = pair_scores("2,1", "0,3").unwrap();
    assert!(!parsed.truncated);
    assert_eq!(parsed.pairs, vec![(2, 0), (1, 3)]);
}

#[test]
fn unequal_lists_truncate_to_the_shorter() {
    let parsed = pair_scores("2,1,5,0", "1,1").unwrap();
    assert!(parsed.truncated);
    assert_eq!(parsed.pairs, vec![(2, 1), (1, 1)]);
}

#[test]
fn either_side_failing_rejects_the_batch() {
    assert!(pair_scores("1,2", "").is_err());
    assert!(pair_scores("x", "1").is_err());
}
