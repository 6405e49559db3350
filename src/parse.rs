use anyhow::{Result, bail};

/// A submitted batch of paired scores, ready for the store.
#[derive(Debug, Clone)]
pub struct ParsedScores {
    pub pairs: Vec<(u32, u32)>,
    /// The two lists had different lengths and were cut to the shorter one.
    pub truncated: bool,
}

/// Parses one comma-separated score list. Rejects empty lists, non-numeric
/// tokens and negative values outright; the caller surfaces the message.
pub fn parse_score_list(raw: &str) -> Result<Vec<u32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("enter at least one score");
    }
    let mut scores = Vec::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        if token.is_empty() {
            bail!("empty score entry in list");
        }
        match token.parse::<i64>() {
            Ok(v) if v < 0 => bail!("scores must be non-negative"),
            Ok(v) => scores.push(v as u32),
            Err(_) => bail!("invalid score {token:?} (numbers only)"),
        }
    }
    Ok(scores)
}

/// Parses both sides of a category submission and zips them into pairs,
/// truncating to the shorter list when the lengths differ.
pub fn pair_scores(own: &str, other: &str) -> Result<ParsedScores> {
    let own = parse_score_list(own)?;
    let other = parse_score_list(other)?;
    let truncated = own.len() != other.len();
    let pairs = own.into_iter().zip(other).collect();
    Ok(ParsedScores { pairs, truncated })
}

/// Lenient numeric field parsing for context inputs: empty or unparseable
/// text falls back to the given default, mirroring how the form behaves.
pub fn parse_or<T: std::str::FromStr>(raw: &str, default: T) -> T {
    raw.trim().parse::<T>().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_lists() {
        assert_eq!(parse_score_list("2, 1,3").unwrap(), vec![2, 1, 3]);
        assert_eq!(parse_score_list(" 0 ").unwrap(), vec![0]);
    }

    #[test]
    fn rejects_bad_tokens() {
        assert!(parse_score_list("").is_err());
        assert!(parse_score_list("2,,3").is_err());
        assert!(parse_score_list("2,x").is_err());
        assert!(parse_score_list("2,-1").is_err());
    }

    #[test]
    fn unequal_lists_truncate() {
        let parsed = pair_scores("1,2,3", "0,0").unwrap();
        assert!(parsed.truncated);
        assert_eq!(parsed.pairs, vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn parse_or_falls_back() {
        assert_eq!(parse_or::<f64>("1.25", 1.0), 1.25);
        assert_eq!(parse_or::<f64>("abc", 1.0), 1.0);
        assert_eq!(parse_or::<u32>("", 0), 0);
    }
}
