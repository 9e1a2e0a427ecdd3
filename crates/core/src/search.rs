//! Fuzzy search over the flattened catalog.
//!
//! A [`Snapshot`] is built fresh from the store for one search or browse
//! operation: the ordered list of (tool, command) pairs, each carrying a
//! display summary and the searchable text the scorer runs against. Ranking
//! is deterministic for a fixed snapshot and query.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::catalog::QueryRow;
use crate::error::{Error, Result};
use crate::store::Catalog;

/// Default number of ranked results to return.
pub const DEFAULT_LIMIT: usize = 10;

/// Score ceiling; blank-query browse mode assigns this to every entry.
pub const MAX_SCORE: i64 = 100;

const SUMMARY_WIDTH: usize = 80;

/// One searchable (tool, command) pair.
#[derive(Debug, Clone)]
pub struct SearchEntry {
    pub tool: String,
    pub command: String,
    pub description: String,
    pub snippet: String,
    /// Description if non-empty, else a truncated snippet, else empty.
    pub summary: String,
    haystack: String,
}

impl SearchEntry {
    fn from_row(row: QueryRow) -> Self {
        let summary = if !row.description.is_empty() {
            row.description.clone()
        } else {
            truncate_snippet(&row.snippet)
        };

        let haystack = [
            row.tool.as_str(),
            row.command.as_str(),
            row.description.as_str(),
            row.snippet.as_str(),
        ]
        .iter()
        .filter(|field| !field.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

        Self {
            tool: row.tool,
            command: row.command,
            description: row.description,
            snippet: row.snippet,
            summary,
            haystack,
        }
    }
}

fn truncate_snippet(snippet: &str) -> String {
    if snippet.is_empty() {
        return String::new();
    }

    let truncated: String = snippet.chars().take(SUMMARY_WIDTH).collect();
    if truncated.chars().count() < snippet.chars().count() {
        format!("{truncated}…")
    } else {
        truncated
    }
}

/// A ranked reference into the snapshot: entry index plus its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub index: usize,
    pub score: i64,
}

/// The ordered, flattened catalog view for one search operation.
pub struct Snapshot {
    entries: Vec<SearchEntry>,
    matcher: SkimMatcherV2,
}

impl Snapshot {
    /// Builds a snapshot from a full catalog scan. Tools without commands
    /// are not indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store scan fails.
    pub fn build(catalog: &Catalog) -> Result<Self> {
        let entries = catalog
            .command_pairs()?
            .into_iter()
            .map(SearchEntry::from_row)
            .collect();

        Ok(Self {
            entries,
            matcher: SkimMatcherV2::default(),
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranks the snapshot against `query`.
    ///
    /// A blank query is browse mode: the first `limit` entries in snapshot
    /// order, each at [`MAX_SCORE`]. Otherwise entries are scored in
    /// [0,100], zero-score entries are dropped, and the top `limit` are
    /// returned by descending score with ties broken by ascending snapshot
    /// index.
    #[must_use]
    pub fn rank(&self, query: &str, limit: usize) -> Vec<Ranked> {
        if query.trim().is_empty() {
            return (0..self.entries.len().min(limit))
                .map(|index| Ranked {
                    index,
                    score: MAX_SCORE,
                })
                .collect();
        }

        let mut ranked: Vec<Ranked> = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| Ranked {
                index,
                score: self.score(&entry.haystack, query),
            })
            .filter(|ranked| ranked.score > 0)
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)));
        ranked.truncate(limit);
        ranked
    }

    /// Scores `query` against `haystack` in [0,100].
    ///
    /// The query is split on whitespace and each token is matched
    /// independently, normalized against the token's self-match score, then
    /// the token scores are averaged. Matching per token makes the score
    /// tolerant of word reordering and partial token overlap.
    fn score(&self, haystack: &str, query: &str) -> i64 {
        let tokens: Vec<&str> = query.split_whitespace().collect();
        if tokens.is_empty() {
            return MAX_SCORE;
        }

        let mut total = 0;
        for token in &tokens {
            let ceiling = self.matcher.fuzzy_match(token, token).unwrap_or(1).max(1);
            let raw = self.matcher.fuzzy_match(haystack, token).unwrap_or(0);
            total += (raw * MAX_SCORE / ceiling).min(MAX_SCORE);
        }

        total / tokens.len() as i64
    }

    /// Resolves a 1-based position in a ranked result list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelection`] for position 0 or a position past
    /// the end of the results.
    pub fn select<'a>(&'a self, ranked: &[Ranked], position: usize) -> Result<&'a SearchEntry> {
        if position == 0 || position > ranked.len() {
            return Err(Error::InvalidSelection {
                position,
                count: ranked.len(),
            });
        }

        Ok(&self.entries[ranked[position - 1].index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog
            .upsert_tool("curl", "HTTP client", &[])
            .unwrap();
        catalog
            .upsert_command("curl", "get", "Simple GET", "curl -s https://example.com")
            .unwrap();
        catalog
            .upsert_tool("ironclad", "Password manager", &[])
            .unwrap();
        catalog
            .upsert_command("ironclad", "init", "Create a new vault", "ironclad init --store x")
            .unwrap();
        catalog.upsert_tool("jq", "JSON processor", &[]).unwrap();

        Snapshot::build(&catalog).unwrap()
    }

    #[test]
    fn test_snapshot_excludes_tools_without_commands() {
        let snapshot = snapshot();
        assert_eq!(snapshot.entries().len(), 2);
        assert!(snapshot.entries().iter().all(|e| e.tool != "jq"));
    }

    #[test]
    fn test_blank_query_is_browse_mode_at_max_score() {
        let snapshot = snapshot();
        let ranked = snapshot.rank("   ", DEFAULT_LIMIT);

        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.score == MAX_SCORE));
        // Snapshot order: curl/get before ironclad/init.
        assert_eq!(ranked[0].index, 0);
        assert_eq!(ranked[1].index, 1);
    }

    #[test]
    fn test_query_scores_matching_entry_nonzero() {
        let snapshot = snapshot();
        let ranked = snapshot.rank("example", DEFAULT_LIMIT);

        assert!(!ranked.is_empty());
        let top = snapshot.select(&ranked, 1).unwrap();
        assert_eq!(top.tool, "curl");
        assert_eq!(top.command, "get");
        assert!(ranked[0].score > 0);
        assert!(ranked[0].score <= MAX_SCORE);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let snapshot = snapshot();
        let first = snapshot.rank("in", DEFAULT_LIMIT);
        let second = snapshot.rank("in", DEFAULT_LIMIT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ranking_sorted_descending_with_index_tie_break() {
        let snapshot = snapshot();
        let ranked = snapshot.rank("i", DEFAULT_LIMIT);

        for pair in ranked.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].index < pair[1].index)
            );
        }
    }

    #[test]
    fn test_select_rejects_out_of_range_positions() {
        let snapshot = snapshot();
        let ranked = snapshot.rank("", DEFAULT_LIMIT);

        assert!(matches!(
            snapshot.select(&ranked, 0),
            Err(Error::InvalidSelection { position: 0, .. })
        ));
        assert!(matches!(
            snapshot.select(&ranked, ranked.len() + 1),
            Err(Error::InvalidSelection { .. })
        ));
        assert!(snapshot.select(&ranked, 1).is_ok());
    }

    #[test]
    fn test_summary_prefers_description() {
        let snapshot = snapshot();
        assert_eq!(snapshot.entries()[0].summary, "Simple GET");
    }

    #[test]
    fn test_summary_truncates_long_snippet() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.upsert_tool("find", "", &[]).unwrap();
        let long_snippet = "find . -name '*.rs' -exec grep -l 'pattern' {} \\; ".repeat(4);
        catalog
            .upsert_command("find", "grep-all", "", &long_snippet)
            .unwrap();

        let snapshot = Snapshot::build(&catalog).unwrap();
        let summary = &snapshot.entries()[0].summary;
        assert!(summary.ends_with('…'));
        assert_eq!(summary.chars().count(), 81);
    }

    #[test]
    fn test_reordered_tokens_still_match() {
        let snapshot = snapshot();
        let forward = snapshot.rank("curl get", DEFAULT_LIMIT);
        let reversed = snapshot.rank("get curl", DEFAULT_LIMIT);

        assert!(!forward.is_empty());
        assert!(!reversed.is_empty());
        assert_eq!(forward[0].index, reversed[0].index);
        assert_eq!(forward[0].score, reversed[0].score);
    }
}
