//! Fuzzy match index over normalized stat text.
//!
//! The index holds one key per catalog entry. Keys are always produced by
//! [`normalize_stat_text`]; raw catalog text is never indexed.
//!
//! # Scoring
//!
//! Scores run from `0.0` (identical) to `1.0` (no match). A query scores
//! against a key by the fewest edits needed to turn the query into *some
//! substring* of the key, divided by the query length:
//!
//! ```text
//! query  "# to strength"
//! key    "+# to strength"        -> 0 edits / 13 chars = 0.00
//! key    "# to dexterity"        -> 6 edits / 13 chars = 0.46
//! ```
//!
//! Where the match sits inside the key is ignored unless
//! [`MatchConfig::ignore_location`] is turned off, in which case the start
//! offset adds `start / location_distance`.
//!
//! Hits are ordered by score, then by whole-key similarity to the query
//! (normalized Levenshtein), then by catalog order.
//!
//! # Extended Syntax
//!
//! [`MatchIndex::search_extended`] understands a small query language:
//!
//! | Token     | Meaning                          |
//! |-----------|----------------------------------|
//! | `fire`    | fuzzy match                      |
//! | `'fire`   | key contains `fire`              |
//! | `^fire`   | key starts with `fire`           |
//! | `fire$`   | key ends with `fire`             |
//! | `=fire`   | key is exactly `fire`            |
//! | `!fire`   | key does not contain `fire`      |
//!
//! Whitespace-separated tokens must all match; `|` separates alternatives.
//! Double quotes keep spaces inside one token: `="+# to dexterity"`,
//! `'"fire damage"`.

use nucleo::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo::{Matcher, Utf32Str};
use serde::{Deserialize, Serialize};

use super::normalize::normalize_stat_text;
use super::types::StatOption;

// ============================================================================
// Constants
// ============================================================================

/// Hits scoring above this are discarded by the index.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// The resolver only accepts a fuzzy hit scoring strictly below this.
pub const DEFAULT_ACCEPT_BELOW: f64 = 0.8;

/// Offset at which a match start costs a full point when location matters.
pub const DEFAULT_LOCATION_DISTANCE: usize = 300;

/// Queries (and extended fuzzy tokens) shorter than this never match.
pub const DEFAULT_MIN_MATCH_CHAR_LENGTH: usize = 2;

// ============================================================================
// MatchConfig
// ============================================================================

/// Tuning for the match index and the resolver's acceptance policy.
///
/// # Defaults
///
/// - `threshold`: 0.7
/// - `ignore_location`: true
/// - `location_distance`: 300
/// - `min_match_char_length`: 2
/// - `accept_below`: 0.8
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Maximum score (0 = identical, 1 = unrelated) a hit may have.
    pub threshold: f64,
    /// Score matches without regard to where they start in the key.
    pub ignore_location: bool,
    /// Divisor for the start-offset penalty when location matters.
    pub location_distance: usize,
    /// Minimum number of matched characters.
    pub min_match_char_length: usize,
    /// Resolver cut-off: the top fuzzy hit must score strictly below this.
    pub accept_below: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            ignore_location: true,
            location_distance: DEFAULT_LOCATION_DISTANCE,
            min_match_char_length: DEFAULT_MIN_MATCH_CHAR_LENGTH,
            accept_below: DEFAULT_ACCEPT_BELOW,
        }
    }
}

impl MatchConfig {
    /// Builder method to set the index threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Builder method to set the resolver cut-off.
    pub fn accept_below(mut self, accept_below: f64) -> Self {
        self.accept_below = accept_below;
        self
    }

    /// Builder method to enable/disable the location penalty.
    pub fn location_aware(mut self, location_distance: usize) -> Self {
        self.ignore_location = false;
        self.location_distance = location_distance;
        self
    }
}

// ============================================================================
// MatchIndex
// ============================================================================

#[derive(Debug, Clone)]
struct IndexEntry {
    /// Position of the record in the catalog the index was built from.
    position: usize,
    key: String,
    chars: Vec<char>,
}

/// A scored index hit. `position` refers to the catalog the index was built
/// over, not to the index itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub score: f64,
}

/// Fuzzy search index over normalized stat text.
#[derive(Debug, Clone)]
pub struct MatchIndex {
    entries: Vec<IndexEntry>,
    config: MatchConfig,
}

impl MatchIndex {
    /// Build an index from `(catalog position, raw text)` pairs.
    pub fn build<'a, I>(texts: I, config: MatchConfig) -> Self
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let entries = texts
            .into_iter()
            .map(|(position, text)| {
                let key = normalize_stat_text(text);
                let chars = key.chars().collect();
                IndexEntry {
                    position,
                    key,
                    chars,
                }
            })
            .collect();

        Self { entries, config }
    }

    /// Index every option of a catalog.
    pub fn from_options(options: &[StatOption], config: MatchConfig) -> Self {
        Self::build(
            options
                .iter()
                .enumerate()
                .map(|(position, option)| (position, option.text.as_str())),
            config,
        )
    }

    /// Index only the options of one category. Hit positions still refer to
    /// the full catalog.
    pub fn scoped(options: &[StatOption], category: &str, config: MatchConfig) -> Self {
        Self::build(
            options
                .iter()
                .enumerate()
                .filter(|(_, option)| option.category == category)
                .map(|(position, option)| (position, option.text.as_str())),
            config,
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Normalized keys with their catalog positions, in index order.
    pub fn keys(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.position, entry.key.as_str()))
    }

    /// Fuzzy search. The query is normalized before matching.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let (query, hits) = self.scored(query);
        rank(&query, hits)
    }

    /// Top-ranked hit, if any. Same as the first [`search`](Self::search)
    /// hit, but only hits tied at the best score are ranked.
    pub fn best(&self, query: &str) -> Option<SearchHit> {
        let (query, hits) = self.scored(query);
        let top = hits.iter().map(|(_, score)| *score).min_by(f64::total_cmp)?;
        let tied = hits.into_iter().filter(|(_, score)| *score == top).collect();
        rank(&query, tied).into_iter().next()
    }

    /// Search with the extended query syntax described in the module docs.
    ///
    /// The query is lowercased but not otherwise normalized, so operator
    /// characters survive.
    pub fn search_extended(&self, query: &str) -> Vec<SearchHit> {
        let query = query.to_lowercase();
        let mut groups = parse_extended(&query, &self.config);
        if groups.is_empty() {
            return Vec::new();
        }

        let mut matcher = Matcher::default();
        let mut buf = Vec::new();
        let mut hits = Vec::new();

        for entry in &self.entries {
            let best = groups
                .iter_mut()
                .filter_map(|group| {
                    self.group_score(group, entry, &mut matcher, &mut buf)
                })
                .min_by(f64::total_cmp);
            if let Some(score) = best {
                hits.push((entry, score));
            }
        }

        rank(&query, hits)
    }

    // ------------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------------

    /// Normalize the query and score it against every key, unranked.
    fn scored(&self, query: &str) -> (String, Vec<(&IndexEntry, f64)>) {
        let query = normalize_stat_text(query);
        let mut scorer = QueryScorer::new(query.chars().collect(), &self.config);
        if scorer.max_errors.is_none() {
            return (query, Vec::new());
        }

        let hits = self
            .entries
            .iter()
            .filter_map(|entry| {
                scorer
                    .score(&entry.chars, &self.config)
                    .map(|score| (entry, score))
            })
            .collect();

        (query, hits)
    }

    fn group_score(
        &self,
        group: &mut [ExtendedToken],
        entry: &IndexEntry,
        matcher: &mut Matcher,
        buf: &mut Vec<char>,
    ) -> Option<f64> {
        let len = group.len();
        let mut total = 0.0;
        for token in group.iter_mut() {
            total += match token {
                ExtendedToken::Fuzzy(scorer) => scorer.score(&entry.chars, &self.config)?,
                ExtendedToken::Operator(atom) => {
                    let haystack = Utf32Str::new(&entry.key, buf);
                    atom.score(haystack, matcher).map(|_| 0.0)?
                }
            };
        }
        Some(total / len as f64)
    }
}

/// Order hits by score, then whole-key similarity, then catalog position.
fn rank(query: &str, mut hits: Vec<(&IndexEntry, f64)>) -> Vec<SearchHit> {
    hits.sort_by(|(a, a_score), (b, b_score)| {
        a_score
            .total_cmp(b_score)
            .then_with(|| a.position.cmp(&b.position))
    });

    // Similarity is only computed inside runs of equal score.
    let mut start = 0;
    while start < hits.len() {
        let score = hits[start].1;
        let end = start
            + hits[start..]
                .iter()
                .take_while(|(_, other)| *other == score)
                .count();

        if end - start > 1 {
            let mut run: Vec<(f64, &IndexEntry)> = hits[start..end]
                .iter()
                .map(|(entry, _)| (strsim::normalized_levenshtein(query, &entry.key), *entry))
                .collect();
            // Stable, so equal similarity keeps catalog order.
            run.sort_by(|(a, _), (b, _)| b.total_cmp(a));
            for (slot, (_, entry)) in hits[start..end].iter_mut().zip(run) {
                slot.0 = entry;
            }
        }
        start = end;
    }

    hits.into_iter()
        .map(|(entry, score)| SearchHit {
            position: entry.position,
            score,
        })
        .collect()
}

// ============================================================================
// Approximate substring alignment
// ============================================================================

/// Per-query scoring state, built once and reused for every key.
#[derive(Debug)]
struct QueryScorer {
    pattern: Vec<char>,
    /// Most edits a key may need and still be a hit. `None` when no key can.
    max_errors: Option<usize>,
    mask: Option<PatternMask>,
    rows: AlignmentRows,
}

impl QueryScorer {
    fn new(pattern: Vec<char>, config: &MatchConfig) -> Self {
        Self {
            max_errors: error_budget(pattern.len(), config),
            mask: PatternMask::new(&pattern),
            rows: AlignmentRows::default(),
            pattern,
        }
    }

    fn score(&mut self, text: &[char], config: &MatchConfig) -> Option<f64> {
        let max_errors = self.max_errors?;
        let len = self.pattern.len();
        // Pattern chars beyond the key length cost one edit each.
        if len.saturating_sub(text.len()) > max_errors {
            return None;
        }

        let alignment = match &self.mask {
            Some(mask) if config.ignore_location => Alignment {
                errors: mask.min_errors(text),
                start: 0,
            },
            _ => self.rows.align(&self.pattern, text, max_errors)?,
        };
        if alignment.errors > max_errors {
            return None;
        }

        let mut score = alignment.errors as f64 / len as f64;
        if !config.ignore_location {
            score += if config.location_distance == 0 {
                if alignment.start == 0 { 0.0 } else { 1.0 }
            } else {
                alignment.start as f64 / config.location_distance as f64
            };
        }
        let score = score.min(1.0);

        (score <= config.threshold).then_some(score)
    }
}

/// Most edits a pattern of `len` chars may need while still scoring within
/// the threshold and matching at least `min_match_char_length` chars.
fn error_budget(len: usize, config: &MatchConfig) -> Option<usize> {
    if len < config.min_match_char_length.max(1) {
        return None;
    }
    let by_length = len - config.min_match_char_length;
    let by_threshold = (0..=len)
        .rev()
        .find(|&errors| errors as f64 / len as f64 <= config.threshold)?;
    Some(by_length.min(by_threshold))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Alignment {
    errors: usize,
    start: usize,
}

/// Dynamic-programming rows, kept between keys to avoid reallocating.
#[derive(Debug, Default)]
struct AlignmentRows {
    prev: Vec<usize>,
    prev_start: Vec<usize>,
    cur: Vec<usize>,
    cur_start: Vec<usize>,
}

impl AlignmentRows {
    /// Fewest edits turning `pattern` into some substring of `text`, and
    /// where that substring starts. Ties prefer the earliest start.
    ///
    /// Gives up with `None` as soon as every alignment needs more than
    /// `max_errors` edits.
    fn align(&mut self, pattern: &[char], text: &[char], max_errors: usize) -> Option<Alignment> {
        let Self {
            prev,
            prev_start,
            cur,
            cur_start,
        } = self;
        let n = text.len();

        // Row 0: matching may begin anywhere in the text for free.
        prev.clear();
        prev.resize(n + 1, 0);
        prev_start.clear();
        prev_start.extend(0..=n);
        cur.clear();
        cur.resize(n + 1, 0);
        cur_start.clear();
        cur_start.resize(n + 1, 0);

        for (i, &pc) in pattern.iter().enumerate() {
            cur[0] = i + 1;
            cur_start[0] = 0;
            let mut row_min = cur[0];
            for j in 1..=n {
                let substitute = prev[j - 1] + usize::from(pc != text[j - 1]);
                let skip_pattern = prev[j] + 1;
                let skip_text = cur[j - 1] + 1;

                let (cost, start) = if substitute <= skip_pattern && substitute <= skip_text {
                    (substitute, prev_start[j - 1])
                } else if skip_pattern <= skip_text {
                    (skip_pattern, prev_start[j])
                } else {
                    (skip_text, cur_start[j - 1])
                };
                cur[j] = cost;
                cur_start[j] = start;
                row_min = row_min.min(cost);
            }
            std::mem::swap(prev, cur);
            std::mem::swap(prev_start, cur_start);

            // Row minimums never decrease.
            if row_min > max_errors {
                return None;
            }
        }

        prev.iter()
            .zip(prev_start.iter())
            .map(|(&errors, &start)| Alignment { errors, start })
            .min_by(|a, b| a.errors.cmp(&b.errors).then(a.start.cmp(&b.start)))
    }
}

/// Bit-parallel edit distance (Myers, 1999) for patterns of up to 64 chars.
/// Yields the same error count as [`AlignmentRows::align`], without the
/// start offset.
#[derive(Debug)]
struct PatternMask {
    ascii: [u64; 128],
    other: Vec<(char, u64)>,
    last: u64,
    len: usize,
}

impl PatternMask {
    fn new(pattern: &[char]) -> Option<Self> {
        if pattern.is_empty() || pattern.len() > u64::BITS as usize {
            return None;
        }

        let mut mask = Self {
            ascii: [0; 128],
            other: Vec::new(),
            last: 1u64 << (pattern.len() - 1),
            len: pattern.len(),
        };
        for (i, &c) in pattern.iter().enumerate() {
            let bit = 1u64 << i;
            if c.is_ascii() {
                mask.ascii[c as usize] |= bit;
            } else if let Some((_, bits)) = mask.other.iter_mut().find(|(other, _)| *other == c) {
                *bits |= bit;
            } else {
                mask.other.push((c, bit));
            }
        }
        Some(mask)
    }

    fn positions(&self, c: char) -> u64 {
        if c.is_ascii() {
            self.ascii[c as usize]
        } else {
            self.other
                .iter()
                .find(|(other, _)| *other == c)
                .map_or(0, |(_, bits)| *bits)
        }
    }

    fn min_errors(&self, text: &[char]) -> usize {
        let mut pv = u64::MAX;
        let mut mv = 0u64;
        let mut errors = self.len;
        let mut best = self.len;

        for &c in text {
            let eq = self.positions(c);
            let xv = eq | mv;
            let xh = ((eq & pv).wrapping_add(pv) ^ pv) | eq;
            let mut ph = mv | !(xh | pv);
            let mut mh = pv & xh;

            if ph & self.last != 0 {
                errors += 1;
            } else if mh & self.last != 0 {
                errors -= 1;
            }

            // Row 0 is all zeros, so nothing is shifted in.
            ph <<= 1;
            mh <<= 1;
            pv = mh | !(xv | ph);
            mv = ph & xv;
            best = best.min(errors);
        }
        best
    }
}

// ============================================================================
// Extended query parsing
// ============================================================================

#[derive(Debug)]
enum ExtendedToken {
    Fuzzy(QueryScorer),
    Operator(Atom),
}

/// Split an extended query into OR groups of AND tokens. Fuzzy tokens too
/// short to ever match are dropped; groups left empty are discarded.
fn parse_extended(query: &str, config: &MatchConfig) -> Vec<Vec<ExtendedToken>> {
    query
        .split('|')
        .map(|group| {
            split_tokens(group)
                .into_iter()
                .filter_map(|token| parse_token(token, config))
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect()
}

/// Whitespace-separated tokens. Whitespace inside double quotes does not
/// split.
fn split_tokens(group: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut quoted = false;

    for (i, c) in group.char_indices() {
        if c == '"' {
            quoted = !quoted;
        }
        if c.is_whitespace() && !quoted {
            if let Some(from) = start.take() {
                tokens.push(&group[from..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(from) = start {
        tokens.push(&group[from..]);
    }
    tokens
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

fn parse_token(token: &str, config: &MatchConfig) -> Option<ExtendedToken> {
    let (negative, rest) = match token.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let (kind, needle) = if let Some(rest) = rest.strip_prefix('=') {
        (AtomKind::Exact, rest)
    } else if let Some(rest) = rest.strip_prefix('\'') {
        (AtomKind::Substring, rest)
    } else {
        let (anchored_start, rest) = match rest.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let (anchored_end, rest) = match rest.strip_suffix('$') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let kind = match (anchored_start, anchored_end) {
            (true, true) => AtomKind::Exact,
            (true, false) => AtomKind::Prefix,
            (false, true) => AtomKind::Postfix,
            (false, false) if negative => AtomKind::Substring,
            (false, false) => AtomKind::Fuzzy,
        };
        (kind, rest)
    };

    let needle = unquote(needle);
    if needle.is_empty() {
        return None;
    }

    if kind == AtomKind::Fuzzy {
        let pattern: Vec<char> = needle.chars().collect();
        return (pattern.len() >= config.min_match_char_length.max(1))
            .then(|| ExtendedToken::Fuzzy(QueryScorer::new(pattern, config)));
    }

    let mut atom = Atom::new(
        needle,
        CaseMatching::Ignore,
        Normalization::Smart,
        kind,
        false,
    );
    atom.negative = negative;
    Some(ExtendedToken::Operator(atom))
}
