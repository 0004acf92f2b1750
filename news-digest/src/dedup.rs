use crate::types::ArticleRecord;
use tracing::{debug, info};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Ratcliff/Obershelp similarity of two titles, case-folded, in `[0, 1]`.
///
/// `2 * M / (len(a) + len(b))` where `M` is the number of characters covered by
/// the longest common block and, recursively, the longest blocks on either
/// side of it. Two empty strings are identical (1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    folded_ratio(&fold(a), &fold(b))
}

fn fold(title: &str) -> Vec<char> {
    title.to_lowercase().chars().collect()
}

fn folded_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

/// Total size of the matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties go to the block starting earliest in `a`, then earliest in `b`, so the
/// decomposition (and therefore the ratio) is deterministic.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run[j + 1] = length of the common run ending at a[i - 1], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            curr[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let k = curr[j + 1];
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr[blo] = 0;
    }

    (best_i, best_j, best_size)
}

/// A near-duplicate hit.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    pub index: usize,
    pub ratio: f64,
}

/// Suppresses articles whose titles are near-duplicates of titles already seen.
///
/// Every candidate is compared against every known title, so a run costs
/// `O(existing * candidates)` ratio computations. That is fine for a store of a
/// few hundred rows and there is no index to make it cheaper.
#[derive(Debug, Clone)]
pub struct DedupEngine {
    threshold: f64,
}

impl DedupEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// First known title whose similarity meets the threshold.
    pub fn find_duplicate<S: AsRef<str>>(&self, title: &str, known: &[S]) -> Option<DuplicateMatch> {
        let known: Vec<Vec<char>> = known.iter().map(|t| fold(t.as_ref())).collect();
        self.first_match(&fold(title), &known)
    }

    fn first_match(&self, folded: &[char], known: &[Vec<char>]) -> Option<DuplicateMatch> {
        known.iter().enumerate().find_map(|(index, existing)| {
            let ratio = folded_ratio(folded, existing);
            (ratio >= self.threshold).then_some(DuplicateMatch { index, ratio })
        })
    }

    /// Keep the candidates that are not near-duplicates of any existing title.
    ///
    /// Order is preserved. Candidates are not compared with each other here;
    /// see [`DedupEngine::collapse_batch`].
    pub fn filter_new<S: AsRef<str>>(
        &self,
        candidates: Vec<ArticleRecord>,
        existing_titles: &[S],
    ) -> Vec<ArticleRecord> {
        if existing_titles.is_empty() {
            return candidates;
        }

        let folded_existing: Vec<Vec<char>> = existing_titles.iter().map(|t| fold(t.as_ref())).collect();
        let total = candidates.len();

        let survivors: Vec<ArticleRecord> = candidates
            .into_iter()
            .filter(|candidate| {
                match self.first_match(&fold(&candidate.title), &folded_existing) {
                    Some(hit) => {
                        debug!(
                            "Rejecting {:?}: {:.2} similar to stored {:?}",
                            candidate.title,
                            hit.ratio,
                            existing_titles[hit.index].as_ref()
                        );
                        false
                    }
                    None => true,
                }
            })
            .collect();

        info!(
            "Dedup kept {}/{} candidates against {} stored titles",
            survivors.len(),
            total,
            existing_titles.len()
        );
        survivors
    }

    /// Drop later articles that are near-duplicates of an earlier one in the same batch.
    pub fn collapse_batch(&self, articles: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
        let mut kept: Vec<ArticleRecord> = Vec::with_capacity(articles.len());
        let mut kept_titles: Vec<Vec<char>> = Vec::with_capacity(articles.len());

        for article in articles {
            let folded = fold(&article.title);
            match self.first_match(&folded, &kept_titles) {
                Some(hit) => debug!(
                    "Dropping {:?} as a near-duplicate of {:?} in the same batch",
                    article.title, kept[hit.index].title
                ),
                None => {
                    kept_titles.push(folded);
                    kept.push(article);
                }
            }
        }
        kept
    }
}

impl Default for DedupEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}
