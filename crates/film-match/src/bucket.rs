//! Similarity bucketing of resolved keys.

use std::collections::HashMap;

use film_model::CellValue;
use serde::Serialize;
use tracing::{debug, trace};

use crate::guards::is_sequel_title;
use crate::similarity::{MAX_SCORE, ratio, render_key};

/// Key-column values of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedKey {
    components: Vec<CellValue>,
    rendered: String,
}

impl ResolvedKey {
    pub fn new(components: Vec<CellValue>) -> Self {
        let rendered = render_key(&components);
        Self {
            components,
            rendered,
        }
    }

    pub fn components(&self) -> &[CellValue] {
        &self.components
    }

    /// Tuple rendering used for similarity and de-duplication.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// False when any component is missing.
    pub fn is_complete(&self) -> bool {
        self.components.iter().all(|component| !component.is_missing())
    }

    fn is_sequel(&self) -> bool {
        self.components
            .first()
            .is_some_and(|leading| is_sequel_title(&leading.render()))
    }

    /// With strict timestamps, every position holding a date on either side
    /// must hold equal dates on both.
    fn timestamps_agree(&self, other: &Self) -> bool {
        self.components
            .iter()
            .zip(&other.components)
            .all(|(a, b)| match (a, b) {
                (CellValue::Date(a), CellValue::Date(b)) => a == b,
                (CellValue::Date(_), _) | (_, CellValue::Date(_)) => false,
                _ => true,
            })
    }
}

/// A non-identical merge accepted on similarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzyMerge {
    pub key: String,
    pub representative: String,
    pub score: u8,
}

/// Rows judged to be the same entity, in input order.
#[derive(Debug, Clone)]
pub(crate) struct Bucket {
    pub key: ResolvedKey,
    pub rows: Vec<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct Bucketing {
    pub buckets: Vec<Bucket>,
    pub fuzzy_merges: Vec<FuzzyMerge>,
    pub timestamp_rejections: usize,
}

pub(crate) struct BucketRules {
    pub threshold: u8,
    pub strict_timestamp_equality: bool,
}

/// Assigns every key to a bucket, keeping input order.
///
/// Keys seen once pass through untouched in a bucket of their own. Only keys
/// that occur more than once are duplicate candidates: each candidate group is
/// compared against earlier candidate representatives and folded into the
/// first one that is similar enough. Incomplete keys always open their own
/// bucket.
pub(crate) fn assign_buckets(keys: Vec<ResolvedKey>, rules: &BucketRules) -> Bucketing {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for key in keys.iter().filter(|key| key.is_complete()) {
        *occurrences.entry(key.rendered().to_string()).or_default() += 1;
    }

    let mut bucketing = Bucketing::default();
    let mut exact: HashMap<String, usize> = HashMap::new();
    let mut candidates: Vec<usize> = Vec::new();

    for (row, key) in keys.into_iter().enumerate() {
        if !key.is_complete() {
            bucketing.buckets.push(Bucket { key, rows: vec![row] });
            continue;
        }
        if let Some(&bucket) = exact.get(key.rendered()) {
            bucketing.buckets[bucket].rows.push(row);
            continue;
        }
        let duplicated = occurrences.get(key.rendered()).is_some_and(|&count| count > 1);
        if duplicated {
            if let Some(bucket) = find_similar(&key, &candidates, rules, &mut bucketing) {
                exact.insert(key.rendered().to_string(), bucket);
                bucketing.buckets[bucket].rows.push(row);
                continue;
            }
            candidates.push(bucketing.buckets.len());
        }
        exact.insert(key.rendered().to_string(), bucketing.buckets.len());
        bucketing.buckets.push(Bucket { key, rows: vec![row] });
    }
    debug!(
        buckets = bucketing.buckets.len(),
        candidates = candidates.len(),
        fuzzy_merges = bucketing.fuzzy_merges.len(),
        "assigned buckets"
    );
    bucketing
}

/// Scans candidate representatives in creation order. Key text is only
/// emitted at trace level.
fn find_similar(
    key: &ResolvedKey,
    candidates: &[usize],
    rules: &BucketRules,
    bucketing: &mut Bucketing,
) -> Option<usize> {
    if rules.threshold >= MAX_SCORE || key.is_sequel() {
        return None;
    }
    for &index in candidates {
        let representative = &bucketing.buckets[index].key;
        if representative.is_sequel() {
            continue;
        }
        let score = ratio(key.rendered(), representative.rendered());
        if score < rules.threshold {
            continue;
        }
        if rules.strict_timestamp_equality && !key.timestamps_agree(representative) {
            trace!(
                key = key.rendered(),
                representative = representative.rendered(),
                "similar keys with different timestamps"
            );
            debug!(score, "kept similar keys apart on timestamps");
            bucketing.timestamp_rejections += 1;
            continue;
        }
        trace!(
            key = key.rendered(),
            representative = representative.rendered(),
            "similar keys"
        );
        debug!(score, bucket = index, "merged similar keys");
        bucketing.fuzzy_merges.push(FuzzyMerge {
            key: key.rendered().to_string(),
            representative: representative.rendered().to_string(),
            score,
        });
        return Some(index);
    }
    None
}

#[cfg(test)]
mod tests {
    use film_model::DateValue;

    use super::*;

    fn key(title: &str, year: f64) -> ResolvedKey {
        ResolvedKey::new(vec![CellValue::text(title), CellValue::Number(year)])
    }

    fn rules(threshold: u8) -> BucketRules {
        BucketRules {
            threshold,
            strict_timestamp_equality: false,
        }
    }

    #[test]
    fn exact_and_similar_keys_share_buckets() {
        let keys = vec![
            key("The Lord of the Rings: The Fellowship of the Ring", 2001.0),
            key("Heat", 1995.0),
            key("The Lord of the Rings: The Fellowship of the Ring", 2001.0),
            key("The Lord of the Rings - The Fellowship of the Ring", 2001.0),
            key("The Lord of the Rings - The Fellowship of the Ring", 2001.0),
        ];
        let bucketing = assign_buckets(keys, &rules(95));
        assert_eq!(bucketing.buckets.len(), 2);
        assert_eq!(bucketing.buckets[0].rows, vec![0, 2, 3, 4]);
        assert_eq!(bucketing.fuzzy_merges.len(), 1);
    }

    #[test]
    fn single_occurrence_keys_skip_similarity() {
        let keys = vec![
            key("The Lord of the Rings: The Return of the King", 2003.0),
            key("The Lord of the Rings The Return of the King", 2003.0),
        ];
        let bucketing = assign_buckets(keys, &rules(90));
        assert_eq!(bucketing.buckets.len(), 2);
        assert!(bucketing.fuzzy_merges.is_empty());
    }

    #[test]
    fn unique_key_is_not_folded_into_duplicate_group() {
        let keys = vec![
            key("Heat", 1995.0),
            key("Heat", 1995.0),
            key("Heat.", 1995.0),
        ];
        let bucketing = assign_buckets(keys, &rules(90));
        assert_eq!(bucketing.buckets.len(), 2);
        assert_eq!(bucketing.buckets[0].rows, vec![0, 1]);
        assert_eq!(bucketing.buckets[1].rows, vec![2]);
    }

    #[test]
    fn incomplete_keys_stay_alone() {
        let keys = vec![
            ResolvedKey::new(vec![CellValue::text("Heat"), CellValue::Missing]),
            ResolvedKey::new(vec![CellValue::text("Heat"), CellValue::Missing]),
        ];
        let bucketing = assign_buckets(keys, &rules(98));
        assert_eq!(bucketing.buckets.len(), 2);
    }

    #[test]
    fn strict_timestamps_reject_close_keys() {
        let date = |year| {
            CellValue::Date(
                DateValue::format(chrono::NaiveDate::from_ymd_opt(year, 1, 1).unwrap(), "%Y")
                    .unwrap(),
            )
        };
        let fallout = |year| {
            ResolvedKey::new(vec![CellValue::text("Mission: Impossible Fallout"), date(year)])
        };
        let keys = vec![fallout(2018), fallout(2019), fallout(2018), fallout(2019)];
        let loose = assign_buckets(keys.clone(), &rules(90));
        assert_eq!(loose.buckets.len(), 1);
        assert_eq!(loose.buckets[0].rows, vec![0, 1, 2, 3]);

        let strict = assign_buckets(
            keys,
            &BucketRules {
                threshold: 90,
                strict_timestamp_equality: true,
            },
        );
        assert_eq!(strict.buckets.len(), 2);
        assert_eq!(strict.timestamp_rejections, 1);
    }
}
