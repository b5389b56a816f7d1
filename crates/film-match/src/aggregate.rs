//! Duplicate aggregation over a table's key columns.
//!
//! Rows are grouped into buckets of the same entity (see [`crate::bucket`]),
//! each bucket is reconciled into one survivor under the configured
//! [`ConflictPolicy`], and the survivors are returned in first-appearance
//! order.

use std::collections::HashSet;
use std::fmt;

use film_model::{CellValue, Dataset, Row, Table};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, trace, warn};

use crate::bucket::{BucketRules, FuzzyMerge, ResolvedKey, assign_buckets};
use crate::error::{MatchError, Result};
use crate::policy::{ConflictPolicy, ReconcileScope};
use crate::reconcile::{ConflictOperator, Reconciler};
use crate::similarity::MAX_SCORE;

/// Default similarity a non-identical key needs to merge.
pub const DEFAULT_THRESHOLD: u8 = 98;

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregateOptions {
    /// Columns whose combined value identifies an entity.
    pub key_columns: Vec<String>,
    pub policy: ConflictPolicy,
    /// Minimum similarity (0–100) for a fuzzy merge. 100 disables fuzzy
    /// matching.
    pub threshold: u8,
    /// Drop rows with a missing key component before bucketing.
    pub drop_rows_with_missing_keys: bool,
    /// Require equal dates in key positions holding a date.
    pub strict_timestamp_equality: bool,
    pub reconcile_scope: ReconcileScope,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            policy: ConflictPolicy::default(),
            threshold: DEFAULT_THRESHOLD,
            drop_rows_with_missing_keys: true,
            strict_timestamp_equality: false,
            reconcile_scope: ReconcileScope::default(),
        }
    }
}

impl AggregateOptions {
    pub fn new<I, S>(key_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_columns: key_columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_drop_rows_with_missing_keys(mut self, drop: bool) -> Self {
        self.drop_rows_with_missing_keys = drop;
        self
    }

    #[must_use]
    pub fn with_strict_timestamp_equality(mut self, strict: bool) -> Self {
        self.strict_timestamp_equality = strict;
        self
    }

    #[must_use]
    pub fn with_reconcile_scope(mut self, scope: ReconcileScope) -> Self {
        self.reconcile_scope = scope;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold > MAX_SCORE {
            return Err(MatchError::InvalidThreshold(self.threshold));
        }
        if self.key_columns.is_empty() {
            return Err(MatchError::NoKeyColumns);
        }
        Ok(())
    }
}

/// What an aggregation run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateReport {
    pub input_rows: usize,
    pub dropped_missing_keys: usize,
    pub buckets: usize,
    /// Rows folded into another row of their bucket.
    pub merged_rows: usize,
    pub fuzzy_merges: Vec<FuzzyMerge>,
    pub timestamp_rejections: usize,
    /// Buckets whose operator failed; their first row was kept as is.
    pub unresolved_buckets: usize,
    /// Bucket rows beyond the first pair, dropped without reconciliation.
    pub unreconciled_rows: usize,
    pub output_rows: usize,
}

impl AggregateReport {
    pub fn has_unresolved(&self) -> bool {
        self.unresolved_buckets > 0
    }
}

/// Aggregated table together with its report.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub table: Table,
    pub report: AggregateReport,
}

/// Merges duplicate rows of a table into one row per entity.
pub struct Aggregator {
    options: AggregateOptions,
    operator: Option<Box<dyn ConflictOperator>>,
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("options", &self.options)
            .field("operator", &self.operator.is_some())
            .finish()
    }
}

impl Aggregator {
    pub fn new(options: AggregateOptions) -> Self {
        Self {
            options,
            operator: None,
        }
    }

    /// Sets the operator consulted by [`ConflictPolicy::Interactive`].
    #[must_use]
    pub fn with_operator(mut self, operator: Box<dyn ConflictOperator>) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    /// Aggregates `table` on the configured key columns.
    ///
    /// # Errors
    ///
    /// Invalid options, an interactive policy without operator, or a key
    /// column missing from the table. Operator failures are not errors; they
    /// are counted in [`AggregateReport::unresolved_buckets`].
    pub fn aggregate(&mut self, table: Table) -> Result<Aggregation> {
        self.options.validate()?;
        if self.options.policy.is_interactive() && self.operator.is_none() {
            return Err(MatchError::InvalidPolicy(format!(
                "{} (no conflict operator configured)",
                self.options.policy
            )));
        }
        let key_indices = self
            .options
            .key_columns
            .iter()
            .map(|key| {
                table
                    .column_index(key)
                    .ok_or_else(|| MatchError::MissingKeyColumn(key.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        let columns = table.columns().to_vec();

        let mut report = AggregateReport {
            input_rows: table.height(),
            ..AggregateReport::default()
        };
        let mut rows = Vec::with_capacity(table.height());
        let mut keys = Vec::with_capacity(table.height());
        for mut row in table.into_rows() {
            for &index in &key_indices {
                trim_cell(&mut row.cells[index]);
            }
            let key = ResolvedKey::new(
                key_indices
                    .iter()
                    .map(|&index| row.cells[index].clone())
                    .collect(),
            );
            if self.options.drop_rows_with_missing_keys && !key.is_complete() {
                report.dropped_missing_keys += 1;
                continue;
            }
            rows.push(Some(row));
            keys.push(key);
        }

        let bucketing = assign_buckets(
            keys,
            &BucketRules {
                threshold: self.options.threshold,
                strict_timestamp_equality: self.options.strict_timestamp_equality,
            },
        );
        report.buckets = bucketing.buckets.len();
        report.fuzzy_merges = bucketing.fuzzy_merges;
        report.timestamp_rejections = bucketing.timestamp_rejections;

        let reconciler = Reconciler {
            policy: self.options.policy,
            columns: &columns,
            key_indices: &key_indices,
        };
        let mut survivors = Vec::with_capacity(bucketing.buckets.len());
        let mut seen = HashSet::new();
        for bucket in bucketing.buckets {
            let members: Vec<Row> = bucket
                .rows
                .iter()
                .filter_map(|&index| rows[index].take())
                .collect();
            let Some(survivor) = self.reconcile_bucket(&reconciler, &bucket.key, members, &mut report)
            else {
                continue;
            };
            if bucket.key.is_complete() && !seen.insert(bucket.key.rendered().to_string()) {
                trace!(key = bucket.key.rendered(), "duplicate survivor key");
                debug!(rows = bucket.rows.len(), "dropped duplicate survivor");
                continue;
            }
            survivors.push(survivor);
        }

        report.output_rows = survivors.len();
        let table = Table::with_rows(columns, survivors)?;
        info!(
            input_rows = report.input_rows,
            output_rows = report.output_rows,
            buckets = report.buckets,
            merged_rows = report.merged_rows,
            fuzzy_merges = report.fuzzy_merges.len(),
            unresolved = report.unresolved_buckets,
            "aggregated duplicate rows"
        );
        Ok(Aggregation { table, report })
    }

    /// Aggregates a dataset on its own key columns.
    pub fn aggregate_dataset(&mut self, dataset: Dataset) -> Result<(Dataset, AggregateReport)> {
        let (name, key_columns, table) = dataset.into_parts();
        let span = info_span!("aggregate", dataset = %name);
        let _guard = span.enter();

        let configured = std::mem::replace(&mut self.options.key_columns, key_columns.clone());
        let result = self.aggregate(table);
        self.options.key_columns = configured;

        let Aggregation { table, report } = result?;
        let dataset = Dataset::from_parts(name, key_columns, table)?;
        Ok((dataset, report))
    }

    fn reconcile_bucket(
        &mut self,
        reconciler: &Reconciler<'_>,
        key: &ResolvedKey,
        members: Vec<Row>,
        report: &mut AggregateReport,
    ) -> Option<Row> {
        let mut members = members.into_iter();
        let first = members.next()?;
        let rest: Vec<Row> = members.collect();
        if rest.is_empty() {
            return Some(first);
        }
        report.merged_rows += rest.len();

        let paired = match self.options.reconcile_scope {
            ReconcileScope::FirstPair => 1,
            ReconcileScope::AllRows => rest.len(),
        };
        let extra = rest.len() - paired;
        let fallback = first.clone();
        let mut survivor = first;
        for second in rest.into_iter().take(paired) {
            match reconciler.reconcile(survivor, second, self.operator.as_deref_mut()) {
                Ok(row) => survivor = row,
                Err(err) => {
                    trace!(key = key.rendered(), "unresolved bucket key");
                    warn!(error = %err, "left duplicate bucket unresolved");
                    report.unresolved_buckets += 1;
                    return Some(fallback);
                }
            }
        }
        if extra > 0 {
            trace!(key = key.rendered(), "bucket with unreconciled rows");
            debug!(extra, "dropped duplicates beyond the first pair");
            report.unreconciled_rows += extra;
        }
        Some(survivor)
    }
}

/// Aggregates `table` with a one-off [`Aggregator`].
///
/// The interactive policy needs an operator and fails here with
/// [`MatchError::InvalidPolicy`]; use [`Aggregator::with_operator`] instead.
pub fn aggregate(table: Table, options: &AggregateOptions) -> Result<Table> {
    Aggregator::new(options.clone())
        .aggregate(table)
        .map(|aggregation| aggregation.table)
}

fn trim_cell(cell: &mut CellValue) {
    match cell {
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }
        CellValue::List(values) => {
            for value in values.iter_mut() {
                let trimmed = value.trim();
                if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_validate_threshold_and_keys() {
        let err = AggregateOptions::new(["movie_name"])
            .with_threshold(101)
            .validate()
            .unwrap_err();
        assert_eq!(err, MatchError::InvalidThreshold(101));
        let err = AggregateOptions::default().validate().unwrap_err();
        assert_eq!(err, MatchError::NoKeyColumns);
    }

    #[test]
    fn trims_text_and_list_keys() {
        let mut cell = CellValue::text(" The Dark Knight ");
        trim_cell(&mut cell);
        assert_eq!(cell, CellValue::text("The Dark Knight"));
        let mut cell = CellValue::list([" Heat", "Alien "]);
        trim_cell(&mut cell);
        assert_eq!(cell, CellValue::list(["Heat", "Alien"]));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: AggregateOptions = serde_json::from_str(
            r#"{"key_columns": ["movie_name"], "policy": "keep_longest", "reconcile_scope": "all_rows"}"#,
        )
        .unwrap();
        assert_eq!(options.policy, ConflictPolicy::KeepLongest);
        assert_eq!(options.threshold, DEFAULT_THRESHOLD);
        assert_eq!(options.reconcile_scope, ReconcileScope::AllRows);
        assert!(options.drop_rows_with_missing_keys);
    }

    #[test]
    fn unknown_policy_fails_deserialization() {
        let err = serde_json::from_str::<AggregateOptions>(r#"{"policy": "coin_flip"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid conflict policy"));
    }
}
