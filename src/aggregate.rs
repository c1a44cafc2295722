//! Aggregator: partitions filtered statements into ordered time slices.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::model::{DocumentId, SliceLabel, Statement};
use crate::spec::{AggregationRule, ValidSpec};

/// A labeled subset of the filtered statements, built into one network.
#[derive(Debug, Clone)]
pub struct TimeSlice<'a> {
    pub label: SliceLabel,
    pub statements: Vec<&'a Statement>,
}

/// Split `statements` into slices according to the spec's aggregation rule.
///
/// Slices are returned in time order (ascending document id for
/// per-document slicing), each keeping the input order of its statements.
/// An empty input yields no slices.
pub fn aggregate<'a>(statements: &[&'a Statement], spec: &ValidSpec) -> Vec<TimeSlice<'a>> {
    if statements.is_empty() {
        return Vec::new();
    }

    let slices = match spec.aggregation {
        AggregationRule::WholeRange => vec![TimeSlice {
            label: SliceLabel::Range { start: spec.date_range.start, end: spec.date_range.end },
            statements: statements.to_vec(),
        }],
        AggregationRule::PerDocument => {
            let groups: BTreeMap<DocumentId, Vec<&'a Statement>> = group_by(statements, |s| s.document);
            groups
                .into_iter()
                .map(|(id, statements)| TimeSlice {
                    label: SliceLabel::Document { id, title: None, date: None },
                    statements,
                })
                .collect()
        }
        AggregationRule::PerYear => {
            let groups: BTreeMap<i32, Vec<&'a Statement>> = group_by(statements, |s| s.date.year());
            groups
                .into_iter()
                .map(|(year, statements)| TimeSlice { label: SliceLabel::Year { year }, statements })
                .collect()
        }
        AggregationRule::TimeWindow { .. } => windows(statements, spec),
    };

    tracing::debug!(slices = slices.len(), rule = ?spec.aggregation, "aggregation done");
    slices
}

fn group_by<'a, K: Ord>(
    statements: &[&'a Statement],
    key: impl Fn(&Statement) -> K,
) -> BTreeMap<K, Vec<&'a Statement>> {
    let mut groups: BTreeMap<K, Vec<&'a Statement>> = BTreeMap::new();
    for &s in statements {
        groups.entry(key(s)).or_default().push(s);
    }
    groups
}

/// Consecutive `[start + k*N, start + (k+1)*N)` windows covering the date range.
fn windows<'a>(statements: &[&'a Statement], spec: &ValidSpec) -> Vec<TimeSlice<'a>> {
    let Some(window) = spec.window() else {
        return Vec::new();
    };
    let range = spec.date_range;
    let step = window.num_seconds().max(1);
    let count = (range.end - range.start).num_seconds() / step + 1;

    let mut slices: Vec<TimeSlice<'a>> = (0..count)
        .map(|k| {
            let start = range.start + chrono::TimeDelta::seconds(k * step);
            let end = start
                .checked_add_signed(window)
                .filter(|e| *e <= range.end)
                .unwrap_or(range.end);
            TimeSlice { label: SliceLabel::Range { start, end }, statements: Vec::new() }
        })
        .collect();

    for &s in statements {
        if !range.contains(&s.date) {
            tracing::debug!(statement = %s.id, "statement outside date range, not windowed");
            continue;
        }
        let k = ((s.date - range.start).num_seconds() / step) as usize;
        slices[k].statements.push(s);
    }
    slices
}
