//! Property tests over randomly generated statement corpora.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;

use discourse_net::aggregate::aggregate;
use discourse_net::engine::{self, ExportControl};
use discourse_net::filter::filter;
use discourse_net::{
    AgreementPattern, AggregationRule, DateRange, DocumentId, LayerKind, NetworkSpec, Statement,
    StatementId, StatementType, StatementTypeId, Value, VariableKind,
};

const DNA: StatementTypeId = StatementTypeId(1);
const ACTORS: &[&str] = &["", "EPA", "NGO", "Senate", "Union", "Lobby"];
const CONCEPTS: &[&str] = &["", "climate", "jobs", "tax", "energy"];

fn schema() -> StatementType {
    StatementType::new(DNA, "DNA Statement")
        .with_variable("person", VariableKind::ShortText)
        .with_variable("concept", VariableKind::ShortText)
        .with_variable("agree", VariableKind::Boolean)
}

fn base_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn range() -> DateRange {
    DateRange::new(base_date() + TimeDelta::days(100), base_date() + TimeDelta::days(900)).unwrap()
}

prop_compose! {
    fn arb_statement(id: u64)(
        actor in 0..ACTORS.len(),
        concept in 0..CONCEPTS.len(),
        agree in any::<bool>(),
        day in 0i64..1000,
        doc in 1u64..5,
    ) -> Statement {
        Statement::new(StatementId(id), DNA, DocumentId(doc), base_date() + TimeDelta::days(day))
            .with_value("person", ACTORS[actor])
            .with_value("concept", CONCEPTS[concept])
            .with_value("agree", agree)
    }
}

fn arb_corpus() -> impl Strategy<Value = Vec<Statement>> {
    (0usize..40).prop_flat_map(|n| (0..n as u64).map(arb_statement).collect::<Vec<_>>())
}

fn arb_rule() -> impl Strategy<Value = AggregationRule> {
    prop_oneof![
        Just(AggregationRule::WholeRange),
        Just(AggregationRule::PerDocument),
        Just(AggregationRule::PerYear),
        (1u32..120).prop_map(|days| AggregationRule::TimeWindow { days }),
    ]
}

fn spec(pattern: AgreementPattern) -> NetworkSpec {
    NetworkSpec::new(DNA, "person", "concept", range()).one_mode("agree", pattern)
}

proptest! {
    #[test]
    fn filter_keeps_exactly_matching_statements(
        corpus in arb_corpus(),
        excluded_actor in 1..ACTORS.len(),
        restrict in any::<Option<bool>>(),
    ) {
        let mut spec = NetworkSpec::new(DNA, "person", "concept", range())
            .excluding_mode1([ACTORS[excluded_actor]]);
        if let Some(v) = restrict {
            spec = spec.with_agreement("agree", vec![Value::Boolean(v)]);
        }
        let valid = spec.validate(&schema()).unwrap();
        let kept: HashSet<StatementId> = filter(&corpus, &valid).statements.iter().map(|s| s.id).collect();

        for s in &corpus {
            let actor = s.get("person").unwrap().label();
            let concept = s.get("concept").unwrap().label();
            let agree = s.get("agree").unwrap().as_bool().unwrap();
            let expected = range().contains(&s.date)
                && !actor.is_empty()
                && !concept.is_empty()
                && actor != ACTORS[excluded_actor]
                && restrict.is_none_or(|v| v == agree);
            prop_assert_eq!(kept.contains(&s.id), expected, "statement {}", s.id);
        }
    }

    #[test]
    fn slices_partition_the_filtered_set(corpus in arb_corpus(), rule in arb_rule()) {
        let valid = spec(AgreementPattern::Congruence).aggregated_by(rule).validate(&schema()).unwrap();
        let filtered = filter(&corpus, &valid);
        let slices = aggregate(&filtered.statements, &valid);

        let mut seen = HashSet::new();
        for slice in &slices {
            for s in &slice.statements {
                prop_assert!(seen.insert(s.id), "statement {} in two slices", s.id);
            }
        }
        let expected: HashSet<StatementId> = filtered.statements.iter().map(|s| s.id).collect();
        prop_assert_eq!(seen, expected);
        if filtered.statements.is_empty() {
            prop_assert!(slices.is_empty());
        }
    }

    #[test]
    fn subtract_is_congruence_minus_conflict(corpus in arb_corpus(), rule in arb_rule()) {
        let run = |pattern| {
            let valid = spec(pattern).aggregated_by(rule).validate(&schema()).unwrap();
            engine::run(&corpus, &valid, &ExportControl::new()).completed().unwrap().networks
        };
        let separate = run(AgreementPattern::Separate);
        let subtract = run(AgreementPattern::Subtract);
        prop_assert_eq!(separate.len(), subtract.len());

        for (sep, sub) in separate.iter().zip(&subtract) {
            for a in sep.rows.iter() {
                for b in sep.rows.iter() {
                    let cong = sep.weight(LayerKind::Congruence, a, b);
                    let conf = sep.weight(LayerKind::Conflict, a, b);
                    prop_assert_eq!(sub.weight(LayerKind::Subtract, a, b), cong - conf);
                    prop_assert_eq!(cong, sep.weight(LayerKind::Congruence, b, a));
                    if a == b {
                        prop_assert_eq!(cong + conf, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn one_mode_edges_never_loop(corpus in arb_corpus()) {
        let valid = spec(AgreementPattern::Separate).validate(&schema()).unwrap();
        let result = engine::run(&corpus, &valid, &ExportControl::new()).completed().unwrap();
        for network in &result.networks {
            for layer in &network.layers {
                for &(a, b) in layer.edges.keys() {
                    prop_assert!(a < b);
                }
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical(corpus in arb_corpus(), rule in arb_rule()) {
        let valid = spec(AgreementPattern::Subtract)
            .aggregated_by(rule)
            .with_isolates(true)
            .validate(&schema())
            .unwrap();
        let first = engine::run(&corpus, &valid, &ExportControl::new()).completed().unwrap().networks;
        let second = engine::run(&corpus, &valid, &ExportControl::new()).completed().unwrap().networks;
        prop_assert_eq!(first, second);
    }
}
