//! Network construction semantics: two-mode counts, agreement patterns,
//! exclusions, symmetry, and ordering.
//!
//! These run the synchronous core (`engine::run`) over in-memory statements.

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

use discourse_net::aggregate::aggregate;
use discourse_net::builder::build;
use discourse_net::engine::{self, ExportControl};
use discourse_net::filter::filter;
use discourse_net::{
    AgreementPattern, DateRange, DocumentId, LayerKind, Network, NetworkSpec, Statement,
    StatementId, StatementType, StatementTypeId, ValidSpec, Value, VariableKind,
};

// ============================================================================
// Helpers
// ============================================================================

const DNA: StatementTypeId = StatementTypeId(1);

fn schema() -> StatementType {
    StatementType::new(DNA, "DNA Statement")
        .with_variable("person", VariableKind::ShortText)
        .with_variable("concept", VariableKind::ShortText)
        .with_variable("agree", VariableKind::Boolean)
        .with_variable("intensity", VariableKind::Integer)
}

fn date(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, day).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

/// Statements `(actor, concept, agree)` dated one day apart.
fn statements(rows: &[(&str, &str, bool)]) -> Vec<Statement> {
    rows.iter()
        .enumerate()
        .map(|(i, &(actor, concept, agree))| {
            Statement::new(StatementId(i as u64 + 1), DNA, DocumentId(1), date(i as u32 % 28 + 1))
                .with_value("person", actor)
                .with_value("concept", concept)
                .with_value("agree", agree)
                .with_value("intensity", i as i64 % 3)
        })
        .collect()
}

fn two_mode() -> NetworkSpec {
    NetworkSpec::new(DNA, "person", "concept", DateRange::years(2020, 2020).unwrap())
}

fn one_mode(pattern: AgreementPattern) -> NetworkSpec {
    two_mode().one_mode("agree", pattern)
}

fn whole(stmts: &[Statement], spec: &NetworkSpec) -> Network {
    let valid = spec.validate(&schema()).unwrap();
    let mut networks = engine::run(stmts, &valid, &ExportControl::new())
        .completed()
        .unwrap()
        .networks;
    assert_eq!(networks.len(), 1);
    networks.remove(0)
}

// ============================================================================
// Two-mode
// ============================================================================

#[test]
fn test_two_mode_counts() {
    let stmts = statements(&[("p1", "c1", true), ("p1", "c1", true), ("p2", "c1", false)]);
    let net = whole(&stmts, &two_mode());

    assert_eq!(net.rows.len(), 2);
    assert_eq!(net.columns.len(), 1);
    assert_eq!(net.weight(LayerKind::Incidence, "p1", "c1"), 2);
    assert_eq!(net.weight(LayerKind::Incidence, "p2", "c1"), 1);
}

#[test]
fn test_two_mode_ignores_pattern() {
    let stmts = statements(&[("p1", "c1", true), ("p2", "c1", false)]);
    let spec = two_mode().with_agreement("agree", Vec::new()).with_pattern(AgreementPattern::Separate);
    let net = whole(&stmts, &spec);
    assert_eq!(net.layers.len(), 1);
    assert_eq!(net.layers[0].kind, LayerKind::Incidence);
}

// ============================================================================
// One-mode agreement patterns
// ============================================================================

#[test]
fn test_congruence_and_conflict() {
    let agree = statements(&[("A", "C", true), ("B", "C", true)]);
    assert_eq!(whole(&agree, &one_mode(AgreementPattern::Congruence)).weight(LayerKind::Congruence, "A", "B"), 1);
    assert_eq!(whole(&agree, &one_mode(AgreementPattern::Conflict)).weight(LayerKind::Conflict, "A", "B"), 0);

    let disagree = statements(&[("A", "C", true), ("B", "C", false)]);
    assert_eq!(whole(&disagree, &one_mode(AgreementPattern::Congruence)).weight(LayerKind::Congruence, "A", "B"), 0);
    assert_eq!(whole(&disagree, &one_mode(AgreementPattern::Conflict)).weight(LayerKind::Conflict, "A", "B"), 1);
}

#[test]
fn test_statement_pairs_are_counted() {
    // A twice and B once on C, all agreeing: two statement pairs link A and B.
    let stmts = statements(&[("A", "C", true), ("A", "C", true), ("B", "C", true)]);
    let net = whole(&stmts, &one_mode(AgreementPattern::Congruence));
    assert_eq!(net.weight(LayerKind::Congruence, "A", "B"), 2);
    assert_eq!(net.weight(LayerKind::Congruence, "A", "A"), 0);
}

#[test]
fn test_separate_has_two_layers() {
    let stmts = statements(&[
        ("A", "C1", true),
        ("B", "C1", true),
        ("A", "C2", true),
        ("B", "C2", false),
        ("B", "C3", false),
        ("D", "C3", true),
    ]);
    let net = whole(&stmts, &one_mode(AgreementPattern::Separate));
    let kinds: Vec<LayerKind> = net.layers.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, vec![LayerKind::Congruence, LayerKind::Conflict]);
    assert_eq!(net.weight(LayerKind::Congruence, "A", "B"), 1);
    assert_eq!(net.weight(LayerKind::Conflict, "A", "B"), 1);
    assert_eq!(net.weight(LayerKind::Conflict, "B", "D"), 1);
    assert_eq!(net.weight(LayerKind::Congruence, "B", "D"), 0);
}

#[test]
fn test_subtract_is_signed() {
    let stmts = statements(&[
        ("A", "C1", true),
        ("B", "C1", false),
        ("A", "C2", true),
        ("B", "C2", false),
        ("A", "C3", false),
        ("B", "C3", false),
    ]);
    let net = whole(&stmts, &one_mode(AgreementPattern::Subtract));
    assert_eq!(net.weight(LayerKind::Subtract, "A", "B"), -1);
    assert_eq!(net.weight(LayerKind::Subtract, "B", "A"), -1);
}

#[test]
fn test_integer_agreement() {
    let stmts = statements(&[("A", "C", true), ("B", "C", true), ("D", "C", true)]);
    // intensity is i % 3: A=0, B=1, D=2
    let spec = two_mode().one_mode("intensity", AgreementPattern::Conflict);
    let net = whole(&stmts, &spec);
    assert_eq!(net.weight(LayerKind::Conflict, "A", "B"), 1);
    assert_eq!(net.weight(LayerKind::Conflict, "B", "D"), 1);
    assert_eq!(net.weight(LayerKind::Conflict, "A", "D"), 1);
}

#[test]
fn test_no_self_loops() {
    let stmts = statements(&[("A", "C", true), ("A", "C", false), ("A", "D", true)]);
    for pattern in [
        AgreementPattern::Congruence,
        AgreementPattern::Conflict,
        AgreementPattern::Subtract,
        AgreementPattern::Separate,
    ] {
        let net = whole(&stmts, &one_mode(pattern));
        assert_eq!(net.rows.as_slice(), &["A"]);
        assert_eq!(net.edge_count(), 0, "{pattern:?} produced a self-loop");
    }
}

// ============================================================================
// Filtering, exclusion, ordering
// ============================================================================

#[test]
fn test_exclusions_never_become_nodes() {
    let stmts = statements(&[("A", "C", true), ("B", "C", true), ("A", "jobs", true), ("X", "C", true)]);
    let spec = one_mode(AgreementPattern::Congruence).excluding_mode1(["X"]).excluding_mode2(["jobs"]);
    let net = whole(&stmts, &spec);
    assert_eq!(net.rows.as_slice(), &["A", "B"]);
    assert!(!net.columns.contains("X"));

    let net = whole(&stmts, &two_mode().excluding_mode1(["X"]).excluding_mode2(["jobs"]));
    assert_eq!(net.columns.as_slice(), &["C"]);
}

#[test]
fn test_agreement_restriction_applies_to_two_mode() {
    let stmts = statements(&[("A", "C", true), ("B", "C", false)]);
    let spec = two_mode().with_agreement("agree", vec![Value::Boolean(false)]);
    let net = whole(&stmts, &spec);
    assert_eq!(net.rows.as_slice(), &["B"]);
}

#[test]
fn test_first_appearance_order() {
    let stmts = statements(&[("Zeta", "b", true), ("Alpha", "a", true), ("Zeta", "a", true)]);
    let net = whole(&stmts, &two_mode());
    assert_eq!(net.rows.as_slice(), &["Zeta", "Alpha"]);
    assert_eq!(net.columns.as_slice(), &["b", "a"]);
}

#[test]
fn test_stages_compose_by_hand() {
    let stmts = statements(&[("A", "C", true), ("B", "C", true)]);
    let valid: ValidSpec = one_mode(AgreementPattern::Congruence).validate(&schema()).unwrap();
    let filtered = filter(&stmts, &valid);
    let slices = aggregate(&filtered.statements, &valid);
    let net = build(&slices[0], &valid);
    assert_eq!(net, whole(&stmts, &one_mode(AgreementPattern::Congruence)));
}
