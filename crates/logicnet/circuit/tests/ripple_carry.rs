//! End-to-end behaviour of the 8-bit ripple-carry adder against the in-memory
//! service.

use logicnet_circuit::engine::removal_plan;
use logicnet_circuit::{
    exercise, BuildStrategy, CircuitError, RippleCarryAdder, SettlePolicy,
};
use logicnet_service::{InMemoryRuleService, RuleService, ServiceError};
use logicnet_types::{NodeName, Register, Rule};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn unique_name() -> NodeName {
    NodeName::new(format!("test-{}", uuid::Uuid::new_v4())).unwrap()
}

async fn built_adder() -> (Arc<InMemoryRuleService>, RippleCarryAdder) {
    let service = Arc::new(InMemoryRuleService::new());
    let rca = RippleCarryAdder::new(service.clone(), unique_name()).unwrap();
    rca.build().await.unwrap();
    (service, rca)
}

async fn add(rca: &RippleCarryAdder, a: u8, b: u8) -> (u8, bool) {
    rca.set_inputs(Register::from(a), Register::from(b))
        .await
        .unwrap();
    let (sum, overflow) = rca.read_outputs().await.unwrap();
    (sum.value(), overflow)
}

#[tokio::test]
async fn boundary_sums() {
    let (_service, rca) = built_adder().await;
    assert_eq!(add(&rca, 0, 0).await, (0, false));
    assert_eq!(add(&rca, 255, 255).await, (254, true));
    assert_eq!(add(&rca, 128, 128).await, (0, true));
    assert_eq!(add(&rca, 25, 87).await, (112, false));
    assert_eq!(add(&rca, 255, 1).await, (0, true));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn sums_wrap_and_flag_overflow(a in any::<u8>(), b in any::<u8>()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (sum, overflow) = rt.block_on(async {
            let (_service, rca) = built_adder().await;
            add(&rca, a, b).await
        });
        prop_assert_eq!(sum, a.wrapping_add(b));
        prop_assert_eq!(overflow, a as u16 + b as u16 > 255);
    }
}

#[tokio::test]
async fn layered_build_produces_the_same_circuit() {
    let service = Arc::new(InMemoryRuleService::new());
    let rca = RippleCarryAdder::new(service.clone(), unique_name()).unwrap();
    rca.build_with(BuildStrategy::Layered).await.unwrap();

    assert_eq!(service.node_count().await, rca.blueprint().len());
    assert_eq!(add(&rca, 100, 55).await, (155, false));
}

#[tokio::test]
async fn every_node_is_created_after_its_references() {
    let rca = RippleCarryAdder::new(Arc::new(InMemoryRuleService::new()), unique_name()).unwrap();
    let bp = rca.blueprint();
    let mut created: HashSet<NodeName> = HashSet::new();
    for (name, rule) in bp.nodes() {
        for reference in rule.references() {
            assert!(created.contains(reference), "{} before {}", name, reference);
        }
        created.insert(name.clone());
    }
}

#[tokio::test]
async fn removal_deletes_parents_before_children() {
    let rca = RippleCarryAdder::new(Arc::new(InMemoryRuleService::new()), unique_name()).unwrap();
    let bp = rca.blueprint();
    let plan = removal_plan(&bp, &rca.leaf_names()).await.unwrap();

    assert_eq!(plan.len(), bp.len());
    let unique: HashSet<&NodeName> = plan.iter().collect();
    assert_eq!(unique.len(), plan.len());

    let position = |name: &NodeName| plan.iter().position(|p| p == name).unwrap();
    for (name, rule) in bp.nodes() {
        for child in rule.references() {
            assert!(position(name) < position(child), "{} after {}", name, child);
        }
    }
}

#[tokio::test]
async fn remove_leaves_unrelated_nodes_alone() {
    let (service, rca) = built_adder().await;
    let bystander = unique_name();
    service
        .create_rule_node(&bystander, &Rule::Constant(true))
        .await
        .unwrap();

    let deleted = rca.remove().await.unwrap();
    assert_eq!(deleted.len(), rca.blueprint().len());
    for name in rca.blueprint().creation_order() {
        assert!(!service.contains(&name).await, "{} survived", name);
    }
    assert_eq!(service.names().await, vec![bystander]);
}

#[tokio::test]
async fn removing_an_absent_circuit_fails() {
    let service = Arc::new(InMemoryRuleService::new());
    let rca = RippleCarryAdder::new(service, unique_name()).unwrap();
    let err = rca.remove().await.unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Traverse {
            source: ServiceError::NotFound(_),
            ..
        }
    ));
}

#[tokio::test]
async fn building_twice_fails_on_the_first_node() {
    let (_service, rca) = built_adder().await;
    let err = rca.build().await.unwrap_err();
    match err {
        CircuitError::Create { name, source, .. } => {
            assert_eq!(&name, rca.ground_name());
            assert!(matches!(source, ServiceError::AlreadyExists(_)));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn graph_visits_each_node_once() {
    let (_service, rca) = built_adder().await;
    let trace = rca.trace().await.unwrap();

    let unique: HashSet<&NodeName> = trace.visited.iter().collect();
    assert_eq!(unique.len(), trace.visited.len());
    assert_eq!(trace.visited.len(), rca.blueprint().len());

    let mut out = Vec::new();
    rca.save_graph(&mut out).await.unwrap();
    let dot = String::from_utf8(out).unwrap();
    assert!(dot.starts_with("digraph {\n"));
    assert!(dot.ends_with("}\n"));
    let edge = format!(
        "\t\"{}\" -> \"{}\";",
        rca.ground_name(),
        rca.adder(0).sum_out_name()
    );
    assert!(dot.contains(&edge), "missing {}", edge);
    assert_eq!(dot.lines().count(), trace.edges.len() + 2);
}

#[tokio::test(start_paused = true)]
async fn exercise_converges_once_the_service_catches_up() {
    let service = Arc::new(InMemoryRuleService::with_latency(Duration::from_secs(3)));
    let rca = RippleCarryAdder::new(service.clone(), unique_name()).unwrap();
    rca.build().await.unwrap();

    let report = exercise(&rca, 25, 87, &SettlePolicy::default())
        .await
        .unwrap();
    assert!(report.converged);
    assert_eq!(report.attempts, 3);
    assert_eq!(report.sum.value(), 112);
    assert!(!report.overflow);
}

#[tokio::test(start_paused = true)]
async fn exercise_reports_failure_after_the_last_attempt() {
    let service = Arc::new(InMemoryRuleService::with_latency(Duration::from_secs(60)));
    let rca = RippleCarryAdder::new(service.clone(), unique_name()).unwrap();
    rca.build().await.unwrap();

    let report = exercise(&rca, 25, 87, &SettlePolicy::default())
        .await
        .unwrap();
    assert!(!report.converged);
    assert_eq!(report.attempts, 10);
}

#[tokio::test]
async fn exercise_on_an_unbuilt_circuit_is_an_error() {
    let rca = RippleCarryAdder::new(Arc::new(InMemoryRuleService::new()), unique_name()).unwrap();
    let err = exercise(&rca, 1, 2, &SettlePolicy::immediate())
        .await
        .unwrap_err();
    assert!(matches!(err, CircuitError::Override { .. }));
}

#[tokio::test]
async fn overlong_circuit_names_are_rejected_before_anything_is_created() {
    let service = Arc::new(InMemoryRuleService::new());
    let err = RippleCarryAdder::new(service.clone(), NodeName::new("x".repeat(240)).unwrap())
        .err()
        .unwrap();
    assert!(matches!(err, CircuitError::Name(_)));
    assert!(err.to_string().contains("259"), "{}", err);
    assert_eq!(service.node_count().await, 0);

    let rca = RippleCarryAdder::new(service.clone(), NodeName::new("x".repeat(229)).unwrap())
        .unwrap();
    rca.build().await.unwrap();
    for name in service.names().await {
        assert!(name.as_str().len() <= 255, "{} is too long", name);
    }
}
