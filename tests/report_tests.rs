//! Tests for full-disclosure audit reports.

mod common;

use common::*;
use rak::hash::digest;
use rak::report::UNSPECIFIED_UNCERTAINTY;
use rak::{
    build_full_disclosure_audit_report, build_reasoning_artifact,
    verify_full_disclosure_audit_report, AuditReportBuilder, DeploymentFingerprint, ErrorKind,
    FullDisclosureAuditReport, KernelConfig, LimitsOverride, RakError, ReasoningArtifact,
    ReportOptions, ReportVerificationContext,
};

fn report_options(artifacts: Vec<ReasoningArtifact>) -> ReportOptions {
    let mut options = ReportOptions::new("bookiji-1.0.0", artifacts, fingerprint());
    options.active_phases = vec!["12".to_string()];
    options.issued_at = Some(1_700_000_000_000);
    options
}

fn report() -> FullDisclosureAuditReport {
    build_full_disclosure_audit_report(report_options(vec![artifact(100), artifact(101)]))
        .expect("report should build")
}

fn verify(report: &FullDisclosureAuditReport) -> Result<(), RakError> {
    verify_full_disclosure_audit_report(report, &ReportVerificationContext::default())
}

fn reseal(mut report: FullDisclosureAuditReport) -> FullDisclosureAuditReport {
    report.report_id = report.compute_id().expect("recompute");
    report
}

// ============================================================================
// Report Construction Tests
// ============================================================================

#[test]
fn test_report_preserves_every_disagreement_and_uncertainty() {
    let a1 = artifact(100);
    let a2 = artifact(101);
    let report = build_full_disclosure_audit_report(report_options(vec![a1.clone(), a2.clone()]))
        .expect("report");

    let evidence = &report.reasoning_evidence;
    for artifact in [&a1, &a2] {
        for key in artifact.disagreement_keys() {
            assert!(evidence.preserved_disagreements.contains(&key), "missing {}", key);
        }
        for key in artifact.uncertainty_keys() {
            assert!(evidence.preserved_uncertainties.contains(&key), "missing {}", key);
        }
    }
    assert!(evidence.preserved_disagreements.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(evidence.artifacts[0].artifact_hash, a1.identity.artifact_id);
    assert_eq!(report.limits.irreducible_uncertainty, evidence.preserved_uncertainties);
    assert!(report.machine_generated);
    assert!(verify(&report).is_ok());
}

#[test]
fn test_input_closure_is_sorted_and_hashed() {
    let report = report();
    let closure = &report.input_closure;
    assert_eq!(closure.inputs.len(), 2);
    assert!(closure.inputs[0].artifact_id < closure.inputs[1].artifact_id);
    let expected = digest(&serde_json::json!({ "inputs": closure.inputs })).expect("digest");
    assert_eq!(closure.hash_closure, expected);
}

#[test]
fn test_closure_independent_of_artifact_order() {
    let forward =
        build_full_disclosure_audit_report(report_options(vec![artifact(100), artifact(101)]))
            .expect("report");
    let backward =
        build_full_disclosure_audit_report(report_options(vec![artifact(101), artifact(100)]))
            .expect("report");
    assert_eq!(forward.input_closure.hash_closure, backward.input_closure.hash_closure);
    assert_eq!(
        forward.reasoning_evidence.preserved_disagreements,
        backward.reasoning_evidence.preserved_disagreements
    );
}

#[test]
fn test_report_id_deterministic_for_fixed_issue_time() {
    assert_eq!(report().report_id, report().report_id);
}

#[test]
fn test_report_requires_artifacts() {
    assert!(matches!(
        build_full_disclosure_audit_report(report_options(Vec::new())),
        Err(RakError::Validation { field, .. }) if field == "artifacts"
    ));
}

#[test]
fn test_report_rejects_foreign_deployment() {
    let other = DeploymentFingerprint::build(fingerprint_inputs("commit-other")).expect("fp");
    let foreign = build_reasoning_artifact(options_with(latency_synthesis(), other, 102))
        .expect("artifact");
    let err = build_full_disclosure_audit_report(report_options(vec![artifact(100), foreign]))
        .expect_err("foreign deployment must fail");
    assert_eq!(err.kind(), ErrorKind::DeploymentBindingMismatch);
}

#[test]
fn test_report_rejects_tampered_artifact_at_build() {
    let mut tampered = artifact(103);
    tampered.identity.logical_time = 0;
    assert!(matches!(
        build_full_disclosure_audit_report(report_options(vec![tampered])),
        Err(RakError::HashMismatch { .. })
    ));
}

#[test]
fn test_report_rejects_unbound_genome_at_build() {
    let mut forged = artifact(104);
    forged.provenance.genome_hash = Some("forged-genome".to_string());
    let forged = common::reseal(forged);
    let err = build_full_disclosure_audit_report(report_options(vec![forged]))
        .expect_err("unbound genome must fail");
    assert_eq!(err.kind(), ErrorKind::BindingMismatch);
}

#[test]
fn test_report_artifact_limit() {
    let config = KernelConfig {
        max_report_artifacts: 1,
        ..KernelConfig::default()
    };
    let result = AuditReportBuilder::with_config(config)
        .build(report_options(vec![artifact(100), artifact(101)]));
    assert!(matches!(result, Err(RakError::ResourceLimit { .. })));
}

#[test]
fn test_empty_limit_override_rejected() {
    let mut options = report_options(vec![artifact(100)]);
    options.limits = LimitsOverride {
        blind_spots: Some(Vec::new()),
        ..LimitsOverride::default()
    };
    assert!(matches!(
        build_full_disclosure_audit_report(options),
        Err(RakError::IncompleteLimits { list }) if list == "blind_spots"
    ));
}

#[test]
fn test_limit_overrides_applied() {
    let mut options = report_options(vec![artifact(100)]);
    options.limits.non_claims = Some(vec!["No forecast is implied.".to_string()]);
    let report = build_full_disclosure_audit_report(options).expect("report");
    assert_eq!(report.limits.non_claims, vec!["No forecast is implied.".to_string()]);
    assert_eq!(report.limits.blind_spots.len(), 2);
    assert!(verify(&report).is_ok());
}

#[test]
fn test_irreducible_uncertainty_never_empty() {
    let report = report();
    assert!(!report.limits.irreducible_uncertainty.is_empty());
    assert_ne!(report.limits.irreducible_uncertainty[0], UNSPECIFIED_UNCERTAINTY);
}

// ============================================================================
// Report Verification Tests
// ============================================================================

#[test]
fn test_report_json_round_trip_verifies() {
    let report = report();
    let raw = serde_json::to_string(&report).expect("serialize");
    let rehydrated: FullDisclosureAuditReport = serde_json::from_str(&raw).expect("deserialize");
    assert!(verify(&rehydrated).is_ok());
}

#[test]
fn test_dropped_disagreement_without_reseal_is_hash_mismatch() {
    let mut report = report();
    report.reasoning_evidence.preserved_disagreements.pop();
    assert!(matches!(
        verify(&report),
        Err(RakError::HashMismatch { subject, .. }) if subject == "audit report"
    ));
}

#[test]
fn test_dropped_disagreement_after_reseal_is_omission() {
    let mut report = report();
    report.reasoning_evidence.preserved_disagreements.remove(0);
    let report = reseal(report);
    assert!(matches!(
        verify(&report),
        Err(RakError::DisclosureOmission { category, .. }) if category == "disagreement"
    ));
}

#[test]
fn test_dropped_uncertainty_after_reseal_is_omission() {
    let mut report = report();
    report.reasoning_evidence.preserved_uncertainties.clear();
    let report = reseal(report);
    assert!(matches!(
        verify(&report),
        Err(RakError::DisclosureOmission { category, .. }) if category == "uncertainty"
    ));
}

#[test]
fn test_dropped_input_after_reseal_is_omission() {
    let mut report = report();
    report.input_closure.inputs.pop();
    report.input_closure.hash_closure =
        digest(&serde_json::json!({ "inputs": report.input_closure.inputs })).expect("digest");
    let report = reseal(report);
    assert!(matches!(
        verify(&report),
        Err(RakError::DisclosureOmission { category, .. }) if category == "input"
    ));
}

#[test]
fn test_tampered_closure_hash_detected() {
    let mut report = report();
    report.input_closure.hash_closure = "0".repeat(64);
    let report = reseal(report);
    assert!(matches!(
        verify(&report),
        Err(RakError::HashMismatch { subject, .. }) if subject == "input closure"
    ));
}

#[test]
fn test_emptied_limits_detected() {
    let mut report = report();
    report.limits.non_claims.clear();
    let report = reseal(report);
    assert!(matches!(verify(&report), Err(RakError::IncompleteLimits { .. })));
}

#[test]
fn test_artifact_hash_entry_must_match_identity() {
    let mut report = report();
    report.reasoning_evidence.artifacts[0].artifact_hash = "f".repeat(64);
    let report = reseal(report);
    assert!(matches!(
        verify(&report),
        Err(RakError::HashMismatch { subject, .. }) if subject == "artifact evidence"
    ));
}

#[test]
fn test_embedded_artifact_reverified() {
    let mut report = report();
    report.reasoning_evidence.artifacts[1].artifact.personas.pop();
    let report = reseal(report);
    assert!(matches!(
        verify(&report),
        Err(RakError::HashMismatch { subject, .. }) if subject == "artifact"
    ));
}

#[test]
fn test_embedded_genome_binding_reverified() {
    let mut report =
        build_full_disclosure_audit_report(report_options(vec![artifact(100)])).expect("report");
    let mut forged = artifact(100);
    forged.provenance.genome_hash = Some("forged-genome".to_string());
    let forged = common::reseal(forged);

    let old_id = report.reasoning_evidence.artifacts[0].artifact_hash.clone();
    let new_id = forged.identity.artifact_id.clone();
    let rebind = |keys: &mut Vec<String>| {
        for key in keys.iter_mut() {
            *key = key.replace(&old_id, &new_id);
        }
    };
    rebind(&mut report.reasoning_evidence.preserved_disagreements);
    rebind(&mut report.reasoning_evidence.preserved_uncertainties);
    rebind(&mut report.limits.irreducible_uncertainty);
    report.reasoning_evidence.artifacts[0].artifact = forged;
    report.reasoning_evidence.artifacts[0].artifact_hash = new_id.clone();
    report.input_closure.inputs[0].artifact_id = new_id;
    report.input_closure.hash_closure =
        digest(&serde_json::json!({ "inputs": report.input_closure.inputs })).expect("digest");
    let report = reseal(report);

    assert!(matches!(
        verify(&report),
        Err(RakError::BindingMismatch { binding, .. }) if binding == "genome_hash"
    ));
}

#[test]
fn test_expected_deployment_enforced() {
    let report = report();
    let context = ReportVerificationContext {
        expected_deployment_fingerprint_id: Some("a".repeat(64)),
    };
    let err = verify_full_disclosure_audit_report(&report, &context).expect_err("mismatch");
    assert!(matches!(err, RakError::FingerprintIdentityMismatch { .. }));

    let matching = ReportVerificationContext {
        expected_deployment_fingerprint_id: Some(fingerprint().fingerprint_id),
    };
    assert!(verify_full_disclosure_audit_report(&report, &matching).is_ok());
}

#[test]
fn test_report_version_checked() {
    let mut report = report();
    report.version_tag = "full-disclosure-audit/v2".to_string();
    assert!(matches!(verify(&report), Err(RakError::UnsupportedVersion { .. })));
}
