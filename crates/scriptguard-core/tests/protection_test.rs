//! Transform and findings tests.

use proptest::prelude::*;

use scriptguard_core::protection::{
    decode_artifact, sanitize_file_name, transform, FindingsGenerator, PlaceholderFindings,
};
use scriptguard_core::protection::transform::MAX_FILE_NAME_BYTES;
use scriptguard_core::{ProtectionLevel, RiskLevel};

// =============================================================================
// Transform
// =============================================================================

#[test]
fn loader_has_header_and_decode_snippet() {
    let out = transform("return 42", ProtectionLevel::Advanced, "deadbeef");
    let mut lines = out.loader_code.lines();
    assert_eq!(lines.next(), Some("-- ScriptGuard Encoded Script"));
    assert_eq!(lines.next(), Some("-- Protection Level: advanced"));
    assert_eq!(lines.next(), Some("-- License Key: deadbeef"));
    assert!(out.loader_code.contains("local function decrypt()"));
    assert!(out.loader_code.contains(&out.artifact));
}

#[test]
fn empty_script_encodes_to_empty_payload() {
    let out = transform("", ProtectionLevel::Standard, "k");
    assert_eq!(out.artifact, "");
    assert_eq!(decode_artifact(&out.artifact).unwrap(), Vec::<u8>::new());
}

#[test]
fn multibyte_content_survives_encoding() {
    let script = "print(\"héllo wörld ✓\")";
    let out = transform(script, ProtectionLevel::Standard, "k");
    assert_eq!(decode_artifact(&out.artifact).unwrap(), script.as_bytes());
}

#[test]
fn sanitized_names_never_contain_separators() {
    for raw in ["a/b/c.lua", "..\\..\\win.ini", "\u{0}evil", ".hidden", "..."] {
        let clean = sanitize_file_name(raw);
        assert!(!clean.contains('/'), "{raw} -> {clean}");
        assert!(!clean.contains('\\'), "{raw} -> {clean}");
        assert!(!clean.starts_with('.'), "{raw} -> {clean}");
        assert!(!clean.is_empty());
    }
}

// =============================================================================
// Findings
// =============================================================================

#[test]
fn placeholder_findings_are_medium_risk_with_lines_under_one_hundred() {
    for _ in 0..20 {
        let findings = PlaceholderFindings.generate("main.lua", "local x = 1");
        assert_eq!(findings.vulnerabilities.len(), 2);
        assert_eq!(findings.suggestions.len(), 4);
        assert_eq!(findings.risk_level(), RiskLevel::Medium);
        assert!(findings.vulnerabilities.iter().all(|v| v.line < 100));
    }
}

#[test]
fn vulnerability_serializes_kind_as_type() {
    let findings = PlaceholderFindings.generate("main.lua", "");
    let json = serde_json::to_value(&findings.vulnerabilities[0]).unwrap();
    assert_eq!(json["type"], "SQL Injection");
    assert_eq!(json["severity"], "high");
    assert!(json.get("kind").is_none());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn transform_round_trips_any_script(content in ".{0,512}") {
        let out = transform(&content, ProtectionLevel::Standard, "key");
        let decoded = decode_artifact(&out.artifact).unwrap();
        prop_assert_eq!(decoded, content.as_bytes().to_vec());
    }

    #[test]
    fn transform_is_deterministic(content in ".{0,256}", key in "[0-9a-f]{64}") {
        let a = transform(&content, ProtectionLevel::Undetectable, &key);
        let b = transform(&content, ProtectionLevel::Undetectable, &key);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn sanitize_never_escapes_the_prefix(name in "\\PC{0,64}") {
        let clean = sanitize_file_name(&name);
        prop_assert!(!clean.is_empty());
        prop_assert!(!clean.contains('/') && !clean.contains('\\'));
        prop_assert!(!clean.starts_with('.'));
    }

    #[test]
    fn stored_name_fits_one_path_component(name in "\\PC{0,400}") {
        let clean = sanitize_file_name(&name);
        let component = format!("{}_{}", uuid::Uuid::new_v4(), clean);
        prop_assert!(clean.len() <= MAX_FILE_NAME_BYTES);
        prop_assert!(component.len() <= 255, "{} bytes", component.len());
    }
}
