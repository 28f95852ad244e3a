//! Architecture contract tests.

mod harness;

use harness::architecture::{find_logic_in_mod_files, find_production_lines_containing};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_production_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "reqwest::",
            "diesel::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_production_lines_containing(
        "src/port",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "reqwest::",
            "diesel::",
        ],
    );

    assert!(hits.is_empty(), "ports must not import outer layers: {hits:#?}");
}

#[test]
fn application_layer_has_no_direct_adapter_imports() {
    let hits = find_production_lines_containing("src/application", &["crate::adapter::"]);
    assert!(
        hits.is_empty(),
        "application layer should not import adapters directly: {hits:#?}"
    );
}

#[test]
fn wire_formats_stay_in_adapters() {
    let hits = find_production_lines_containing("src/application", &["reqwest::", "diesel::"]);
    assert!(
        hits.is_empty(),
        "application layer should not talk HTTP or SQL: {hits:#?}"
    );
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_logic_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}
