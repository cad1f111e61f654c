//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

/// Product and version every fixture feature lives in
pub const PRODUCT: &str = "Living";
pub const VERSION: &str = "1.0";

/// Run the trellis binary in `dir` with plain, uncolored output.
pub fn run_trellis_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trellis"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("TRELLIS_ASCII", "1")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute trellis binary")
}

/// Stdout of a run that must succeed.
pub fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// One feature line for `features.jsonl`.
pub fn feature_line(title: &str, signatures: &[&str]) -> String {
    serde_json::json!({
        "product": PRODUCT,
        "group": "",
        "title": title,
        "version": VERSION,
        "direct_invocation_signatures": signatures,
    })
    .to_string()
}

/// One ledger line for `invocations.jsonl`.
pub fn invocation_line(signature: &str, invoked: &[&str]) -> String {
    serde_json::json!({
        "product": PRODUCT,
        "version": VERSION,
        "signature": signature,
        "invoked_signatures": invoked,
    })
    .to_string()
}

/// Write the data files of an initialized repository rooted at `dir`.
pub fn write_data(dir: &Path, features: &[String], invocations: &[String]) {
    let trellis_dir = dir.join(".trellis");
    std::fs::write(trellis_dir.join("features.jsonl"), features.join("\n") + "\n")
        .expect("Failed to write features");
    std::fs::write(
        trellis_dir.join("invocations.jsonl"),
        invocations.join("\n") + "\n",
    )
    .expect("Failed to write invocations");
}

/// The four-feature catalog: Calling -> Called -> AnotherCalled, with
/// Unlinked declaring nothing.
pub fn scenario_features() -> Vec<String> {
    vec![
        feature_line("CallingFeature", &["Foo()"]),
        feature_line("CalledFeature", &["Bar()"]),
        feature_line("UnlinkedFeature", &[]),
        feature_line("AnotherCalledFeature", &["JuiceBar()"]),
    ]
}

/// Ledger for [`scenario_features`]; `cyclic` adds `JuiceBar() -> Bar()`.
pub fn scenario_invocations(cyclic: bool) -> Vec<String> {
    let mut lines = vec![
        invocation_line("Foo()", &["Foo(string)", "Bar()"]),
        invocation_line("Bar()", &["JuiceBar()"]),
    ];
    if cyclic {
        lines.push(invocation_line("JuiceBar()", &["Bar()"]));
    }
    lines
}
