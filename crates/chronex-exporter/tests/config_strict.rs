#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chronex_core::error::ErrorCode;
use chronex_exporter::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
upstream:
  uri: "http://chronos.mesos:4400"
  timeout: 5000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.exporter.listen, "0.0.0.0:9044");
    assert_eq!(cfg.exporter.telemetry_path, "/metrics");
    assert_eq!(cfg.exporter.namespace, "chronos");
    assert_eq!(cfg.upstream.uri, "http://chronos.mesos:4400");
    assert_eq!(cfg.upstream.timeout_ms, 10000);
    assert!(cfg.upstream.insecure_skip_verify);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
exporter:
  listen: "127.0.0.1:9100"
  telemetry_path: "/prom"
  namespace: "jobs"
upstream:
  uri: "https://chronos.example:4400/"
  metrics_path: "/v1/metrics"
  ping_path: "/v1/ping"
  timeout_ms: 2000
  retry_interval_ms: 500
  insecure_skip_verify: false
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.exporter.telemetry_path, "/prom");
    assert_eq!(
        cfg.upstream.url(&cfg.upstream.metrics_path),
        "https://chronos.example:4400/v1/metrics"
    );
    assert!(!cfg.upstream.insecure_skip_verify);
}

#[test]
fn rejects_out_of_range_values() {
    let cases = [
        "version: 2\n",
        "version: 1\nupstream:\n  timeout_ms: 5\n",
        "version: 1\nupstream:\n  retry_interval_ms: 9999999\n",
        "version: 1\nupstream:\n  uri: \"chronos.mesos:4400\"\n",
        "version: 1\nexporter:\n  telemetry_path: \"metrics\"\n",
        "version: 1\nexporter:\n  telemetry_path: \"/healthz\"\n",
        "version: 1\nexporter:\n  namespace: \"bad-ns\"\n",
    ];
    for case in cases {
        let err = config::load_from_str(case).expect_err(case);
        assert_eq!(err.code(), ErrorCode::BadConfig, "{case}");
    }
}

#[test]
fn missing_file_uses_defaults() {
    let cfg = config::load_from_file("does/not/exist.yaml").expect("defaults");
    assert_eq!(cfg.exporter.listen, "0.0.0.0:9044");
}
