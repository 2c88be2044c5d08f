//! Unit tests for the subcommands.

use super::*;
use crate::config::LICENSE_KEY_VAR;
use crate::endpoints::Endpoints;
use crate::http::MockHttpTransport;
use mockall::Sequence;
use mockall::predicate::{always, function};
use rstest::{fixture, rstest};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

const KEY: &str = "AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE";

struct Harness {
    _dir: TempDir,
    config: ClientConfig,
}

#[fixture]
fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("create temp dir");
    let license_file = dir.path().join("licenseKey");
    fs::write(&license_file, format!("LICENSE_KEY={KEY}\n")).expect("write license file");
    let config = ClientConfig {
        endpoints: Endpoints {
            vendor_base: "https://vendor.test".to_owned(),
            identity_base: "https://identity.test/v3".to_owned(),
            identity_api_key: "api-key".to_owned(),
            direct_download_base: "https://downloads.test".to_owned(),
            product: "Product".to_owned(),
        },
        cache_dir: Some(dir.path().join("cache")),
        license_file: Some(license_file),
    };
    Harness { _dir: dir, config }
}

fn path_is(expected: &'static str) -> impl mockall::Predicate<url::Url> + Send {
    function(move |url: &url::Url| url.path() == expected)
}

/// Script a successful three-step handshake yielding session token `S`.
fn expect_handshake(transport: &mut MockHttpTransport, seq: &mut Sequence) {
    transport
        .expect_get_text()
        .with(path_is("/api/isLicenseKeyValid"))
        .times(1)
        .in_sequence(seq)
        .returning(|_| Ok("true".to_owned()));
    transport
        .expect_get_text()
        .with(path_is("/auth/licenseKey"))
        .times(1)
        .in_sequence(seq)
        .returning(|_| Ok(r#"{"token":"vendor"}"#.to_owned()));
    transport
        .expect_post_json()
        .with(path_is("/v3/verifyCustomToken"), always())
        .times(1)
        .in_sequence(seq)
        .returning(|_, _| Ok(r#"{"idToken":"S"}"#.to_owned()));
}

fn without_env_key<R>(f: impl FnOnce() -> R) -> R {
    temp_env::with_var_unset(LICENSE_KEY_VAR, f)
}

#[rstest]
#[case::valid("true", true)]
#[case::invalid("false", false)]
fn license_reports_validity(harness: Harness, #[case] body: &'static str, #[case] valid: bool) {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_get_text()
        .with(path_is("/api/isLicenseKeyValid"))
        .times(1)
        .returning(move |_| Ok(body.to_owned()));
    transport.expect_post_json().never();

    let result = without_env_key(|| CommandContext::new(&harness.config, &transport).license());
    if valid {
        assert!(result.is_ok());
    } else {
        assert!(matches!(result, Err(FetchError::LicenseRejected)));
    }
}

#[rstest]
fn missing_license_key_fails_before_any_request(mut harness: Harness) {
    let absent = harness.config.cache_dir().expect("cache dir").join("absent");
    harness.config.license_file = Some(absent);
    let mut transport = MockHttpTransport::new();
    transport.expect_get_text().never();
    transport.expect_post_json().never();
    transport.expect_open().never();

    let ctx = CommandContext::new(&harness.config, &transport);
    let mut stdout = Vec::new();
    let err = without_env_key(|| ctx.cur("stable", &mut stdout)).expect_err("no key");
    assert!(matches!(err, FetchError::MissingLicenseKey { .. }));
    assert!(stdout.is_empty());
}

#[rstest]
fn head_prints_only_the_commit_id(harness: Harness) {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_get_text()
        .with(path_is("/api/getReleaseNotes"))
        .times(1)
        .returning(|_| Ok(r#"{"commitId":"deadbeef"}"#.to_owned()));

    let mut stdout = Vec::new();
    CommandContext::new(&harness.config, &transport)
        .head(&mut stdout)
        .expect("head");
    assert_eq!(stdout, b"deadbeef\n");
}

#[test]
fn head_needs_no_platform_directories() {
    let config = ClientConfig {
        endpoints: Endpoints {
            vendor_base: "https://vendor.test".to_owned(),
            ..Endpoints::default()
        },
        cache_dir: None,
        license_file: None,
    };
    let mut transport = MockHttpTransport::new();
    transport
        .expect_get_text()
        .with(path_is("/api/getReleaseNotes"))
        .times(1)
        .returning(|_| Ok(r#"{"commitId":"deadbeef"}"#.to_owned()));

    let mut stdout = Vec::new();
    CommandContext::new(&config, &transport)
        .head(&mut stdout)
        .expect("head without home");
    assert_eq!(stdout, b"deadbeef\n");
}

#[rstest]
fn cur_prints_descriptor_json(harness: Harness) {
    let mut seq = Sequence::new();
    let mut transport = MockHttpTransport::new();
    expect_handshake(&mut transport, &mut seq);
    transport
        .expect_get_text()
        .with(function(|url: &url::Url| {
            url.path() == "/api/getDownloads"
                && url.query() == Some("channel=nightly&token=S")
        }))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Ok(r#"{"version":"0.5.1","shortCommitId":"c0ffee","notes":"x"}"#.to_owned())
        });

    let mut stdout = Vec::new();
    without_env_key(|| {
        CommandContext::new(&harness.config, &transport).cur("nightly", &mut stdout)
    })
    .expect("cur");

    let printed: serde_json::Value = serde_json::from_slice(&stdout).expect("JSON output");
    assert_eq!(printed["version"], "0.5.1");
    assert_eq!(printed["notes"], "x");
}

#[rstest]
fn cur_prints_answers_without_release_coordinates(harness: Harness) {
    let mut seq = Sequence::new();
    let mut transport = MockHttpTransport::new();
    expect_handshake(&mut transport, &mut seq);
    transport
        .expect_get_text()
        .with(path_is("/api/getDownloads"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(r#"{"message":"no builds for channel"}"#.to_owned()));

    let mut stdout = Vec::new();
    without_env_key(|| {
        CommandContext::new(&harness.config, &transport).cur("nightly", &mut stdout)
    })
    .expect("cur prints whatever the catalog answers");

    let printed: serde_json::Value = serde_json::from_slice(&stdout).expect("JSON output");
    assert_eq!(printed, serde_json::json!({"message": "no builds for channel"}));
}

#[rstest]
fn account_prints_first_user(harness: Harness) {
    let mut seq = Sequence::new();
    let mut transport = MockHttpTransport::new();
    expect_handshake(&mut transport, &mut seq);
    transport
        .expect_post_json()
        .with(path_is("/v3/getAccountInfo"), always())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(r#"{"users":[{"localId":"u1"},{"localId":"u2"}]}"#.to_owned()));

    let mut stdout = Vec::new();
    without_env_key(|| CommandContext::new(&harness.config, &transport).account(&mut stdout))
        .expect("account");

    let printed: serde_json::Value = serde_json::from_slice(&stdout).expect("JSON output");
    assert_eq!(printed, serde_json::json!({"localId": "u1"}));
}

#[rstest]
fn account_without_users_is_an_error(harness: Harness) {
    let mut seq = Sequence::new();
    let mut transport = MockHttpTransport::new();
    expect_handshake(&mut transport, &mut seq);
    transport
        .expect_post_json()
        .with(path_is("/v3/getAccountInfo"), always())
        .returning(|_, _| Ok(r#"{"users":[]}"#.to_owned()));

    let mut stdout = Vec::new();
    let err = without_env_key(|| {
        CommandContext::new(&harness.config, &transport).account(&mut stdout)
    })
    .expect_err("no users");
    assert!(matches!(err, FetchError::NoAccountRecords));
}

#[rstest]
fn download_authenticates_then_fetches(harness: Harness) {
    let mut seq = Sequence::new();
    let mut transport = MockHttpTransport::new();
    expect_handshake(&mut transport, &mut seq);
    transport
        .expect_get_text()
        .with(path_is("/api/getDownloads"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Ok(r#"{"version":"1.2.3","shortCommitId":"abc123",
                "artifacts":{"linux":{"tar":"https://x/y.tar.gz"}}}"#
                .to_owned())
        });
    transport
        .expect_open()
        .withf(|url| url.as_str() == "https://x/y.tar.gz")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(Box::new(Cursor::new(&b"archive"[..]))));

    let mut stderr = Vec::new();
    let outcome = without_env_key(|| {
        CommandContext::new(&harness.config, &transport).download("linux", "stable", &mut stderr)
    })
    .expect("download");

    let expected = harness
        .config
        .cache_dir()
        .expect("cache dir")
        .join("Product-linux-stable-1.2.3-abc123.tar.gz");
    assert_eq!(outcome, FetchOutcome::Downloaded { path: expected });
}

#[rstest]
#[case::blank_platform("", "stable")]
#[case::blank_branch("linux", "  ")]
fn download_validates_target_before_authenticating(
    harness: Harness,
    #[case] platform: &str,
    #[case] branch: &str,
) {
    let mut transport = MockHttpTransport::new();
    transport.expect_get_text().never();
    transport.expect_post_json().never();
    transport.expect_open().never();

    let err = without_env_key(|| {
        CommandContext::new(&harness.config, &transport).download(platform, branch, &mut Vec::new())
    })
    .expect_err("blank target");
    assert!(matches!(err, FetchError::MissingParameters { .. }));
}

#[rstest]
fn download_rejects_branch_with_path_separator_before_authenticating(harness: Harness) {
    let mut transport = MockHttpTransport::new();
    transport.expect_get_text().never();
    transport.expect_post_json().never();
    transport.expect_open().never();

    let err = without_env_key(|| {
        CommandContext::new(&harness.config, &transport).download("linux", "feature/x", &mut Vec::new())
    })
    .expect_err("unusable branch");
    assert!(matches!(err, FetchError::Naming(_)));
}

#[rstest]
fn env_key_takes_precedence_over_file(harness: Harness) {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_get_text()
        .with(function(|url: &url::Url| {
            url.query() == Some("licenseKey=FROM-ENV")
        }))
        .times(1)
        .returning(|_| Ok("true".to_owned()));

    let result = temp_env::with_var(LICENSE_KEY_VAR, Some("FROM-ENV"), || {
        CommandContext::new(&harness.config, &transport).license()
    });
    assert!(result.is_ok());
}
