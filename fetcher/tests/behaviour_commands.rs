//! Behaviour-driven tests for the oni-fetch subcommands.
//!
//! Each scenario parses a command line, runs it against a scripted transport
//! with a temporary config and cache, and checks stdout and the requests
//! that were issued.

use clap::Parser;
use oni_fetch::cli::Cli;
use oni_fetch::commands::CommandContext;
use oni_fetch::config::{ClientConfig, LICENSE_KEY_VAR};
use oni_fetch::error::FetchError;
use oni_fetch::test_utils::{
    ExpectedRequest, RecordedRequest, StubTransport, TEST_LICENSE_KEY, TEST_SESSION_TOKEN,
    handshake, release_notes, templated_descriptor, test_endpoints,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

struct CommandsWorld {
    // Keep the directory alive for the lifetime of the scenario.
    dir: TempDir,
    config: ClientConfig,
    scripted: Vec<ExpectedRequest>,
    requests: Vec<RecordedRequest>,
    stdout: Vec<u8>,
    result: Option<Result<(), FetchError>>,
}

#[fixture]
fn world() -> CommandsWorld {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = ClientConfig {
        endpoints: test_endpoints(),
        cache_dir: Some(dir.path().join("cache")),
        license_file: Some(dir.path().join("licenseKey")),
    };
    CommandsWorld {
        dir,
        config,
        scripted: Vec::new(),
        requests: Vec::new(),
        stdout: Vec::new(),
        result: None,
    }
}

fn stdout_json(world: &CommandsWorld) -> serde_json::Value {
    serde_json::from_slice(&world.stdout).expect("stdout is JSON")
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a license file with the test key")]
fn given_license_file(world: &mut CommandsWorld) {
    fs::write(
        world.config.license_file().expect("license file"),
        format!("# oni-fetch\nLICENSE_KEY={TEST_LICENSE_KEY}\n"),
    )
    .expect("write license file");
}

#[given("no license file")]
fn given_no_license_file(world: &mut CommandsWorld) {
    assert!(!world.config.license_file().expect("license file").exists());
}

#[given("the vendor reports the key as \"{validity}\"")]
fn given_validity(world: &mut CommandsWorld, validity: String) {
    world
        .scripted
        .push(ExpectedRequest::get("/api/isLicenseKeyValid", validity));
}

#[given("a successful handshake")]
fn given_handshake(world: &mut CommandsWorld) {
    world.scripted.extend(handshake());
}

#[given("the identity toolkit issues an empty session token")]
fn given_empty_session_token(world: &mut CommandsWorld) {
    world.scripted.extend([
        ExpectedRequest::get("/api/isLicenseKeyValid", "true"),
        ExpectedRequest::get("/auth/licenseKey", r#"{"token":"vendor-token"}"#),
        ExpectedRequest::post("/v3/verifyCustomToken", r#"{"idToken":""}"#),
    ]);
}

#[given("the release notes report commit \"{commit}\"")]
fn given_release_notes(world: &mut CommandsWorld, commit: String) {
    world
        .scripted
        .push(ExpectedRequest::get("/api/getReleaseNotes", release_notes(&commit)));
}

#[given("the catalog lists version \"{version}\" commit \"{commit}\"")]
fn given_catalog(world: &mut CommandsWorld, version: String, commit: String) {
    world.scripted.push(ExpectedRequest::get(
        "/api/getDownloads",
        templated_descriptor(&version, &commit),
    ));
}

#[given("the account has users \"{first}\" and \"{second}\"")]
fn given_account_users(world: &mut CommandsWorld, first: String, second: String) {
    let body = serde_json::json!({ "users": [{ "email": first }, { "email": second }] });
    world.scripted.push(ExpectedRequest::post(
        "/v3/getAccountInfo",
        body.to_string(),
    ));
}

#[given("the server serves the \"{platform}\" archive")]
fn given_archive(world: &mut CommandsWorld, platform: String) {
    world.scripted.push(ExpectedRequest::open(
        &format!("/Product-{platform}.tar.gz"),
        b"archive bytes",
    ));
}

#[when("oni-fetch runs \"{args}\"")]
fn when_runs(world: &mut CommandsWorld, args: String) {
    let argv = std::iter::once("oni-fetch").chain(args.split_whitespace());
    let cli = Cli::try_parse_from(argv).expect("valid command line");
    let transport = StubTransport::new(std::mem::take(&mut world.scripted));

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let result = temp_env::with_var_unset(LICENSE_KEY_VAR, || {
        CommandContext::new(&world.config, &transport).run(&cli, &mut stdout, &mut stderr)
    });
    if result.is_ok() {
        transport.assert_finished();
    }

    world.requests = transport.requests();
    world.stdout = stdout;
    world.result = Some(result);
}

#[then("the command succeeds")]
fn then_succeeds(world: &mut CommandsWorld) {
    let result = world.result.as_ref().expect("command ran");
    assert!(result.is_ok(), "unexpected error: {result:?}");
}

#[then("the command fails with \"{message}\"")]
fn then_fails_with(world: &mut CommandsWorld, message: String) {
    let result = world.result.as_ref().expect("command ran");
    let err = result.as_ref().expect_err("command should fail");
    assert!(
        err.to_string().contains(&message),
        "error `{err}` does not mention `{message}`"
    );
}

#[then("stdout is exactly \"{text}\"")]
fn then_stdout_exactly(world: &mut CommandsWorld, text: String) {
    assert_eq!(String::from_utf8_lossy(&world.stdout), format!("{text}\n"));
}

#[then("stdout is JSON with \"{field}\" equal to \"{value}\"")]
fn then_stdout_json_field(world: &mut CommandsWorld, field: String, value: String) {
    let json = stdout_json(world);
    assert_eq!(json[field.as_str()], serde_json::Value::String(value));
}

#[then("no request was made")]
fn then_no_request(world: &mut CommandsWorld) {
    assert!(world.requests.is_empty(), "requests: {:?}", world.requests);
}

#[then("the license key was sent to the vendor")]
fn then_license_key_sent(world: &mut CommandsWorld) {
    let request = world.requests.first().expect("validity request");
    let key = request
        .url
        .query_pairs()
        .find(|(name, _)| name == "licenseKey")
        .map(|(_, value)| value.into_owned());
    assert_eq!(key.as_deref(), Some(TEST_LICENSE_KEY));
}

#[then("the catalog was queried for branch \"{branch}\"")]
fn then_catalog_branch(world: &mut CommandsWorld, branch: String) {
    let request = world
        .requests
        .iter()
        .find(|request| request.url.path() == "/api/getDownloads")
        .expect("downloads request");
    let pairs: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("channel".to_owned(), branch),
            ("token".to_owned(), TEST_SESSION_TOKEN.to_owned()),
        ]
    );
}

#[then("the cache contains \"{name}\"")]
fn then_cache_contains(world: &mut CommandsWorld, name: String) {
    let path = world.config.cache_dir().expect("cache dir").join(&name);
    assert!(path.is_file(), "{} missing", path.display());
    assert!(path.starts_with(world.dir.path()));
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/commands.feature",
    name = "head prints only the commit id"
)]
fn scenario_head(world: CommandsWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/commands.feature",
    name = "license succeeds for an accepted key"
)]
fn scenario_license_accepted(world: CommandsWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/commands.feature",
    name = "license fails for a rejected key"
)]
fn scenario_license_rejected(world: CommandsWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/commands.feature",
    name = "A missing license key fails before any request"
)]
fn scenario_missing_license_key(world: CommandsWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/commands.feature",
    name = "cur prints the descriptor for the branch"
)]
fn scenario_cur(world: CommandsWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/commands.feature",
    name = "account prints the first user record"
)]
fn scenario_account(world: CommandsWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/commands.feature",
    name = "download fetches the archive into the cache"
)]
fn scenario_download(world: CommandsWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/commands.feature",
    name = "download with a blank platform fails before any request"
)]
fn scenario_download_blank_platform(world: CommandsWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/commands.feature",
    name = "An empty session token fails authentication"
)]
fn scenario_empty_session_token(world: CommandsWorld) {
    let _ = world;
}
