//! End-to-end integration tests for wkpdf.
//!
//! A real wkhtmltopdf install is heavyweight and absent from CI, so these
//! tests drive the full subprocess path — spawn, stdin feed, stream drain,
//! classification, metadata rewrite, pool admission — against small stub
//! executables (shell scripts) standing in for the binary. Everything here
//! is hermetic and runs in milliseconds.
//!
//! Unix-only: the stubs are `#!/bin/sh` scripts made executable via chmod.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wkpdf::{generate_pdf, PdfConfig, PdfPool, WkPdfError};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Write an executable shell script into `dir` and return its path.
fn stub(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, script).expect("write stub script");
    let mut perms = fs::metadata(&path).expect("stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub");
    path
}

/// A stub that drains stdin and prints a minimal valid-looking PDF.
const STUB_OK: &str = "#!/bin/sh\ncat >/dev/null\nprintf '%s' '%PDF-1.4 stub output'\n";

/// A stub that produces a PDF but exits nonzero, like the real tool does
/// when a subresource fails to load.
const STUB_FLAKY_EXIT: &str =
    "#!/bin/sh\ncat >/dev/null\nprintf '%s' '%PDF-1.4 despite exit code'\nexit 7\n";

/// A stub that fails outright: progress noise on stdout, a diagnostic on
/// stderr, nonzero exit.
const STUB_BROKEN: &str = "#!/bin/sh\n\
cat >/dev/null\n\
echo 'Loading pages (1/6)'\n\
echo '  ContentNotFoundError while loading body' >&2\n\
exit 1\n";

/// A stub that echoes its arguments back inside a PDF-signed payload, one
/// per line, so tests can assert on the exact command line it received.
const STUB_ECHO_ARGS: &str = "#!/bin/sh\n\
cat >/dev/null\n\
printf '%s' '%PDF-1.4'\n\
printf '\\n%s' \"$@\"\n";

/// A stub whose output carries the Info-dictionary anchor the metadata
/// rewriter looks for.
const STUB_WITH_INFO: &str = "#!/bin/sh\n\
cat >/dev/null\n\
printf '%s\\n' '%PDF-1.4' '1 0 obj' '/Title (stub)' '/Creator (wkhtmltopdf 0.12.6)' '/Producer (Qt 4.8.7)' 'endobj'\n";

/// A stub that embeds whatever arrived on stdin into its output.
const STUB_ECHO_STDIN: &str = "#!/bin/sh\n\
html=$(cat)\n\
printf '%s' '%PDF-1.4 rendered: '\n\
printf '%s' \"$html\"\n";

fn args_of(pdf: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(pdf)
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

// ── Classification through the real subprocess path ──────────────────────────

#[test]
fn clean_exit_succeeds() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-ok", STUB_OK);

    let config = PdfConfig::builder().binary(&bin).build();
    let pdf = generate_pdf("<h1>hi</h1>", &config).expect("stub conversion succeeds");
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn nonzero_exit_with_pdf_signature_succeeds() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-flaky", STUB_FLAKY_EXIT);

    let config = PdfConfig::builder().binary(&bin).build();
    let pdf = generate_pdf("<h1>hi</h1>", &config).expect("signature overrides exit code");
    assert_eq!(pdf, b"%PDF-1.4 despite exit code");
}

#[test]
fn nonzero_exit_without_signature_fails_with_diagnostics() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-broken", STUB_BROKEN);

    let config = PdfConfig::builder()
        .binary(&bin)
        .grayscale(true)
        .build();
    let err = generate_pdf("<h1>hi</h1>", &config).unwrap_err();
    match err {
        WkPdfError::GenerationFailed { command, stderr } => {
            assert_eq!(command[0], bin.display().to_string());
            assert!(command.contains(&"--grayscale".to_string()), "{command:?}");
            assert_eq!(&command[command.len() - 2..], ["-", "-"]);
            assert_eq!(stderr, "ContentNotFoundError while loading body");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_binary_reports_spawn_failure() {
    let config = PdfConfig::builder()
        .binary("/definitely/not/a/real/wkhtmltopdf")
        .build();
    let err = generate_pdf("<h1>hi</h1>", &config).unwrap_err();
    assert!(matches!(err, WkPdfError::SpawnFailed { .. }), "got: {err}");
}

// ── Input handling ────────────────────────────────────────────────────────────

#[test]
fn html_is_fed_to_the_child_stdin() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-echo-stdin", STUB_ECHO_STDIN);

    let config = PdfConfig::builder().binary(&bin).build();
    let pdf = generate_pdf("<p>round trip 42</p>", &config).unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("<p>round trip 42</p>"), "got: {text}");
}

#[test]
fn url_input_fails_before_any_spawn() {
    // The "binary" is a directory: spawning it would yield SpawnFailed, so
    // getting UrlInput proves nothing was spawned.
    let tmp = TempDir::new().unwrap();
    let config = PdfConfig::builder().binary(tmp.path()).build();
    let err = generate_pdf("  http://example.com", &config).unwrap_err();
    assert!(matches!(err, WkPdfError::UrlInput { .. }), "got: {err}");
}

#[test]
fn rendered_command_line_matches_the_config() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-echo-args", STUB_ECHO_ARGS);

    let config = PdfConfig::builder()
        .binary(&bin)
        .grayscale(true)
        .page_size("A4")
        .margin_top("10mm")
        .flag("quiet")
        .option("zoom", "1.25")
        .build();
    let pdf = generate_pdf("<h1>hi</h1>", &config).unwrap();
    assert_eq!(
        args_of(&pdf),
        vec![
            "--grayscale",
            "--margin-top",
            "10mm",
            "--page-size",
            "A4",
            "--quiet",
            "--zoom",
            "1.25",
            "-",
            "-"
        ]
    );
}

// ── Metadata rewrite through the subprocess path ─────────────────────────────

#[test]
fn metadata_block_is_rewritten_in_the_output() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-info", STUB_WITH_INFO);

    let config = PdfConfig::builder()
        .binary(&bin)
        .title("Quarterly Numbers")
        .author("Finance")
        .producer("wkpdf")
        .build();
    let pdf = generate_pdf("<h1>hi</h1>", &config).unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert!(
        text.contains("/Title (Quarterly Numbers)\n/Author (Finance)\n/Producer (wkpdf)"),
        "got: {text}"
    );
    assert!(!text.contains("/Title (stub)"));
    // Untouched parts of the document survive.
    assert!(text.starts_with("%PDF-1.4\n1 0 obj\n"));
    assert!(text.contains("endobj"));
}

#[test]
fn output_without_info_anchor_is_passed_through() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-ok", STUB_OK);

    let config = PdfConfig::builder().binary(&bin).title("ignored").build();
    let pdf = generate_pdf("<h1>hi</h1>", &config).unwrap();
    assert_eq!(pdf, b"%PDF-1.4 stub output");
}

// ── Pool behaviour ────────────────────────────────────────────────────────────

/// Stub that counts how many instances of itself are alive when it starts,
/// recording each sample, then lingers long enough for overlap to show.
fn concurrency_stub(dir: &Path, track_dir: &Path) -> PathBuf {
    let script = format!(
        "#!/bin/sh\n\
cat >/dev/null\n\
d='{track}'\n\
touch \"$d/active.$$\"\n\
n=$(ls \"$d\" | grep -c '^active\\.')\n\
echo \"$n\" >> \"$d/samples\"\n\
sleep 0.3\n\
rm -f \"$d/active.$$\"\n\
printf '%s' '%PDF-1.4 ok'\n",
        track = track_dir.display()
    );
    stub(dir, "wk-concurrent", &script)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pool_never_exceeds_its_ceiling() {
    let tmp = TempDir::new().unwrap();
    let track = tmp.path().join("track");
    fs::create_dir(&track).unwrap();
    let bin = concurrency_stub(tmp.path(), &track);

    let pool = PdfPool::builder()
        .max_processes(2)
        .cache_dir(tmp.path().join("cache"))
        .binary(&bin)
        .build()
        .unwrap();

    let config = PdfConfig::default();
    let jobs: Vec<(&str, &PdfConfig)> = (0..5).map(|_| ("<p>x</p>", &config)).collect();
    let results = pool.generate_many(jobs).await;

    assert_eq!(results.len(), 5);
    for r in &results {
        assert!(r.is_ok(), "job failed: {r:?}");
    }

    let samples = fs::read_to_string(track.join("samples")).unwrap();
    let counts: Vec<usize> = samples
        .lines()
        .map(|l| l.trim().parse().unwrap())
        .collect();
    assert_eq!(counts.len(), 5, "every child must have sampled once");
    let peak = counts.iter().copied().max().unwrap();
    assert!(
        peak <= 2,
        "pool ceiling exceeded: {peak} concurrent children (samples: {counts:?})"
    );
    // With 5 jobs, a 2-slot pool and a 300 ms child, slots must actually be
    // reused: at least one child has to observe a sibling.
    assert!(
        counts.iter().any(|&c| c == 2),
        "expected overlap under a full pool (samples: {counts:?})"
    );
}

#[tokio::test]
async fn pool_injects_its_cache_dir_unless_overridden() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-echo-args", STUB_ECHO_ARGS);
    let cache = tmp.path().join("cache");

    let pool = PdfPool::builder()
        .max_processes(1)
        .cache_dir(&cache)
        .binary(&bin)
        .build()
        .unwrap();
    assert!(cache.is_dir(), "pool construction creates the cache dir");

    let pdf = pool
        .generate_pdf("<p>x</p>", &PdfConfig::default())
        .await
        .unwrap();
    let args = args_of(&pdf);
    assert_eq!(args[0], "--cache-dir");
    assert_eq!(args[1], cache.display().to_string());

    // A caller-supplied cache dir wins.
    let config = PdfConfig::builder().cache_dir("/caller/cache").build();
    let pdf = pool.generate_pdf("<p>x</p>", &config).await.unwrap();
    let args = args_of(&pdf);
    assert_eq!(args[..2], ["--cache-dir", "/caller/cache"]);
}

#[tokio::test]
async fn generate_many_keeps_input_order() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-echo-args", STUB_ECHO_ARGS);

    let pool = PdfPool::builder()
        .max_processes(3)
        .cache_dir(tmp.path().join("cache"))
        .binary(&bin)
        .build()
        .unwrap();

    let configs: Vec<PdfConfig> = ["A4", "Letter", "A5"]
        .iter()
        .map(|size| PdfConfig::builder().page_size(*size).build())
        .collect();
    let jobs: Vec<(&str, &PdfConfig)> =
        configs.iter().map(|c| ("<p>x</p>", c)).collect();

    let results = pool.generate_many(jobs).await;
    assert_eq!(results.len(), 3);
    for (result, expected) in results.iter().zip(["A4", "Letter", "A5"]) {
        let args = args_of(result.as_ref().unwrap());
        assert!(
            args.contains(&expected.to_string()),
            "result out of order: wanted {expected}, got {args:?}"
        );
    }
}

#[tokio::test]
async fn pool_failure_releases_its_slot() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-broken", STUB_BROKEN);

    let pool = PdfPool::builder()
        .max_processes(1)
        .cache_dir(tmp.path().join("cache"))
        .binary(&bin)
        .build()
        .unwrap();

    let config = PdfConfig::default();
    for _ in 0..3 {
        let err = pool.generate_pdf("<p>x</p>", &config).await.unwrap_err();
        assert!(matches!(err, WkPdfError::GenerationFailed { .. }));
    }
    // Three sequential failures through a single slot: the permit was
    // released each time or the second call would have hung forever.
}

// ── Binary queries ────────────────────────────────────────────────────────────

/// Version/help stub answering the query flags like the real binary.
const STUB_QUERIES: &str = "#!/bin/sh\n\
case \"$1\" in\n\
  -V) printf '%s\\n' 'wkhtmltopdf 0.12.6 (with patched qt)';;\n\
  -h) printf '%s\\n' '  Usage: wkhtmltopdf [OPTIONS]... <input> <output>  ';;\n\
  -H) printf '%s\\n' 'extended help text';;\n\
esac\n";

#[test]
fn binary_queries_follow_the_env_override() {
    let tmp = TempDir::new().unwrap();
    let bin = stub(tmp.path(), "wk-queries", STUB_QUERIES);

    // All other tests override the binary per-config, so this is the only
    // test touching the process-wide variable; keep every env-dependent
    // assertion in this one function.
    std::env::set_var("WKHTMLTOPDF_BIN", &bin);

    let version = wkpdf::get_version();
    assert!(version.contains("wkpdf version: "), "got: {version}");
    assert!(
        version.contains("wkhtmltopdf version: wkhtmltopdf 0.12.6 (with patched qt)"),
        "got: {version}"
    );

    let help = wkpdf::get_help().unwrap();
    assert_eq!(help, "Usage: wkhtmltopdf [OPTIONS]... <input> <output>");

    let extended = wkpdf::get_extended_help().unwrap();
    assert_eq!(extended, "extended help text");

    std::env::remove_var("WKHTMLTOPDF_BIN");
}
