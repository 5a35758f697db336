use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use blockdef::loader::Loader;
use codegen::{GeneratedArtifact, GenerationDiagnostic};

const TEST_SUFFIX: &str = ".test.toml";

/// What a fixture expects from generating its composition.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectations {
    /// Substrings that must all appear in the definition document.
    #[serde(default)]
    pub definition_contains: Vec<String>,

    #[serde(default)]
    pub body_contains: Vec<String>,

    #[serde(default)]
    pub declaration_contains: Vec<String>,

    /// Exact `"message0"` of the definition; empty when the key is expected absent.
    #[serde(default)]
    pub message: Option<String>,

    /// Expected load or generation error. The message must contain this substring.
    #[serde(default)]
    pub error: Option<String>,

    /// Expected warnings, in order, as message substrings.
    /// If present (even empty), the warning count is checked too.
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// The non-composition keys of a fixture. The `[[block]]` tables in the same
/// file are read by the composition loader.
#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub expect: Expectations,
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let source = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let config: TestConfig = match toml::from_str(&source) {
        Ok(config) => config,
        Err(e) => return fail(None, format!("fixture error: {}", e.message())),
    };
    let description = config.description.clone();

    let outcome = match check(&source, &config.expect) {
        Ok(()) => TestOutcome::Pass,
        Err(reason) => TestOutcome::Fail(reason),
    };
    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Load, generate and compare against `expect`. Returns the first mismatch.
fn check(source: &str, expect: &Expectations) -> Result<(), String> {
    let composition = match Loader::new(source.to_string(), 0).load() {
        Ok(composition) => composition,
        Err(errors) => {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            return expect_error(expect, &messages.join("; "), "load error");
        }
    };

    let (artifact, warnings) = match codegen::generate(&composition) {
        Ok(result) => result,
        Err(error) => return expect_error(expect, &error.to_string(), "generation error"),
    };

    if let Some(expected) = &expect.error {
        return Err(format!(
            "expected error containing \"{}\", but generation succeeded",
            expected
        ));
    }

    check_contains("definition", &artifact.definition, &expect.definition_contains)?;
    check_contains("declaration", &artifact.glue_declaration, &expect.declaration_contains)?;
    check_contains("body", &artifact.glue_body, &expect.body_contains)?;

    if let Some(expected) = &expect.message {
        let actual = message0(&artifact)?;
        if actual != *expected {
            return Err(format!(
                "message0 mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            ));
        }
    }

    if let Some(expected) = &expect.warnings {
        check_warnings(&warnings, expected)?;
    }
    Ok(())
}

fn expect_error(expect: &Expectations, actual: &str, what: &str) -> Result<(), String> {
    match &expect.error {
        Some(expected) if actual.contains(expected.as_str()) => Ok(()),
        Some(expected) => Err(format!(
            "expected error containing \"{}\", got: {}",
            expected, actual
        )),
        None => Err(format!("unexpected {}: {}", what, actual)),
    }
}

fn check_contains(part: &str, text: &str, expected: &[String]) -> Result<(), String> {
    match expected.iter().find(|needle| !text.contains(needle.as_str())) {
        None => Ok(()),
        Some(missing) => Err(format!(
            "{} does not contain {:?}\n  actual:\n{}",
            part,
            missing,
            codegen::template::prefix_lines(text, "    ")
        )),
    }
}

fn message0(artifact: &GeneratedArtifact) -> Result<String, String> {
    let document: serde_json::Value = serde_json::from_str(&artifact.definition)
        .map_err(|e| format!("definition is not valid JSON: {}", e))?;
    Ok(document
        .get("message0")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string())
}

/// Check that actual warnings match expectations.
fn check_warnings(warnings: &[GenerationDiagnostic], expected: &[String]) -> Result<(), String> {
    let actual: Vec<&GenerationDiagnostic> = warnings.iter().filter(|d| d.is_warning).collect();

    if actual.len() != expected.len() {
        let actual_msgs: Vec<String> = actual.iter().map(|w| format!("  - {}", w)).collect();
        return Err(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            actual.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected).enumerate() {
        let msg = actual.to_string();
        if !msg.contains(expected.as_str()) {
            return Err(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected, msg
            ));
        }
    }
    Ok(())
}

/// Discover fixtures grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(TEST_SUFFIX) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

/// Select the categories to run. Requesting `a` also selects `a/b`.
fn filter_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut filtered = BTreeMap::new();
    for request in requested {
        let req = request.trim_matches('/');
        let mut found = false;
        for (cat, files) in all {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                filtered.insert(cat.as_str(), files);
                found = true;
            }
        }
        if !found {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    filtered
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

fn label(result: &TestResult) -> &str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_suffix(TEST_SUFFIX))
            .unwrap_or("?")
    })
}

/// Run every fixture under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        // Single file mode ignores categories.
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        let selected: BTreeMap<String, Vec<PathBuf>> =
            filter_categories(&all_categories, categories)
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
        if selected.is_empty() {
            eprintln!("no matching categories found");
            return 1;
        }
        selected
    };

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", bold(header, no_color));
        }

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), label(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", fail_label(no_color), label(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        let ok = if no_color { "ok" } else { "\x1b[32mok\x1b[0m" };
        eprintln!("test result: {}. {} passed, 0 failed", ok, passed);
        0
    } else {
        let verdict = if no_color {
            "FAILED"
        } else {
            "\x1b[31mFAILED\x1b[0m"
        };
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            verdict,
            passed,
            failed,
            passed + failed
        );
        1
    }
}
