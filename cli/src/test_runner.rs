use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use regimen::parser::{ParseError, ParseOptions, Parser};
use regimen::registry::DuplicatePolicy;
use tally::Totals;

const TEST_SUFFIX: &str = ".test.regimen";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Parse with `DuplicatePolicy::Replace`.
    #[serde(default)]
    pub allow_redefinition: bool,

    /// Expected totals by regime name. Regimes not listed must total zero.
    #[serde(default)]
    pub expect_totals: Option<BTreeMap<String, u64>>,

    /// Expected aggregation error: its Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// If true, at least one line must fail to parse.
    #[serde(default)]
    pub expect_parse_error: bool,

    /// Expected warnings. If present (even empty), warning count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

/// Split a fixture into its TOML config and the regimen source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    if !content.starts_with("---") {
        return Err("missing opening --- frontmatter delimiter".into());
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
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

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };
    let description = config.description.clone();

    match check(&config, source) {
        Some(reason) => fail(description, reason),
        None => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
    }
}

/// Run one fixture. Returns `Some(reason)` on failure.
fn check(config: &TestConfig, source: &str) -> Option<String> {
    let options = ParseOptions {
        duplicates: if config.allow_redefinition {
            DuplicatePolicy::Replace
        } else {
            DuplicatePolicy::Reject
        },
    };
    let parsed = Parser::new(source.to_string(), 0).with_options(options).parse();

    if config.expect_parse_error {
        return if parsed.has_errors() {
            None
        } else {
            Some("expected parse error, but parsing succeeded".into())
        };
    }
    if parsed.has_errors() {
        let msgs: Vec<String> = parsed.errors().map(|e| e.message.clone()).collect();
        return Some(format!("unexpected parse error: {}", msgs.join("; ")));
    }

    if let Some(expected) = &config.expect_warnings {
        let warnings: Vec<&ParseError> = parsed.warnings().collect();
        if let Some(reason) = check_warnings(source, &warnings, expected) {
            return Some(reason);
        }
    }

    match (&config.expect_error, tally::summarize(&parsed.catalog)) {
        (Some(expected_err), Err(err)) => {
            let err_str = err.to_string();
            if err_str.contains(expected_err.as_str()) {
                None
            } else {
                Some(format!(
                    "expected error containing \"{}\", got: {}",
                    expected_err, err_str
                ))
            }
        }
        (Some(expected_err), Ok(_)) => Some(format!(
            "expected error containing \"{}\", but counting succeeded",
            expected_err
        )),
        (None, Err(err)) => Some(format!("unexpected error: {}", err)),
        (None, Ok(totals)) => config
            .expect_totals
            .as_ref()
            .and_then(|expected| check_totals(&totals, expected)),
    }
}

fn check_totals(actual: &Totals, expected: &BTreeMap<String, u64>) -> Option<String> {
    let mut mismatches = Vec::new();
    for name in expected.keys() {
        if !actual.iter().any(|(n, _)| n == name.as_str()) {
            mismatches.push(format!("  {}: not a regime", name));
        }
    }
    for (name, count) in actual.iter() {
        let want = expected.get(name).copied().unwrap_or(0);
        if want != count {
            mismatches.push(format!("  {}: expected {}, got {}", name, want, count));
        }
    }
    if mismatches.is_empty() {
        None
    } else {
        Some(format!("totals mismatch\n{}", mismatches.join("\n")))
    }
}

/// Convert a byte offset in `source` to a 1-based line number.
fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

/// Check that actual warnings match expectations. Returns `Some(reason)` on mismatch.
fn check_warnings(
    source: &str,
    warnings: &[&ParseError],
    expected: &[ExpectedWarning],
) -> Option<String> {
    if warnings.len() != expected.len() {
        let actual_msgs: Vec<String> = warnings.iter().map(|w| format!("  - {}", w)).collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            warnings.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in warnings.iter().zip(expected.iter()).enumerate() {
        let msg = actual.to_string();
        if !msg.contains(&expected.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, msg
            ));
        }
        if let Some(expected_line) = expected.line {
            let actual_line = byte_offset_to_line(source, actual.span.start);
            if actual_line != expected_line {
                return Some(format!(
                    "warning[{}]: expected on line {}, but span is on line {}",
                    i, expected_line, actual_line
                ));
            }
        }
    }

    None
}

/// Fixture files grouped by the folder they live in, relative to `root`.
/// A single file is its own root-level group.
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    if root.is_file() {
        groups.entry(String::new()).or_default().push(root.to_path_buf());
        return groups;
    }
    walk(root, root, &mut groups);
    for files in groups.values_mut() {
        files.sort();
    }
    groups
}

fn walk(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            walk(&path, root, out);
            continue;
        }
        let is_fixture = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(TEST_SUFFIX));
        if is_fixture {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let groups = discover(path);
    if groups.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &groups {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

/// ANSI styling for the summary, or none with `--no-color`.
struct Palette {
    color: bool,
}

impl Palette {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

/// Keep the groups named in `wanted` (a name also selects its subfolders).
fn select<'a>(
    groups: &'a BTreeMap<String, Vec<PathBuf>>,
    wanted: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    if wanted.is_empty() {
        return groups.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect();
    }
    let mut selected = BTreeMap::new();
    for requested in wanted {
        let req = requested.trim_matches('/');
        let prefix = format!("{}/", req);
        let before = selected.len();
        for (category, files) in groups {
            if category == req || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files.as_slice());
            }
        }
        if selected.len() == before {
            let available: Vec<&str> = groups.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                available.join(", ")
            );
        }
    }
    selected
}

/// Run every fixture under `path` (or the single file `path`).
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let palette = Palette { color: !no_color };
    let groups = discover(path);
    if groups.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return 1;
    }
    let selected = select(&groups, categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (category, files) in &selected {
        eprintln!();
        eprintln!("{}", palette.bold(category_label(category)));
        for file in files.iter() {
            let result = run_single_test(file);
            let label = result
                .description
                .clone()
                .or_else(|| file.file_name().and_then(|s| s.to_str()).map(str::to_string))
                .unwrap_or_else(|| "?".to_string());
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", palette.pass(), label);
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", palette.fail(), label);
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", palette.paint("32", "ok"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            palette.paint("31", "FAILED"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
