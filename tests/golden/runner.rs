use doctoc_common::options::TocOptions;
use doctoc_common::toc::generate;
use doctoc_common::toc::id::IdGenerator;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct GoldenCase {
    name: String,
    options: TocOptions,
    input: String,
    output: String,
    tree: Value,
}

#[test]
fn toc_golden_cases() {
    let cases_dir = golden_cases_dir();
    let cases = load_cases(&cases_dir);

    assert!(!cases.is_empty(), "no golden cases found in {}", cases_dir.display());

    let mut failures = Vec::new();
    for case in cases {
        if let Err(message) = run_case(&case) {
            failures.push(message);
        }
    }

    if !failures.is_empty() {
        panic!("{} golden case(s) failed:\n\n{}", failures.len(), failures.join("\n\n"));
    }
}

fn golden_cases_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/golden/cases")
}

fn load_cases(cases_dir: &Path) -> Vec<GoldenCase> {
    let mut case_dirs: Vec<PathBuf> = fs::read_dir(cases_dir)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", cases_dir.display()))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.is_dir() {
                Some(path)
            } else {
                None
            }
        })
        .collect();
    case_dirs.sort();
    case_dirs.into_iter().map(load_case).collect()
}

fn load_case(case_dir: PathBuf) -> GoldenCase {
    let name = case_dir
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("<unnamed-case>")
        .to_owned();

    let options_path = case_dir.join("options.json");
    let options = if options_path.exists() {
        serde_json::from_str::<TocOptions>(&read_required(&options_path)).unwrap_or_else(
            |error| panic!("failed to parse options in {}: {error}", options_path.display()),
        )
    } else {
        TocOptions::default()
    };

    let tree_path = case_dir.join("tree.json");
    let tree = serde_json::from_str::<Value>(&read_required(&tree_path)).unwrap_or_else(|error| {
        panic!("failed to parse expected tree in {}: {error}", tree_path.display())
    });

    GoldenCase {
        name,
        options,
        input: read_required(&case_dir.join("input.html")),
        output: read_required(&case_dir.join("output.html")),
        tree,
    }
}

fn run_case(case: &GoldenCase) -> Result<(), String> {
    case.options.validate().map_err(|error| format!("case `{}` options: {error}", case.name))?;

    let mut ids = IdGenerator::from_options(&case.options);
    let toc = generate(&case.input, &case.options, &mut ids)
        .map_err(|error| format!("case `{}` failed: {error}", case.name))?;

    let actual_output = toc.contents.as_deref().unwrap_or(&case.input);
    if actual_output != case.output {
        return Err(format!(
            "case `{}` output mismatch.\nexpected: {:?}\nactual:   {:?}",
            case.name, case.output, actual_output
        ));
    }

    let actual_tree = serde_json::to_value(&toc.tree)
        .map_err(|error| format!("case `{}` tree serialization: {error}", case.name))?;
    if actual_tree != case.tree {
        return Err(format!(
            "case `{}` tree mismatch.\nexpected:\n{}\nactual:\n{}",
            case.name,
            render(&case.tree),
            render(&actual_tree)
        ));
    }

    Ok(())
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn read_required(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", path.display()))
}
