use clap::Parser;
use evader::cli::commands::{
    evaluate::{self, EvaluateArgs},
    inspect::{self, InspectArgs},
    train::{TrainArgs, execute},
};
use tempfile::tempdir;

fn parse_args<I, T>(args: I) -> TrainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TrainArgs::parse_from(args)
}

#[test]
fn train_writes_table_and_summary() {
    let tmp = tempdir().unwrap();
    let table = tmp.path().join("q_table.csv");
    let summary_stem = tmp.path().join("run_overview");

    let args = parse_args([
        "evader-train",
        "--width",
        "6",
        "--height",
        "6",
        "--episodes",
        "12",
        "--max-steps",
        "30",
        "--seed",
        "5",
        "--table",
        table.to_str().unwrap(),
        "--summary",
        summary_stem.to_str().unwrap(),
        "--no-progress",
    ]);

    execute(args).expect("training with summary should succeed");

    assert!(table.is_file(), "expected table at {}", table.display());
    let csv = std::fs::read_to_string(&table).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("state,action,q_value"));
    assert_eq!(lines.count(), 4 * 144);

    let expected_path = summary_stem.with_extension("json");
    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["training"]["total_episodes"], 12);
    assert_eq!(parsed["params"]["max_steps"], 30);
    assert_eq!(parsed["world"], "open 6x6 grid");
}

#[test]
fn summary_directory_argument_creates_default_file() {
    let tmp = tempdir().unwrap();
    let summary_dir = tmp.path().join("summaries");
    let summary_arg = format!("{}/", summary_dir.display());
    let table = tmp.path().join("q.csv");

    let args = parse_args([
        "evader-train",
        "--episodes",
        "3",
        "--max-steps",
        "10",
        "--table",
        table.to_str().unwrap(),
        "--summary",
        &summary_arg,
        "--no-progress",
    ]);

    execute(args).expect("training with directory summary should succeed");

    let expected_path = summary_dir.join("training_summary.json");
    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["training"]["total_episodes"], 3);
}

#[test]
fn train_on_map_file_then_evaluate_and_inspect() {
    let tmp = tempdir().unwrap();
    let map = tmp.path().join("arena.txt");
    std::fs::write(&map, ".....\n.#.#.\n.....\n.#.#.\n.....\n").unwrap();
    let table = tmp.path().join("q.csv");
    let observations = tmp.path().join("episodes.jsonl");

    execute(parse_args([
        "evader-train",
        "--map",
        map.to_str().unwrap(),
        "--episodes",
        "8",
        "--seed",
        "2",
        "--table",
        table.to_str().unwrap(),
        "--observations",
        observations.to_str().unwrap(),
        "--no-progress",
    ]))
    .unwrap();

    let jsonl = std::fs::read_to_string(&observations).unwrap();
    assert_eq!(jsonl.lines().count(), 8);

    let export = tmp.path().join("eval.json");
    evaluate::execute(EvaluateArgs::parse_from([
        "evader-evaluate",
        "--table",
        table.to_str().unwrap(),
        "--map",
        map.to_str().unwrap(),
        "--episodes",
        "4",
        "--seed",
        "1",
        "--export",
        export.to_str().unwrap(),
    ]))
    .unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(parsed["total_episodes"], 4);

    inspect::execute(InspectArgs::parse_from([
        "evader-inspect",
        "--table",
        table.to_str().unwrap(),
    ]))
    .unwrap();
}

#[test]
fn evaluate_requires_existing_table() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("nothing.csv");
    let result = evaluate::execute(EvaluateArgs::parse_from([
        "evader-evaluate",
        "--table",
        missing.to_str().unwrap(),
    ]));
    assert!(result.is_err());
}
