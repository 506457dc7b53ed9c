use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use vtree::{SourceNode, TreeConfig, VirtualTree, search::search};

use crate::error::{HarnessError, Result};
use crate::render::{Guides, render_window};
use crate::script::{RecordingHost, parse_script, replay};

#[derive(Debug, Parser)]
#[command(
    name = "vtree",
    about = "Render, search, and replay sessions over JSON forests with the vtree engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the visible rows of a forest.
    Render(RenderArgs),

    /// Print the ids matching a path pattern.
    Search(SearchArgs),

    /// Replay a JSON session script and print host events as JSON lines.
    Replay(ReplayArgs),

    /// Validate a TOML or JSON config file.
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// JSON file holding an array of `{id, name, children}` nodes.
    pub forest: PathBuf,

    /// Collapse these ids before rendering.
    #[arg(long = "collapse", value_name = "ID")]
    pub collapse: Vec<String>,

    /// Collapse every internal node first.
    #[arg(long)]
    pub collapse_all: bool,

    /// Apply a search pattern (marks matches, expands everything).
    #[arg(long)]
    pub pattern: Option<String>,

    /// First displayed row.
    #[arg(long, default_value_t = 0)]
    pub first: usize,

    /// Last displayed row (inclusive); defaults to the end.
    #[arg(long)]
    pub last: Option<usize>,

    #[arg(long, value_enum, default_value_t = Guides::Unicode)]
    pub guides: Guides,

    /// TOML or JSON engine config.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub forest: PathBuf,

    pub pattern: String,

    #[arg(long, short = 'i')]
    pub ignore_case: bool,

    /// Segment delimiter (overrides config).
    #[arg(long)]
    pub delimiter: Option<char>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print a JSON object instead of one id per line.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    pub forest: PathBuf,

    /// JSON array of steps.
    pub script: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also print the rows on screen after the last step.
    #[arg(long)]
    pub render: bool,
}

#[derive(Debug, Args)]
pub struct CheckConfigArgs {
    pub path: PathBuf,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Render(args) => run_render(args, out),
        Commands::Search(args) => run_search(args, out),
        Commands::Replay(args) => run_replay(args, out),
        Commands::CheckConfig(args) => run_check_config(args, out),
    }
}

fn require(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(HarnessError::MissingPath {
            path: path.to_path_buf(),
        })
    }
}

/// Read a forest from a JSON file.
pub fn load_forest(path: &Path) -> Result<Vec<SourceNode>> {
    require(path)?;
    let content = std::fs::read_to_string(path)?;
    let forest: Vec<SourceNode> = serde_json::from_str(&content)?;
    tracing::info!(
        message = "harness.forest_loaded",
        path = %path.display(),
        roots = forest.len(),
        nodes = vtree::node::forest_len(&forest)
    );
    Ok(forest)
}

/// Load and validate a config file, picking the format by extension.
pub fn load_config(path: Option<&Path>) -> Result<TreeConfig> {
    let Some(path) = path else {
        return Ok(TreeConfig::default());
    };
    require(path)?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => TreeConfig::from_json_file(path)?,
        _ => TreeConfig::from_toml_file(path)?,
    };
    Ok(config.validated()?)
}

fn run_render(args: RenderArgs, out: &mut impl Write) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut tree = VirtualTree::with_config(load_forest(&args.forest)?, &config, ());
    if args.collapse_all {
        tree.collapse_all();
    }
    tree.collapse(args.collapse.iter().map(String::as_str));

    let last = args.last.unwrap_or(usize::MAX);
    if args.first > last {
        return Err(HarnessError::invalid(format!(
            "--first {} is past --last {last}",
            args.first
        )));
    }
    tree.set_visible_range(args.first, last);
    if let Some(pattern) = &args.pattern {
        tree.set_pattern(pattern);
    }

    for line in render_window(&tree, args.first, last, args.guides) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn run_search(args: SearchArgs, out: &mut impl Write) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut options = config.search_options();
    if args.ignore_case {
        options = options.ignore_case(true);
    }
    if let Some(delimiter) = args.delimiter {
        options = options.delimiter(delimiter);
    }

    let forest = load_forest(&args.forest)?;
    let matches = search(&forest, &args.pattern, &options);
    if args.json {
        let ids: Vec<&str> = matches.iter().map(|m| m.node_id.as_str()).collect();
        let summary = serde_json::json!({
            "pattern": args.pattern,
            "total": ids.len(),
            "matches": ids,
        });
        writeln!(out, "{summary}")?;
    } else {
        for m in &matches {
            writeln!(out, "{}", m.node_id)?;
        }
    }
    Ok(())
}

fn run_replay(args: ReplayArgs, out: &mut impl Write) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let forest = load_forest(&args.forest)?;
    require(&args.script)?;
    let steps = parse_script(&std::fs::read_to_string(&args.script)?)?;

    let mut session = VirtualTree::with_config(forest, &config, RecordingHost::default());
    replay(&mut session, &steps);

    for event in session.host().events() {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    if args.render {
        let viewport = *session.viewport();
        for line in render_window(&session, viewport.first(), viewport.last(), Guides::Ascii) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn run_check_config(args: CheckConfigArgs, out: &mut impl Write) -> Result<()> {
    let config = load_config(Some(&args.path))?;
    writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const FOREST: &str = r#"[
        {"id": 1, "name": "root", "children": [
            {"id": 2, "name": "leaf1"},
            {"id": "x", "name": "leaf2"}
        ]}
    ]"#;

    fn run_to_string(cli: Cli) -> Result<String> {
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn search_prints_ids() {
        let dir = tempfile::tempdir().unwrap();
        let forest = write_file(&dir, "forest.json", FOREST);
        let out = run_to_string(Cli::parse_from([
            "vtree",
            "search",
            forest.to_str().unwrap(),
            "leaf",
        ]))
        .unwrap();
        assert_eq!(out, "2\nx\n");
    }

    #[test]
    fn search_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let forest = write_file(&dir, "forest.json", FOREST);
        let out = run_to_string(Cli::parse_from([
            "vtree",
            "search",
            forest.to_str().unwrap(),
            "LEAF1",
            "-i",
            "--json",
        ]))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["matches"][0], "2");
    }

    #[test]
    fn render_with_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let forest = write_file(&dir, "forest.json", FOREST);
        let out = run_to_string(Cli::parse_from([
            "vtree",
            "render",
            forest.to_str().unwrap(),
            "--collapse",
            "1",
            "--guides",
            "ascii",
        ]))
        .unwrap();
        assert_eq!(out, "    [+] root\n");
    }

    #[test]
    fn render_rejects_inverted_window() {
        let dir = tempfile::tempdir().unwrap();
        let forest = write_file(&dir, "forest.json", FOREST);
        let err = run_to_string(Cli::parse_from([
            "vtree",
            "render",
            forest.to_str().unwrap(),
            "--first",
            "3",
            "--last",
            "1",
        ]))
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn replay_prints_events_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let forest = write_file(&dir, "forest.json", FOREST);
        let script = write_file(
            &dir,
            "script.json",
            r#"[
                {"op": "range", "first": 0, "last": 5},
                {"op": "pattern", "pattern": "leaf2"},
                {"op": "toggle", "id": "1"}
            ]"#,
        );
        let out = run_to_string(Cli::parse_from([
            "vtree",
            "replay",
            forest.to_str().unwrap(),
            script.to_str().unwrap(),
        ]))
        .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                r#"{"event":"summary","step":1,"active":0,"total":1}"#,
                r#"{"event":"toggle","step":2,"id":"1"}"#,
            ]
        );
    }

    #[test]
    fn missing_forest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_forest(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, HarnessError::MissingPath { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn malformed_forest_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let forest = write_file(&dir, "forest.json", r#"[{"name": "no id"}]"#);
        assert!(matches!(load_forest(&forest), Err(HarnessError::Json(_))));
    }

    #[test]
    fn check_config_rejects_bad_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "vtree.toml", "[search]\ndelimiter = \"|\"\n");
        let err = run_to_string(Cli::parse_from([
            "vtree",
            "check-config",
            path.to_str().unwrap(),
        ]))
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn check_config_accepts_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "vtree.json", r#"{"viewport": {"align": "start"}}"#);
        let out = run_to_string(Cli::parse_from([
            "vtree",
            "check-config",
            path.to_str().unwrap(),
        ]))
        .unwrap();
        assert!(out.contains("\"start\""));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
