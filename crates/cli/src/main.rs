use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use common::config::DEFAULT_CONFIG_FILE;
use common::{LintConfig, Violation};
use ruleset::{all_rule_sets, LintEngine, RuleSet};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "kolint")]
#[command(about = "Naming-convention linter for Kotlin sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint Kotlin files and directories.
    Check {
        /// Files or directories to lint (default: current directory).
        paths: Vec<PathBuf>,
        /// Config file (default: ./kolint.toml if present).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Report format.
        #[arg(long, value_enum, default_value_t = Format::Plain)]
        format: Format,
        /// Disable a rule by id or bare name. Repeatable.
        #[arg(long = "disable", value_name = "RULE")]
        disable: Vec<String>,
        /// Debug logging unless KOLINT_LOG / RUST_LOG say otherwise.
        #[arg(long, short)]
        verbose: bool,
    },
    /// List known rules and whether they are enabled.
    Rules {
        /// Config file (default: ./kolint.toml if present).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Plain,
    Json,
}

/// Exit code for "violations found". Errors out of `run` exit with 2.
const EXIT_VIOLATIONS: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Check { verbose: true, .. });
    init_logging(verbose);
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, ".env not loaded");
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Check {
            paths,
            config,
            format,
            disable,
            verbose: _,
        } => {
            let config = load_config(config.as_deref(), &disable)?;
            cmd_check(&paths, &config, format)
        }
        Commands::Rules { config } => {
            let config = load_config(config.as_deref(), &[])?;
            for line in rule_listing(&all_rule_sets(), &config) {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ---------------------------------------------------------------------------
// logging / config
// ---------------------------------------------------------------------------

/// Stderr subscriber; `KOLINT_LOG` wins over `RUST_LOG`.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = env::var("KOLINT_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>, disable: &[String]) -> anyhow::Result<LintConfig> {
    let mut config = match explicit {
        Some(path) => LintConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LintConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))
            .with_context(|| format!("Failed to load {DEFAULT_CONFIG_FILE}"))?,
    };
    for rule in disable {
        config.disable(rule.as_str());
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

fn cmd_check(paths: &[PathBuf], config: &LintConfig, format: Format) -> anyhow::Result<ExitCode> {
    use anatomist::{path_util::display_path, KotlinHost};

    let roots = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths.to_vec()
    };
    let files = collect_kotlin_files(&roots, config)?;
    let engine = LintEngine::new(all_rule_sets(), config);
    let mut host = KotlinHost::new()?;
    let base = env::current_dir().context("Failed to read current directory")?;

    let mut violations = Vec::new();
    let mut linted = 0usize;
    let mut skipped = 0usize;
    for path in &files {
        match host.dissect(path) {
            Ok(mut file) => {
                file.path = display_path(path, &base);
                violations.extend(engine.check_file(&file));
                linted += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipped");
                skipped += 1;
            }
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Plain => {
            write_plain(&mut out, &violations)?;
            eprintln!("{}", summary(violations.len(), linted, skipped));
        }
        Format::Json => write_json(&mut out, &violations)?,
    }
    out.flush()?;

    Ok(if violations.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_VIOLATIONS)
    })
}

/// Files given explicitly are kept as is; directories are walked without
/// following symlinks, pruning excluded directory names. Sorted, no duplicates.
fn collect_kotlin_files(roots: &[PathBuf], config: &LintConfig) -> anyhow::Result<Vec<PathBuf>> {
    use walkdir::WalkDir;

    let mut files = Vec::new();
    for root in roots {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }
        if !root.is_dir() {
            anyhow::bail!("No such file or directory: {}", root.display());
        }
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !config.is_excluded_dir(&e.file_name().to_string_lossy())
            });
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "walk error");
                    continue;
                }
            };
            let accepted = entry
                .path()
                .extension()
                .and_then(|x| x.to_str())
                .is_some_and(|ext| config.accepts_extension(ext));
            if entry.file_type().is_file() && accepted {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

// ---------------------------------------------------------------------------
// reporting
// ---------------------------------------------------------------------------

fn write_plain(out: &mut impl Write, violations: &[Violation]) -> io::Result<()> {
    for violation in violations {
        writeln!(out, "{violation}")?;
    }
    Ok(())
}

fn write_json(out: &mut impl Write, violations: &[Violation]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, violations).context("Failed to write JSON report")?;
    writeln!(out)?;
    Ok(())
}

fn summary(violations: usize, linted: usize, skipped: usize) -> String {
    let mut line = format!("{violations} violation(s) in {linted} file(s)");
    if skipped > 0 {
        line.push_str(&format!(", {skipped} skipped"));
    }
    line
}

// ---------------------------------------------------------------------------
// rules
// ---------------------------------------------------------------------------

fn rule_listing(rule_sets: &[RuleSet], config: &LintConfig) -> Vec<String> {
    rule_sets
        .iter()
        .flat_map(|set| &set.rules)
        .map(|rule| {
            let id = rule.rule_id();
            let state = if config.is_rule_enabled(&id) {
                "enabled"
            } else {
                "disabled"
            };
            format!("{:<32} {state:<8}  {}", id.to_string(), rule.rule_description())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Diagnostic, RuleId};
    use std::fs;

    fn violation(file: &str, line: u32, column: u32) -> Violation {
        Violation::from_diagnostic(
            file,
            (line, column),
            Diagnostic {
                rule_id: RuleId::new("experimental", "function-naming"),
                offset: 0,
                message: "bad name".into(),
                auto_correctable: false,
            },
        )
    }

    #[test]
    fn test_cli_parses_check() {
        let cli = Cli::try_parse_from([
            "kolint", "check", "src", "--format", "json", "--disable", "function-naming", "-v",
        ])
        .unwrap();
        match cli.command {
            Commands::Check {
                paths,
                format,
                disable,
                verbose,
                config,
            } => {
                assert_eq!(paths, vec![PathBuf::from("src")]);
                assert_eq!(format, Format::Json);
                assert_eq!(disable, vec!["function-naming".to_string()]);
                assert!(verbose);
                assert!(config.is_none());
            }
            Commands::Rules { .. } => panic!("expected check"),
        }
    }

    #[test]
    fn test_collect_kotlin_files_filters_and_sorts() {
        let tmp = env::temp_dir().join("kolint_collect");
        fs::create_dir_all(tmp.join("src/b")).ok();
        fs::create_dir_all(tmp.join("build/generated")).ok();
        fs::write(tmp.join("src/b/Zeta.kt"), "").ok();
        fs::write(tmp.join("src/Alpha.kt"), "").ok();
        fs::write(tmp.join("src/build.gradle.kts"), "").ok();
        fs::write(tmp.join("src/Notes.md"), "").ok();
        fs::write(tmp.join("build/generated/Gen.kt"), "").ok();

        let files = collect_kotlin_files(&[tmp.clone()], &LintConfig::default()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(&tmp).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/Alpha.kt", "src/b/Zeta.kt", "src/build.gradle.kts"]);

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn test_collect_explicit_file_and_dedup() {
        let tmp = env::temp_dir().join("kolint_collect_explicit");
        fs::create_dir_all(&tmp).ok();
        let file = tmp.join("Script.txt");
        fs::write(&file, "").ok();

        let files =
            collect_kotlin_files(&[file.clone(), file.clone()], &LintConfig::default()).unwrap();
        assert_eq!(files, vec![file]);

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn test_collect_missing_path_is_error() {
        let missing = PathBuf::from("/this/does/not/exist/kolint");
        assert!(collect_kotlin_files(&[missing], &LintConfig::default()).is_err());
    }

    #[test]
    fn test_load_config_explicit_missing() {
        let err = load_config(Some(Path::new("/no/such/kolint.toml")), &[]).unwrap_err();
        assert!(format!("{err:#}").contains("not found"));
    }

    #[test]
    fn test_load_config_appends_disabled_rules() {
        let tmp = env::temp_dir().join("kolint_cli_config");
        fs::create_dir_all(&tmp).ok();
        let path = tmp.join("kolint.toml");
        fs::write(&path, "disabled_rules = [\"other\"]\n").ok();

        let config = load_config(Some(&path), &["function-naming".to_string()]).unwrap();
        assert_eq!(config.disabled_rules, vec!["other", "function-naming"]);

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn test_write_plain() {
        let mut out = Vec::new();
        write_plain(&mut out, &[violation("src/A.kt", 3, 5), violation("src/B.kt", 1, 1)]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "src/A.kt:3:5: bad name (experimental:function-naming)\n\
             src/B.kt:1:1: bad name (experimental:function-naming)\n"
        );
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&mut out, &[violation("src/A.kt", 3, 5)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["file"], "src/A.kt");
        assert_eq!(value[0]["line"], 3);
        assert_eq!(value[0]["column"], 5);
        assert_eq!(value[0]["rule"], "experimental:function-naming");
        assert_eq!(value[0]["auto_correctable"], false);
    }

    #[test]
    fn test_write_json_empty() {
        let mut out = Vec::new();
        write_json(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(2, 5, 0), "2 violation(s) in 5 file(s)");
        assert_eq!(summary(0, 4, 1), "0 violation(s) in 4 file(s), 1 skipped");
    }

    #[test]
    fn test_rule_listing() {
        let mut config = LintConfig::default();
        let enabled = rule_listing(&all_rule_sets(), &config);
        assert_eq!(enabled.len(), 1);
        assert!(enabled[0].starts_with("experimental:function-naming"));
        assert!(enabled[0].contains("enabled"));

        config.disable("function-naming");
        let disabled = rule_listing(&all_rule_sets(), &config);
        assert!(disabled[0].contains("disabled"));
    }
}
