use anyhow::{Context, Result};
use clap::Parser;
use classpath_dupes::cli::{Cli, Commands, OutputFormat};
use classpath_dupes::config::resolve_config;
use classpath_dupes::index::ClasspathIndex;
use classpath_dupes::report::DuplicateReport;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    let policy = config
        .build_policy()
        .context("Invalid resource ignore configuration")?;
    let mut index = ClasspathIndex::new(policy);

    match cli.command {
        Commands::Duplicates {
            elements,
            format,
            output,
            keep_going,
        } => {
            let start = Instant::now();
            add_elements(&mut index, &elements, keep_going)?;
            let report = DuplicateReport::from_index(&index, start.elapsed().as_millis() as u64);
            let content = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Text => report.render_text(),
            };
            write_output(&content, output.as_deref())?;
        }
        Commands::Owners { name, elements } => {
            add_elements(&mut index, &elements, false)?;
            let result = OwnersResult {
                classes: owner_names(index.classes_of(&name)),
                resources: owner_names(index.resources_of(&name)),
                name,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

/// Expands path-list arguments (`a.jar:b.jar`) into individual elements.
/// An argument naming an existing path is taken as-is, even if it contains
/// the list separator.
fn expand_elements(raw: &[PathBuf]) -> Vec<PathBuf> {
    raw.iter()
        .flat_map(|arg| {
            if arg.exists() {
                vec![arg.clone()]
            } else {
                std::env::split_paths(arg).collect()
            }
        })
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

fn add_elements(index: &mut ClasspathIndex, raw: &[PathBuf], keep_going: bool) -> Result<()> {
    for path in expand_elements(raw) {
        match index.add(&path) {
            Ok(element) => log::info!("indexed {element}"),
            Err(e) if keep_going => log::warn!("skipping {}: {e}", path.display()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to index {}", path.display()));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct OwnersResult {
    name: String,
    classes: Vec<String>,
    resources: Vec<String>,
}

fn owner_names(owners: Option<&classpath_dupes::index::Owners>) -> Vec<String> {
    owners
        .into_iter()
        .flatten()
        .map(|e| e.display_name())
        .collect()
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_elements_splits_path_lists() {
        let joined = std::env::join_paths(["/lib/a.jar", "/lib/b.jar"]).unwrap();
        let raw = vec![PathBuf::from(joined), PathBuf::from("/classes")];
        assert_eq!(
            expand_elements(&raw),
            [
                PathBuf::from("/lib/a.jar"),
                PathBuf::from("/lib/b.jar"),
                PathBuf::from("/classes")
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn expand_elements_keeps_existing_path_with_separator() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("a:b.jar");
        std::fs::write(&odd, b"").unwrap();

        assert_eq!(expand_elements(&[odd.clone()]), [odd]);
    }
}
