// FILE: src/cli/handlers.rs
use crate::{
    cli::{BatchOptions, OutputFormat},
    transform_file, MappingTable, Result, RewriteOptions, RewriteStats, ThemifyError,
};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file the batch could not rewrite.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub files_unchanged: usize,
    pub changed_paths: Vec<String>,
    pub failures: Vec<FileFailure>,
    pub totals: RewriteStats,
}

impl BatchSummary {
    fn record(&mut self, path: &Path, stats: &RewriteStats, changed: bool) {
        self.files_scanned += 1;
        if changed {
            self.files_changed += 1;
            self.changed_paths.push(path.display().to_string());
        } else {
            self.files_unchanged += 1;
        }

        let totals = &mut self.totals;
        totals.sites_found += stats.sites_found;
        totals.sites_wrapped += stats.sites_wrapped;
        totals.sites_parameterized += stats.sites_parameterized;
        totals.sites_merged += stats.sites_merged;
        totals.sites_skipped += stats.sites_skipped;
        totals.properties_rewritten += stats.properties_rewritten;
        totals.helper_injected |= stats.helper_injected;
        totals.imports_pruned += stats.imports_pruned;
    }

    fn record_failure(&mut self, path: &Path, error: &ThemifyError) {
        self.files_scanned += 1;
        self.failures.push(FileFailure {
            path: path.display().to_string(),
            error: error.to_string(),
        });
    }

    pub fn files_failed(&self) -> usize {
        self.failures.len()
    }
}

// --- REWRITE ---
pub fn handle_rewrite_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let mapping = cli.load_mapping(matches)?;
    let options = cli.build_rewrite_options(matches);
    let batch = cli.build_batch_options(matches)?;

    let files = collect_files(Path::new(input_path), &batch)?;
    if batch.dry_run {
        println!("🔍 Dry run over {} file(s) in {}", files.len(), input_path);
    } else {
        println!("🎨 Rewriting {} file(s) in {}", files.len(), input_path);
    }

    let summary = run_batch(&files, &mapping, &options, !batch.dry_run);

    for path in &summary.changed_paths {
        let verb = if batch.dry_run { "would change" } else { "rewritten" };
        println!("   ✏️  {} ({})", path, verb);
    }
    print_summary(&summary, cli.elapsed_ms());

    if matches.get_flag("stats") {
        match matches.get_one::<OutputFormat>("format") {
            Some(OutputFormat::Json) => println!("{}", to_json(&summary)?),
            _ => print_detailed_stats(&summary.totals),
        }
    }

    fail_on_errors(&summary)
}

// --- CHECK ---
pub fn handle_check_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let mapping = cli.load_mapping(matches)?;
    let options = cli.build_rewrite_options(matches);
    let batch = cli.build_batch_options(matches)?;

    let files = collect_files(Path::new(input_path), &batch)?;
    println!("🔍 Checking {} file(s) in {}", files.len(), input_path);

    let summary = run_batch(&files, &mapping, &options, false);
    for path in &summary.changed_paths {
        println!("❌ {} - needs rewriting", path);
    }
    print_summary(&summary, cli.elapsed_ms());

    fail_on_errors(&summary)?;
    if summary.files_changed > 0 {
        return Err(ThemifyError::invalid_format(format!(
            "{} file(s) would be rewritten",
            summary.files_changed
        )));
    }

    println!("✅ All files are up to date");
    Ok(())
}

// --- MAPPING ---
#[derive(Debug, Serialize)]
struct MappingReport {
    entries: Vec<MappingReportEntry>,
    overlaps: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MappingReportEntry {
    key: String,
    path: String,
}

pub fn handle_mapping_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let mapping = MappingTable::load(input_path)?;

    let report = MappingReport {
        entries: mapping
            .entries()
            .into_iter()
            .map(|(key, path)| MappingReportEntry { key, path })
            .collect(),
        overlaps: mapping.overlaps(),
    };

    match matches.get_one::<OutputFormat>("format") {
        Some(OutputFormat::Json) => println!("{}", to_json(&report)?),
        _ => {
            println!("✅ {} - {} entries", input_path, report.entries.len());
            for entry in &report.entries {
                println!("   {} -> {}", entry.key, entry.path);
            }
            for overlap in &report.overlaps {
                println!("⚠️  {}", overlap);
            }
        }
    }

    Ok(())
}

/// Every file under `root` with a selected extension whose path matches no
/// exclude pattern, in a stable order. A file given directly is taken as is.
pub fn collect_files(root: &Path, batch: &BatchOptions) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        return Err(ThemifyError::FileNotFound {
            path: root.display().to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            ThemifyError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let selected = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| batch.extensions.iter().any(|e| e == ext));
        if !selected {
            continue;
        }

        let display = path.to_string_lossy().replace('\\', "/");
        if batch.exclude.iter().any(|pattern| pattern.is_match(&display)) {
            log::debug!("Excluded {}", display);
            continue;
        }

        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Rewrite every file, writing changed ones back when `write` is set. Errors
/// are recorded per file and never stop the batch.
pub fn run_batch(
    files: &[PathBuf],
    mapping: &MappingTable,
    options: &RewriteOptions,
    write: bool,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for path in files {
        let result = transform_file(path, mapping, options).and_then(|output| {
            if write && output.changed {
                fs::write(path, &output.code)?;
            }
            Ok(output)
        });

        match result {
            Ok(output) => {
                log::debug!("{}: {:?}", path.display(), output.stats);
                summary.record(path, &output.stats, output.changed);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                eprintln!("❌ {} - {}", path.display(), e);
                summary.record_failure(path, &e);
            }
        }
    }

    summary
}

fn print_summary(summary: &BatchSummary, elapsed_ms: u128) {
    println!("\n📊 Summary:");
    println!("   Files scanned: {}", summary.files_scanned);
    println!("   Changed: {}", summary.files_changed);
    println!("   Unchanged: {}", summary.files_unchanged);
    println!("   Failed: {}", summary.files_failed());
    println!("   Time: {}ms", elapsed_ms);
}

fn print_detailed_stats(stats: &RewriteStats) {
    println!("\n📊 Detailed Rewrite Statistics:");
    println!("   Style sites: {}", stats.sites_found);
    println!("     Wrapped: {}", stats.sites_wrapped);
    println!("     With theme parameter: {}", stats.sites_parameterized);
    println!("     Merged: {}", stats.sites_merged);
    println!("     Already parameterized: {}", stats.sites_skipped);
    println!("   Properties rewritten: {}", stats.properties_rewritten);
    println!("   Imports pruned: {}", stats.imports_pruned);
}

fn fail_on_errors(summary: &BatchSummary) -> Result<()> {
    if summary.files_failed() > 0 {
        Err(ThemifyError::invalid_format(format!(
            "{} file(s) could not be rewritten",
            summary.files_failed()
        )))
    } else {
        Ok(())
    }
}

fn required<'m>(matches: &'m clap::ArgMatches, name: &str) -> Result<&'m String> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| ThemifyError::invalid_format(format!("Missing argument <{}>", name)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ThemifyError::codegen(format!("JSON serialization error: {}", e)))
}
