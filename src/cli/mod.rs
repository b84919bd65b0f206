// FILE: src/cli/mod.rs

mod config;
mod handlers;

pub use handlers::{BatchSummary, FileFailure};

use crate::constants::{DEFAULT_EXCLUDE_PATTERNS, DEFAULT_EXTENSIONS};
use crate::error::{Result, ThemifyError};
use crate::{MappingTable, RewriteOptions};
use clap::{Arg, ArgAction, Command, ValueEnum};
use regex::Regex;
use std::time::Instant;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// File selection for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub extensions: Vec<String>,
    pub exclude: Vec<Regex>,
    pub dry_run: bool,
}

pub struct EnhancedCli {
    config: config::ConfigFile,
    start_time: Instant,
}

impl Default for EnhancedCli {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancedCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        self.setup_logging(matches.get_count("verbose"))?;

        match matches.subcommand() {
            Some(("rewrite", sub_matches)) => handlers::handle_rewrite_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            Some(("mapping", sub_matches)) => handlers::handle_mapping_command(sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .author("Themify Development Team")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("rewrite")
                    .about("Rewrite token references in a file or directory")
                    .arg(Arg::new("input").help("Source file or directory").required(true).index(1))
                    .arg(Arg::new("mapping").short('m').long("mapping").value_name("FILE").help("Token mapping file (.json or .toml)"))
                    .arg(Arg::new("helper-module").long("helper-module").value_name("MODULE").help("Module the helper import is injected from"))
                    .arg(Arg::new("exclude").short('e').long("exclude").value_name("REGEX").help("Skip paths matching this pattern").action(ArgAction::Append))
                    .arg(Arg::new("dry-run").short('n').long("dry-run").help("Report changes without writing files").action(ArgAction::SetTrue))
                    .arg(Arg::new("no-prune").long("no-prune").help("Keep unreferenced imports").action(ArgAction::SetTrue))
                    .arg(Arg::new("stats").long("stats").help("Show detailed rewrite statistics").action(ArgAction::SetTrue))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("text").help("Statistics output format"))
                    .arg(Arg::new("debug").short('d').long("debug").help("Enable debug mode with extra logging").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("List files a rewrite would change")
                    .arg(Arg::new("input").help("Source file or directory").required(true).index(1))
                    .arg(Arg::new("mapping").short('m').long("mapping").value_name("FILE").help("Token mapping file (.json or .toml)"))
                    .arg(Arg::new("exclude").short('e').long("exclude").value_name("REGEX").help("Skip paths matching this pattern").action(ArgAction::Append)),
            )
            .subcommand(
                Command::new("mapping")
                    .about("Validate a mapping file and show its entries")
                    .arg(Arg::new("input").help("Token mapping file (.json or .toml)").required(true).index(1))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("text").help("Output format")),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    /// Load the mapping named on the command line, falling back to the config
    /// file. Overlapping entries are reported as warnings.
    pub fn load_mapping(&self, matches: &clap::ArgMatches) -> Result<MappingTable> {
        let path = matches
            .get_one::<String>("mapping")
            .or(self.config.mapping.as_ref())
            .ok_or_else(|| {
                ThemifyError::invalid_format(
                    "No mapping file given. Use --mapping FILE or set `mapping` in the config file.",
                )
            })?;

        let mapping = MappingTable::load(path)?;
        log::info!("Loaded {} mapping entries from {}", mapping.len(), path);
        for overlap in mapping.overlaps() {
            log::warn!("Overlapping mapping entries: {}", overlap);
        }
        Ok(mapping)
    }

    pub fn build_rewrite_options(&self, matches: &clap::ArgMatches) -> RewriteOptions {
        let mut options = RewriteOptions::default();

        if let Some(helper_module) = flag_value(matches, "helper-module")
            .or(self.config.helper_module.as_ref())
        {
            options.helper_module = helper_module.clone();
        }
        if let Some(prune) = self.config.prune_imports {
            options.prune_imports = prune;
        }
        if flag_set(matches, "no-prune") {
            options.prune_imports = false;
        }
        if let Some(retained) = &self.config.retained_imports {
            options.retained_imports = retained.clone();
        }
        if let Some(annotate) = self.config.annotate_theme_param {
            options.annotate_theme_param = annotate;
        }
        options.debug_mode = flag_set(matches, "debug");

        options
    }

    pub fn build_batch_options(&self, matches: &clap::ArgMatches) -> Result<BatchOptions> {
        let extensions = self
            .config
            .extensions
            .clone()
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect());

        let mut patterns: Vec<String> = match &self.config.exclude {
            Some(configured) => configured.clone(),
            None => DEFAULT_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        };
        if let Some(extra) = matches.get_many::<String>("exclude") {
            patterns.extend(extra.cloned());
        }

        let exclude = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    ThemifyError::invalid_format(format!(
                        "Invalid exclude pattern '{}': {}",
                        pattern, e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BatchOptions {
            extensions,
            exclude,
            dry_run: flag_set(matches, "dry-run"),
        })
    }
}

/// Subcommands share some arguments but not all of them.
fn flag_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(matches.try_get_one::<bool>(name), Ok(Some(true)))
}

fn flag_value<'m>(matches: &'m clap::ArgMatches, name: &str) -> Option<&'m String> {
    matches.try_get_one::<String>(name).ok().flatten()
}
