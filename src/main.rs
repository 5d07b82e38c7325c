//! loglight - check syntax and color scheme documents, and show how a
//! log line is tokenized and colored

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use loglight::{
    ConfigFiles, ConfigStore, Highlights, LineLayers, QuickFindPattern, Settings, StructConfig,
};

/// Rule-based log line highlighting
#[derive(Parser, Debug)]
#[command(name = "loglight")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file to use instead of the default one
    #[arg(long, value_name = "FILE", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every document with tests enabled and report problems
    Check {
        /// Directories to check instead of the configured ones
        #[arg(value_name = "DIR")]
        dirs: Vec<PathBuf>,

        /// Skip the built-in documents
        #[arg(long)]
        no_builtin: bool,

        /// Report all errors instead of stopping at the first
        #[arg(long)]
        keep_going: bool,
    },

    /// List selectable color schemes
    Schemes {
        /// Extra directories to load
        #[arg(value_name = "DIR")]
        dirs: Vec<PathBuf>,
    },

    /// Print the colored tokens of a line
    Tokens {
        /// Color scheme to filter scopes with
        #[arg(long, value_name = "NAME")]
        scheme: Option<String>,

        /// Extra directories to load
        #[arg(long = "dir", value_name = "DIR")]
        dirs: Vec<PathBuf>,

        /// Quick find pattern (regular expression)
        #[arg(long, value_name = "PATTERN")]
        quick_find: Option<String>,

        /// Literal to highlight; repeat to fill further color slots
        #[arg(long = "highlight", value_name = "TEXT")]
        highlights: Vec<String>,

        /// The log line
        line: String,
    },
}

/// Level from the `-v` count, refined by `RUST_LOG`-style directives
fn log_filter(verbose: u8, directives: &str) -> EnvFilter {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(log_filter(
            args.verbose,
            &std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default(),
        ))
        .init();

    let mut settings = match &args.settings {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Cannot load settings from {}", path.display()))?,
        None => Settings::load(),
    };

    match args.command {
        Command::Check {
            dirs,
            no_builtin,
            keep_going,
        } => {
            if no_builtin {
                settings.builtin = false;
            }
            let ok = check(&settings, &dirs, keep_going)?;
            if !ok {
                process::exit(1);
            }
        }
        Command::Schemes { dirs } => {
            settings.config_dirs.extend(dirs);
            let store = ConfigStore::new(StructConfig::from_settings(&settings)?);
            for name in store.color_scheme_names() {
                println!("{}", name);
            }
        }
        Command::Tokens {
            scheme,
            dirs,
            quick_find,
            highlights,
            line,
        } => {
            settings.config_dirs.extend(dirs);
            if let Some(scheme) = scheme {
                settings.color_scheme = scheme;
            }
            tokens(&settings, quick_find.as_deref(), &highlights, &line)?;
        }
    }

    Ok(())
}

/// Returns whether everything loaded without errors
fn check(settings: &Settings, dirs: &[PathBuf], keep_going: bool) -> anyhow::Result<bool> {
    let mut files = ConfigFiles::new();
    if settings.builtin {
        files.add_builtin();
    }
    if dirs.is_empty() {
        files.scan_dirs(&settings.search_dirs())?;
    } else {
        files.scan_dirs(dirs)?;
    }

    let mut options = settings.load_options();
    options.run_tests = true;
    options.stop_on_error = !keep_going;

    let config = match StructConfig::load(&files, options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(false);
        }
    };
    for error in config.errors() {
        eprintln!("{}", error);
    }
    for issue in config.check_for_issues() {
        eprintln!("warning: {}", issue);
    }
    println!(
        "{} documents, {} syntaxes, {} color schemes, {} errors",
        files.len(),
        config.syntaxes().len(),
        config.color_schemes().len(),
        config.errors().len()
    );
    Ok(config.errors().is_empty())
}

fn tokens(
    settings: &Settings,
    quick_find: Option<&str>,
    highlight_patterns: &[String],
    line: &str,
) -> anyhow::Result<()> {
    let mut store = ConfigStore::new(StructConfig::from_settings(settings)?);
    store.set_color_scheme(&settings.color_scheme)?;

    let mut highlights = Highlights::new();
    for (i, pattern) in highlight_patterns.iter().enumerate() {
        if i >= loglight::color::HIGHLIGHT_COUNT {
            bail!(
                "At most {} highlight patterns are supported",
                loglight::color::HIGHLIGHT_COUNT
            );
        }
        highlights.add_pattern(pattern, i)?;
    }

    let mut find = QuickFindPattern::new();
    if let Some(pattern) = quick_find {
        find.set_pattern(pattern, false);
    }

    let (owner, syntax_tokens) = store.syntaxes().parse_with_owner(line);
    println!("syntax: {}", owner.map(|s| s.name()).unwrap_or("-"));

    let mut layers = LineLayers::new();
    layers
        .push_layer(&find.tokens(line))
        .push_layer(&highlights.colorize(line));
    let scheme = store.color_scheme();
    for token in layers.compose(&syntax_tokens, scheme) {
        println!(
            "{} {} {:?} ({})",
            token.range,
            token.scope,
            token.text(line),
            scheme.scope_color(&token.scope)
        );
    }
    Ok(())
}
