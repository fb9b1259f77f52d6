//! COSMIC Pie Menu
//!
//! Reads a tab-indented menu description on stdin, shows it as nested pie
//! menus and prints the chosen entry.
//!
//! Modes:
//! - default: show the menu once and print (or run) the choice
//! - `--root`: stay in the background and open the menu on a button + modifier
//! - `--dump`: print the parsed menu back in input form

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cosmic_pmenu::config::PieMenuConfig;
use cosmic_pmenu::layout::Point;
use cosmic_pmenu::menu::MenuTree;
use cosmic_pmenu::{pie_menu, trigger};

/// Nested pie menus from tab-indented text on stdin
#[derive(Debug, Parser)]
#[command(name = "cosmic-pmenu", version, about)]
struct Cli {
    /// Run the chosen entry with the shell instead of printing it
    #[arg(short = 'x', long)]
    execute: bool,

    /// Keep submenus at their slice instead of under the pointer
    #[arg(short = 'w', long)]
    no_warp: bool,

    /// Stay in the background and open the menu on a button press
    #[arg(short = 'r', long)]
    root: bool,

    /// Pointer button for --root (left, middle, right)
    #[arg(long, value_name = "BUTTON")]
    button: Option<String>,

    /// Modifier key for --root (super, alt, control, shift)
    #[arg(long, value_name = "MODIFIER")]
    modifier: Option<String>,

    /// Centre the root menu here instead of on the pointer
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    at: Option<Vec<f64>>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the parsed menu and exit
    #[arg(long)]
    dump: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// File config with command line overrides applied
    fn config(&self) -> PieMenuConfig {
        let mut config = match &self.config {
            Some(path) => PieMenuConfig::load_from(path),
            None => PieMenuConfig::load(),
        };
        if self.execute {
            config.execute = true;
        }
        if self.no_warp {
            config.warp = false;
        }
        if let Some(button) = &self.button {
            config.root_button = button.clone();
        }
        if let Some(modifier) = &self.modifier {
            config.root_modifier = modifier.clone();
        }
        config
    }

    fn at(&self) -> Option<Point> {
        match self.at.as_deref() {
            Some([x, y]) => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Arguments for menu processes started from root mode
fn child_args() -> Vec<OsString> {
    std::env::args_os()
        .skip(1)
        .filter(|arg| arg != "-r" && arg != "--root")
        .collect()
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config();

    if cli.write_config {
        match &cli.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        info!("configuration written");
        return Ok(());
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("could not read menu from stdin")?;

    let (tree, root) = MenuTree::parse(text.as_bytes())?;
    debug!(menus = tree.menu_count(), slices = tree.slice_count(), "menu parsed");

    if cli.dump {
        let mut stdout = io::stdout().lock();
        tree.write_input(root, &mut stdout)?;
        stdout.flush()?;
        return Ok(());
    }

    if cli.root {
        let binding = trigger::Binding::parse(&config.root_button, &config.root_modifier)?;
        trigger::run(&text, &binding, &child_args())?;
        return Ok(());
    }

    pie_menu::show_pie_menu(tree, root, &config, cli.at())?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("cosmic-pmenu: {e:#}");
        std::process::exit(1);
    }
}
