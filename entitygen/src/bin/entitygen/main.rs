mod commands;
mod output;
mod theme;

use anyhow::Result;
use clap::{
    builder::styling::{AnsiColor, Style, Styles},
    ColorChoice, CommandFactory, Parser, Subcommand,
};
use std::io::{self, Write as IoWrite};

use commands::{
    generate::{handle_generate, GenerateArgs},
    inspect::{handle_inspect, InspectArgs},
};
use output::{GlobalOptions, OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "entitygen")]
#[command(version)]
#[command(
    about = "Entity class regenerator",
    long_about = r#"Regenerates accessor methods, constructors, and imports for PHP entity
classes from a declarative schema manifest, while preserving every
hand-written member. Running it twice over an unchanged schema is a
no-op.

Commands:
  generate  Regenerate entity classes from a schema manifest
  inspect   Show the properties and methods declared in entity files
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate entity classes from a schema manifest
    Generate(GenerateArgs),

    /// Show the properties and methods declared in entity files
    Inspect(InspectArgs),
}

fn main() {
    env_logger::init();

    let cli = parse_cli();

    let _ = print_blank_line();

    match execute(cli) {
        Ok(()) => {
            let _ = print_blank_line();
        }
        Err(err) => {
            eprintln!("Error: {err}");
            let _ = print_blank_line();
            std::process::exit(1);
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    let output = OutputManager::new(global_options);

    match cli.command {
        Commands::Generate(args) => handle_generate(args, &output),
        Commands::Inspect(args) => handle_inspect(args, &output),
    }
}

fn parse_cli() -> Cli {
    let command = Cli::command()
        .styles(help_styles())
        .color(ColorChoice::Auto);
    match command.try_get_matches() {
        Ok(matches) => {
            use clap::FromArgMatches;
            Cli::from_arg_matches(&matches).expect("Failed to parse CLI arguments")
        }
        Err(err) => {
            let _ = print_blank_line();
            let _ = err.print();
            let _ = print_blank_line();
            std::process::exit(err.exit_code());
        }
    }
}

fn print_blank_line() -> io::Result<()> {
    let mut stdout = io::stdout();
    IoWrite::write_all(&mut stdout, b"\n")?;
    IoWrite::flush(&mut stdout)
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(Style::new().fg_color(Some(AnsiColor::BrightBlue.into())).bold())
        .header(Style::new().fg_color(Some(AnsiColor::Cyan.into())).bold())
        .literal(Style::new().fg_color(Some(AnsiColor::Magenta.into())))
        .placeholder(Style::new().fg_color(Some(AnsiColor::BrightBlack.into())))
        .error(Style::new().fg_color(Some(AnsiColor::Red.into())).bold())
}
