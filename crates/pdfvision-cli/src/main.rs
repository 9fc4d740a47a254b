mod cli;
mod elements_cmd;
mod fonts_cmd;
mod glyphs_cmd;
mod page_range;
mod shared;

use clap::Parser;
use cli::Cli;
use pdfvision::GroupingOptions;
use tracing_subscriber::EnvFilter;

fn main() {
    // RUST_LOG overrides; warnings only by default. Logs never touch stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Elements {
            ref file,
            ref pages,
            ref format,
            gap_ratio,
            line_tolerance,
            font_size_tolerance,
            parallel,
        } => elements_cmd::run(
            file,
            elements_cmd::ElementsArgs {
                pages: pages.as_deref(),
                format,
                grouping: GroupingOptions {
                    gap_ratio,
                    line_tolerance_ratio: line_tolerance,
                    font_size_tolerance,
                },
                parallel,
            },
        ),
        cli::Commands::Glyphs {
            ref file,
            ref pages,
            ref format,
        } => glyphs_cmd::run(file, pages.as_deref(), format),
        cli::Commands::Fonts {
            ref file,
            ref pages,
            ref format,
        } => fonts_cmd::run(file, pages.as_deref(), format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
