mod cli;
mod header_cmd;
mod shared;
mod tables_cmd;
mod validate_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Tables {
            ref tokens,
            ref regions,
            ref format,
            canonical,
            ref tuning,
        } => tables_cmd::run(tokens, regions.as_deref(), format, canonical, tuning),
        cli::Commands::Validate {
            ref tokens,
            ref regions,
            ref header,
            ref page_text,
            ref format,
            ref tuning,
        } => validate_cmd::run(
            tokens,
            regions.as_deref(),
            header.as_deref(),
            page_text.as_deref(),
            format,
            tuning,
        ),
        cli::Commands::Header {
            ref file,
            ref key_map,
        } => header_cmd::run(file, key_map.as_deref()),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
