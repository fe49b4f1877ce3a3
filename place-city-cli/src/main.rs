//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() -> eyre::Result<()> {
    place_city_cli::run()?;
    Ok(())
}
