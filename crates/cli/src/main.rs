use clap::Parser;
use stac_check_cli::StacCheck;

fn main() -> anyhow::Result<()> {
    StacCheck::parse().run(true)
}
