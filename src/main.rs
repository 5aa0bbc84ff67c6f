//! CLI entry point for building a photomosaic

use clap::Parser;
use mosaicbuild::io::cli::{Cli, MosaicProcessor};
use mosaicbuild::io::logging::init_logging;

fn main() -> mosaicbuild::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let processor = MosaicProcessor::new(cli);
    processor.process()
}
