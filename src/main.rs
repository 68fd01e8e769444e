use std::path::PathBuf;

use clap::Parser;
use kdvp_xml::{convert_file, Result};

/// Convert a capital gains workbook into a Doh-KDVP XML filing.
#[derive(Parser, Debug)]
#[command(name = "kdvp-xml", version, about, long_about = None)]
struct Args {
    /// Input spreadsheet (xlsx, xls or ods)
    #[arg(long, alias = "xlsx_input")]
    xlsx_input: PathBuf,

    /// Where to write the XML document; it is always printed to stdout
    #[arg(long, alias = "xml_output")]
    xml_output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    convert_file(&args.xlsx_input, args.xml_output.as_ref())?;
    Ok(())
}
