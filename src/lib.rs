use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Error};
use log::{info, warn};

pub mod cells;
pub mod error;
pub mod header;
pub mod item;
pub mod summary;
pub mod workbook;
pub mod xml;

pub use error::ConvertError;
pub use workbook::{SpreadsheetFile, Workbook};
pub use xml::Element;

pub type Result<T> = std::result::Result<T, Error>;

/// Sheet holding the taxpayer identity, copied column by column into the header.
pub const TAXPAYER_SHEET: &str = "Podatki";
/// Sheet holding the filing year, residency and contact details.
pub const FILING_SHEET: &str = "KDVP podatki";

fn is_metadata_sheet(name: &str) -> bool {
    name == TAXPAYER_SHEET || name == FILING_SHEET
}

/// Security sheets in file order, each name once.
pub fn security_sheets(sheet_names: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    sheet_names
        .iter()
        .map(String::as_str)
        .filter(|name| !is_metadata_sheet(name))
        .filter(|name| {
            let first = seen.insert(*name);
            if !first {
                warn!("sheet `{name}` appears more than once, keeping the first");
            }
            first
        })
        .collect()
}

/// Converts a whole workbook into the `Envelope` document tree.
pub fn convert<W: Workbook>(workbook: &mut W) -> Result<Element> {
    let sheet_names = workbook.sheet_names();
    let securities = security_sheets(&sheet_names);
    info!(
        "{} sheets, {} securities",
        sheet_names.len(),
        securities.len()
    );

    let mut envelope = header::build_envelope(&workbook.sheet(TAXPAYER_SHEET)?)
        .with_context(|| format!("failed to build header from sheet `{TAXPAYER_SHEET}`"))?;
    let mut doh_kdvp = summary::build_filing(&workbook.sheet(FILING_SHEET)?, securities.len())
        .with_context(|| format!("failed to build summary from sheet `{FILING_SHEET}`"))?;

    for name in securities {
        let sheet = workbook.sheet(name)?;
        item::append_item(&sheet, &mut doh_kdvp)?;
        info!("converted security {name}");
    }

    envelope.push(summary::wrap_body(doh_kdvp));
    Ok(envelope)
}

/// Converts the workbook at `input_path`, echoes the document to stdout and,
/// when `output_path` is given, writes it there.
///
/// The document is rendered completely before anything is written, so a
/// failed conversion leaves no output file behind.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Option<Q>,
) -> Result<String> {
    let mut workbook = SpreadsheetFile::open(input_path)?;
    let document = xml::to_document_string(&convert(&mut workbook)?)?;

    print!("{document}");

    if let Some(output_path) = output_path {
        write_document(&document, output_path)?;
    }
    Ok(document)
}

pub fn write_document<P: AsRef<Path>>(document: &str, file_path: P) -> Result<()> {
    let path = file_path.as_ref();
    fs::write(path, document).with_context(|| format!("failed to write {}", path.display()))?;
    info!("The XML document was written to file {}", path.display());
    Ok(())
}
