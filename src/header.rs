use log::warn;

use crate::{cells, workbook::Sheet, xml::Element, Result};

pub const KDVP_NAMESPACE: &str = "http://edavki.durs.si/Documents/Schemas/Doh_KDVP_9.xsd";
pub const EDP_NAMESPACE: &str = "http://edavki.durs.si/Documents/Schemas/EDP-Common-1.xsd";

/// Builds the document envelope from the taxpayer sheet.
///
/// Every column of the first data row becomes an `edp:<column>` field under
/// `edp:taxpayer`, whatever its name. Columns with a blank header have no
/// element name and are skipped. The schema requires the attachment list
/// and signatures to exist, so they are emitted empty.
pub fn build_envelope(taxpayer: &Sheet) -> Result<Element> {
    let row = taxpayer.first_row()?;

    let mut envelope = Element::new("Envelope")
        .with_attribute("xmlns", KDVP_NAMESPACE)
        .with_attribute("xmlns:edp", EDP_NAMESPACE);

    let header = envelope.push(Element::new("edp:Header"));
    let fields = header.push(Element::new("edp:taxpayer"));
    for (index, column) in taxpayer.headers().iter().enumerate() {
        if column.is_empty() {
            warn!(
                "sheet `{}`: column {} has no header, skipping it",
                taxpayer.name(),
                index + 1
            );
            continue;
        }
        fields.push_text(format!("edp:{column}"), cells::text(row.cell(index)));
    }

    envelope.push(Element::new("edp:AttachmentList"));
    envelope.push(Element::new("edp:Signatures"));
    Ok(envelope)
}
