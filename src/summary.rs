use anyhow::Context;

use crate::{cells, workbook::Sheet, xml::Element, Result};

/// Counters for categories this converter never produces.
const UNSUPPORTED_COUNTS: [&str; 5] = [
    "SecurityShortCount",
    "SecurityWithContractCount",
    "SecurityWithContractShortCount",
    "ShareCount",
    "SecurityCapitalReductionCount",
];

/// Builds `Doh_KDVP` holding the filing summary (`KDVP`).
///
/// Security items are appended to the returned node by the caller, which then
/// hands it to [`wrap_body`].
pub fn build_filing(filing: &Sheet, security_count: usize) -> Result<Element> {
    let row = filing.first_row()?;
    let field = |column| filing.value(row, column);

    let year = cells::year(field("Year")?).context("invalid Year")?;
    let is_resident = cells::boolean(field("IsResident")?).context("invalid IsResident")?;
    let telephone = cells::text(field("TelephoneNumber")?);
    let email = cells::text(field("Email")?);

    let mut doh_kdvp = Element::new("Doh_KDVP");
    let kdvp = doh_kdvp.push(Element::new("KDVP"));
    kdvp.push_text("DocumentWorkflowID", "0");
    kdvp.push_text("Year", year.to_string());
    kdvp.push_text("PeriodStart", format!("{year:04}-01-01"));
    kdvp.push_text("PeriodEnd", format!("{year:04}-12-31"));
    kdvp.push_text("IsResident", is_resident.to_string());
    kdvp.push_text("TelephoneNumber", telephone);
    kdvp.push_text("SecurityCount", security_count.to_string());
    for counter in UNSUPPORTED_COUNTS {
        kdvp.push_text(counter, "0");
    }
    kdvp.push_text("Email", email);
    Ok(doh_kdvp)
}

/// Wraps the filled `Doh_KDVP` node into the document `body`.
pub fn wrap_body(doh_kdvp: Element) -> Element {
    let mut body = Element::new("body");
    body.push(Element::new("edp:bodyContent"));
    body.push(doh_kdvp);
    body
}
