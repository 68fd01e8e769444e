use anyhow::Context;
use log::debug;

use crate::{
    cells,
    workbook::{Row, Sheet},
    xml::Element,
    Result,
};

const INVENTORY_LIST_TYPE: &str = "PLVP";

/// Per-security flags emitted directly under `KDVPItem`.
const ITEM_FLAGS: [&str; 4] = [
    "HasForeignTax",
    "HasLossTransfer",
    "ForeignTransfer",
    "TaxDecreaseConformance",
];
const FUND_FLAG: &str = "IsFond";

/// Transaction type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionType {
    Buy,
    Sell,
    /// Anything else: the row still gets its ID and remaining quantity.
    Other,
}

impl TransactionType {
    fn from_cell(cell: &calamine::Data) -> Self {
        match cells::text(cell).trim() {
            "B" => Self::Buy,
            "S" => Self::Sell,
            _ => Self::Other,
        }
    }
}

/// Column positions of a security sheet, resolved once.
struct Columns {
    kind: usize,
    date: usize,
    quantity: usize,
    price: usize,
    gift_tax: usize,
    remaining: usize,
}

impl Columns {
    fn resolve(sheet: &Sheet) -> Result<Self> {
        Ok(Self {
            kind: sheet.column("Type")?,
            date: sheet.column("Date")?,
            quantity: sheet.column("Quantity")?,
            price: sheet.column("Price")?,
            gift_tax: sheet.column("GiftAndInheritanceTax")?,
            remaining: sheet.column("Remaining")?,
        })
    }
}

/// Appends one `KDVPItem` for the security sheet `sheet` to `doh_kdvp`.
///
/// The sheet name is the security's ISIN. The flags are per-security
/// constants and are read from the first data row only; the rows below it
/// repeat them or leave them blank without effect.
pub fn append_item(sheet: &Sheet, doh_kdvp: &mut Element) -> Result<()> {
    let name = sheet.name();
    let first = sheet.first_row()?;
    let flag = |column: &str| -> Result<String> {
        let value = cells::boolean(sheet.value(first, column)?)
            .with_context(|| format!("sheet `{name}`, column `{column}`"))?;
        Ok(value.to_string())
    };

    let mut item = Element::new("KDVPItem");
    item.push_text("InventoryListType", INVENTORY_LIST_TYPE);
    item.push_text("Name", name);
    for column in ITEM_FLAGS {
        item.push_text(column, flag(column)?);
    }

    let securities = item.push(Element::new("Securities"));
    securities.push_text("ISIN", name);
    securities.push_text(FUND_FLAG, flag(FUND_FLAG)?);

    let columns = Columns::resolve(sheet)?;
    let mut count = 0;
    for (id, row) in sheet.rows().enumerate() {
        let element = transaction_row(id, row, &columns)
            .with_context(|| format!("sheet `{name}`, data row {}", id + 1))?;
        securities.push(element);
        count += 1;
    }
    debug!("{name}: {count} transaction rows");

    doh_kdvp.push(item);
    Ok(())
}

fn transaction_row(id: usize, row: Row<'_>, columns: &Columns) -> Result<Element> {
    let mut element = Element::new("Row");
    element.push_text("ID", id.to_string());

    match TransactionType::from_cell(row.cell(columns.kind)) {
        TransactionType::Buy => {
            let purchase = element.push(Element::new("Purchase"));
            purchase.push_text("F1", cells::iso_date(row.cell(columns.date)).context("Date")?);
            purchase.push_text("F2", "B");
            purchase.push_text("F3", cells::decimal(row.cell(columns.quantity)).context("Quantity")?);
            purchase.push_text("F4", cells::decimal(row.cell(columns.price)).context("Price")?);
            purchase.push_text(
                "F5",
                cells::decimal(row.cell(columns.gift_tax)).context("GiftAndInheritanceTax")?,
            );
        }
        TransactionType::Sell => {
            let sale = element.push(Element::new("Sale"));
            sale.push_text("F6", cells::iso_date(row.cell(columns.date)).context("Date")?);
            sale.push_text("F7", cells::decimal(row.cell(columns.quantity)).context("Quantity")?);
            sale.push_text("F9", cells::decimal(row.cell(columns.price)).context("Price")?);
        }
        TransactionType::Other => {}
    }

    element.push_text("F8", cells::decimal(row.cell(columns.remaining)).context("Remaining")?);
    Ok(element)
}
