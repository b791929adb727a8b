use crate::constants::*;
use crate::pipeline::record::Record;

/// Decides whether an input record survives into the output set.
///
/// Cancelled invoices, dropship invoices and self-credit (`SCR`) invoice
/// numbers are excluded. Comparisons ignore case; absent fields compare as "".
pub fn accept(record: &Record) -> bool {
    let status = record.get(FIELD_STATUS).to_lowercase();
    let source = record.get(FIELD_SOURCE_NAME).to_lowercase();
    let invoice_no = record.get(FIELD_INVOICE_NO).to_lowercase();

    !(status == CANCELLED_STATUS
        || source == DROPSHIP_SOURCE
        || invoice_no.ends_with(SCR_INVOICE_SUFFIX))
}
