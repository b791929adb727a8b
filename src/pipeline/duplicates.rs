use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::constants::{REMARK_DUPLICATE, REMARK_NON_DUPLICATE};
use crate::pipeline::record::Record;
use crate::pipeline::transform::CompositeKey;

/// Number of records marked `Duplicate`, per composite key. Every member of a
/// group of two or more counts, not the number of groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCounts {
    #[serde(rename = "concat1_duplicates")]
    pub header_po_date_amount: usize,
    #[serde(rename = "concat2_duplicates")]
    pub vendor_year_amount: usize,
    #[serde(rename = "concat3_duplicates")]
    pub header_po_amount: usize,
}

impl DuplicateCounts {
    pub fn get(&self, key: CompositeKey) -> usize {
        match key {
            CompositeKey::HeaderPoDateAmount => self.header_po_date_amount,
            CompositeKey::VendorYearAmount => self.vendor_year_amount,
            CompositeKey::HeaderPoAmount => self.header_po_amount,
        }
    }

    fn increment(&mut self, key: CompositeKey) {
        match key {
            CompositeKey::HeaderPoDateAmount => self.header_po_date_amount += 1,
            CompositeKey::VendorYearAmount => self.vendor_year_amount += 1,
            CompositeKey::HeaderPoAmount => self.header_po_amount += 1,
        }
    }
}

/// Two-pass duplicate flagging over the whole surviving set.
///
/// Pass one counts every key value; pass two writes a remark per key on each
/// record. Records must already carry their composite key columns.
pub fn flag_duplicates(records: &mut [Record]) -> DuplicateCounts {
    let flags: Vec<[bool; 3]> = {
        let mut frequencies: [HashMap<&str, usize>; 3] = Default::default();
        for record in records.iter() {
            for key in CompositeKey::ALL {
                *frequencies[key.index()]
                    .entry(record.get(key.column()))
                    .or_insert(0) += 1;
            }
        }

        records
            .iter()
            .map(|record| {
                CompositeKey::ALL
                    .map(|key| frequencies[key.index()][record.get(key.column())] > 1)
            })
            .collect()
    };

    let mut counts = DuplicateCounts::default();
    for (record, record_flags) in records.iter_mut().zip(flags) {
        for key in CompositeKey::ALL {
            let remark = if record_flags[key.index()] {
                counts.increment(key);
                REMARK_DUPLICATE
            } else {
                REMARK_NON_DUPLICATE
            };
            record.set(key.remark_column(), remark);
        }
    }

    counts
}
