use chrono::{Datelike, NaiveDate, NaiveDateTime};
use crate::constants::*;
use crate::pipeline::record::Record;

/// The three duplicate-detection keys. Each is a plain concatenation of
/// normalized fields with no separator, so distinct field splits can collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKey {
    /// Header PO + invoice date + scaled amount
    HeaderPoDateAmount,
    /// Vendor code + invoice year + scaled amount
    VendorYearAmount,
    /// Header PO + scaled amount
    HeaderPoAmount,
}

impl CompositeKey {
    pub const ALL: [CompositeKey; 3] = [
        CompositeKey::HeaderPoDateAmount,
        CompositeKey::VendorYearAmount,
        CompositeKey::HeaderPoAmount,
    ];

    pub fn column(self) -> &'static str {
        match self {
            CompositeKey::HeaderPoDateAmount => KEY_A_COLUMN,
            CompositeKey::VendorYearAmount => KEY_B_COLUMN,
            CompositeKey::HeaderPoAmount => KEY_C_COLUMN,
        }
    }

    pub fn remark_column(self) -> &'static str {
        match self {
            CompositeKey::HeaderPoDateAmount => KEY_A_REMARK_COLUMN,
            CompositeKey::VendorYearAmount => KEY_B_REMARK_COLUMN,
            CompositeKey::HeaderPoAmount => KEY_C_REMARK_COLUMN,
        }
    }

    pub fn index(self) -> usize {
        match self {
            CompositeKey::HeaderPoDateAmount => 0,
            CompositeKey::VendorYearAmount => 1,
            CompositeKey::HeaderPoAmount => 2,
        }
    }

    fn derive(self, header_po: &str, vendor: &str, date: &str, year: &str, amount: &str) -> String {
        match self {
            CompositeKey::HeaderPoDateAmount => format!("{header_po}{date}{amount}"),
            CompositeKey::VendorYearAmount => format!("{vendor}{year}{amount}"),
            CompositeKey::HeaderPoAmount => format!("{header_po}{amount}"),
        }
    }
}

/// `floor(amount / 10)` as integer text. Unparseable or non-finite amounts bucket to "0".
///
/// This is a coarse bucket for key building, not a display rounding. The
/// floored value is formatted directly so huge amounts keep every digit.
pub fn scale_amount(raw: &str) -> String {
    let amount = match raw.trim() {
        "" => 0.0,
        text => text.parse::<f64>().unwrap_or(0.0),
    };

    let scaled = (amount / AMOUNT_BUCKET_DIVISOR).floor();
    if !scaled.is_finite() || scaled == 0.0 {
        // -0.0 would otherwise print as "-0"
        return "0".to_string();
    }
    format!("{:.0}", scaled)
}

/// Drops the time part of an ISO timestamp (`2022-07-09T00:00:00Z` -> `2022-07-09`).
pub fn normalize_date(raw: &str) -> &str {
    match raw.split_once(TIMESTAMP_SEPARATOR) {
        Some((date, _)) => date,
        None => raw,
    }
}

/// Four-digit year of the first format that parses, or "" when none does.
///
/// Day/month ordering is not disambiguated: `%m/%d/%Y` is tried before `%d/%m/%Y`.
pub fn extract_year(date: &str) -> String {
    let date = normalize_date(date);
    if date.is_empty() {
        return String::new();
    }

    DATE_FORMATS
        .iter()
        .filter(|format| matches_strictly(date, format))
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
        .or_else(|| {
            matches_strictly(date, DATETIME_FORMAT)
                .then(|| NaiveDateTime::parse_from_str(date, DATETIME_FORMAT).ok())
                .flatten()
                .map(|datetime| datetime.date())
        })
        .map(|parsed| parsed.year().to_string())
        .unwrap_or_default()
}

/// chrono's `%Y` takes 1 to 4 digits and skips whitespace before numbers.
/// The year field must be exactly four ASCII digits and the only whitespace
/// allowed is what the format itself contains.
fn matches_strictly(date: &str, format: &str) -> bool {
    let year = if format.starts_with("%Y") {
        date.split('-').next()
    } else {
        date.rsplit('/').next()
    };
    let four_digits = year.is_some_and(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()));

    let whitespace = date.chars().filter(|c| c.is_whitespace()).count();
    four_digits && whitespace == format.matches(' ').count() && date.trim() == date
}

/// Adds the derived columns to a surviving record and rewrites its invoice
/// date to the normalized form.
pub fn apply(record: &mut Record) {
    let scaled_amount = scale_amount(record.get(FIELD_AMOUNT));
    let date = normalize_date(record.get(FIELD_INVOICE_DATE)).to_string();
    let year = extract_year(&date);

    let keys = CompositeKey::ALL.map(|key| {
        key.derive(
            record.get(FIELD_HEADER_PO),
            record.get(FIELD_VENDOR_CODE),
            &date,
            &year,
            &scaled_amount,
        )
    });

    record.set(FIELD_SCALED_AMOUNT, scaled_amount);
    record.set(FIELD_INVOICE_DATE, date);
    record.set(FIELD_INVOICE_YEAR, year);
    for (key, value) in CompositeKey::ALL.into_iter().zip(keys) {
        record.set(key.column(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_amount() {
        assert_eq!(scale_amount("1234.56"), "123");
        assert_eq!(scale_amount("10"), "1");
        assert_eq!(scale_amount("9.99"), "0");
        assert_eq!(scale_amount(" 250 "), "25");
        assert_eq!(scale_amount("-5"), "-1");
        assert_eq!(scale_amount("-0"), "0");
        assert_eq!(scale_amount("abc"), "0");
        assert_eq!(scale_amount(""), "0");
        assert_eq!(scale_amount("NaN"), "0");
        assert_eq!(scale_amount("inf"), "0");
    }

    #[test]
    fn test_scale_amount_beyond_i64() {
        assert_eq!(scale_amount("1e20"), "10000000000000000000");
        assert_eq!(scale_amount("-1e20"), "-10000000000000000000");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2022-07-09T00:00:00.000Z"), "2022-07-09");
        assert_eq!(normalize_date("2022-07-09"), "2022-07-09");
        assert_eq!(normalize_date("07/09/2022"), "07/09/2022");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2022-07-09"), "2022");
        assert_eq!(extract_year("2022-07-09T00:00:00.000Z"), "2022");
        assert_eq!(extract_year("07/09/2021"), "2021");
        // Not a valid month, falls through to day-first
        assert_eq!(extract_year("25/12/2020"), "2020");
        assert_eq!(extract_year("2019-01-02 10:11:12"), "2019");
        assert_eq!(extract_year("next tuesday"), "");
        assert_eq!(extract_year(""), "");
    }

    #[test]
    fn test_extract_year_requires_four_digits() {
        assert_eq!(extract_year("7/9/22"), "");
        assert_eq!(extract_year("22-07-09"), "");
        assert_eq!(extract_year(" 2022-07-09"), "");
        assert_eq!(extract_year("2022-07-09 "), "");
        assert_eq!(extract_year("07/09/ 2022"), "");
        assert_eq!(extract_year("7/9/2022"), "2022");
        assert_eq!(extract_year("2019-01-02 10:11:12"), "2019");
    }

    #[test]
    fn test_short_year_leaves_vendor_key_without_year() {
        let mut record = Record::from_pairs([
            (FIELD_VENDOR_CODE, "V01"),
            (FIELD_INVOICE_DATE, "7/9/22"),
            (FIELD_AMOUNT, "1234.56"),
        ]);

        apply(&mut record);

        assert_eq!(record.get(FIELD_INVOICE_YEAR), "");
        assert_eq!(record.get(KEY_B_COLUMN), "V01123");
    }

    #[test]
    fn test_apply_derives_keys() {
        let mut record = Record::from_pairs([
            (FIELD_HEADER_PO, "PO77"),
            (FIELD_VENDOR_CODE, "V01"),
            (FIELD_INVOICE_DATE, "2022-07-09T00:00:00.000Z"),
            (FIELD_AMOUNT, "1234.56"),
        ]);

        apply(&mut record);

        assert_eq!(record.get(FIELD_INVOICE_DATE), "2022-07-09");
        assert_eq!(record.get(FIELD_INVOICE_YEAR), "2022");
        assert_eq!(record.get(FIELD_SCALED_AMOUNT), "123");
        assert_eq!(record.get(FIELD_AMOUNT), "1234.56");
        assert_eq!(record.get(KEY_A_COLUMN), "PO772022-07-09123");
        assert_eq!(record.get(KEY_B_COLUMN), "V012022123");
        assert_eq!(record.get(KEY_C_COLUMN), "PO77123");
    }

    #[test]
    fn test_apply_with_unparseable_fields() {
        let mut record = Record::from_pairs([
            (FIELD_HEADER_PO, "PO1"),
            (FIELD_INVOICE_DATE, "unknown"),
            (FIELD_AMOUNT, "n/a"),
        ]);

        apply(&mut record);

        assert_eq!(record.get(FIELD_INVOICE_YEAR), "");
        assert_eq!(record.get(FIELD_SCALED_AMOUNT), "0");
        assert_eq!(record.get(KEY_A_COLUMN), "PO1unknown0");
        assert_eq!(record.get(KEY_B_COLUMN), "0");
    }

    #[test]
    fn test_keys_collide_without_separator() {
        let mut left = Record::from_pairs([(FIELD_HEADER_PO, "12"), (FIELD_AMOUNT, "30")]);
        let mut right = Record::from_pairs([(FIELD_HEADER_PO, "1"), (FIELD_AMOUNT, "230")]);
        apply(&mut left);
        apply(&mut right);
        assert_eq!(left.get(KEY_C_COLUMN), right.get(KEY_C_COLUMN));
    }
}
