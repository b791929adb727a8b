use csv::StringRecord;
use std::collections::HashMap;

/// One row of the invoice table, keyed by header name.
///
/// Every value is text. A field that is not present reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a data row. Short rows leave trailing columns
    /// absent; values beyond the header are dropped.
    pub fn from_row(headers: &StringRecord, row: &StringRecord) -> Self {
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self { fields }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Keeps exactly `names`, filling absent ones with the empty string.
    pub fn project(&self, names: &[&str]) -> Self {
        Self {
            fields: names
                .iter()
                .map(|name| (name.to_string(), self.get(name).to_string()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_row_short_and_long_rows() {
        let headers = StringRecord::from(vec!["a", "b", "c"]);

        let short = Record::from_row(&headers, &StringRecord::from(vec!["1", "2"]));
        assert_eq!(short.get("a"), "1");
        assert_eq!(short.get("b"), "2");
        assert!(!short.contains("c"));
        assert_eq!(short.get("c"), "");

        let long = Record::from_row(&headers, &StringRecord::from(vec!["1", "2", "3", "4"]));
        assert_eq!(long.len(), 3);
        assert_eq!(long.get("c"), "3");
    }

    #[test]
    fn test_project_fills_missing_fields() {
        let record = Record::from_pairs([("invoice_no", "INV-1"), ("extra", "x")]);
        let projected = record.project(&["invoice_no", "header_po"]);

        assert_eq!(projected.len(), 2);
        assert_eq!(projected.get("invoice_no"), "INV-1");
        assert!(projected.contains("header_po"));
        assert_eq!(projected.get("header_po"), "");
        assert!(!projected.contains("extra"));
    }
}
