// Input columns
pub const FIELD_CREATION_DATE: &str = "invoice_creation_date";
pub const FIELD_PAYEE_NAME: &str = "payee_name";
pub const FIELD_VENDOR_CODE: &str = "primary_vendor_code";
pub const FIELD_BARCODE: &str = "barcode";
pub const FIELD_STATUS: &str = "invoice_status";
pub const FIELD_HEADER_PO: &str = "header_po";
pub const FIELD_INVOICE_NO: &str = "invoice_no";
pub const FIELD_INVOICE_DATE: &str = "invoice_date";
pub const FIELD_SOURCE_NAME: &str = "invoice_source_name";
pub const FIELD_QUANTITY: &str = "invoice_quantity";
pub const FIELD_AMOUNT: &str = "invoice_amount";

pub const REQUIRED_FIELDS: [&str; 11] = [
    FIELD_CREATION_DATE,
    FIELD_PAYEE_NAME,
    FIELD_VENDOR_CODE,
    FIELD_BARCODE,
    FIELD_STATUS,
    FIELD_HEADER_PO,
    FIELD_INVOICE_NO,
    FIELD_INVOICE_DATE,
    FIELD_SOURCE_NAME,
    FIELD_QUANTITY,
    FIELD_AMOUNT,
];

// Derived columns
pub const FIELD_INVOICE_YEAR: &str = "invoice_year";
pub const FIELD_SCALED_AMOUNT: &str = "invoice_amount_after_removing_decimal";

pub const KEY_A_COLUMN: &str = "CONCAT 1(Header PO + Invoice Date + Invoice Amount)";
pub const KEY_A_REMARK_COLUMN: &str = "CONCAT 1(Header PO + Invoice Date + Invoice Amount) Remarks";
pub const KEY_B_COLUMN: &str = "CONCAT 2(Primary Vendor Code + Invoice Year + Invoice Amount)";
pub const KEY_B_REMARK_COLUMN: &str =
    "CONCAT 2(Primary Vendor Code + Invoice Year + Invoice Amount) Remarks";
pub const KEY_C_COLUMN: &str = "CONCAT 3(Header PO + Invoice Amount)";
pub const KEY_C_REMARK_COLUMN: &str = "CONCAT 3(Header PO + Invoice Amount) Remarks";

pub const OUTPUT_COLUMNS: [&str; 19] = [
    FIELD_SOURCE_NAME,
    FIELD_VENDOR_CODE,
    FIELD_PAYEE_NAME,
    FIELD_STATUS,
    FIELD_CREATION_DATE,
    FIELD_BARCODE,
    FIELD_HEADER_PO,
    FIELD_INVOICE_NO,
    FIELD_INVOICE_DATE,
    FIELD_INVOICE_YEAR,
    FIELD_QUANTITY,
    FIELD_AMOUNT,
    FIELD_SCALED_AMOUNT,
    KEY_A_COLUMN,
    KEY_A_REMARK_COLUMN,
    KEY_B_COLUMN,
    KEY_B_REMARK_COLUMN,
    KEY_C_COLUMN,
    KEY_C_REMARK_COLUMN,
];

pub const REMARK_DUPLICATE: &str = "Duplicate";
pub const REMARK_NON_DUPLICATE: &str = "Non Duplicate";

// Filter values, compared case-insensitively
pub const CANCELLED_STATUS: &str = "cancelled";
pub const DROPSHIP_SOURCE: &str = "dropship";
pub const SCR_INVOICE_SUFFIX: &str = "scr";

pub const AMOUNT_BUCKET_DIVISOR: f64 = 10.0;
pub const TIMESTAMP_SEPARATOR: char = 'T';
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Progress milestones (percent)
pub const PROGRESS_READING: u8 = 10;
pub const PROGRESS_FILTERING: u8 = 30;
pub const PROGRESS_FILTERING_SPAN: f64 = 40.0;
pub const PROGRESS_RAMP_RECORDS: f64 = 100_000.0;
pub const PROGRESS_TRANSFORMING: u8 = 75;
pub const PROGRESS_DETECTING: u8 = 85;
pub const PROGRESS_WRITING: u8 = 95;
pub const PROGRESS_COMPLETE: u8 = 100;

pub const DEFAULT_PROGRESS_INTERVAL_RECORDS: usize = 50_000;

// Storage
pub const DEFAULT_STORAGE_ROOT: &str = "sift_data";
pub const DEFAULT_UPLOAD_NAME: &str = "upload.csv.gz";
pub const OUTPUT_FILE_PREFIX: &str = "processed_";
pub const DOWNLOAD_FILE_NAME: &str = "processed_invoice_data.csv";
pub const GZIP_EXTENSION: &str = ".gz";
pub const CSV_EXTENSION: &str = ".csv";

// Server
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 1024;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

pub const BYTES_PER_MB: usize = 1_048_576;
pub const BYTES_PER_GB: f64 = 1_073_741_824.0;
pub const SECONDS_PER_MINUTE: f64 = 60.0;
