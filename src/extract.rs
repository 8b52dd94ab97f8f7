// 🔎 Table extractor - first marked HTML table → bank records
//
// Steps:
// 1. First <table> carrying the marker class
// 2. Header row names the columns (trimmed)
// 3. Keep the name column and the first "Market cap..." column
// 4. Strip line breaks from market-cap cells and parse as f64

use crate::config::TableSource;
use crate::error::{ExtractionError, Result};
use crate::models::{BankRecord, ColumnNames, ExtractedTable};
use crate::progress::ProgressLog;
use scraper::{ElementRef, Html, Selector};
use std::io::Write;

// ============================================================================
// RAW TABLE
// ============================================================================

/// Text content of a source table, before column selection
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of the column whose header equals `header`
    pub fn column_exact(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Columns sharing the header `header`, e.g. a `colspan` header over flag + name
    pub fn column_run(&self, header: &str) -> Option<std::ops::Range<usize>> {
        let start = self.column_exact(header)?;
        let len = self.headers[start..]
            .iter()
            .take_while(|h| *h == header)
            .count();
        Some(start..start + len)
    }

    /// Index of the first column whose header contains `fragment`
    pub fn column_containing(&self, fragment: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.contains(fragment))
    }
}

/// Widest `colspan` honoured, the HTML limit
const MAX_COLSPAN: usize = 1000;

/// One grid slot: cell text, whether it came from a <th>, rows it still covers below
#[derive(Debug, Clone)]
struct SpanCell {
    text: String,
    header: bool,
    rows_left: usize,
}

/// Parse `html` and read the first table whose class list contains `marker`.
///
/// `rowspan` cells are carried into the rows below and `colspan` cells are
/// repeated across the columns they cover, for header and data rows alike.
pub fn read_marked_table(html: &str, marker: &str) -> std::result::Result<RawTable, ExtractionError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("table.{}", marker))
        .map_err(|e| ExtractionError::Selector(e.to_string()))?;

    let table = document
        .select(&selector)
        .next()
        .ok_or_else(|| ExtractionError::NoMatchingTable {
            marker: marker.to_string(),
        })?;

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut carried: Vec<Option<SpanCell>> = Vec::new();

    for row in table_rows(table) {
        let cells: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "th" | "td"))
            .collect();

        if cells.is_empty() {
            continue;
        }

        let expanded = expand_row(&cells, &mut carried);
        let all_header_cells = expanded.iter().all(|c| c.header);

        if all_header_cells {
            // Later all-<th> rows are sub-headers and carry no data
            if headers.is_none() {
                headers = Some(expanded.iter().map(|c| clean_cell_text(&c.text)).collect());
            }
        } else if headers.is_some() {
            rows.push(expanded.into_iter().map(|c| c.text).collect());
        }
    }

    Ok(RawTable {
        headers: headers.unwrap_or_default(),
        rows,
    })
}

/// Lay out one <tr> on the grid, filling slots still covered by earlier rowspans
fn expand_row(cells: &[ElementRef<'_>], carried: &mut Vec<Option<SpanCell>>) -> Vec<SpanCell> {
    let mut out = Vec::new();
    let mut own = cells.iter();
    let mut col = 0;

    loop {
        if let Some(slot) = carried.get_mut(col).and_then(Option::take) {
            if slot.rows_left > 1 {
                carried[col] = Some(SpanCell {
                    rows_left: slot.rows_left - 1,
                    ..slot.clone()
                });
            }
            out.push(slot);
            col += 1;
            continue;
        }

        let Some(cell) = own.next() else {
            break;
        };

        let text = cell_text(cell);
        let header = cell.value().name() == "th";
        let rowspan = span_attr(cell, "rowspan");
        let colspan = span_attr(cell, "colspan").min(MAX_COLSPAN);

        for _ in 0..colspan {
            if carried.len() <= col {
                carried.resize(col + 1, None);
            }
            if rowspan > 1 {
                carried[col] = Some(SpanCell {
                    text: text.clone(),
                    header,
                    rows_left: rowspan - 1,
                });
            }
            out.push(SpanCell {
                text: text.clone(),
                header,
                rows_left: 0,
            });
            col += 1;
        }
    }

    out
}

/// `rowspan` / `colspan` value, 1 when absent or malformed
fn span_attr(cell: &ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// <tr> elements of `table`, looking through thead/tbody/tfoot but not nested tables
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr"),
            ),
            _ => {}
        }
    }

    rows
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect()
}

/// Collapse line breaks and whitespace runs to one space, then trim
pub fn clean_cell_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove embedded newlines and thousands separators, then parse the market-cap figure
pub fn parse_market_cap(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | ','))
        .collect();
    cleaned.trim().parse::<f64>().ok()
}

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct TableExtractor {
    source: TableSource,
}

impl TableExtractor {
    pub fn new(source: TableSource) -> Self {
        TableExtractor { source }
    }

    /// Extract bank records from `html`, naming the output columns `columns`
    pub fn extract(
        &self,
        html: &str,
        columns: &ColumnNames,
        log: &dyn ProgressLog,
        out: &mut dyn Write,
    ) -> Result<ExtractedTable> {
        let raw = read_marked_table(html, &self.source.marker_class)?;
        writeln!(out, "✓ Table columns: {:?}", raw.headers)?;

        let records = self.select_records(&raw)?;

        log.log("Data extraction complete. Initiating Transformation process")?;

        Ok(ExtractedTable {
            columns: columns.clone(),
            records,
        })
    }

    /// Pick name + market cap from every data row, in source order
    pub fn select_records(
        &self,
        raw: &RawTable,
    ) -> std::result::Result<Vec<BankRecord>, ExtractionError> {
        let name_cols = raw.column_run(&self.source.name_header).ok_or_else(|| {
            ExtractionError::MissingColumn {
                column: self.source.name_header.clone(),
            }
        })?;

        let mc_idx = raw
            .column_containing(&self.source.market_cap_header)
            .ok_or_else(|| ExtractionError::MissingColumn {
                column: self.source.market_cap_header.clone(),
            })?;

        let needed = name_cols.end.max(mc_idx + 1);

        raw.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let row_number = i + 1;

                if row.len() < needed {
                    return Err(ExtractionError::ShortRow {
                        row: row_number,
                        expected: needed,
                        found: row.len(),
                    });
                }

                let mc_text = &row[mc_idx];
                let mc_usd_billion =
                    parse_market_cap(mc_text).ok_or_else(|| ExtractionError::NonNumericCell {
                        row: row_number,
                        value: mc_text.clone(),
                    })?;

                let name = clean_cell_text(&row[name_cols.clone()].join(" "));
                Ok(BankRecord::new(&name, mc_usd_billion))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::progress::MemoryProgressLog;

    const BANKS_HTML: &str = r#"
<html><body>
<table class="infobox"><tr><th>Bank name</th><th>Market cap</th></tr>
<tr><td>Decoy</td><td>1.0</td></tr></table>
<h2>By market capitalization</h2>
<table class="wikitable sortable mw-collapsible">
<tbody>
<tr>
<th>Rank
</th>
<th>Bank name
</th>
<th>Market cap<br />(US$ billion)<sup>[1]</sup>
</th></tr>
<tr>
<td>1</td>
<td><span class="flagicon"></span> <a href="/wiki/JPMorgan_Chase">JPMorgan Chase</a></td>
<td>432.92
</td></tr>
<tr>
<td>2</td>
<td><span class="flagicon"></span> <a href="/wiki/Bank_of_America">Bank of America</a></td>
<td>231.52
</td></tr>
<tr>
<td>3</td>
<td><span class="flagicon"></span> <a href="/wiki/ICBC">Industrial and Commercial Bank of China</a></td>
<td>194.56
</td></tr>
</tbody></table>
<table class="wikitable"><tr><th>Bank name</th><th>Total assets</th></tr>
<tr><td>Second table</td><td>9.9</td></tr></table>
</body></html>
"#;

    fn extractor() -> TableExtractor {
        TableExtractor::new(TableSource::default())
    }

    #[test]
    fn test_read_marked_table_picks_first_match() {
        let raw = read_marked_table(BANKS_HTML, "wikitable").unwrap();

        assert_eq!(raw.headers.len(), 3);
        assert_eq!(raw.headers[1], "Bank name");
        assert!(raw.headers[2].starts_with("Market cap"));
        assert_eq!(raw.rows.len(), 3);
    }

    #[test]
    fn test_extract_records_in_source_order() {
        let log = MemoryProgressLog::new();
        let mut out: Vec<u8> = Vec::new();
        let table = extractor()
            .extract(BANKS_HTML, &ColumnNames::default(), &log, &mut out)
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "✓ Table columns: [\"Rank\", \"Bank name\", \"Market cap(US$ billion)[1]\"]\n"
        );

        assert_eq!(table.columns, ColumnNames::new("Name", "MC_USD_Billion"));
        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[0], BankRecord::new("JPMorgan Chase", 432.92));
        assert_eq!(table.records[1], BankRecord::new("Bank of America", 231.52));
        assert_eq!(
            table.records[2],
            BankRecord::new("Industrial and Commercial Bank of China", 194.56)
        );

        assert_eq!(
            log.messages(),
            vec!["Data extraction complete. Initiating Transformation process".to_string()]
        );

        println!("✅ Extraction test PASSED");
    }

    #[test]
    fn test_extract_uses_configured_column_names() {
        let log = MemoryProgressLog::new();
        let columns = ColumnNames::new("Bank", "USD_bn");
        let table = extractor().extract(BANKS_HTML, &columns, &log, &mut std::io::sink()).unwrap();
        assert_eq!(table.columns, columns);
    }

    #[test]
    fn test_no_matching_table() {
        let log = MemoryProgressLog::new();
        let html = "<table class=\"infobox\"><tr><th>Bank name</th></tr></table>";

        let err = extractor()
            .extract(html, &ColumnNames::default(), &log, &mut std::io::sink())
            .unwrap_err();

        assert!(matches!(
            err,
            EtlError::Extraction(ExtractionError::NoMatchingTable { .. })
        ));
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_missing_market_cap_column() {
        let html = r#"<table class="wikitable">
            <tr><th>Bank name</th><th>Total assets</th></tr>
            <tr><td>Bank A</td><td>10</td></tr></table>"#;

        let err = extractor()
            .extract(html, &ColumnNames::default(), &MemoryProgressLog::new(), &mut std::io::sink())
            .unwrap_err();

        match err {
            EtlError::Extraction(ExtractionError::MissingColumn { column }) => {
                assert_eq!(column, "Market cap")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_name_column() {
        let html = r#"<table class="wikitable">
            <tr><th>Name</th><th>Market cap</th></tr>
            <tr><td>Bank A</td><td>10</td></tr></table>"#;

        let err = extractor()
            .extract(html, &ColumnNames::default(), &MemoryProgressLog::new(), &mut std::io::sink())
            .unwrap_err();

        assert!(matches!(
            err,
            EtlError::Extraction(ExtractionError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_non_numeric_market_cap() {
        let html = r#"<table class="wikitable">
            <tr><th>Bank name</th><th>Market cap (US$ billion)</th></tr>
            <tr><td>Bank A</td><td>10.5</td></tr>
            <tr><td>Bank B</td><td>n/a</td></tr></table>"#;

        let err = extractor()
            .extract(html, &ColumnNames::default(), &MemoryProgressLog::new(), &mut std::io::sink())
            .unwrap_err();

        match err {
            EtlError::Extraction(ExtractionError::NonNumericCell { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row() {
        let html = r#"<table class="wikitable">
            <tr><th>Rank</th><th>Bank name</th><th>Market cap</th></tr>
            <tr><td>1</td><td>Bank A</td></tr></table>"#;

        let err = extractor()
            .extract(html, &ColumnNames::default(), &MemoryProgressLog::new(), &mut std::io::sink())
            .unwrap_err();

        assert!(matches!(
            err,
            EtlError::Extraction(ExtractionError::ShortRow {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_header_in_thead_and_subheader_rows_skipped() {
        let html = r#"<table class="wikitable">
            <thead><tr><th> Bank name </th><th>Market cap</th></tr></thead>
            <tbody>
            <tr><th colspan="2">Europe</th></tr>
            <tr><td>HSBC</td><td>160.68</td></tr>
            </tbody></table>"#;

        let raw = read_marked_table(html, "wikitable").unwrap();
        assert_eq!(raw.headers, vec!["Bank name", "Market cap"]);

        let records = extractor().select_records(&raw).unwrap();
        assert_eq!(records, vec![BankRecord::new("HSBC", 160.68)]);
    }

    #[test]
    fn test_nested_table_rows_ignored() {
        let html = r#"<table class="wikitable">
            <tr><th>Bank name</th><th>Market cap</th></tr>
            <tr><td>Bank A<table><tr><td>x</td><td>y</td></tr></table></td><td>1.5</td></tr>
            </table>"#;

        let raw = read_marked_table(html, "wikitable").unwrap();
        assert_eq!(raw.rows.len(), 1);
    }

    #[test]
    fn test_rowspan_tied_rank() {
        let html = r#"<table class="wikitable">
            <tr><th>Rank</th><th>Bank name</th><th>Market cap</th></tr>
            <tr><td rowspan="2">1</td><td>Bank A</td><td>10</td></tr>
            <tr><td>Bank B</td><td>20</td></tr>
            <tr><td>3</td><td>Bank C</td><td>5</td></tr></table>"#;

        let raw = read_marked_table(html, "wikitable").unwrap();
        assert_eq!(raw.rows[1], vec!["1", "Bank B", "20"]);

        let records = extractor().select_records(&raw).unwrap();
        assert_eq!(
            records,
            vec![
                BankRecord::new("Bank A", 10.0),
                BankRecord::new("Bank B", 20.0),
                BankRecord::new("Bank C", 5.0),
            ]
        );

        println!("✅ Rowspan test PASSED");
    }

    #[test]
    fn test_rowspan_in_middle_column() {
        let html = r#"<table class="wikitable">
            <tr><th>Bank name</th><th>Country</th><th>Market cap</th></tr>
            <tr><td>Bank A</td><td rowspan="3">China</td><td>10</td></tr>
            <tr><td>Bank B</td><td>20</td></tr>
            <tr><td>Bank C</td><td>30</td></tr>
            <tr><td>Bank D</td><td>USA</td><td>40</td></tr></table>"#;

        let raw = read_marked_table(html, "wikitable").unwrap();
        assert_eq!(raw.rows[2], vec!["Bank C", "China", "30"]);
        assert_eq!(raw.rows[3], vec!["Bank D", "USA", "40"]);

        let records = extractor().select_records(&raw).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3], BankRecord::new("Bank D", 40.0));
    }

    #[test]
    fn test_colspan_header() {
        let html = r#"<table class="wikitable">
            <tr><th colspan="2">Bank name</th><th>Market cap</th></tr>
            <tr><td><span class="flagicon"></span></td><td>Bank A</td><td>10</td></tr>
            <tr><td><span class="flagicon"></span></td><td>Bank B</td><td>20</td></tr></table>"#;

        let raw = read_marked_table(html, "wikitable").unwrap();
        assert_eq!(raw.headers, vec!["Bank name", "Bank name", "Market cap"]);
        assert_eq!(raw.column_run("Bank name"), Some(0..2));

        let records = extractor().select_records(&raw).unwrap();
        assert_eq!(
            records,
            vec![BankRecord::new("Bank A", 10.0), BankRecord::new("Bank B", 20.0)]
        );

        println!("✅ Colspan header test PASSED");
    }

    #[test]
    fn test_colspan_data_cell_fills_columns() {
        let html = r#"<table class="wikitable">
            <tr><th>Bank name</th><th>Note</th><th>Market cap</th></tr>
            <tr><td>Bank A</td><td>x</td><td>10</td></tr>
            <tr><td colspan="2">Bank B</td><td>20</td></tr></table>"#;

        let raw = read_marked_table(html, "wikitable").unwrap();
        assert_eq!(raw.rows[1], vec!["Bank B", "Bank B", "20"]);

        let records = extractor().select_records(&raw).unwrap();
        assert_eq!(records[1], BankRecord::new("Bank B", 20.0));
    }

    #[test]
    fn test_invalid_marker_is_selector_error() {
        let err = read_marked_table("<table class=\"wikitable\"></table>", "[").unwrap_err();
        assert!(matches!(err, ExtractionError::Selector(_)));
    }

    #[test]
    fn test_thousands_separator() {
        let html = r#"<table class="wikitable">
            <tr><th>Bank name</th><th>Market cap</th></tr>
            <tr><td>Bank A</td><td>1,234.5
</td></tr></table>"#;

        let table = extractor()
            .extract(html, &ColumnNames::default(), &MemoryProgressLog::new(), &mut std::io::sink())
            .unwrap();

        assert_eq!(table.records, vec![BankRecord::new("Bank A", 1234.5)]);
    }

    #[test]
    fn test_parse_market_cap() {
        assert_eq!(parse_market_cap("123.45\n"), Some(123.45));
        assert_eq!(parse_market_cap("12\n3.45"), Some(123.45));
        assert_eq!(parse_market_cap(" 99.1\r\n"), Some(99.1));
        assert_eq!(parse_market_cap("1,234.56"), Some(1234.56));
        assert_eq!(parse_market_cap("abc"), None);
        assert_eq!(parse_market_cap(""), None);
    }

    #[test]
    fn test_clean_cell_text() {
        assert_eq!(clean_cell_text("  Bank\n of\tAmerica \n"), "Bank of America");
        assert_eq!(clean_cell_text("\n"), "");
    }
}
