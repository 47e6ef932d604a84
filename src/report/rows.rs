//! Flat result rows and CSV export

use std::io::{self, Write};

use serde::Serialize;

use crate::simulator::QueryResult;

/// Column order of `results.csv`
pub const CSV_HEADER: [&str; 10] = [
    "denorm_id",
    "query_id",
    "operator_plan_summary",
    "time",
    "carbon",
    "price",
    "scanned_docs",
    "output_docs",
    "scanned_bytes",
    "returned_bytes",
];

/// One (design, query) result, unweighted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub denorm_id: String,
    pub query_id: String,
    pub operator_plan_summary: String,
    pub time: f64,
    pub carbon: f64,
    pub price: f64,
    pub scanned_docs: u64,
    pub output_docs: u64,
    pub scanned_bytes: u64,
    pub returned_bytes: u64,
}

impl ResultRow {
    pub fn from_result(result: &QueryResult) -> Self {
        Self {
            denorm_id: result.design_id.clone(),
            query_id: result.query_id().to_string(),
            operator_plan_summary: result.plan.summary(),
            time: result.total_cost.time_cost,
            carbon: result.total_cost.carbon_cost,
            price: result.total_cost.price_cost,
            scanned_docs: result.scanned_docs,
            output_docs: result.output_docs,
            scanned_bytes: result.scanned_bytes,
            returned_bytes: result.output_bytes,
        }
    }

    fn fields(&self) -> [String; 10] {
        [
            self.denorm_id.clone(),
            self.query_id.clone(),
            self.operator_plan_summary.clone(),
            self.time.to_string(),
            self.carbon.to_string(),
            self.price.to_string(),
            self.scanned_docs.to_string(),
            self.output_docs.to_string(),
            self.scanned_bytes.to_string(),
            self.returned_bytes.to_string(),
        ]
    }
}

/// One-line text summary of a result
pub fn summary_line(result: &QueryResult) -> String {
    format!(
        "{} -> time={:.6}, carbon={:.6}, price={:.6}, scanned_docs={}, output_docs={}",
        result.query_id(),
        result.total_cost.time_cost,
        result.total_cost.carbon_cost,
        result.total_cost.price_cost,
        result.scanned_docs,
        result.output_docs
    )
}

/// Writes the header and one record per row, CRLF-terminated
pub fn write_csv<W: Write>(rows: &[ResultRow], writer: &mut W) -> io::Result<()> {
    write_record(writer, CSV_HEADER.iter().copied())?;
    for row in rows {
        let fields = row.fields();
        write_record(writer, fields.iter().map(String::as_str))?;
    }
    writer.flush()
}

fn write_record<'a, W: Write>(
    writer: &mut W,
    fields: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    let line = fields.map(csv_field).collect::<Vec<_>>().join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")
}

/// Quotes a field if it holds a comma, quote or line break
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(denorm_id: &str) -> ResultRow {
        ResultRow {
            denorm_id: denorm_id.to_string(),
            query_id: "Q1".to_string(),
            operator_plan_summary: "filter_with_sharding -> nested_loop_with_sharding"
                .to_string(),
            time: 0.5,
            carbon: 0.25,
            price: 0.05,
            scanned_docs: 100,
            output_docs: 10,
            scanned_bytes: 1800,
            returned_bytes: 220,
        }
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_write_csv() {
        let mut buffer = Vec::new();
        write_csv(&[row("D1"), row("D,2")], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            "D1,Q1,filter_with_sharding -> nested_loop_with_sharding,0.5,0.25,0.05,100,10,1800,220"
        );
        assert!(lines[2].starts_with("\"D,2\",Q1,"));
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_write_csv_without_rows_has_header() {
        let mut buffer = Vec::new();
        write_csv(&[], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), format!("{}\r\n", CSV_HEADER.join(",")));
    }
}
