use crate::report::Report;
use crate::types::{ReportRow, RowKind};

const HEADER_STYLE: &str =
    "background-color: #4472C4; color: white; padding: 10px; border: 1px solid #ddd;";
const LABEL_STYLE: &str = "padding: 8px; border: 1px solid #ddd; font-weight: bold;";
const CELL_STYLE: &str = "padding: 8px; text-align: center; border: 1px solid #ddd;";
const MAX_STYLE: &str = " background-color: #90EE90; font-weight: bold;";
const SLOT_LABEL_STYLE: &str = " background-color: #D9E1F2;";
const SLOT_STYLE: &str = " background-color: #D9E1F2; font-style: italic;";
const WHOLE_DAY_STYLE: &str = " background-color: #F2F2F2; border-top: 2px solid #4472C4;";

/// Standalone page around the report table, for writing to disk.
#[must_use]
pub fn render_document(report: &Report) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("  <title>{}</title>\n", escape_html(&report.subject())));
    html.push_str(&render_styles());
    html.push_str("</head>\n<body>\n");

    html.push_str(&format!(
        "  <h1>Daily Ratings</h1>\n  <h3>Broadcast day {} ({})</h3>\n",
        report.date(),
        report.date().date().format("%A")
    ));
    html.push_str("  <div class=\"container\">\n");
    html.push_str(&render_table(report));
    html.push_str("\n  </div>\n");

    html.push_str("</body>\n</html>\n");
    html
}

fn render_styles() -> String {
    r#"  <style>
    body { background-color: #ffffff; color: #222; font-family: Arial, Helvetica, sans-serif; padding: 20px; margin: 0; }
    h1 { text-align: center; margin-bottom: 5px; color: #4472C4; font-size: 2em; }
    h3 { text-align: center; font-size: 0.9em; color: #777; margin-bottom: 30px; font-weight: normal; text-transform: uppercase; letter-spacing: 2px; }
    .container { max-width: 900px; margin: 0 auto; overflow-x: auto; }
  </style>
"#
    .to_string()
}

/// The report as one inline-styled table, safe to embed in an e-mail body.
#[must_use]
pub fn render_table(report: &Report) -> String {
    let mut html = String::new();

    html.push_str(
        r#"<table style="border-collapse: collapse; font-family: Arial, sans-serif; width: 100%;">"#,
    );
    html.push_str("<thead><tr>");
    html.push_str(&format!(r#"<th style="{HEADER_STYLE}">Time</th>"#));
    for channel in report.channels() {
        html.push_str(&format!(
            r#"<th style="{HEADER_STYLE}">{}</th>"#,
            escape_html(channel)
        ));
    }
    html.push_str("</tr></thead><tbody>");

    for row in report.rows() {
        html.push_str(&render_row(row));
    }

    html.push_str("</tbody></table>");
    html
}

fn render_row(row: &ReportRow) -> String {
    let label_style = match row.kind {
        RowKind::Interval => LABEL_STYLE.to_string(),
        RowKind::Slot => format!("{LABEL_STYLE}{SLOT_LABEL_STYLE}"),
        RowKind::WholeDay => format!("{LABEL_STYLE}{WHOLE_DAY_STYLE}"),
    };

    // Only plain interval rows get their maximum highlighted
    let max = match row.kind {
        RowKind::Interval => row.max_value(),
        RowKind::Slot | RowKind::WholeDay => None,
    };

    let mut html = String::from("<tr>");
    html.push_str(&format!(
        r#"<td style="{label_style}">{}</td>"#,
        escape_html(&row.label)
    ));

    for value in &row.values {
        let extra = match row.kind {
            RowKind::Slot => SLOT_STYLE,
            RowKind::WholeDay => WHOLE_DAY_STYLE,
            RowKind::Interval if value.is_some() && *value == max => MAX_STYLE,
            RowKind::Interval => "",
        };
        let text = value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        html.push_str(&format!(r#"<td style="{CELL_STYLE}{extra}">{text}</td>"#));
    }

    html.push_str("</tr>");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportDate;

    fn sample() -> Report {
        let row = |label: &str, kind, values: Vec<Option<f64>>| ReportRow {
            label: label.to_string(),
            kind,
            values,
        };
        Report::new(
            "2026-01-30".parse::<ReportDate>().unwrap(),
            vec!["Digi 24".to_string(), "Antena 3 CNN".to_string()],
            vec![
                row("22:45 - 23:00", RowKind::Interval, vec![Some(1.5), Some(2.25)]),
                row("MEDIE 20:00 - 23:00", RowKind::Slot, vec![Some(3.0), Some(1.0)]),
                row("Whole day", RowKind::WholeDay, vec![Some(4.0), None]),
            ],
        )
    }

    #[test]
    fn test_table_structure() {
        let html = render_table(&sample());
        assert!(html.starts_with("<table"));
        assert!(html.ends_with("</table>"));
        assert_eq!(html.matches("<tr>").count(), 4);
        assert!(html.contains(">Antena 3 CNN</th>"));
    }

    #[test]
    fn test_only_interval_max_is_highlighted() {
        let html = render_table(&sample());
        assert_eq!(html.matches("#90EE90").count(), 1);
        assert!(html.contains(&format!(r#"<td style="{CELL_STYLE}{MAX_STYLE}">2.25</td>"#)));
        assert!(html.contains(&format!(r#"<td style="{CELL_STYLE}{SLOT_STYLE}">3.00</td>"#)));
    }

    #[test]
    fn test_two_decimals_and_missing() {
        let html = render_table(&sample());
        assert!(html.contains(">1.50</td>"));
        assert!(html.contains(">4.00</td>"));
        assert!(html.contains(">-</td>"));
    }

    #[test]
    fn test_document_wraps_table() {
        let report = sample();
        let doc = render_document(&report);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Audiente 30.01.2026</title>"));
        assert!(doc.contains("Friday"));
        assert!(doc.contains(&render_table(&report)));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>&'\""), "&lt;b&gt;&amp;&#39;&quot;");
    }
}
