//! Snapshot exporters. Each one turns a computed breakdown into a downloadable
//! artefact; none of them recompute anything.

use std::fmt::Write as _;

use serde::Deserialize;
use thiserror::Error;

use crate::core::{
    AgentGroup, DealBreakdown, chart_slices, format_currency, share_summary, summary_table,
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render snapshot: {0}")]
    Render(#[from] std::fmt::Error),
}

pub struct Snapshot<'a> {
    pub breakdown: &'a DealBreakdown,
    pub currency_symbol: &'a str,
}

pub trait SnapshotExporter {
    fn file_name(&self) -> &'static str;
    fn content_type(&self) -> &'static str;
    fn export(&self, snapshot: &Snapshot<'_>) -> Result<Vec<u8>, ExportError>;
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Html,
    #[serde(alias = "txt")]
    Text,
}

impl ExportFormat {
    pub fn exporter(self) -> Box<dyn SnapshotExporter + Send + Sync> {
        match self {
            ExportFormat::Html => Box::new(HtmlReportExporter),
            ExportFormat::Text => Box::new(TextSummaryExporter),
        }
    }
}

/// Plain-text share summary.
pub struct TextSummaryExporter;

impl SnapshotExporter for TextSummaryExporter {
    fn file_name(&self) -> &'static str {
        "commission_calculator.txt"
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn export(&self, snapshot: &Snapshot<'_>) -> Result<Vec<u8>, ExportError> {
        Ok(share_summary(snapshot.breakdown, snapshot.currency_symbol).into_bytes())
    }
}

/// Self-contained printable page; the browser's print dialog turns it into
/// the PDF.
pub struct HtmlReportExporter;

impl SnapshotExporter for HtmlReportExporter {
    fn file_name(&self) -> &'static str {
        "commission_calculator.html"
    }

    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn export(&self, snapshot: &Snapshot<'_>) -> Result<Vec<u8>, ExportError> {
        let b = snapshot.breakdown;
        let money = |value: f64| format_currency(snapshot.currency_symbol, value);
        let mut html = String::with_capacity(4096);

        html.push_str(
            "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Commission Calculator</title>\n<style>\
             body{font-family:Inter,sans-serif;margin:2rem;color:#222}\
             table{border-collapse:collapse;width:100%;margin-bottom:1.5rem}\
             th,td{border:1px solid #ccc;padding:.35rem .6rem;text-align:left}\
             td.num{text-align:right}\
             @media print{body{margin:0}}\
             </style>\n</head>\n<body onload=\"window.print()\">\n\
             <h1>Commission Calculator</h1>\n",
        );

        let deal_rows = [
            ("Purchase Price", b.purchase_price),
            ("Gross Commission (incl VAT)", b.gross_commission_incl),
            ("VAT on Gross Commission", b.vat_on_gross_commission),
            ("Gross Commission (excl VAT)", b.gross_commission_excl),
            ("Service Fee (excl VAT)", b.service_fee_excl),
            ("VAT on Service Fee", b.service_fee_vat),
            ("Total Service Fees (incl VAT)", b.service_fee_incl),
            ("Admin Fee (to Office)", b.admin_fee),
            ("Net Commission before Office Split", b.net_commission_before_split),
        ];
        write_amount_table(&mut html, "Deal Breakdown", &deal_rows, &money)?;

        let total_rows = [
            ("Total Office Share", b.total_office_share),
            ("Commission Payable to Office", b.commission_payable_to_office),
            ("Total VAT Collected", b.total_vat_collected),
            ("Total VAT Payable", b.total_vat_payable),
            ("Total PAYE Payable", b.total_paye),
            ("Total Net Commissions to Agents", b.total_net_to_agents),
        ];
        write_amount_table(&mut html, "Key Financial Totals", &total_rows, &money)?;

        let rows = summary_table(b, snapshot.currency_symbol);
        if !rows.is_empty() {
            html.push_str(
                "<h2>Agent Commission Summary</h2>\n<table>\n<thead><tr><th>Group</th>\
                 <th>Name</th><th>Pool %</th><th>Office Share</th><th>PAYE</th>\
                 <th>Take Home</th></tr></thead>\n<tbody>\n",
            );
            for row in rows {
                writeln!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td>\
                     <td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
                    group_label(row.group),
                    escape_html(&row.name),
                    row.pool,
                    row.office_share,
                    row.paye,
                    row.take_home
                )?;
            }
            html.push_str("</tbody>\n</table>\n");
        }

        html.push_str("<h2>Distribution</h2>\n<ul>\n");
        for slice in chart_slices(b) {
            writeln!(
                html,
                "<li><span style=\"color:{}\">&#9632;</span> {}: {}</li>",
                slice.color, slice.label, slice.percent_label
            )?;
        }
        html.push_str("</ul>\n</body>\n</html>\n");
        Ok(html.into_bytes())
    }
}

fn write_amount_table(
    html: &mut String,
    title: &str,
    rows: &[(&str, f64)],
    money: &dyn Fn(f64) -> String,
) -> Result<(), ExportError> {
    writeln!(html, "<h2>{title}</h2>\n<table>\n<tbody>")?;
    for (label, value) in rows {
        writeln!(
            html,
            "<tr><th>{label}</th><td class=\"num\">{}</td></tr>",
            money(*value)
        )?;
    }
    html.push_str("</tbody>\n</table>\n");
    Ok(())
}

fn group_label(group: AgentGroup) -> &'static str {
    match group {
        AgentGroup::Listing => "Listing",
        AgentGroup::Sole => "Sole Mandate",
        AgentGroup::Selling => "Selling",
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
