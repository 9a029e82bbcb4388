use serde::Serialize;

use super::format::{format_currency, format_percent};
use super::types::{AgentGroup, DealBreakdown};

const SHARE_BASE_URL: &str = "https://wa.me/?text=";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub id: u32,
    pub group: AgentGroup,
    pub name: String,
    pub pool: String,
    pub office_share: String,
    pub paye: String,
    pub take_home: String,
}

pub fn summary_table(breakdown: &DealBreakdown, symbol: &str) -> Vec<SummaryRow> {
    AgentGroup::ALL
        .iter()
        .flat_map(|&group| breakdown.agents_in(group))
        .map(|agent| SummaryRow {
            id: agent.id,
            group: agent.group,
            name: agent.name.clone(),
            pool: format_percent(agent.pool_percent),
            office_share: format_currency(symbol, agent.office_share),
            paye: format_currency(symbol, agent.paye_amount),
            take_home: format_currency(symbol, agent.take_home),
        })
        .collect()
}

/// Plain-text message for the share link.
pub fn share_summary(breakdown: &DealBreakdown, symbol: &str) -> String {
    let money = |value: f64| format_currency(symbol, value);
    let mut lines: Vec<String> = vec![
        "Commission Calculator Summary".to_string(),
        String::new(),
        "--- Overall Deal Breakdown ---".to_string(),
        format!("Purchase Price: {}", money(breakdown.purchase_price)),
        format!(
            "Gross Commission (incl VAT): {}",
            money(breakdown.gross_commission_incl)
        ),
        format!(
            "VAT on Gross Commission: {}",
            money(breakdown.vat_on_gross_commission)
        ),
        format!(
            "Gross Commission (excl VAT): {}",
            money(breakdown.gross_commission_excl)
        ),
        format!("Service Fee (excl VAT): {}", money(breakdown.service_fee_excl)),
        format!("VAT on Service Fee: {}", money(breakdown.service_fee_vat)),
        format!("Total Service Fees (incl VAT): {}", money(breakdown.service_fee_incl)),
        format!("Admin Fee (to Office): {}", money(breakdown.admin_fee)),
        format!(
            "Net Commission before Office Split (excl VAT): {}",
            money(breakdown.net_commission_before_split)
        ),
        String::new(),
        "--- Key Financial Totals ---".to_string(),
        format!(
            "Net Commission before Office Split (All Agents): {}",
            money(breakdown.net_commission_before_split)
        ),
        format!(
            "Total Office Share (from Agents): {}",
            money(breakdown.total_office_share)
        ),
        format!(
            "Commission Payable to Office: {}",
            money(breakdown.commission_payable_to_office)
        ),
        format!("Total VAT Collected: {}", money(breakdown.total_vat_collected)),
        format!("Total VAT Payable: {}", money(breakdown.total_vat_payable)),
        format!("Total PAYE Payable: {}", money(breakdown.total_paye)),
        format!(
            "Total Net Commissions to Agents (Take Home): {}",
            money(breakdown.total_net_to_agents)
        ),
        String::new(),
        "--- Agent Commission Summary ---".to_string(),
    ];

    for group in AgentGroup::ALL {
        let mut agents = breakdown.agents_in(group).peekable();
        if agents.peek().is_none() {
            continue;
        }
        lines.push(group.heading().to_string());
        for agent in agents {
            let name = match agent.name.as_str() {
                "" => "Unnamed",
                name => name,
            };
            lines.push(format!(
                "{name}: Pool {}, Office Share {}, PAYE {}, Take Home {}",
                format_percent(agent.pool_percent),
                money(agent.office_share),
                money(agent.paye_amount),
                money(agent.take_home),
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn whatsapp_share_url(message: &str) -> String {
    format!("{SHARE_BASE_URL}{}", urlencoding::encode(message))
}
