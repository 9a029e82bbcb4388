use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentGroup {
    Listing,
    Sole,
    Selling,
}

impl AgentGroup {
    pub const ALL: [AgentGroup; 3] = [AgentGroup::Listing, AgentGroup::Sole, AgentGroup::Selling];

    pub fn heading(self) -> &'static str {
        match self {
            AgentGroup::Listing => "Listing Agent(s):",
            AgentGroup::Sole => "Sole Mandate Agent(s):",
            AgentGroup::Selling => "Selling Agent(s):",
        }
    }

    /// Sole mandate rows are fixed: never added or removed after the roster exists.
    pub fn is_removable(self) -> bool {
        !matches!(self, AgentGroup::Sole)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealInputs {
    pub purchase_price: f64,
    pub gross_commission_incl: f64,
    /// Fraction, e.g. 0.15 for 15%.
    pub vat_rate: f64,
    pub admin_fee: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: u32,
    pub name: String,
    pub group: AgentGroup,
    pub pool_percent: f64,
    pub office_split_percent: f64,
    pub paye_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBreakdown {
    pub id: u32,
    pub name: String,
    pub group: AgentGroup,
    pub pool_percent: f64,
    pub share: f64,
    pub office_share: f64,
    pub agent_share_before_paye: f64,
    pub paye_amount: f64,
    pub take_home: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotals {
    pub listing: f64,
    pub sole: f64,
    pub selling: f64,
}

impl GroupTotals {
    pub fn get(&self, group: AgentGroup) -> f64 {
        match group {
            AgentGroup::Listing => self.listing,
            AgentGroup::Sole => self.sole,
            AgentGroup::Selling => self.selling,
        }
    }

    pub(crate) fn add(&mut self, group: AgentGroup, amount: f64) {
        match group {
            AgentGroup::Listing => self.listing += amount,
            AgentGroup::Sole => self.sole += amount,
            AgentGroup::Selling => self.selling += amount,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealBreakdown {
    pub purchase_price: f64,
    pub gross_commission_incl: f64,
    pub gross_commission_excl: f64,
    pub vat_on_gross_commission: f64,
    pub vat_rate: f64,
    pub service_fee_excl: f64,
    pub service_fee_vat: f64,
    pub service_fee_incl: f64,
    pub admin_fee: f64,
    pub total_fees_excl: f64,
    pub net_commission_before_split: f64,
    pub agents: Vec<AgentBreakdown>,
    pub group_take_home: GroupTotals,
    pub total_office_share: f64,
    pub total_paye: f64,
    pub total_net_to_agents: f64,
    pub total_vat_collected: f64,
    pub total_vat_payable: f64,
    pub commission_payable_to_office: f64,
}

impl DealBreakdown {
    pub fn agents_in(&self, group: AgentGroup) -> impl Iterator<Item = &AgentBreakdown> {
        self.agents.iter().filter(move |agent| agent.group == group)
    }
}
