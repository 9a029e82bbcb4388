use super::types::{AgentBreakdown, AgentRecord, DealBreakdown, DealInputs, GroupTotals};

/// Brand service fee, charged on the VAT-inclusive gross commission.
pub const SERVICE_FEE_RATE: f64 = 0.05;

#[derive(Debug, Clone, Copy)]
struct FeeStage {
    gross_commission_excl: f64,
    vat_on_gross_commission: f64,
    service_fee_excl: f64,
    service_fee_vat: f64,
    total_fees_excl: f64,
    net_commission_before_split: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct AgentTotals {
    office_share: f64,
    paye: f64,
    take_home: f64,
}

/// Runs one recompute pass over the deal and the agents in the order given.
///
/// Non-finite inputs count as zero. Percentages are used as-is: nothing is
/// clamped and pool percentages are not required to sum to 100.
pub fn allocate(inputs: &DealInputs, agents: &[AgentRecord]) -> DealBreakdown {
    let inputs = normalize_inputs(inputs);
    let fees = fee_stage(&inputs);

    let mut totals = AgentTotals::default();
    let mut group_take_home = GroupTotals::default();
    let mut agent_rows = Vec::with_capacity(agents.len());

    for agent in agents {
        let row = split_agent_share(fees.net_commission_before_split, agent);
        totals.office_share += row.office_share;
        totals.paye += row.paye_amount;
        totals.take_home += row.take_home;
        group_take_home.add(row.group, row.take_home);
        agent_rows.push(row);
    }

    let admin_fee_vat = inputs.admin_fee * inputs.vat_rate;

    tracing::debug!(
        agents = agent_rows.len(),
        net_commission_before_split = fees.net_commission_before_split,
        "recomputed deal breakdown"
    );

    DealBreakdown {
        purchase_price: inputs.purchase_price,
        gross_commission_incl: inputs.gross_commission_incl,
        gross_commission_excl: fees.gross_commission_excl,
        vat_on_gross_commission: fees.vat_on_gross_commission,
        vat_rate: inputs.vat_rate,
        service_fee_excl: fees.service_fee_excl,
        service_fee_vat: fees.service_fee_vat,
        service_fee_incl: fees.service_fee_excl + fees.service_fee_vat,
        admin_fee: inputs.admin_fee,
        total_fees_excl: fees.total_fees_excl,
        net_commission_before_split: fees.net_commission_before_split,
        agents: agent_rows,
        group_take_home,
        total_office_share: totals.office_share,
        total_paye: totals.paye,
        total_net_to_agents: totals.take_home,
        total_vat_collected: fees.vat_on_gross_commission + fees.service_fee_vat + admin_fee_vat,
        total_vat_payable: fees.service_fee_vat + admin_fee_vat,
        commission_payable_to_office: totals.office_share
            + fees.service_fee_excl
            + inputs.admin_fee,
    }
}

fn normalize_inputs(inputs: &DealInputs) -> DealInputs {
    DealInputs {
        purchase_price: finite_or_zero(inputs.purchase_price),
        gross_commission_incl: finite_or_zero(inputs.gross_commission_incl),
        vat_rate: finite_or_zero(inputs.vat_rate),
        admin_fee: finite_or_zero(inputs.admin_fee),
    }
}

fn fee_stage(inputs: &DealInputs) -> FeeStage {
    let gross_commission_excl = inputs.gross_commission_incl / (1.0 + inputs.vat_rate);
    let vat_on_gross_commission = inputs.gross_commission_incl - gross_commission_excl;
    let service_fee_excl = inputs.gross_commission_incl * SERVICE_FEE_RATE;
    let service_fee_vat = service_fee_excl * inputs.vat_rate;
    let total_fees_excl = service_fee_excl + inputs.admin_fee;

    FeeStage {
        gross_commission_excl,
        vat_on_gross_commission,
        service_fee_excl,
        service_fee_vat,
        total_fees_excl,
        net_commission_before_split: gross_commission_excl - total_fees_excl,
    }
}

fn split_agent_share(net_commission_before_split: f64, agent: &AgentRecord) -> AgentBreakdown {
    let pool = finite_or_zero(agent.pool_percent);
    let office_split = finite_or_zero(agent.office_split_percent);
    let paye = finite_or_zero(agent.paye_percent);

    let share = net_commission_before_split * pool / 100.0;
    let office_share = share * (1.0 - office_split / 100.0);
    let agent_share_before_paye = share * (office_split / 100.0);
    let paye_amount = agent_share_before_paye * (paye / 100.0);

    AgentBreakdown {
        id: agent.id,
        name: agent.name.clone(),
        group: agent.group,
        pool_percent: pool,
        share,
        office_share,
        agent_share_before_paye,
        paye_amount,
        take_home: agent_share_before_paye - paye_amount,
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
