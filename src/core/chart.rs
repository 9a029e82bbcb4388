use serde::Serialize;

use super::types::DealBreakdown;

pub const CHART_LABELS: [&str; 7] = [
    "Office Share",
    "Brand Fees",
    "Total PAYE",
    "Total VAT",
    "Listing Agents Net",
    "Sole Mandate Net",
    "Selling Agents Net",
];

pub const CHART_COLORS: [&str; 7] = [
    "#feca57", "#ff9f43", "#ee5253", "#48dbfb", "#1dd1a1", "#5f27cd", "#54a0ff",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSlice {
    pub label: &'static str,
    pub color: &'static str,
    pub weight: f64,
    /// Share of the pie, one decimal, e.g. `"12.5%"`.
    pub percent_label: String,
}

/// Raw category weights in `CHART_LABELS` order.
pub fn chart_weights(breakdown: &DealBreakdown) -> [f64; 7] {
    [
        breakdown.total_office_share,
        breakdown.service_fee_excl + breakdown.admin_fee,
        breakdown.total_paye,
        breakdown.total_vat_collected,
        breakdown.group_take_home.listing,
        breakdown.group_take_home.sole,
        breakdown.group_take_home.selling,
    ]
}

/// Weights handed to the renderer. Weights summing to exactly zero become
/// seven equal slices; negative weights are passed through untouched.
pub fn chart_slices(breakdown: &DealBreakdown) -> Vec<ChartSlice> {
    let mut weights = chart_weights(breakdown);
    if weights.iter().sum::<f64>() == 0.0 {
        weights = [1.0; 7];
    }
    let total: f64 = weights.iter().sum();

    weights
        .iter()
        .zip(CHART_LABELS)
        .zip(CHART_COLORS)
        .map(|((&weight, label), color)| ChartSlice {
            label,
            color,
            weight,
            percent_label: if total.is_finite() && total > 0.0 {
                format!("{:.1}%", weight / total * 100.0)
            } else {
                String::new()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AgentRoster, DealInputs, GroupTotals, allocate};

    #[test]
    fn all_zero_breakdown_falls_back_to_equal_weights() {
        let slices = chart_slices(&allocate(&DealInputs::default(), &[]));
        assert_eq!(slices.len(), 7);
        for slice in &slices {
            assert_eq!(slice.weight, 1.0);
            assert_eq!(slice.percent_label, "14.3%");
        }
    }

    #[test]
    fn weights_follow_breakdown_aggregates() {
        let inputs = DealInputs {
            purchase_price: 1_000_000.0,
            gross_commission_incl: 60_000.0,
            vat_rate: 0.15,
            admin_fee: 500.0,
        };
        let breakdown = AgentRoster::with_default_agents().recalculate(&inputs);
        let slices = chart_slices(&breakdown);

        assert_eq!(slices[0].weight, breakdown.total_office_share);
        assert_eq!(slices[1].weight, 3_500.0);
        assert_eq!(slices[2].weight, breakdown.total_paye);
        assert_eq!(slices[3].weight, breakdown.total_vat_collected);
        assert_eq!(slices[6].weight, breakdown.group_take_home.selling);
        assert_eq!(slices[4].label, "Listing Agents Net");
        assert_eq!(slices[4].color, "#1dd1a1");
    }

    #[test]
    fn single_non_zero_category_keeps_zero_slices() {
        let breakdown = DealBreakdown {
            total_office_share: 250.0,
            ..DealBreakdown::default()
        };
        let slices = chart_slices(&breakdown);
        assert_eq!(slices[0].weight, 250.0);
        assert_eq!(slices[0].percent_label, "100.0%");
        assert!(slices[1..].iter().all(|s| s.weight == 0.0));
        assert_eq!(slices[1].percent_label, "0.0%");
    }

    #[test]
    fn cancelling_weights_also_fall_back() {
        let breakdown = DealBreakdown {
            total_office_share: 100.0,
            group_take_home: GroupTotals {
                listing: -100.0,
                ..GroupTotals::default()
            },
            ..DealBreakdown::default()
        };
        assert_eq!(chart_weights(&breakdown)[4], -100.0);

        let slices = chart_slices(&breakdown);
        assert!(slices.iter().all(|s| s.weight == 1.0));
        assert!(slices.iter().all(|s| s.percent_label == "14.3%"));
    }

    #[test]
    fn negative_weights_pass_through() {
        let breakdown = DealBreakdown {
            total_office_share: 300.0,
            group_take_home: GroupTotals {
                selling: -100.0,
                ..GroupTotals::default()
            },
            ..DealBreakdown::default()
        };
        let slices = chart_slices(&breakdown);
        assert_eq!(slices[0].weight, 300.0);
        assert_eq!(slices[6].weight, -100.0);
        assert_eq!(slices[0].percent_label, "150.0%");
        assert_eq!(slices[6].percent_label, "-50.0%");
    }

    #[test]
    fn non_finite_total_leaves_percent_labels_empty() {
        let inputs = DealInputs {
            gross_commission_incl: 60_000.0,
            vat_rate: -1.0,
            ..DealInputs::default()
        };
        let slices = chart_slices(&AgentRoster::with_default_agents().recalculate(&inputs));
        assert_eq!(slices.len(), 7);
        assert!(slices.iter().all(|s| s.percent_label.is_empty()));
    }
}
