mod chart;
mod engine;
mod format;
mod roster;
mod share;
mod types;

pub use chart::{CHART_COLORS, CHART_LABELS, ChartSlice, chart_slices, chart_weights};
pub use engine::{SERVICE_FEE_RATE, allocate};
pub use format::{DEFAULT_CURRENCY_SYMBOL, format_currency, format_percent};
pub use roster::{AgentDraft, AgentRoster, AgentUpdate, RosterError};
pub use share::{SummaryRow, share_summary, summary_table, whatsapp_share_url};
pub use types::{
    AgentBreakdown, AgentGroup, AgentRecord, DealBreakdown, DealInputs, GroupTotals,
};
