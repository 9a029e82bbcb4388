use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::{
    AgentGroup, AgentRecord, AgentRoster, DealInputs, share_summary, whatsapp_share_url,
};
use crate::settings::{Settings, load_settings};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliAgentGroup {
    Listing,
    #[value(alias = "sole-mandate")]
    Sole,
    Selling,
}

impl From<CliAgentGroup> for AgentGroup {
    fn from(value: CliAgentGroup) -> Self {
        match value {
            CliAgentGroup::Listing => AgentGroup::Listing,
            CliAgentGroup::Sole => AgentGroup::Sole,
            CliAgentGroup::Selling => AgentGroup::Selling,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct AgentSpec {
    group: CliAgentGroup,
    name: String,
    pool: f64,
    office_split: f64,
    paye: f64,
}

#[derive(Parser, Debug)]
#[command(
    name = "commission",
    about = "Real-estate commission calculator (fees, VAT, PAYE and agent splits)"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Configuration file; defaults to ./commission.toml when present"
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculator page and JSON API
    Serve {
        #[arg(long, help = "Port to listen on; overrides server.port")]
        port: Option<u16>,
        #[arg(long, help = "Address to bind; overrides server.host")]
        host: Option<String>,
    },
    /// Print the plain-text deal summary
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[arg(long)]
    purchase_price: Option<f64>,
    #[arg(long, help = "Gross commission including VAT")]
    gross_commission: Option<f64>,
    #[arg(long, help = "VAT rate in percent, e.g. 15")]
    vat_rate: Option<f64>,
    #[arg(long)]
    admin_fee: Option<f64>,
    #[arg(
        long = "agent",
        value_parser = parse_agent_spec,
        help = "group:name:pool:office-split:paye, repeatable; defaults to the starting roster"
    )]
    agents: Vec<AgentSpec>,
    #[arg(long, help = "Also print the WhatsApp share link")]
    share_url: bool,
}

pub async fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            print!("{e}");
            return Ok(());
        }
        Err(e) => return Err(e.to_string()),
    };
    let mut settings = load_settings(cli.config.as_deref()).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Serve { port, host } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(host) = host {
                settings.server.host = host;
            }
            crate::api::run_http_server(settings)
                .await
                .map_err(|e| format!("Server error: {e}"))
        }
        Command::Summary(args) => {
            println!("{}", render_summary(&settings, args)?);
            Ok(())
        }
    }
}

fn render_summary(settings: &Settings, args: SummaryArgs) -> Result<String, String> {
    let inputs = build_inputs(settings, &args);
    let roster = build_roster(args.agents)?;
    let breakdown = roster.recalculate(&inputs);

    let mut out = share_summary(&breakdown, &settings.currency.symbol);
    if args.share_url {
        let url = whatsapp_share_url(&out);
        out.push('\n');
        out.push_str(&url);
    }
    Ok(out)
}

fn build_inputs(settings: &Settings, args: &SummaryArgs) -> DealInputs {
    let deal = &settings.deal;
    DealInputs {
        purchase_price: args.purchase_price.unwrap_or(deal.purchase_price),
        gross_commission_incl: args.gross_commission.unwrap_or(deal.gross_commission),
        vat_rate: args.vat_rate.unwrap_or(deal.vat_rate_percent) / 100.0,
        admin_fee: args.admin_fee.unwrap_or(deal.admin_fee),
    }
}

fn build_roster(agents: Vec<AgentSpec>) -> Result<AgentRoster, String> {
    if agents.is_empty() {
        return Ok(AgentRoster::with_default_agents());
    }
    let records = agents
        .into_iter()
        .zip(1u32..)
        .map(|(spec, id)| AgentRecord {
            id,
            name: spec.name,
            group: spec.group.into(),
            pool_percent: spec.pool,
            office_split_percent: spec.office_split,
            paye_percent: spec.paye,
        })
        .collect();
    AgentRoster::from_records(records).map_err(|e| format!("--agent: {e}"))
}

fn parse_agent_spec(raw: &str) -> Result<AgentSpec, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [group, name, pool, office_split, paye] = parts.as_slice() else {
        return Err(format!(
            "expected group:name:pool:office-split:paye, got {raw:?}"
        ));
    };
    let group = CliAgentGroup::from_str(*group, true)
        .map_err(|_| format!("unknown agent group {group:?}; use listing, sole or selling"))?;
    let percent = |label: &str, value: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("{label} must be a number, got {value:?}"))
    };

    Ok(AgentSpec {
        group,
        name: name.trim().to_string(),
        pool: percent("pool", *pool)?,
        office_split: percent("office-split", *office_split)?,
        paye: percent("paye", *paye)?,
    })
}
