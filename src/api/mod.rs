use axum::{
    Router,
    extract::{Json, Query, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::core::{
    AgentDraft, AgentGroup, AgentRecord, AgentRoster, ChartSlice, DealBreakdown, DealInputs,
    RosterError, SummaryRow, chart_slices, format_currency, share_summary, summary_table, whatsapp_share_url,
};
use crate::export::{ExportFormat, Snapshot};
use crate::settings::Settings;

mod error;
mod session;

pub use error::ApiError;
pub use session::{SessionGate, StaticSessionGate};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

pub struct AppState {
    settings: Settings,
    gate: Box<dyn SessionGate>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let gate = StaticSessionGate::new(settings.session.authenticated);
        Self::with_gate(settings, Box::new(gate))
    }

    pub fn with_gate(settings: Settings, gate: Box<dyn SessionGate>) -> Self {
        Self { settings, gate }
    }

    fn symbol(&self) -> &str {
        &self.settings.currency.symbol
    }

    fn require_session(&self) -> Result<(), ApiError> {
        if self.gate.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiAgentGroup {
    Listing,
    #[serde(alias = "soleMandate", alias = "sole_mandate", alias = "sole-mandate")]
    Sole,
    Selling,
}

impl From<ApiAgentGroup> for AgentGroup {
    fn from(value: ApiAgentGroup) -> Self {
        match value {
            ApiAgentGroup::Listing => AgentGroup::Listing,
            ApiAgentGroup::Sole => AgentGroup::Sole,
            ApiAgentGroup::Selling => AgentGroup::Selling,
        }
    }
}

/// A form value read the way a browser reads an input: numbers pass through,
/// strings contribute their leading number, anything else is zero.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct LenientNumber(f64);

impl<'de> Deserialize<'de> for LenientNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(LenientNumber(lenient_f64(&value)))
    }
}

fn lenient_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_leading_number(s),
        _ => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

fn parse_leading_number(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let candidate_len = trimmed
        .find(|c: char| !matches!(c, '0'..='9' | '.' | '+' | '-' | 'e' | 'E'))
        .unwrap_or(trimmed.len());
    let candidate = &trimmed[..candidate_len];
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AgentPayload {
    id: Option<u32>,
    name: Option<String>,
    group: Option<ApiAgentGroup>,
    #[serde(alias = "poolPercent")]
    pool: LenientNumber,
    #[serde(alias = "officeSplitPercent")]
    office_split: LenientNumber,
    #[serde(alias = "payePercent")]
    paye: LenientNumber,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    purchase_price: LenientNumber,
    #[serde(alias = "grossCommissionIncl")]
    gross_commission: LenientNumber,
    /// Percent, as typed into the form.
    vat_rate: LenientNumber,
    admin_fee: LenientNumber,
    agents: Option<Vec<AgentPayload>>,
}

#[derive(Debug)]
struct CalculateRequest {
    inputs: DealInputs,
    roster: AgentRoster,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExportQuery {
    format: Option<ExportFormat>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DisplayFields {
    purchase_price: String,
    gross_commission: String,
    vat_on_gross_commission: String,
    gross_commission_excl: String,
    service_fee_excl: String,
    service_fee_vat: String,
    service_fee_incl: String,
    admin_fee: String,
    total_fees_excl: String,
    net_before_split: String,
    total_office_share: String,
    commission_payable_office: String,
    total_vat_collected: String,
    total_vat_payable: String,
    total_paye: String,
    total_net_to_agents: String,
}

impl DisplayFields {
    fn new(b: &DealBreakdown, symbol: &str) -> Self {
        let money = |value: f64| format_currency(symbol, value);
        Self {
            purchase_price: money(b.purchase_price),
            gross_commission: money(b.gross_commission_incl),
            vat_on_gross_commission: money(b.vat_on_gross_commission),
            gross_commission_excl: money(b.gross_commission_excl),
            service_fee_excl: money(b.service_fee_excl),
            service_fee_vat: money(b.service_fee_vat),
            service_fee_incl: money(b.service_fee_incl),
            admin_fee: money(b.admin_fee),
            total_fees_excl: money(b.total_fees_excl),
            net_before_split: money(b.net_commission_before_split),
            total_office_share: money(b.total_office_share),
            commission_payable_office: money(b.commission_payable_to_office),
            total_vat_collected: money(b.total_vat_collected),
            total_vat_payable: money(b.total_vat_payable),
            total_paye: money(b.total_paye),
            total_net_to_agents: money(b.total_net_to_agents),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    currency_symbol: String,
    agents: Vec<AgentRecord>,
    breakdown: DealBreakdown,
    display: DisplayFields,
    summary_table: Vec<SummaryRow>,
    chart: Vec<ChartSlice>,
    share_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareResponse {
    message: String,
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewAgentDefaults {
    pool: f64,
    office_split: f64,
    paye: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsResponse {
    currency_symbol: String,
    purchase_price: f64,
    gross_commission: f64,
    vat_rate: f64,
    admin_fee: f64,
    agents: Vec<AgentRecord>,
    new_agent: NewAgentDefaults,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/health", get(health_handler))
        .route("/api/defaults", get(defaults_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/share", post(share_handler))
        .route("/api/export", post(export_handler))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(settings: Settings) -> std::io::Result<()> {
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let app = router(Arc::new(AppState::new(settings)));

    let listener = TcpListener::bind((host.as_str(), port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Commission calculator listening on http://{addr}");
    tracing::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    if !state.gate.is_authenticated() {
        tracing::info!(
            login_url = %state.settings.session.login_url,
            "redirecting unauthenticated visitor"
        );
        return Redirect::to(&state.settings.session.login_url).into_response();
    }
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> Response {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> Response {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> Response {
    with_cache_control("OK")
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn defaults_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    state.require_session()?;
    let deal = &state.settings.deal;
    let new_row = AgentDraft::new_row();
    let body = DefaultsResponse {
        currency_symbol: state.symbol().to_string(),
        purchase_price: deal.purchase_price,
        gross_commission: deal.gross_commission,
        vat_rate: deal.vat_rate_percent,
        admin_fee: deal.admin_fee,
        agents: AgentRoster::with_default_agents().records().to_vec(),
        new_agent: NewAgentDefaults {
            pool: new_row.pool_percent,
            office_split: new_row.office_split_percent,
            paye: new_row.paye_percent,
        },
    };
    Ok(json_response(StatusCode::OK, body))
}

async fn calculate_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<CalculatePayload>,
) -> Result<Response, ApiError> {
    calculate_handler_impl(&state, payload)
}

async fn calculate_post_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculatePayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    calculate_handler_impl(&state, payload)
}

fn calculate_handler_impl(
    state: &AppState,
    payload: CalculatePayload,
) -> Result<Response, ApiError> {
    state.require_session()?;
    let request = calculate_request_from_payload(payload)?;
    let breakdown = request.roster.recalculate(&request.inputs);
    let response = build_calculate_response(&request.roster, breakdown, state.symbol());
    Ok(json_response(StatusCode::OK, response))
}

async fn share_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculatePayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    state.require_session()?;
    let Json(payload) = payload?;
    let request = calculate_request_from_payload(payload)?;
    let breakdown = request.roster.recalculate(&request.inputs);
    let message = share_summary(&breakdown, state.symbol());
    let url = whatsapp_share_url(&message);
    Ok(json_response(StatusCode::OK, ShareResponse { message, url }))
}

async fn export_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
    payload: Result<Json<CalculatePayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    state.require_session()?;
    let Json(payload) = payload?;
    let request = calculate_request_from_payload(payload)?;
    let breakdown = request.roster.recalculate(&request.inputs);

    let exporter = query.format.unwrap_or_default().exporter();
    let bytes = exporter.export(&Snapshot {
        breakdown: &breakdown,
        currency_symbol: state.symbol(),
    })?;
    tracing::info!(
        file = exporter.file_name(),
        bytes = bytes.len(),
        "exported snapshot"
    );

    let disposition = format!("attachment; filename=\"{}\"", exporter.file_name());
    let mut response =
        with_cache_control(([(header::CONTENT_TYPE, exporter.content_type())], bytes));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

pub(crate) fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn calculate_request_from_json(json: &str) -> Result<CalculateRequest, ApiError> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| ApiError::BadRequest(format!("Invalid API JSON payload: {e}")))?;
    calculate_request_from_payload(payload)
}

fn calculate_request_from_payload(
    payload: CalculatePayload,
) -> Result<CalculateRequest, ApiError> {
    let inputs = DealInputs {
        purchase_price: payload.purchase_price.0,
        gross_commission_incl: payload.gross_commission.0,
        vat_rate: payload.vat_rate.0 / 100.0,
        admin_fee: payload.admin_fee.0,
    };

    let roster = match payload.agents {
        None => AgentRoster::with_default_agents(),
        Some(agents) => AgentRoster::from_records(agent_records_from_payload(agents)?)?,
    };

    Ok(CalculateRequest { inputs, roster })
}

fn agent_records_from_payload(
    agents: Vec<AgentPayload>,
) -> Result<Vec<AgentRecord>, ApiError> {
    let mut next_id = match agents.iter().filter_map(|agent| agent.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    };

    agents
        .into_iter()
        .enumerate()
        .map(|(index, agent)| {
            let Some(group) = agent.group else {
                return Err(ApiError::BadRequest(format!(
                    "agents[{index}].group must be one of listing, sole, selling"
                )));
            };
            let id = match agent.id {
                Some(id) => id,
                None => {
                    let id = next_id.ok_or(RosterError::IdSpaceExhausted)?;
                    next_id = id.checked_add(1);
                    id
                }
            };
            Ok(AgentRecord {
                id,
                name: agent.name.unwrap_or_default(),
                group: group.into(),
                pool_percent: agent.pool.0,
                office_split_percent: agent.office_split.0,
                paye_percent: agent.paye.0,
            })
        })
        .collect()
}

fn build_calculate_response(
    roster: &AgentRoster,
    breakdown: DealBreakdown,
    symbol: &str,
) -> CalculateResponse {
    let message = share_summary(&breakdown, symbol);
    CalculateResponse {
        currency_symbol: symbol.to_string(),
        agents: roster.records().to_vec(),
        display: DisplayFields::new(&breakdown, symbol),
        summary_table: summary_table(&breakdown, symbol),
        chart: chart_slices(&breakdown),
        share_url: whatsapp_share_url(&message),
        breakdown,
    }
}
