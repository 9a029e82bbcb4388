use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::core::{DEFAULT_CURRENCY_SYMBOL, DealInputs};

pub const DEFAULT_CONFIG_FILE: &str = "commission.toml";
const ENV_PREFIX: &str = "COMMISSION";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub currency: CurrencySettings,
    pub deal: DealDefaults,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencySettings {
    pub symbol: String,
}

/// Starting values for a new calculation. The VAT rate is in percent here,
/// as it is entered on the form.
#[derive(Debug, Clone, Deserialize)]
pub struct DealDefaults {
    pub purchase_price: f64,
    pub gross_commission: f64,
    pub vat_rate_percent: f64,
    pub admin_fee: f64,
}

impl DealDefaults {
    pub fn to_inputs(&self) -> DealInputs {
        DealInputs {
            purchase_price: self.purchase_price,
            gross_commission_incl: self.gross_commission,
            vat_rate: self.vat_rate_percent / 100.0,
            admin_fee: self.admin_fee,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub authenticated: bool,
    pub login_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            currency: CurrencySettings {
                symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            },
            deal: DealDefaults {
                purchase_price: 1_000_000.0,
                gross_commission: 60_000.0,
                vat_rate_percent: 15.0,
                admin_fee: 500.0,
            },
            session: SessionSettings {
                authenticated: true,
                login_url: "/login.html".to_string(),
            },
        }
    }
}

/// Loads settings: built-in defaults, then the TOML file (required only when
/// a path is given explicitly), then `COMMISSION__SECTION__KEY` variables.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let defaults = Settings::default();
    let mut builder = config::Config::builder()
        .set_default("server.host", defaults.server.host)?
        .set_default("server.port", i64::from(defaults.server.port))?
        .set_default("currency.symbol", defaults.currency.symbol)?
        .set_default("deal.purchase_price", defaults.deal.purchase_price)?
        .set_default("deal.gross_commission", defaults.deal.gross_commission)?
        .set_default("deal.vat_rate_percent", defaults.deal.vat_rate_percent)?
        .set_default("deal.admin_fee", defaults.deal.admin_fee)?
        .set_default("session.authenticated", defaults.session.authenticated)?
        .set_default("session.login_url", defaults.session.login_url)?;

    builder = match path {
        Some(path) => builder.add_source(config::File::from(path).required(true)),
        None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
    };

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<Settings>()?;

    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if settings.currency.symbol.trim().is_empty() {
        return Err(SettingsError::Invalid(
            "currency.symbol must not be empty".to_string(),
        ));
    }
    if settings.session.login_url.trim().is_empty() {
        return Err(SettingsError::Invalid(
            "session.login_url must not be empty".to_string(),
        ));
    }
    let deal = &settings.deal;
    let deal_values = [
        ("deal.purchase_price", deal.purchase_price),
        ("deal.gross_commission", deal.gross_commission),
        ("deal.vat_rate_percent", deal.vat_rate_percent),
        ("deal.admin_fee", deal.admin_fee),
    ];
    for (key, value) in deal_values {
        if !value.is_finite() {
            return Err(SettingsError::Invalid(format!("{key} must be a finite number")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_config(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "commission-settings-{}-{name}.toml",
            std::process::id()
        ));
        fs::write(&path, body).expect("failed to write temp config");
        path
    }

    #[test]
    fn defaults_describe_the_starting_deal() {
        let settings = Settings::default();
        let inputs = settings.deal.to_inputs();
        assert_eq!(inputs.gross_commission_incl, 60_000.0);
        assert!((inputs.vat_rate - 0.15).abs() < 1e-12);
        assert_eq!(settings.currency.symbol, "R");
        assert!(settings.session.authenticated);
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_config(
            "override",
            "[server]\nport = 9090\n\n[deal]\nadmin_fee = 750.0\n\n[currency]\nsymbol = \"ZAR\"\n",
        );
        let settings = load_settings(Some(&path)).expect("settings should load");
        fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.deal.admin_fee, 750.0);
        assert_eq!(settings.deal.gross_commission, 60_000.0);
        assert_eq!(settings.currency.symbol, "ZAR");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("commission-settings-does-not-exist.toml");
        let err = load_settings(Some(&path)).expect_err("missing file must fail");
        assert!(matches!(err, SettingsError::Load(_)));
    }

    #[test]
    fn blank_currency_symbol_is_rejected() {
        let path = temp_config("blank-symbol", "[currency]\nsymbol = \"  \"\n");
        let err = load_settings(Some(&path)).expect_err("blank symbol must fail");
        fs::remove_file(&path).ok();
        assert!(err.to_string().contains("currency.symbol"));
    }
}
