//! User configuration: who is ordering, where to, and how to pay.
//!
//! The configuration is a singleton record in the cache. It is read once when
//! a session opens and written back when the session closes, so edits made by
//! `apizza config set` are held in memory until then.
//!
//! Field access goes through [`FIELDS`], a fixed table from dotted path to a
//! typed getter and setter. Setters validate before they write.

use crate::core::db::Database;
use crate::core::error::{ApizzaError, Result};
use crate::core::model::{Address, ServiceMethod};
use crate::core::schemas;
use crate::core::session::Session;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::LazyLock;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Card {
    pub number: String,
    pub expiration: String,
    #[serde(rename = "CVV")]
    pub cvv: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    pub name: String,
    pub email: String,
    pub address: Address,
    pub card: Card,
    pub service: ServiceMethod,
}

pub struct ConfigRepository<'a> {
    db: &'a Database,
}

impl<'a> ConfigRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Read the saved configuration, or the default one on first run.
    pub fn load(&self) -> Result<Config> {
        match self.db.get(schemas::CONFIG_KEY) {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(|e| ApizzaError::Deserialization(format!("config: {}", e))),
            Err(ApizzaError::NotFound(_)) => {
                debug!("no saved config, using defaults");
                Ok(Config::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let raw = serde_json::to_vec(config)
            .map_err(|e| ApizzaError::Serialization(format!("config: {}", e)))?;
        self.db.put(schemas::CONFIG_KEY, &raw)
    }
}

pub struct ConfigField {
    pub path: &'static str,
    pub about: &'static str,
    get: fn(&Config) -> String,
    set: fn(&mut Config, &str) -> Result<()>,
}

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));
static STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").expect("state pattern"));
static ZIPCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zipcode pattern"));
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{13,19}$").expect("card number pattern"));
static EXPIRATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("expiration pattern"));
static CVV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("cvv pattern"));

fn check(field: &str, re: &Regex, value: &str, expected: &str) -> Result<()> {
    if value.is_empty() || re.is_match(value) {
        Ok(())
    } else {
        Err(ApizzaError::ValidationError(format!(
            "'{}' is not a valid {} ({})",
            value, field, expected
        )))
    }
}

pub static FIELDS: &[ConfigField] = &[
    ConfigField {
        path: "name",
        about: "name used on orders",
        get: |c| c.name.clone(),
        set: |c, v| {
            c.name = v.to_string();
            Ok(())
        },
    },
    ConfigField {
        path: "email",
        about: "email used for order receipts",
        get: |c| c.email.clone(),
        set: |c, v| {
            check("email", &EMAIL, v, "name@host.tld")?;
            c.email = v.to_string();
            Ok(())
        },
    },
    ConfigField {
        path: "address.street",
        about: "street line of the delivery address",
        get: |c| c.address.street.clone(),
        set: |c, v| {
            c.address.street = v.to_string();
            Ok(())
        },
    },
    ConfigField {
        path: "address.cityname",
        about: "city of the delivery address",
        get: |c| c.address.city_name.clone(),
        set: |c, v| {
            c.address.city_name = v.to_string();
            Ok(())
        },
    },
    ConfigField {
        path: "address.state",
        about: "two letter state code",
        get: |c| c.address.state.clone(),
        set: |c, v| {
            check("state", &STATE, v, "two letters")?;
            c.address.state = v.to_ascii_uppercase();
            Ok(())
        },
    },
    ConfigField {
        path: "address.zipcode",
        about: "zip code, used to find the nearest store",
        get: |c| c.address.zipcode.clone(),
        set: |c, v| {
            check("zipcode", &ZIPCODE, v, "12345 or 12345-6789")?;
            c.address.zipcode = v.to_string();
            Ok(())
        },
    },
    ConfigField {
        path: "card.number",
        about: "payment card number",
        get: |c| c.card.number.clone(),
        set: |c, v| {
            let digits: String = v.chars().filter(|ch| !matches!(ch, ' ' | '-')).collect();
            check("card number", &CARD_NUMBER, &digits, "13 to 19 digits")?;
            c.card.number = digits;
            Ok(())
        },
    },
    ConfigField {
        path: "card.expiration",
        about: "card expiration as MM/YY",
        get: |c| c.card.expiration.clone(),
        set: |c, v| {
            check("expiration", &EXPIRATION, v, "MM/YY")?;
            c.card.expiration = v.to_string();
            Ok(())
        },
    },
    ConfigField {
        path: "card.cvv",
        about: "card security code",
        get: |c| c.card.cvv.clone(),
        set: |c, v| {
            check("cvv", &CVV, v, "3 or 4 digits")?;
            c.card.cvv = v.to_string();
            Ok(())
        },
    },
    ConfigField {
        path: "service",
        about: "default service method: Delivery or Carryout",
        get: |c| c.service.to_string(),
        set: |c, v| {
            c.service = v.parse()?;
            Ok(())
        },
    },
];

pub fn field(path: &str) -> Result<&'static ConfigField> {
    let wanted = path.trim().to_ascii_lowercase().replace('_', "");
    FIELDS
        .iter()
        .find(|f| f.path == wanted)
        .ok_or_else(|| ApizzaError::UnknownField(path.to_string()))
}

pub fn get(config: &Config, path: &str) -> Result<String> {
    Ok((field(path)?.get)(config))
}

pub fn set(config: &mut Config, path: &str, value: &str) -> Result<()> {
    (field(path)?.set)(config, value.trim())
}

#[derive(clap::Args, Debug)]
pub struct ConfigCli {
    #[clap(subcommand)]
    pub command: Option<ConfigCommand>,
    /// List every configurable field.
    #[clap(short, long)]
    pub list: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print one or more fields
    Get {
        #[clap(required = true)]
        fields: Vec<String>,
    },
    /// Set fields with FIELD=VALUE pairs
    Set {
        #[clap(required = true)]
        assignments: Vec<String>,
    },
}

pub fn run_config_cli(session: &mut Session, cli: ConfigCli, out: &mut dyn Write) -> Result<()> {
    if cli.list {
        for f in FIELDS {
            writeln!(out, "  {:<18} {}", f.path, f.about)?;
        }
        return Ok(());
    }

    match cli.command {
        None => {
            for f in FIELDS {
                writeln!(out, "{}: {}", f.path, (f.get)(session.config()))?;
            }
        }
        Some(ConfigCommand::Get { fields }) => {
            for path in fields {
                writeln!(out, "{}", get(session.config(), &path)?)?;
            }
        }
        Some(ConfigCommand::Set { assignments }) => {
            // Validate every pair before touching the live config.
            let mut staged = session.config().clone();
            for pair in &assignments {
                let (path, value) = pair.split_once('=').ok_or_else(|| {
                    ApizzaError::UsageError(format!("'{}' should look like FIELD=VALUE", pair))
                })?;
                set(&mut staged, path, value)?;
            }
            *session.config_mut() = staged;
            debug!(count = assignments.len(), "config updated");
        }
    }
    Ok(())
}
