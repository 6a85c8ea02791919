//! Action plans
//!
//! A [`Plan`] is a fully validated action. Building one applies every
//! parameter check and the safety policy without touching the network;
//! executing one issues the raw commands through a [`CommandExecutor`].

use serde_json::{json, Map, Value};

use crate::error::{Result, RosgateError};
use crate::network::CommandExecutor;
use crate::protocol::Attributes;

use super::action::Action;
use super::params::Params;
use super::safety::{argument_words, check_run_command, check_secret_name};

/// Service assigned to new PPP secrets when none is given
pub const DEFAULT_PPP_SERVICE: &str = "pppoe";

/// How `ppp_set_disabled` finds its secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretRef {
    /// Internal `.id`, used as-is
    Id(String),

    /// Looked up with `/ppp/secret/print ?name=...`
    Name(String),
}

/// A validated action ready to run
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    TestConnection,
    Listing {
        action: Action,
        path: &'static str,
    },
    Log {
        limit: usize,
    },
    SetSecretDisabled {
        secret: SecretRef,
        disabled: bool,
    },
    AddSecret {
        name: String,
        password: String,
        service: String,
        profile: Option<String>,
        comment: Option<String>,
    },
    Batch(Vec<(String, Plan)>),
    Run {
        words: Vec<String>,
    },
}

// =============================================================================
// Planning
// =============================================================================

impl Plan {
    /// Validate `params` for `action`
    pub fn new(action: Action, params: &Params) -> Result<Self> {
        if let Some(path) = action.listing_path() {
            return Ok(Plan::Listing { action, path });
        }

        match action {
            Action::TestConnection => Ok(Plan::TestConnection),
            Action::Log => Ok(Plan::Log {
                limit: usize::try_from(params.int("limit")).unwrap_or(0),
            }),
            Action::PppSetDisabled => plan_set_disabled(params),
            Action::PppAddSecret => plan_add_secret(params),
            Action::Batch => Ok(Plan::Batch(plan_batch(params.get("actions"))?)),
            Action::Run => plan_run(params),
            _ => Err(RosgateError::Validation(format!("unsupported action {action}"))),
        }
    }

    /// Parse an action name and validate its parameters
    pub fn from_name(name: &str, params: &Params) -> Result<Self> {
        Plan::new(name.parse()?, params)
    }
}

fn plan_set_disabled(params: &Params) -> Result<Plan> {
    let disabled = params.flag("disabled")?.ok_or_else(|| {
        RosgateError::Validation("parameter \"disabled\" is required (true/false)".to_string())
    })?;

    let id = params.text("id");
    let name = params.text("name");
    let secret = match (id.is_empty(), name.is_empty()) {
        (false, _) => SecretRef::Id(id),
        (true, false) => SecretRef::Name(name),
        (true, true) => {
            return Err(RosgateError::Validation(
                "either id or name of the secret is required".to_string(),
            ))
        }
    };

    Ok(Plan::SetSecretDisabled { secret, disabled })
}

fn plan_add_secret(params: &Params) -> Result<Plan> {
    let name = params.text("name");
    let password = match params.raw_text("secret_password") {
        p if p.is_empty() => params.raw_text("password"),
        p => p,
    };

    if name.is_empty() || password.is_empty() {
        return Err(RosgateError::Validation(
            "name and password are required".to_string(),
        ));
    }
    check_secret_name(&name)?;

    let service = match params.text("service") {
        s if s.is_empty() => DEFAULT_PPP_SERVICE.to_string(),
        s => s,
    };
    let optional = |key: &str| Some(params.text(key)).filter(|s| !s.is_empty());

    Ok(Plan::AddSecret {
        name,
        password,
        service,
        profile: optional("profile"),
        comment: optional("comment"),
    })
}

fn plan_run(params: &Params) -> Result<Plan> {
    let command = params.text("command");
    check_run_command(&command)?;

    let mut words = vec![command];
    words.extend(argument_words(params.get("arguments"))?);
    Ok(Plan::Run { words })
}

/// Batch items are either a list of names / `{name, params}` objects, or an
/// object mapping names to their params
fn plan_batch(actions: Option<&Value>) -> Result<Vec<(String, Plan)>> {
    let items: Vec<(String, Params)> = match actions {
        Some(Value::Array(list)) => list
            .iter()
            .map(|item| match item {
                Value::String(name) => Ok((name.trim().to_string(), Params::default())),
                Value::Object(obj) => {
                    let name = obj
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    let params = obj.get("params").cloned().unwrap_or(Value::Null);
                    Ok((name, Params::from_value(params)))
                }
                _ => Err(RosgateError::Validation("invalid batch item".to_string())),
            })
            .collect::<Result<_>>()?,
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, params)| (name.trim().to_string(), Params::from_value(params.clone())))
            .collect(),
        _ => Vec::new(),
    };

    if items.is_empty() {
        return Err(RosgateError::Validation("batch action list is empty".to_string()));
    }

    items
        .into_iter()
        .map(|(name, params)| {
            if name.is_empty() {
                return Err(RosgateError::Validation("batch item without a name".to_string()));
            }
            let action = match name.parse::<Action>() {
                Ok(action) if action.batchable() => action,
                _ => {
                    return Err(RosgateError::SafetyPolicy(format!(
                        "action {name:?} is not allowed in a batch"
                    )))
                }
            };
            let plan = Plan::new(action, &params)?;
            Ok((name, plan))
        })
        .collect()
}

// =============================================================================
// Execution
// =============================================================================

impl Plan {
    /// Run the plan, one request/reply round per raw command
    pub fn execute<E: CommandExecutor + ?Sized>(&self, exec: &mut E) -> Result<Value> {
        match self {
            Plan::TestConnection => test_connection(exec),
            Plan::Listing { path, .. } => Ok(rows_to_json(exec.cmd(&[path.to_string()])?)),
            Plan::Log { limit } => {
                let mut rows = exec.cmd(&["/log/print".to_string()])?;
                if *limit > 0 && *limit < rows.len() {
                    rows = rows.split_off(rows.len() - limit);
                }
                Ok(rows_to_json(rows))
            }
            Plan::SetSecretDisabled { secret, disabled } => {
                set_secret_disabled(exec, secret, *disabled)
            }
            Plan::AddSecret {
                name,
                password,
                service,
                profile,
                comment,
            } => {
                let mut words = vec![
                    "/ppp/secret/add".to_string(),
                    format!("=name={name}"),
                    format!("=password={password}"),
                    format!("=service={service}"),
                ];
                if let Some(profile) = profile {
                    words.push(format!("=profile={profile}"));
                }
                if let Some(comment) = comment {
                    words.push(format!("=comment={comment}"));
                }
                exec.cmd(&words)?;
                Ok(json!({ "created": true, "name": name }))
            }
            Plan::Batch(items) => {
                let mut out = Map::new();
                for (name, plan) in items {
                    tracing::debug!("Batch step {}", name);
                    out.insert(name.clone(), plan.execute(exec)?);
                }
                Ok(Value::Object(out))
            }
            Plan::Run { words } => Ok(rows_to_json(exec.cmd(words)?)),
        }
    }
}

fn test_connection<E: CommandExecutor + ?Sized>(exec: &mut E) -> Result<Value> {
    let identity = exec.cmd(&["/system/identity/print".to_string()])?;
    let resource = exec.cmd(&["/system/resource/print".to_string()])?;

    let field = |rows: &[Attributes], key: &str| {
        rows.first()
            .and_then(|row| row.get(key))
            .map_or(Value::Null, |v| Value::String(v.clone()))
    };

    Ok(json!({
        "identity": field(&identity, "name"),
        "version": field(&resource, "version"),
        "uptime": field(&resource, "uptime"),
        "board": field(&resource, "board-name"),
        "cpu_load": field(&resource, "cpu-load"),
    }))
}

fn set_secret_disabled<E: CommandExecutor + ?Sized>(
    exec: &mut E,
    secret: &SecretRef,
    disabled: bool,
) -> Result<Value> {
    let (id, name) = match secret {
        SecretRef::Id(id) => (id.clone(), String::new()),
        SecretRef::Name(name) => {
            let found = exec.cmd(&["/ppp/secret/print".to_string(), format!("?name={name}")])?;
            let id = found
                .first()
                .and_then(|row| row.get(".id"))
                .cloned()
                .ok_or_else(|| RosgateError::Validation(format!("secret not found: {name}")))?;
            (id, name.clone())
        }
    };

    exec.cmd(&[
        "/ppp/secret/set".to_string(),
        format!("=.id={id}"),
        format!("=disabled={}", if disabled { "yes" } else { "no" }),
    ])?;

    Ok(json!({ "updated": true, "id": id, "name": name, "disabled": disabled }))
}

fn rows_to_json(rows: Vec<Attributes>) -> Value {
    Value::Array(
        rows.into_iter()
            .map(|row| Value::Object(row.into_iter().map(|(k, v)| (k, Value::String(v))).collect()))
            .collect(),
    )
}
