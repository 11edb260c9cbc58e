use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Account {
    pub user: String,
    pub domain: String,
    pub plan: String,
    pub email: String,
    pub suspended: bool,
    pub suspendreason: String,
    #[serde(skip)]
    pub password: String,
}

pub type Db = Arc<RwLock<BTreeMap<String, Account>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    authorization: Arc<str>,
}

type FormParams = HashMap<String, String>;

/// Router answering `/json-api/{op}` and `/xml-api/{op}` for requests that
/// carry Basic credentials matching `username` and `password`.
pub fn app(username: &str, password: &str) -> Router {
    let token = STANDARD.encode(format!("{username}:{password}"));
    let state = AppState {
        db: Arc::new(RwLock::new(BTreeMap::new())),
        authorization: format!("Basic {token}").into(),
    };
    Router::new()
        .route("/{api}/{operation}", post(dispatch))
        .with_state(state)
}

pub async fn run(listener: TcpListener, username: &str, password: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(username, password)).await
}

async fn dispatch(
    State(state): State<AppState>,
    Path((api, operation)): Path<(String, String)>,
    headers: HeaderMap,
    Form(params): Form<FormParams>,
) -> Response {
    let as_xml = match api.as_str() {
        "json-api" => false,
        "xml-api" => true,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == &*state.authorization);
    if !authorized {
        return (StatusCode::FORBIDDEN, "Access denied").into_response();
    }

    let body = handle(&state.db, &operation, &params).await;
    info!(%operation, %api, "handled WHM request");

    if as_xml {
        let mut out = String::from("<?xml version=\"1.0\" ?>");
        write_xml(&operation, &body, &mut out);
        ([(header::CONTENT_TYPE, "text/xml")], out).into_response()
    } else {
        ([(header::CONTENT_TYPE, "application/json")], body.to_string()).into_response()
    }
}

async fn handle(db: &Db, operation: &str, params: &FormParams) -> Value {
    match operation {
        "listaccts" => list_accounts(db, params).await,
        "createacct" => create_account(db, params).await,
        "modifyacct" => modify_account(db, params).await,
        "passwd" => change_password(db, params).await,
        "removeacct" => remove_account(db, params).await,
        "accountsummary" => account_summary(db, params).await,
        "listsuspended" => list_suspended(db).await,
        "suspendacct" => set_suspended(db, params, true).await,
        "unsuspendacct" => set_suspended(db, params, false).await,
        other => status(false, format!("Unknown app ({other}) requested for this version of the API.")),
    }
}

fn field<'a>(params: &'a FormParams, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn status(ok: bool, message: impl Into<String>) -> Value {
    json!({ "status": u8::from(ok), "statusmsg": message.into() })
}

fn result(ok: bool, message: impl Into<String>) -> Value {
    json!({ "result": [status(ok, message)] })
}

async fn list_accounts(db: &Db, params: &FormParams) -> Value {
    let accounts = db.read().await;
    let term = field(params, "search");
    let search_type = field(params, "searchtype");
    let acct: Vec<&Account> = accounts
        .values()
        .filter(|a| match (term, search_type) {
            (None, _) => true,
            (Some(term), Some("user")) => a.user.contains(term),
            (Some(term), Some("domain")) => a.domain.contains(term),
            (Some(term), Some("package")) => a.plan.contains(term),
            (Some(term), _) => a.user.contains(term) || a.domain.contains(term),
        })
        .collect();
    json!({ "status": 1, "statusmsg": "Ok", "acct": acct })
}

async fn create_account(db: &Db, params: &FormParams) -> Value {
    let (Some(user), Some(domain), Some(password)) = (
        field(params, "username"),
        field(params, "domain"),
        field(params, "password"),
    ) else {
        return result(false, "username, password and domain are required");
    };

    let mut accounts = db.write().await;
    if accounts.contains_key(user) {
        return result(false, format!("Sorry, a user with the name {user} already exists"));
    }
    let account = Account {
        user: user.to_string(),
        domain: domain.to_string(),
        plan: field(params, "plan").unwrap_or("default").to_string(),
        email: field(params, "contactemail").unwrap_or_default().to_string(),
        suspended: false,
        suspendreason: String::new(),
        password: password.to_string(),
    };
    accounts.insert(account.user.clone(), account);
    result(true, "Account Creation Ok")
}

async fn modify_account(db: &Db, params: &FormParams) -> Value {
    let mut accounts = db.write().await;
    let Some(account) = field(params, "user").and_then(|u| accounts.get_mut(u)) else {
        return result(false, "Account does not exist");
    };
    if let Some(domain) = field(params, "DNS").or(field(params, "domain")) {
        account.domain = domain.to_string();
    }
    if let Some(email) = field(params, "contactemail") {
        account.email = email.to_string();
    }
    if let Some(plan) = field(params, "plan") {
        account.plan = plan.to_string();
    }
    result(true, "Account Modified")
}

async fn change_password(db: &Db, params: &FormParams) -> Value {
    let mut accounts = db.write().await;
    let (Some(user), Some(pass)) = (field(params, "user"), field(params, "pass")) else {
        return json!({ "passwd": [status(false, "user and pass are required")] });
    };
    let Some(account) = accounts.get_mut(user) else {
        return json!({ "passwd": [status(false, format!("User {user} does not exist"))] });
    };
    account.password = pass.to_string();
    json!({ "passwd": [status(true, format!("Password changed for user {user}"))] })
}

async fn remove_account(db: &Db, params: &FormParams) -> Value {
    let mut accounts = db.write().await;
    match field(params, "user").and_then(|u| accounts.remove(u)) {
        Some(account) => result(true, format!("{} account removed", account.user)),
        None => result(false, "Account does not exist"),
    }
}

async fn account_summary(db: &Db, params: &FormParams) -> Value {
    let accounts = db.read().await;
    let found = match (field(params, "user"), field(params, "domain")) {
        (Some(user), _) => accounts.get(user),
        (None, Some(domain)) => accounts.values().find(|a| a.domain == domain),
        (None, None) => None,
    };
    match found {
        Some(account) => json!({ "status": 1, "statusmsg": "Ok", "acct": [account] }),
        None => status(false, "Account does not exist"),
    }
}

async fn list_suspended(db: &Db) -> Value {
    let accounts = db.read().await;
    let account: Vec<Value> = accounts
        .values()
        .filter(|a| a.suspended)
        .map(|a| json!({ "user": a.user, "reason": a.suspendreason }))
        .collect();
    json!({ "status": 1, "account": account })
}

async fn set_suspended(db: &Db, params: &FormParams, suspended: bool) -> Value {
    let mut accounts = db.write().await;
    let Some(account) = field(params, "user").and_then(|u| accounts.get_mut(u)) else {
        return result(false, "Account does not exist");
    };
    account.suspended = suspended;
    account.suspendreason = if suspended {
        field(params, "reason").unwrap_or("Unknown").to_string()
    } else {
        String::new()
    };
    let message = if suspended {
        "Account Suspended"
    } else {
        "Account Unsuspended"
    };
    result(true, message)
}

/// Render a JSON value as XML, repeating an element once per array item.
fn write_xml(name: &str, value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            for item in items {
                write_xml(name, item, out);
            }
        }
        Value::Object(map) => {
            out.push_str(&format!("<{name}>"));
            for (key, child) in map {
                write_xml(key, child, out);
            }
            out.push_str(&format!("</{name}>"));
        }
        Value::Null => out.push_str(&format!("<{name}/>")),
        Value::String(text) => {
            out.push_str(&format!("<{name}>{}</{name}>", escape(text)));
        }
        scalar => out.push_str(&format!("<{name}>{scalar}</{name}>")),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
