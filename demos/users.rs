//! User Controller Example
//!
//! This example declares a conventional `UserController`, lets Switchyard
//! derive its routes and then pushes a handful of requests through an
//! in-memory route table.
//!
//! Run with: `SWITCHYARD_DEBUG=switchyard::* cargo run --example users`

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use switchyard::log::{self, error, info};
use switchyard::prelude::*;

// =============================================================================
// Domain Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub active: bool,
}

static USERS: Lazy<RwLock<BTreeMap<u64, User>>> = Lazy::new(|| {
    let users = [(1, "Alice"), (2, "Bob")]
        .into_iter()
        .map(|(id, name)| {
            (
                id,
                User {
                    id,
                    name: name.to_string(),
                    active: true,
                },
            )
        })
        .collect();
    RwLock::new(users)
});

fn user_id(this: &Instance<'_, UserController>) -> Result<u64> {
    this.req
        .param("id")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| Error::status(400, "missing or malformed user id"))
}

// =============================================================================
// Controller
// =============================================================================

#[derive(Default)]
struct UserController;

impl Controller for UserController {
    const NAME: &'static str = "UserController";

    fn actions() -> ActionTable<Self> {
        ActionTable::<Self>::new()
            .action("list", |this| {
                let users: Vec<User> = USERS.read().values().cloned().collect();
                this.send(users, None, None)
            })
            .action("get", |this| {
                let id = user_id(this)?;
                let user = USERS
                    .read()
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| Error::status(404, format!("user {} not found", id)))?;
                this.send(user, None, None)
            })
            .action("deactivate", |this| {
                let id = user_id(this)?;
                let mut users = USERS.write();
                let user = users
                    .get_mut(&id)
                    .ok_or_else(|| Error::status(404, format!("user {} not found", id)))?;
                user.active = false;
                let user = user.clone();
                drop(users);
                this.send(user, None, None)
            })
            .action("count", |this| {
                let count = USERS.read().len();
                this.send(json!({ "count": count }), None, Some("text"))
            })
    }
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    log::init();

    let config = SwitchyardConfig::from_env()?;
    let users = ControllerClass::<UserController>::builder()
        .config(&config)
        .build()?;

    let mut table = RouteTable::new();
    users.auto_route(&mut table)?;
    table.all(
        "*",
        vec![handler(|req, res, _next| {
            let body = json!({ "error": format!("Cannot {} {}", req.method, req.url) });
            if let Err(err) = res.emit("json", Some(404), body) {
                error!("failed to send 404 for {}: {}", req.url, err);
            }
        })],
    )?;

    if let Some(route) = users.route() {
        info!("Routes for {}: {}", users.name(), route);
    }

    let requests = [
        ("GET", "/users"),
        ("GET", "/user/1"),
        ("GET", "/users/2"),
        ("POST", "/users/deactivate/2"),
        ("GET", "/users/count"),
        ("GET", "/user/9"),
        ("DELETE", "/users/1"),
    ];

    for (method, url) in requests {
        let mut req = HttpRequest::new(method, url);
        let mut res = HttpResponse::new();
        table.handle(&mut req, &mut res);
        println!("{:<6} {:<22} -> {} {}", method, url, res.status, res.body_str());
    }

    Ok(())
}
