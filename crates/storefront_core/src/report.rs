//! Recent-orders greeting page.
//!
//! # Responsibility
//! - Load the newest orders with customers and products eagerly.
//! - Render them into the `hello.html` page.
//!
//! # Invariants
//! - At most `limit` orders, newest `placed_at` first; ties by id descending.
//! - Loading issues a fixed number of queries regardless of order count.
//! - The template context carries exactly `name` and `orders`.

use crate::admin::display::format_timestamp;
use crate::model::money::Money;
use crate::model::order::OrderDetail;
use crate::repo::order_repo::OrderRepository;
use crate::repo::RepoError;
use log::info;
use once_cell::sync::Lazy;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

pub const HELLO_TEMPLATE: &str = "hello.html";
pub const DEFAULT_GREETING_NAME: &str = "Mosh";
pub const DEFAULT_RECENT_ORDER_LIMIT: u32 = 5;

static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template(HELLO_TEMPLATE, include_str!("../templates/hello.html"))
        .expect("valid hello.html template");
    tera
});

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("failed to render page template: {0}")]
    Template(#[from] tera::Error),
}

/// Page context handed to the template.
#[derive(Debug, Serialize)]
pub struct HelloContext<'a> {
    pub name: &'a str,
    pub orders: Vec<OrderView<'a>>,
}

/// Order as shown on the page: the loaded detail plus display values.
#[derive(Debug, Serialize)]
pub struct OrderView<'a> {
    #[serde(flatten)]
    pub detail: &'a OrderDetail,
    pub placed_at_display: String,
    pub total: Money,
}

impl<'a> HelloContext<'a> {
    pub fn new(name: &'a str, orders: &'a [OrderDetail]) -> Self {
        Self {
            name,
            orders: orders
                .iter()
                .map(|detail| OrderView {
                    detail,
                    placed_at_display: format_timestamp(detail.order.placed_at),
                    total: detail.total(),
                })
                .collect(),
        }
    }
}

/// Newest `limit` orders with customer and line products loaded.
pub fn recent_orders<R: OrderRepository>(
    repo: &R,
    limit: u32,
) -> Result<Vec<OrderDetail>, ReportError> {
    Ok(repo.list_recent_orders(limit)?)
}

pub fn render_hello(name: &str, orders: &[OrderDetail]) -> Result<String, ReportError> {
    let context = Context::from_serialize(HelloContext::new(name, orders))?;
    Ok(TEMPLATES.render(HELLO_TEMPLATE, &context)?)
}

/// Loads recent orders and renders the greeting page.
pub fn hello_page<R: OrderRepository>(
    repo: &R,
    name: &str,
    limit: u32,
) -> Result<String, ReportError> {
    let orders = recent_orders(repo, limit)?;
    let html = render_hello(name, &orders)?;
    info!(
        "event=report_render module=report status=ok template={} orders={}",
        HELLO_TEMPLATE,
        orders.len()
    );
    Ok(html)
}
