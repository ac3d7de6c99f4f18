//! Customer command handlers.

use tabled::Tabled;

use petal_core::{Backoffice, Customer, CustomerSummary, Order};

use crate::cli::{CustomersArgs, CustomersCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Orders")]
    orders: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Last order")]
    last_order: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl CustomerRow {
    fn new(c: &Customer, color: bool) -> Self {
        // Degraded rows carry zeroed stats; show "?" rather than a fake zero.
        let (orders, spent) = if c.degraded {
            (
                output::warn_text("?", color),
                output::warn_text("?", color),
            )
        } else {
            (c.stats.total_orders.to_string(), util::money(c.stats.total_spent))
        };
        Self {
            id: c.id,
            name: c.name.clone(),
            phone: util::or_dash(c.phone.as_deref()),
            orders,
            spent,
            last_order: util::date(c.stats.last_order_date.as_ref()),
            status: c.status.to_string(),
        }
    }
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Order> for OrderRow {
    fn from(o: &Order) -> Self {
        let total = match o.currency.as_deref() {
            Some(cur) => format!("{} {cur}", util::money(o.total)),
            None => util::money(o.total),
        };
        Self {
            id: o.id,
            number: util::or_dash(o.number.as_deref()),
            date: util::datetime(o.date.as_ref()),
            total,
            status: util::or_dash(o.status.as_deref()),
        }
    }
}

fn detail(c: &Customer, color: bool) -> String {
    let mut lines = vec![
        format!("ID:           {}", c.id),
        format!("Name:         {}", c.name),
        format!("Phone:        {}", util::or_dash(c.phone.as_deref())),
        format!("Email:        {}", util::or_dash(c.email.as_deref())),
        format!("Address:      {}", util::or_dash(c.address.as_deref())),
        format!("Member since: {}", util::date(c.member_since.as_ref())),
        format!("Status:       {}", c.status),
    ];
    if c.degraded {
        lines.push(format!(
            "Statistics:   {}",
            output::warn_text("unavailable (orders could not be loaded)", color)
        ));
    } else {
        lines.push(format!("Orders:       {}", c.stats.total_orders));
        lines.push(format!("Spent:        {}", util::money(c.stats.total_spent)));
        lines.push(format!(
            "Last order:   {}",
            util::date(c.stats.last_order_date.as_ref())
        ));
    }
    if let Some(notes) = c.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("Notes:        {notes}"));
    }
    if !c.orders.is_empty() {
        let rows: Vec<OrderRow> = c.orders.iter().map(OrderRow::from).collect();
        lines.push(String::new());
        lines.push(
            tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string(),
        );
    }
    lines.join("\n")
}

fn summary(s: &CustomerSummary) -> String {
    let mut lines = vec![
        format!("Customers: {}", s.total),
        format!("VIP:       {}", s.vip),
        format!("Active:    {}", s.active),
        format!("Inactive:  {}", s.inactive),
    ];
    if s.degraded > 0 {
        lines.push(format!("Without statistics: {}", s.degraded));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backoffice: &Backoffice,
    args: CustomersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        CustomersCommand::List {
            page,
            limit,
            only_with_orders,
        } => {
            let resolved = backoffice
                .customers()
                .list(page, limit, only_with_orders)
                .await?;
            let listing = resolved.value;
            tracing::debug!(strategy = resolved.strategy, "customers resolved");

            let out = output::render_list(
                &global.output,
                &listing.customers,
                |c| CustomerRow::new(c, color),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);

            let degraded = listing.degraded_count();
            if degraded > 0 {
                output::note(
                    &output::warn_text(
                        &format!("{degraded} customer(s) shown without order statistics"),
                        color,
                    ),
                    global.quiet,
                );
            }
            if let Some(footer) = util::page_footer(listing.pagination.as_ref()) {
                output::note(&output::dim_text(&footer, color), global.quiet);
            }
            Ok(())
        }

        CustomersCommand::Get { id } => {
            let resolved = backoffice.customers().get(id).await?;
            if resolved.strategy == petal_core::StaticDirectory::NAME {
                output::note(
                    &output::warn_text("backend unavailable, showing a stored record", color),
                    global.quiet,
                );
            }
            let out = output::render_single(
                &global.output,
                &resolved.value,
                |c| detail(c, color),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CustomersCommand::Orders { id, page, limit } => {
            let (orders, pagination) = backoffice.customers().orders(id, page, limit).await?;
            let out = output::render_list(
                &global.output,
                &orders,
                |o| OrderRow::from(o),
                |o| o.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if let Some(footer) = util::page_footer(pagination.as_ref()) {
                output::note(&output::dim_text(&footer, color), global.quiet);
            }
            Ok(())
        }

        CustomersCommand::Search { phone } => {
            let found = backoffice.customers().search_by_phone(&phone).await?;
            let out = output::render_list(
                &global.output,
                &found,
                |c| CustomerRow::new(c, color),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CustomersCommand::Summary { sample } => {
            let resolved = backoffice.customers().summary(sample).await?;
            tracing::debug!(strategy = resolved.strategy, "summary resolved");
            let out = output::render_single(&global.output, &resolved.value, summary, |s| {
                s.total.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
