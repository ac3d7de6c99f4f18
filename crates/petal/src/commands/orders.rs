//! Order command handlers.

use tabled::Tabled;

use petal_core::{Backoffice, OrderListQuery, OrderStatus, ShopOrder, StatusOptions};

use crate::cli::{GlobalOpts, OrderStatusArg, OrdersArgs, OrdersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Recipient")]
    recipient: String,
    #[tabled(rename = "Delivery")]
    delivery: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Paid")]
    paid: String,
}

impl OrderRow {
    fn new(o: &ShopOrder, color: bool) -> Self {
        let delivery = joined([o.delivery_date.as_deref(), o.delivery_time.as_deref()], " ");
        Self {
            id: o.id,
            status: o.status.to_string(),
            product: util::or_dash(o.main_product.as_ref().and_then(|p| p.title.as_deref())),
            recipient: util::or_dash(o.recipient.name.as_deref()),
            delivery: if delivery.is_empty() {
                o.delivery_type.to_string()
            } else {
                delivery
            },
            amount: o.payment.amount.clone(),
            paid: if o.payment.paid {
                "yes".into()
            } else {
                output::warn_text("no", color)
            },
        }
    }
}

fn joined(parts: [Option<&str>; 2], sep: &str) -> String {
    parts.into_iter().flatten().collect::<Vec<_>>().join(sep)
}

fn detail(o: &ShopOrder) -> String {
    let place = joined([o.city.as_deref(), o.address.as_deref()], ", ");
    let mut lines = vec![
        format!("ID:        {}", o.id),
        format!("Number:    {}", o.number),
        format!("Status:    {}", o.status),
        format!("Delivery:  {}", o.delivery_type),
        format!("Address:   {}", util::or_dash(Some(place.as_str()))),
        format!("Date:      {}", util::or_dash(o.delivery_date.as_deref())),
        format!("Time:      {}", util::or_dash(o.delivery_time.as_deref())),
        format!(
            "Recipient: {} {}",
            util::or_dash(o.recipient.name.as_deref()),
            util::or_dash(o.recipient.phone.as_deref())
        ),
        format!(
            "Sender:    {} {}",
            util::or_dash(o.sender.name.as_deref()),
            util::or_dash(o.sender.phone.as_deref())
        ),
        format!(
            "Payment:   {} ({})",
            o.payment.amount,
            if o.payment.paid { "paid" } else { "unpaid" }
        ),
        format!("Florist:   {}", util::or_dash(o.florist.as_deref())),
        format!("Courier:   {}", util::or_dash(o.courier.as_deref())),
        format!("Created:   {}", util::datetime(o.created_at.as_ref())),
    ];
    if let Some(main) = &o.main_product {
        lines.push(format!(
            "Product:   {} x{}",
            util::or_dash(main.title.as_deref()),
            main.quantity
        ));
    }
    for item in &o.additional_items {
        lines.push(format!(
            "           {} x{}",
            util::or_dash(item.title.as_deref()),
            item.quantity
        ));
    }
    if let Some(postcard) = o.postcard.as_deref() {
        lines.push(format!("Postcard:  {postcard}"));
    }
    if let Some(comment) = o.comment.as_deref() {
        lines.push(format!("Comment:   {comment}"));
    }
    if !o.history.is_empty() {
        lines.push(String::new());
        for entry in &o.history {
            lines.push(format!(
                "{}  {}",
                util::or_dash(entry.date.as_deref()),
                entry.description
            ));
        }
    }
    lines.join("\n")
}

fn status_options(s: &StatusOptions) -> String {
    let current = s
        .current
        .map_or_else(|| "-".into(), |c| c.to_string());
    let allowed = if s.allowed.is_empty() {
        "-".to_owned()
    } else {
        s.allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("Current: {current}\nAllowed: {allowed}")
}

impl From<OrderStatusArg> for OrderStatus {
    fn from(arg: OrderStatusArg) -> Self {
        match arg {
            OrderStatusArg::New => OrderStatus::New,
            OrderStatusArg::Paid => OrderStatus::Paid,
            OrderStatusArg::Accepted => OrderStatus::Accepted,
            OrderStatusArg::Assembled => OrderStatus::Assembled,
            OrderStatusArg::InTransit => OrderStatus::InTransit,
            OrderStatusArg::Completed => OrderStatus::Completed,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backoffice: &Backoffice,
    args: OrdersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let book = backoffice.orders();

    match args.command {
        OrdersCommand::List {
            status,
            limit,
            offset,
        } => {
            let query = OrderListQuery {
                status: status.map(OrderStatus::from),
                limit,
                offset,
            };
            let resolved = book.list(query).await?;
            if resolved.strategy != petal_core::orders::V2Orders::NAME {
                output::note(
                    &output::warn_text("order service unavailable, showing the old order list", color),
                    global.quiet,
                );
            }
            let listing = resolved.value;
            let out = output::render_list(
                &global.output,
                &listing.orders,
                |o| OrderRow::new(o, color),
                |o| o.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if let Some(footer) = util::page_footer(listing.pagination.as_ref()) {
                output::note(&output::dim_text(&footer, color), global.quiet);
            }
            Ok(())
        }

        OrdersCommand::Get { id } => {
            let order = book.get(id).await?;
            let out = output::render_single(&global.output, &order, detail, |o| o.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OrdersCommand::Statuses { id } => {
            let options = book.allowed_statuses(id).await?;
            let out = output::render_single(&global.output, &options, status_options, |s| {
                s.allowed
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OrdersCommand::SetStatus {
            id,
            status,
            comment,
        } => {
            let status = OrderStatus::from(status);
            book.change_status(id, status, comment.as_deref()).await?;
            output::note(&format!("Order {id} moved to {status}"), global.quiet);
            Ok(())
        }

        OrdersCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete order {id}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            book.delete(id).await?;
            output::note(&format!("Order {id} deleted"), global.quiet);
            Ok(())
        }
    }
}
