//! Inventory command handlers.

use tabled::Tabled;

use petal_core::{Backoffice, InventoryItem, InventoryQuery, StockMovement};

use crate::cli::{GlobalOpts, InventoryArgs, InventoryCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl ItemRow {
    fn new(i: &InventoryItem, color: bool) -> Self {
        let name = if i.deactivated {
            output::dim_text(&i.name, color)
        } else {
            i.name.clone()
        };
        Self {
            id: i.id,
            name,
            category: i.category.to_string(),
            quantity: util::quantity(i.quantity),
            cost: i.cost.map_or_else(|| "-".into(), util::money),
            location: util::or_dash(i.location.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct MovementRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Order")]
    order: String,
}

impl MovementRow {
    fn new(m: &StockMovement, item: u64) -> Self {
        let quantity: f64 = m
            .lines
            .iter()
            .filter(|l| l.id == item)
            .filter_map(|l| l.quantity)
            .sum();
        Self {
            date: util::datetime(m.date.as_ref()),
            operation: m.operation.to_string(),
            quantity: util::quantity(Some(quantity)),
            user: util::or_dash(m.user.as_deref()),
            order: util::or_dash(m.order_id.as_deref()),
        }
    }
}

fn detail(i: &InventoryItem) -> String {
    let mut lines = vec![
        format!("ID:       {}", i.id),
        format!("Name:     {}", i.name),
        format!("Category: {}", i.category),
        format!("Quantity: {}", util::quantity(i.quantity)),
        format!("Cost:     {}", i.cost.map_or_else(|| "-".into(), util::money)),
        format!("Markup:   {}", util::quantity(i.markup)),
        format!("Location: {}", util::or_dash(i.location.as_deref())),
        format!("Flower:   {}", util::or_dash(i.flower.as_deref())),
    ];
    if i.deactivated {
        lines.push("Deactivated".into());
    }
    if let Some(image) = &i.image {
        lines.push(format!("Image:    {image}"));
    }
    lines.join("\n")
}

fn render_items(
    items: &[InventoryItem],
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let out = output::render_list(
        &global.output,
        items,
        |i| ItemRow::new(i, color),
        |i| i.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backoffice: &Backoffice,
    args: InventoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let inventory = backoffice.inventory();

    match args.command {
        InventoryCommand::List {
            search,
            flower,
            service,
            min_quantity,
            limit,
            offset,
        } => {
            let query = InventoryQuery {
                limit: Some(limit),
                offset: Some(offset),
                search,
                flower,
                service,
                min_quantity,
                ..InventoryQuery::default()
            };
            let page = inventory.list(&query).await?;
            render_items(&page.items, global, color)?;
            if let Some(footer) = util::page_footer(page.pagination.as_ref()) {
                output::note(&output::dim_text(&footer, color), global.quiet);
            }
            Ok(())
        }

        InventoryCommand::Get { id } => {
            let resolved = inventory.get(id).await?;
            tracing::debug!(strategy = resolved.strategy, "inventory item resolved");
            let out = output::render_single(&global.output, &resolved.value, detail, |i| {
                i.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InventoryCommand::Search { text, limit } => {
            let items = inventory.search(&text, limit).await?;
            render_items(&items, global, color)
        }

        InventoryCommand::History { id, limit, offset } => {
            let history = inventory.history(id, limit, offset).await?;
            let out = output::render_list(
                &global.output,
                &history.movements,
                |m| MovementRow::new(m, id),
                |m| m.operation.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if let Some(footer) = util::page_footer(history.pagination.as_ref()) {
                output::note(&output::dim_text(&footer, color), global.quiet);
            }
            Ok(())
        }
    }
}
