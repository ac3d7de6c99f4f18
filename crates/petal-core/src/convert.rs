// ── API-to-domain type conversions ──
//
// Bridges raw `petal_api` wire types into canonical `petal_core::model`
// domain types. Both endpoint families describe the same customers with
// different field names, so everything funnels through the helpers below.

use chrono::{DateTime, FixedOffset, Utc};

use petal_api::LegacyDate;
use petal_api::legacy::{LegacyBasketItem, LegacyCustomer, LegacyOrder, LegacyShopOrder};
use petal_api::v2::{
    CustomerDetail, CustomerDetailOrder, CustomerWithStats, InventoryHistoryDto, InventoryItemDto,
    OrderDetailDto, OrderItemDto, OrderPartyDto, OrderProductDto, OrderSummaryDto, ProductDto,
};

use crate::model::{
    Customer, CustomerStats, CustomerStatus, DeliveryType, HistoryEntry, InventoryCategory,
    InventoryItem, MovementLine, Order, OrderLine, OrderStatus, Party, Payment, Product,
    ShopOrder, StockMovement,
};
use crate::timestamp::parse_timestamp;

/// Placeholder the backend stores for a missing phone number.
pub const PHONE_PLACEHOLDER: &str = "Не указан";
/// Placeholder the backend stores for a missing name or login.
const UNKNOWN: &str = "Unknown";
/// Marker domain for customers registered without an email.
const NO_EMAIL_MARKER: &str = "@unemailed";
/// Shop currency sign appended to bare amounts.
pub const CURRENCY_SIGN: &str = "₸";
/// Payment status text the normalized order list uses for "paid".
const PAID_LABEL: &str = "Оплачен";

// ── Helpers ────────────────────────────────────────────────────────

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn real_phone(raw: Option<&str>) -> Option<String> {
    non_blank(raw)
        .filter(|p| *p != PHONE_PLACEHOLDER)
        .map(str::to_owned)
}

fn real_email(raw: Option<&str>) -> Option<String> {
    non_blank(raw)
        .filter(|e| !e.contains(NO_EMAIL_MARKER))
        .map(str::to_owned)
}

fn parse_date(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    raw.and_then(parse_timestamp)
}

fn parse_legacy_date(raw: Option<&LegacyDate>) -> Option<DateTime<FixedOffset>> {
    raw.map(LegacyDate::value).and_then(parse_timestamp)
}

/// Prices arrive as `"18000"`, `"15 000"` or `"1200,50"`.
fn parse_price(raw: &str) -> Option<f64> {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>()
        .parse()
        .ok()
}

fn owned(raw: Option<&str>) -> Option<String> {
    non_blank(raw).map(str::to_owned)
}

/// Strip tags and decode the entities the backend puts in formatted
/// prices (`25&nbsp;000&nbsp;&#8376;`).
pub fn decode_entities(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            let c = match entity {
                "nbsp" => Some(' '),
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out.trim().to_owned()
}

/// Display amount with the currency sign, plus its numeric value.
fn payment_amount(raw: Option<&str>) -> (String, Option<f64>) {
    let text = non_blank(raw).map(decode_entities).unwrap_or_default();
    let text = if text.is_empty() {
        format!("0 {CURRENCY_SIGN}")
    } else if text.contains(CURRENCY_SIGN) || text.contains('$') {
        text
    } else {
        format!("{text} {CURRENCY_SIGN}")
    };
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.'))
        .collect();
    let value = parse_price(&digits);
    (text, value)
}

/// Backend-sent status wins; otherwise derive it from the statistics.
fn resolve_status(sent: Option<&str>, stats: &CustomerStats, now: DateTime<Utc>) -> CustomerStatus {
    non_blank(sent)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| CustomerStatus::derive(stats, now))
}

/// Identity fields that feed [`display_name`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NameParts<'a> {
    pub name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub login: Option<&'a str>,
}

/// Best human-readable name for a customer.
///
/// Full name, then phone, then the email local part, then login, then
/// a numbered placeholder. Backend placeholders never win.
pub fn display_name(parts: NameParts<'_>, id: u64) -> String {
    let full: Vec<&str> = [parts.name, parts.last_name]
        .into_iter()
        .filter_map(non_blank)
        .filter(|s| *s != UNKNOWN)
        .collect();
    if !full.is_empty() {
        return full.join(" ");
    }
    if let Some(phone) = real_phone(parts.phone) {
        return phone;
    }
    if let Some(local) = real_email(parts.email)
        .as_deref()
        .and_then(|e| e.split('@').next())
        .filter(|l| !l.is_empty())
    {
        return local.to_owned();
    }
    if let Some(login) = non_blank(parts.login).filter(|l| *l != UNKNOWN) {
        return login.to_owned();
    }
    format!("Клиент #{id}")
}

// ── Orders ─────────────────────────────────────────────────────────

impl From<&LegacyOrder> for Order {
    fn from(o: &LegacyOrder) -> Self {
        Order {
            id: o.id,
            number: o.number.clone().or_else(|| Some(o.id.to_string())),
            date: parse_legacy_date(o.date.as_ref()),
            total: o.total.unwrap_or(0.0),
            status: o.status_id.clone(),
            currency: None,
        }
    }
}

impl From<&CustomerDetailOrder> for Order {
    fn from(o: &CustomerDetailOrder) -> Self {
        Order {
            id: o.id,
            number: o.number.clone(),
            date: parse_date(o.date.as_deref()),
            total: o.total.unwrap_or(0.0),
            status: o.status_name.clone().or_else(|| o.status.clone()),
            currency: o.currency.clone(),
        }
    }
}

// ── Customers ──────────────────────────────────────────────────────

/// Row from the aggregated endpoint. Statistics are server-computed; a
/// row missing either total is zero-filled and flagged degraded.
pub fn customer_from_stats(c: &CustomerWithStats, now: DateTime<Utc>) -> Customer {
    let stats = CustomerStats {
        total_orders: c.total_orders.unwrap_or(0),
        total_spent: c.total_spent.unwrap_or(0.0),
        last_order_date: parse_date(c.last_order_date.as_deref()),
    };
    Customer {
        id: c.id,
        name: display_name(
            NameParts {
                name: c.name.as_deref(),
                last_name: c.last_name.as_deref(),
                phone: c.phone.as_deref(),
                email: c.email.as_deref(),
                login: c.login.as_deref(),
            },
            c.id,
        ),
        phone: real_phone(c.phone.as_deref()),
        email: real_email(c.email.as_deref()),
        login: c.login.clone(),
        member_since: parse_date(c.member_since.as_deref()),
        notes: None,
        address: None,
        status: resolve_status(c.status.as_deref(), &stats, now),
        stats,
        degraded: c.total_orders.is_none() || c.total_spent.is_none(),
        orders: Vec::new(),
    }
}

/// Detail with embedded orders. Missing server totals fall back to the
/// orders themselves.
pub fn customer_from_detail(c: &CustomerDetail, now: DateTime<Utc>) -> Customer {
    let orders: Vec<Order> = c.orders.iter().map(Order::from).collect();
    let computed = CustomerStats::from_orders(&orders);
    let stats = CustomerStats {
        total_orders: c.total_orders.unwrap_or(computed.total_orders),
        total_spent: c.total_spent.unwrap_or(computed.total_spent),
        last_order_date: parse_date(c.last_order_date.as_deref()).or(computed.last_order_date),
    };
    let status = if c.is_active == Some(false) && c.status.is_none() {
        CustomerStatus::Inactive
    } else {
        resolve_status(c.status.as_deref(), &stats, now)
    };
    Customer {
        id: c.id,
        name: display_name(
            NameParts {
                name: c.name.as_deref(),
                last_name: c.last_name.as_deref(),
                phone: c.phone.as_deref(),
                email: c.email.as_deref(),
                login: c.login.as_deref(),
            },
            c.id,
        ),
        phone: real_phone(c.phone.as_deref()),
        email: real_email(c.email.as_deref()),
        login: c.login.clone(),
        member_since: parse_date(c.member_since.as_deref()),
        notes: None,
        address: None,
        stats,
        status,
        degraded: false,
        orders,
    }
}

/// Totals some deployments attach to legacy rows. Both counters must be
/// present to be trusted.
fn embedded_stats(c: &LegacyCustomer) -> Option<CustomerStats> {
    Some(CustomerStats {
        total_orders: c.total_orders?,
        total_spent: c.total_spent?,
        last_order_date: parse_date(c.last_order_date.as_deref()),
    })
}

/// Legacy row merged with its separately fetched orders.
///
/// `orders` is `None` when the sub-resource could not be loaded. The
/// row's own totals are used then; without them the customer is kept
/// with zeroed statistics and flagged degraded.
pub fn customer_from_legacy(
    c: &LegacyCustomer,
    orders: Option<&[Order]>,
    now: DateTime<Utc>,
) -> Customer {
    let (stats, degraded) = match (orders, embedded_stats(c)) {
        (Some(orders), _) => (CustomerStats::from_orders(orders), false),
        (None, Some(embedded)) => (embedded, false),
        (None, None) => (CustomerStats::default(), true),
    };
    let deactivated = non_blank(c.active.as_deref()) == Some("N");
    let status = if deactivated && non_blank(c.status.as_deref()).is_none() {
        CustomerStatus::Inactive
    } else {
        resolve_status(c.status.as_deref(), &stats, now)
    };
    let address = [c.personal_street.as_deref(), c.personal_city.as_deref()]
        .into_iter()
        .filter_map(non_blank)
        .collect::<Vec<_>>()
        .join(", ");
    Customer {
        id: c.id,
        name: display_name(
            NameParts {
                name: c.name.as_deref(),
                last_name: c.last_name.as_deref(),
                phone: c.personal_phone.as_deref(),
                email: c.email.as_deref(),
                login: c.login.as_deref(),
            },
            c.id,
        ),
        phone: real_phone(c.personal_phone.as_deref()),
        email: real_email(c.email.as_deref()),
        login: non_blank(c.login.as_deref())
            .filter(|l| *l != UNKNOWN)
            .map(str::to_owned),
        member_since: parse_legacy_date(c.date_register.as_ref()),
        notes: non_blank(c.personal_notes.as_deref()).map(str::to_owned),
        address: (!address.is_empty()).then_some(address),
        status,
        stats,
        degraded,
        orders: orders.map(<[Order]>::to_vec).unwrap_or_default(),
    }
}

// ── Shop orders ────────────────────────────────────────────────────

/// Row of the normalized listing. Names and phones arrive masked.
pub fn shop_order_from_summary(o: &OrderSummaryDto) -> ShopOrder {
    let status = o
        .status
        .as_deref()
        .and_then(OrderStatus::parse_any)
        .or_else(|| o.status_id.as_deref().and_then(OrderStatus::from_code))
        .unwrap_or(OrderStatus::New);
    let (amount, value) = payment_amount(o.payment_amount.as_deref());
    ShopOrder {
        id: o.id,
        number: owned(o.number.as_deref()).unwrap_or_else(|| o.id.to_string()),
        status,
        delivery_type: DeliveryType::Delivery,
        city: owned(o.delivery_city.as_deref()),
        address: owned(o.delivery_address_short.as_deref()),
        delivery_date: None,
        delivery_time: owned(o.delivery_time.as_deref()),
        main_product: owned(o.main_image.as_deref()).map(|image| OrderLine {
            product_id: None,
            title: None,
            image: Some(image),
            quantity: 1,
            composition: None,
        }),
        additional_items: Vec::new(),
        recipient: Party {
            name: owned(o.recipient_masked.as_deref()),
            phone: owned(o.recipient_phone_masked.as_deref()),
            email: None,
        },
        sender: Party::default(),
        postcard: None,
        comment: None,
        anonymous: false,
        payment: Payment {
            amount,
            value,
            paid: o.payment_status.as_deref() == Some(PAID_LABEL),
            method: None,
        },
        florist: o.executors.first().and_then(|e| owned(e.name.as_deref())),
        courier: None,
        photo_before_delivery: None,
        history: Vec::new(),
        created_at: parse_date(o.created_at.as_deref()),
        updated_at: None,
    }
}

fn basket_line(item: &LegacyBasketItem) -> OrderLine {
    OrderLine {
        product_id: owned(item.id.as_deref()),
        title: owned(item.product_name.as_deref()),
        image: owned(item.product_image_src.as_deref()),
        quantity: item.amount.unwrap_or(1),
        composition: None,
    }
}

/// Full row from the old order list. The first basket line is the main
/// product; without a basket the order's own product fields stand in.
pub fn shop_order_from_legacy(o: &LegacyShopOrder) -> ShopOrder {
    let main_product = match o.basket.first() {
        Some(first) => {
            let mut line = basket_line(first);
            line.image = line.image.or_else(|| owned(o.product_image.as_deref()));
            line.title = line.title.or_else(|| owned(o.product_name.as_deref()));
            Some(line)
        }
        None => Some(OrderLine {
            product_id: Some(o.id.to_string()),
            title: owned(o.product_name.as_deref()),
            image: owned(o.product_image.as_deref()),
            quantity: 1,
            composition: None,
        }),
    };
    let (amount, value) = payment_amount(
        o.price_formatted
            .as_deref()
            .or(o.full_price_formatted.as_deref()),
    );
    let address = [&o.address, &o.address_recipient, &o.street]
        .into_iter()
        .find_map(|a| owned(a.as_deref()));
    ShopOrder {
        id: o.id,
        number: o.id.to_string(),
        status: o
            .status_id
            .as_deref()
            .and_then(OrderStatus::from_code)
            .unwrap_or(OrderStatus::New),
        delivery_type: if o.pickup {
            DeliveryType::Pickup
        } else {
            DeliveryType::Delivery
        },
        city: owned(o.city.as_deref()),
        address,
        delivery_date: owned(o.delivery_date.as_deref()),
        delivery_time: owned(o.delivery_name.as_deref())
            .or_else(|| owned(o.plan_delivery_time.as_deref())),
        main_product,
        additional_items: o.basket.iter().skip(1).map(basket_line).collect(),
        recipient: Party {
            name: owned(o.name_recipient.as_deref()),
            phone: owned(o.phone_recipient.as_deref()).or_else(|| owned(o.phone.as_deref())),
            email: None,
        },
        sender: Party {
            name: None,
            phone: owned(o.phone.as_deref()),
            email: owned(o.email.as_deref()),
        },
        postcard: None,
        comment: owned(o.comment.as_deref()).or_else(|| owned(o.comment_courier.as_deref())),
        anonymous: false,
        payment: Payment {
            amount,
            value,
            paid: o.payed,
            method: None,
        },
        florist: owned(o.responsible_name.as_deref()),
        courier: None,
        photo_before_delivery: owned(o.recipient_photo.as_deref()),
        history: Vec::new(),
        created_at: parse_date(o.created_at.as_deref()),
        updated_at: None,
    }
}

fn party(p: Option<&OrderPartyDto>) -> Party {
    p.map(|p| Party {
        name: owned(p.name.as_deref()),
        phone: owned(p.phone.as_deref()),
        email: owned(p.email.as_deref()),
    })
    .unwrap_or_default()
}

fn product_line(p: &OrderProductDto) -> OrderLine {
    OrderLine {
        product_id: owned(p.id.as_deref()),
        title: owned(p.title.as_deref()),
        image: owned(p.image.as_deref()),
        quantity: 1,
        composition: owned(p.composition.as_deref()),
    }
}

fn item_line(i: &OrderItemDto) -> OrderLine {
    OrderLine {
        product_id: owned(i.product_id.as_deref()),
        title: owned(i.product_title.as_deref()),
        image: owned(i.product_image.as_deref()),
        quantity: i.quantity.unwrap_or(1),
        composition: None,
    }
}

/// The detail card.
pub fn shop_order_from_detail(o: &OrderDetailDto) -> ShopOrder {
    let payment = o.payment.as_ref();
    let (amount, value) = payment_amount(payment.and_then(|p| p.amount.as_deref()));
    let staff = o.executor.clone().unwrap_or_default();
    ShopOrder {
        id: o.id,
        number: owned(o.number.as_deref()).unwrap_or_else(|| o.id.to_string()),
        status: o
            .status
            .as_deref()
            .and_then(OrderStatus::parse_any)
            .unwrap_or(OrderStatus::New),
        delivery_type: if o.delivery_type.as_deref() == Some("pickup") {
            DeliveryType::Pickup
        } else {
            DeliveryType::Delivery
        },
        city: owned(o.delivery_city.as_deref()),
        address: owned(o.delivery_address.as_deref()),
        delivery_date: owned(o.delivery_date.as_deref()),
        delivery_time: owned(o.delivery_time.as_deref()),
        main_product: o.selected_product.as_ref().map(product_line),
        additional_items: o.additional_items.iter().map(item_line).collect(),
        recipient: party(o.recipient.as_ref()),
        sender: party(o.sender.as_ref()),
        postcard: owned(o.postcard.as_deref()),
        comment: owned(o.comment.as_deref()),
        anonymous: o.anonymous,
        payment: Payment {
            amount,
            value,
            paid: payment.and_then(|p| p.status.as_deref()) == Some("paid"),
            method: payment.and_then(|p| owned(p.method.as_deref())),
        },
        florist: owned(staff.florist.as_deref()),
        courier: owned(staff.courier.as_deref()),
        photo_before_delivery: owned(o.photo_before_delivery.as_deref()),
        history: o
            .history
            .iter()
            .map(|h| HistoryEntry {
                date: owned(h.date.as_deref()),
                description: h.description.clone().unwrap_or_default(),
            })
            .collect(),
        created_at: parse_date(o.created_at.as_deref()),
        updated_at: parse_date(o.updated_at.as_deref()),
    }
}

// ── Inventory ──────────────────────────────────────────────────────

impl From<InventoryItemDto> for InventoryItem {
    fn from(i: InventoryItemDto) -> Self {
        let category = InventoryCategory::classify(&i.name, i.flower.as_deref(), i.service);
        InventoryItem {
            id: i.id,
            name: i.name,
            cost: i.cost,
            quantity: i.quantity,
            markup: i.markup,
            location: owned(i.location.as_deref()),
            image: owned(i.image.as_deref()),
            images: i.images.unwrap_or_default(),
            service: i.service,
            flower: owned(i.flower.as_deref()),
            deactivated: i.deactivate,
            category,
        }
    }
}

impl From<InventoryHistoryDto> for StockMovement {
    fn from(h: InventoryHistoryDto) -> Self {
        StockMovement {
            operation: h.operation,
            lines: h
                .data
                .into_iter()
                .map(|m| MovementLine {
                    id: m.id,
                    name: m.name,
                    quantity: m.quantity,
                })
                .collect(),
            date: parse_date(h.date.as_deref()),
            user: owned(h.user.as_deref()),
            shop_id: h.shop_id,
            order_id: h.order_id,
        }
    }
}

// ── Products ───────────────────────────────────────────────────────

impl From<ProductDto> for Product {
    fn from(p: ProductDto) -> Self {
        Product {
            id: p.id,
            title: p.title.unwrap_or_default(),
            kind: p.kind,
            price: p.price.as_deref().and_then(parse_price),
            image: p.image,
            images: p.images,
            is_available: p.is_available,
            created_at: parse_date(p.created_at.as_deref()),
        }
    }
}
