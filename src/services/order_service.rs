use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    db::with_retries,
    dto::orders::{OrderLineRequest, PlaceOrderRequest},
    entity::{
        order_lines::ActiveModel as OrderLineActive,
        orders::{ActiveModel as OrderActive, Model as OrderModel, OrderStatus},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner_or_admin},
    models::{Order, OrderLine, OrderWithLines},
    repository::{customers, orders, variants},
    services::inventory_service,
    state::AppState,
};

/// A requested line after its variant and price have been resolved.
#[derive(Debug, Clone, Copy)]
struct PricedLine {
    variant_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
}

/// Place an order for the authenticated customer.
///
/// Every stock deduction and the order with its lines are committed as one
/// transaction; any failing line rolls back all earlier reservations. Store
/// conflicts retry the whole placement up to `max_retries` times, then surface
/// as [`AppError::Conflict`]. The whole call is bounded by the operation timeout.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<OrderWithLines> {
    let customer_id = user.user_id;
    let PlaceOrderRequest {
        shipping_address,
        lines,
    } = payload;
    if lines.is_empty() {
        return Err(AppError::Validation("order must contain at least one line".into()));
    }

    let lines = lines.as_slice();
    let placed = with_retries(&state.orm, state.settings, "place_order", move |txn| {
        let shipping_address = shipping_address.clone();
        async move {
            let result = place_order_in(&txn, customer_id, shipping_address, lines).await;
            (txn, result)
        }
    })
    .await?;

    tracing::info!(
        order_id = %placed.order.id,
        %customer_id,
        total = %placed.order.total,
        lines = placed.lines.len(),
        "order placed"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_place",
        "orders",
        serde_json::json!({ "order_id": placed.order.id, "total": placed.order.total }),
    )
    .await;

    Ok(placed)
}

async fn place_order_in<C: ConnectionTrait>(
    db: &C,
    customer_id: Uuid,
    shipping_address: Option<String>,
    requested: &[OrderLineRequest],
) -> AppResult<OrderWithLines> {
    let customer = customers::find_by_id(db, customer_id)
        .await?
        .ok_or(AppError::NotFound("customer"))?;
    let shipping_address = shipping_address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .or(customer.shipping_address)
        .ok_or_else(|| AppError::Validation("shipping address is required".into()))?;

    let mut priced = Vec::with_capacity(requested.len());
    for line in requested {
        let (variant, product) = variants::find_with_product(db, line.variant_id)
            .await?
            .ok_or(AppError::NotFound("variant"))?;
        let product = product.ok_or(AppError::NotFound("product"))?;
        priced.push(PricedLine {
            variant_id: variant.id,
            quantity: line.quantity,
            unit_price: product.price,
        });
    }

    if let Some(bad) = priced.iter().find(|l| l.quantity < 1) {
        return Err(AppError::Validation(format!(
            "quantity for variant {} must be >= 1",
            bad.variant_id
        )));
    }

    // Fixed lock order across concurrent placements.
    let mut reservation_order: Vec<&PricedLine> = priced.iter().collect();
    reservation_order.sort_by_key(|l| l.variant_id);
    for line in reservation_order {
        inventory_service::deduct_in(db, line.variant_id, line.quantity).await?;
    }

    let total = order_total(&priced);
    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        shipping_address: Set(shipping_address),
        status: Set(OrderStatus::Processing),
        total: Set(total),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    let mut lines = Vec::with_capacity(priced.len());
    for (position, line) in (0..).zip(&priced) {
        let saved = OrderLineActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            position: Set(position),
            variant_id: Set(line.variant_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            created_at: Set(now.into()),
        }
        .insert(db)
        .await?;
        lines.push(OrderLine::from(saved));
    }

    Ok(OrderWithLines {
        order: order.into(),
        lines,
    })
}

/// Cancel an open order and return every line's quantity to stock.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<OrderWithLines> {
    let cancelled = with_retries(&state.orm, state.settings, "cancel_order", |txn| async move {
        let result = cancel_order_in(&txn, user, order_id).await;
        (txn, result)
    })
    .await?;

    tracing::info!(%order_id, "order cancelled");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": order_id }),
    )
    .await;

    Ok(cancelled)
}

async fn cancel_order_in<C: ConnectionTrait>(
    db: &C,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<OrderWithLines> {
    let existing = load_order(db, order_id).await?;
    ensure_owner_or_admin(user, existing.customer_id)?;

    let changed = orders::compare_and_set_status(
        db,
        order_id,
        &OrderStatus::CANCELLABLE,
        OrderStatus::Cancelled,
    )
    .await?;
    if changed == 0 {
        let current = orders::find_by_id(db, order_id)
            .await?
            .ok_or(AppError::NotFound("order"))?;
        return Err(AppError::InvalidTransition {
            from: current.status,
            to: OrderStatus::Cancelled,
        });
    }

    let lines = orders::lines(db, order_id).await?;
    for line in &lines {
        match inventory_service::restock_in(db, line.variant_id, line.quantity).await {
            Ok(_) => {}
            // The variant went away with its product; nothing left to restock.
            Err(AppError::NotFound(_)) => {
                tracing::warn!(%order_id, variant_id = %line.variant_id, "restock skipped, variant deleted");
            }
            Err(err) => return Err(err),
        }
    }

    let order = load_order(db, order_id).await?;
    Ok(OrderWithLines {
        order: order.into(),
        lines: lines.into_iter().map(OrderLine::from).collect(),
    })
}

/// Move an order one step along its lifecycle. Cancelling goes through
/// [`cancel_order`] so reserved stock is always returned.
pub async fn advance_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    next: OrderStatus,
) -> AppResult<Order> {
    ensure_admin(user)?;
    if next == OrderStatus::Cancelled {
        return cancel_order(state, user, order_id).await.map(|o| o.order);
    }

    let order = with_retries(&state.orm, state.settings, "advance_order", |txn| async move {
        let result = advance_order_in(&txn, order_id, next).await;
        (txn, result)
    })
    .await?;

    tracing::info!(%order_id, status = %order.status, "order status updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order_id, "status": order.status.as_str() }),
    )
    .await;

    Ok(order.into())
}

async fn advance_order_in<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    next: OrderStatus,
) -> AppResult<OrderModel> {
    let current = load_order(db, order_id).await?;
    if !current.status.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: current.status,
            to: next,
        });
    }
    // Someone else moved the order between our read and write.
    if orders::compare_and_set_status(db, order_id, &[current.status], next).await? == 0 {
        return Err(AppError::Conflict);
    }
    load_order(db, order_id).await
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<OrderWithLines> {
    let order = load_order(&state.orm, order_id).await?;
    ensure_owner_or_admin(user, order.customer_id)?;
    let lines = orders::lines(&state.orm, order_id)
        .await?
        .into_iter()
        .map(OrderLine::from)
        .collect();

    Ok(OrderWithLines {
        order: order.into(),
        lines,
    })
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    customer_id: Uuid,
    status: Option<OrderStatus>,
) -> AppResult<Vec<Order>> {
    ensure_owner_or_admin(user, customer_id)?;
    Ok(orders::list_for_customer(&state.orm, customer_id, status)
        .await?
        .into_iter()
        .map(Order::from)
        .collect())
}

async fn load_order<C: ConnectionTrait>(db: &C, order_id: Uuid) -> AppResult<OrderModel> {
    orders::find_by_id(db, order_id)
        .await?
        .ok_or(AppError::NotFound("order"))
}

fn order_total(lines: &[PricedLine]) -> Decimal {
    lines
        .iter()
        .map(|l| l.unit_price * Decimal::from(l.quantity))
        .sum()
}
