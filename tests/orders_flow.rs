mod common;

use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::TransactionTrait;
use tokio::task::JoinSet;
use uuid::Uuid;
use variant_inventory_core::{
    config::CoreSettings,
    dto::{
        catalog::UpdateProductRequest,
        customers::CreateCustomerRequest,
        orders::{OrderLineRequest, PlaceOrderRequest},
    },
    entity::orders::OrderStatus,
    error::AppError,
    services::{catalog_service, customer_service, inventory_service, order_service},
    state::AppState,
};

use common::{
    admin, create_customer, create_product, create_variant, setup_shared_state, setup_state,
    shopper, stock_of,
};

fn order_of(lines: &[(Uuid, i32)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        shipping_address: Some("Av. Siempre Viva 742".into()),
        lines: lines
            .iter()
            .map(|&(variant_id, quantity)| OrderLineRequest {
                variant_id,
                quantity,
            })
            .collect(),
    }
}

/// Same store, with every unit of work limited to `budget`.
fn with_budget(state: &AppState, budget: Duration) -> AppState {
    AppState::new(
        state.orm.clone(),
        CoreSettings {
            operation_timeout: budget,
            ..state.settings
        },
    )
}

#[tokio::test]
async fn placing_an_order_reserves_stock_and_totals_lines() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-1", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Floral", 5).await?;

    let placed = order_service::place_order(&state, &customer, order_of(&[(variant.id, 2)])).await?;

    assert_eq!(placed.order.status, OrderStatus::Processing);
    assert_eq!(placed.order.total, Decimal::new(7000, 2));
    assert_eq!(placed.order.customer_id, customer.user_id);
    assert_eq!(placed.lines.len(), 1);
    assert_eq!(placed.lines[0].unit_price, Decimal::new(3500, 2));
    assert_eq!(placed.lines[0].quantity, 2);
    assert_eq!(stock_of(&state, variant.id).await?, (3, true));
    Ok(())
}

#[tokio::test]
async fn a_failing_line_rolls_back_every_reservation() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-2", 3500).await?;
    let plenty = create_variant(&state, product.id, "S", "Blanco", 10).await?;
    let scarce = create_variant(&state, product.id, "M", "Blanco", 3).await?;

    let err = order_service::place_order(
        &state,
        &customer,
        order_of(&[(plenty.id, 5), (scarce.id, 1000)]),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, AppError::InsufficientStock { variant_id, .. } if variant_id == scarce.id),
        "unexpected error: {err:?}"
    );
    assert_eq!(stock_of(&state, plenty.id).await?, (10, true));
    assert_eq!(stock_of(&state, scarce.id).await?, (3, true));
    let orders = order_service::list_orders(&state, &customer, customer.user_id, None).await?;
    assert!(orders.is_empty());
    Ok(())
}

#[tokio::test]
async fn draining_a_variant_through_an_order_clears_its_flag() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-3", 3500).await?;
    let variant = create_variant(&state, product.id, "L", "Floral", 2).await?;

    order_service::place_order(&state, &customer, order_of(&[(variant.id, 2)])).await?;
    assert_eq!(stock_of(&state, variant.id).await?, (0, false));
    Ok(())
}

#[tokio::test]
async fn invalid_requests_change_nothing() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-4", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 4).await?;

    let empty = order_service::place_order(&state, &customer, order_of(&[])).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let zero = order_service::place_order(&state, &customer, order_of(&[(variant.id, 0)])).await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    let unknown = order_service::place_order(
        &state,
        &customer,
        order_of(&[(variant.id, 1), (Uuid::new_v4(), 1)]),
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound("variant"))));

    let stranger = shopper(Uuid::new_v4());
    let no_customer = order_service::place_order(&state, &stranger, order_of(&[(variant.id, 1)])).await;
    assert!(matches!(no_customer, Err(AppError::NotFound("customer"))));

    assert_eq!(stock_of(&state, variant.id).await?, (4, true));
    Ok(())
}

#[tokio::test]
async fn cancelling_restores_stock_once() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-5", 3500).await?;
    let first = create_variant(&state, product.id, "S", "Rojo", 4).await?;
    let second = create_variant(&state, product.id, "M", "Rojo", 1).await?;

    let placed =
        order_service::place_order(&state, &customer, order_of(&[(first.id, 3), (second.id, 1)])).await?;
    assert_eq!(stock_of(&state, second.id).await?, (0, false));
    let fetched = order_service::get_order(&state, &customer, placed.order.id).await?;
    let line_variants: Vec<Uuid> = fetched.lines.iter().map(|l| l.variant_id).collect();
    assert_eq!(line_variants, vec![first.id, second.id]);

    let cancelled = order_service::cancel_order(&state, &customer, placed.order.id).await?;
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state, first.id).await?, (4, true));
    assert_eq!(stock_of(&state, second.id).await?, (1, true));

    let again = order_service::cancel_order(&state, &customer, placed.order.id).await;
    assert!(matches!(
        again,
        Err(AppError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Cancelled
        })
    ));
    assert_eq!(stock_of(&state, first.id).await?, (4, true));
    Ok(())
}

#[tokio::test]
async fn lifecycle_follows_the_state_machine() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-6", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Azul", 5).await?;
    let admin = admin();

    let placed = order_service::place_order(&state, &customer, order_of(&[(variant.id, 1)])).await?;
    let order_id = placed.order.id;

    let backwards = order_service::advance_order(&state, &admin, order_id, OrderStatus::Pending).await;
    assert!(matches!(backwards, Err(AppError::InvalidTransition { .. })));

    let shipped = order_service::advance_order(&state, &admin, order_id, OrderStatus::Shipped).await?;
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let late_cancel = order_service::cancel_order(&state, &customer, order_id).await;
    assert!(matches!(
        late_cancel,
        Err(AppError::InvalidTransition {
            from: OrderStatus::Shipped,
            ..
        })
    ));
    assert_eq!(stock_of(&state, variant.id).await?, (4, true));

    let delivered = order_service::advance_order(&state, &admin, order_id, OrderStatus::Delivered).await?;
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let after_delivery = order_service::advance_order(&state, &admin, order_id, OrderStatus::Shipped).await;
    assert!(matches!(after_delivery, Err(AppError::InvalidTransition { .. })));
    Ok(())
}

#[tokio::test]
async fn admin_cancellation_goes_through_restock() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-7", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Azul", 5).await?;

    let placed = order_service::place_order(&state, &customer, order_of(&[(variant.id, 5)])).await?;
    let order = order_service::advance_order(&state, &admin(), placed.order.id, OrderStatus::Cancelled).await?;

    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state, variant.id).await?, (5, true));
    Ok(())
}

#[tokio::test]
async fn order_lines_keep_the_price_paid() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-8", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 5).await?;

    let placed = order_service::place_order(&state, &customer, order_of(&[(variant.id, 1)])).await?;
    catalog_service::update_product(
        &state,
        &admin(),
        product.id,
        UpdateProductRequest {
            price: Some(Decimal::new(5000, 2)),
            ..Default::default()
        },
    )
    .await?;

    let fetched = order_service::get_order(&state, &customer, placed.order.id).await?;
    assert_eq!(fetched.lines[0].unit_price, Decimal::new(3500, 2));
    assert_eq!(fetched.order.total, Decimal::new(3500, 2));

    let next = order_service::place_order(&state, &customer, order_of(&[(variant.id, 1)])).await?;
    assert_eq!(next.lines[0].unit_price, Decimal::new(5000, 2));
    Ok(())
}

#[tokio::test]
async fn shipping_address_falls_back_to_customer_record() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-9", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 5).await?;

    let placed = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            shipping_address: None,
            lines: vec![OrderLineRequest {
                variant_id: variant.id,
                quantity: 1,
            }],
        },
    )
    .await?;
    assert_eq!(placed.order.shipping_address, "Calle 1, Ciudad");

    let homeless = customer_service::create_customer(
        &state,
        CreateCustomerRequest {
            name: "No Address".into(),
            email: "nowhere@example.com".into(),
            password_hash: "dummy-hash".into(),
            shipping_address: None,
        },
    )
    .await?;
    let err = order_service::place_order(
        &state,
        &shopper(homeless.id),
        PlaceOrderRequest {
            shipping_address: Some("   ".into()),
            lines: vec![OrderLineRequest {
                variant_id: variant.id,
                quantity: 1,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(stock_of(&state, variant.id).await?, (4, true));
    Ok(())
}

#[tokio::test]
async fn customers_only_see_their_own_orders() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let owner = shopper(create_customer(&state, "owner@example.com").await?);
    let other = shopper(create_customer(&state, "other@example.com").await?);
    let product = create_product(&state, "ORD-10", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 5).await?;

    let placed = order_service::place_order(&state, &owner, order_of(&[(variant.id, 1)])).await?;

    let peek = order_service::get_order(&state, &other, placed.order.id).await;
    assert!(matches!(peek, Err(AppError::Forbidden)));
    let cancel = order_service::cancel_order(&state, &other, placed.order.id).await;
    assert!(matches!(cancel, Err(AppError::Forbidden)));

    let as_admin = order_service::get_order(&state, &admin(), placed.order.id).await?;
    assert_eq!(as_admin.order.id, placed.order.id);

    let processing =
        order_service::list_orders(&state, &owner, owner.user_id, Some(OrderStatus::Processing)).await?;
    assert_eq!(processing.len(), 1);
    let shipped =
        order_service::list_orders(&state, &owner, owner.user_id, Some(OrderStatus::Shipped)).await?;
    assert!(shipped.is_empty());
    Ok(())
}

#[tokio::test]
async fn placement_that_cannot_finish_in_time_times_out_cleanly() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-11", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 5).await?;

    // Hold the only pooled connection so the placement cannot start.
    let blocker = state.orm.begin().await?;
    let hurried = with_budget(&state, Duration::from_millis(200));
    let err = order_service::place_order(&hurried, &customer, order_of(&[(variant.id, 2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Timeout), "unexpected error: {err:?}");
    blocker.rollback().await?;

    assert_eq!(stock_of(&state, variant.id).await?, (5, true));
    let orders = order_service::list_orders(&state, &customer, customer.user_id, None).await?;
    assert!(orders.is_empty());
    Ok(())
}

#[tokio::test]
async fn zero_budget_placement_times_out_without_reserving() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-12", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 5).await?;

    let blocker = state.orm.begin().await?;
    let no_time = with_budget(&state, Duration::ZERO);
    let result = order_service::place_order(&no_time, &customer, order_of(&[(variant.id, 1)])).await;
    assert!(matches!(result, Err(AppError::Timeout)), "unexpected result: {result:?}");
    blocker.rollback().await?;

    assert_eq!(stock_of(&state, variant.id).await?, (5, true));
    Ok(())
}

#[tokio::test]
async fn cancellation_runs_entirely_within_its_budget() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-13", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 5).await?;
    let placed = order_service::place_order(&state, &customer, order_of(&[(variant.id, 2)])).await?;

    // The ownership lookup is part of the bounded unit, so a held pool
    // yields a timeout rather than an acquire error.
    let blocker = state.orm.begin().await?;
    let hurried = with_budget(&state, Duration::from_millis(200));
    let err = order_service::cancel_order(&hurried, &customer, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Timeout), "unexpected error: {err:?}");
    blocker.rollback().await?;

    let order = order_service::get_order(&state, &customer, placed.order.id).await?;
    assert_eq!(order.order.status, OrderStatus::Processing);
    assert_eq!(stock_of(&state, variant.id).await?, (3, true));
    Ok(())
}

#[tokio::test]
async fn cancelling_into_a_full_variant_is_refused_atomically() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = shopper(create_customer(&state, "buyer@example.com").await?);
    let product = create_product(&state, "ORD-14", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 5).await?;
    let placed = order_service::place_order(&state, &customer, order_of(&[(variant.id, 2)])).await?;

    inventory_service::set_stock(&state, &admin(), variant.id, i32::MAX).await?;
    let err = order_service::cancel_order(&state, &customer, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "unexpected error: {err:?}");

    let order = order_service::get_order(&state, &customer, placed.order.id).await?;
    assert_eq!(order.order.status, OrderStatus::Processing);
    assert_eq!(stock_of(&state, variant.id).await?, (i32::MAX, true));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn competing_orders_never_oversell() -> anyhow::Result<()> {
    let store = setup_shared_state(5).await?;
    let state = store.state.clone();
    let product = create_product(&state, "ORD-15", 3500).await?;
    let scarce = create_variant(&state, product.id, "M", "Floral", 10).await?;
    let plenty = create_variant(&state, product.id, "L", "Floral", 100).await?;

    let mut tasks = JoinSet::new();
    for n in 0..12 {
        let customer = shopper(create_customer(&state, &format!("buyer{n}@example.com")).await?);
        let state = state.clone();
        let lines = order_of(&[(plenty.id, 1), (scarce.id, 2)]);
        tasks.spawn(async move { order_service::place_order(&state, &customer, lines).await });
    }

    let mut placed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(order) => placed.push(order),
            Err(AppError::InsufficientStock { variant_id, .. }) => assert_eq!(variant_id, scarce.id),
            Err(AppError::Conflict) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let succeeded = i32::try_from(placed.len())?;
    assert!(succeeded >= 1);
    assert!(succeeded <= 5);
    let (scarce_left, scarce_flag) = stock_of(&state, scarce.id).await?;
    assert_eq!(scarce_left, 10 - 2 * succeeded);
    assert_eq!(scarce_flag, scarce_left > 0);
    assert_eq!(stock_of(&state, plenty.id).await?, (100 - succeeded, true));
    for order in &placed {
        assert_eq!(order.order.total, Decimal::new(3 * 3500, 2));
    }
    Ok(())
}
