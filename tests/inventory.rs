mod common;

use tokio::task::JoinSet;
use uuid::Uuid;
use variant_inventory_core::{error::AppError, services::inventory_service};

use common::{
    admin, create_product, create_variant, setup_shared_state, setup_state, shopper, stock_of,
};

#[tokio::test]
async fn deduct_to_zero_then_restock_keeps_flag_in_sync() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = create_product(&state, "INV-1", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 10).await?;
    let admin = admin();

    let drained = inventory_service::deduct(&state, &admin, variant.id, 10).await?;
    assert_eq!((drained.stock, drained.in_stock), (0, false));
    assert_eq!(stock_of(&state, variant.id).await?, (0, false));

    let refilled = inventory_service::restock(&state, &admin, variant.id, 20).await?;
    assert_eq!((refilled.stock, refilled.in_stock), (20, true));
    Ok(())
}

#[tokio::test]
async fn overdraw_is_refused_without_side_effects() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = create_product(&state, "INV-2", 3500).await?;
    let variant = create_variant(&state, product.id, "S", "Rojo", 3).await?;

    let err = inventory_service::deduct(&state, &admin(), variant.id, 4)
        .await
        .unwrap_err();
    match err {
        AppError::InsufficientStock {
            variant_id,
            requested,
            available,
        } => {
            assert_eq!(variant_id, variant.id);
            assert_eq!(requested, 4);
            assert_eq!(available, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(stock_of(&state, variant.id).await?, (3, true));
    Ok(())
}

#[tokio::test]
async fn quantities_must_be_positive() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = create_product(&state, "INV-3", 3500).await?;
    let variant = create_variant(&state, product.id, "L", "Verde", 5).await?;
    let admin = admin();

    for quantity in [0, -2] {
        let deduct = inventory_service::deduct(&state, &admin, variant.id, quantity).await;
        assert!(matches!(deduct, Err(AppError::Validation(_))));
        let restock = inventory_service::restock(&state, &admin, variant.id, quantity).await;
        assert!(matches!(restock, Err(AppError::Validation(_))));
    }
    assert_eq!(stock_of(&state, variant.id).await?, (5, true));
    Ok(())
}

#[tokio::test]
async fn set_stock_rejects_negative_and_derives_flag() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = create_product(&state, "INV-4", 3500).await?;
    let variant = create_variant(&state, product.id, "XL", "Gris", 5).await?;
    let admin = admin();

    let err = inventory_service::set_stock(&state, &admin, variant.id, -1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(stock_of(&state, variant.id).await?, (5, true));

    let zeroed = inventory_service::set_stock(&state, &admin, variant.id, 0).await?;
    assert!(!zeroed.in_stock);
    let set = inventory_service::set_stock(&state, &admin, variant.id, 7).await?;
    assert_eq!((set.stock, set.in_stock), (7, true));
    Ok(())
}

#[tokio::test]
async fn unknown_variant_is_not_found() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin();
    let missing = Uuid::new_v4();

    assert!(matches!(
        inventory_service::deduct(&state, &admin, missing, 1).await,
        Err(AppError::NotFound("variant"))
    ));
    assert!(matches!(
        inventory_service::restock(&state, &admin, missing, 1).await,
        Err(AppError::NotFound("variant"))
    ));
    assert!(matches!(
        inventory_service::set_stock(&state, &admin, missing, 1).await,
        Err(AppError::NotFound("variant"))
    ));
    Ok(())
}

#[tokio::test]
async fn stock_mutation_requires_admin() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = create_product(&state, "INV-5", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Azul", 5).await?;

    let err = inventory_service::restock(&state, &shopper(Uuid::new_v4()), variant.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[tokio::test]
async fn low_stock_report_uses_threshold() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = create_product(&state, "INV-6", 3500).await?;
    let low = create_variant(&state, product.id, "S", "Floral", 2).await?;
    let edge = create_variant(&state, product.id, "M", "Floral", 5).await?;
    let high = create_variant(&state, product.id, "L", "Floral", 8).await?;
    let admin = admin();

    let default_report = inventory_service::list_low_stock(&state, &admin, None).await?;
    let ids: Vec<Uuid> = default_report.iter().map(|v| v.id).collect();
    assert!(ids.contains(&low.id));
    assert!(ids.contains(&edge.id));
    assert!(!ids.contains(&high.id));

    let strict = inventory_service::list_low_stock(&state, &admin, Some(2)).await?;
    assert_eq!(strict.iter().map(|v| v.id).collect::<Vec<_>>(), vec![low.id]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deductions_never_oversell() -> anyhow::Result<()> {
    let store = setup_shared_state(5).await?;
    let state = store.state.clone();
    let product = create_product(&state, "INV-7", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 10).await?;

    let mut tasks = JoinSet::new();
    for _ in 0..25 {
        let state = state.clone();
        let admin = admin();
        let variant_id = variant.id;
        tasks.spawn(async move { inventory_service::deduct(&state, &admin, variant_id, 1).await });
    }

    let mut succeeded = 0;
    let mut refused = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(variant) => {
                assert!(variant.stock >= 0);
                assert_eq!(variant.in_stock, variant.stock > 0);
                succeeded += 1;
            }
            Err(AppError::InsufficientStock { available, .. }) => {
                assert_eq!(available, 0);
                refused += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(refused, 15);
    assert_eq!(stock_of(&state, variant.id).await?, (0, false));
    Ok(())
}

#[tokio::test]
async fn restock_past_the_integer_range_is_refused() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = create_product(&state, "INV-8", 3500).await?;
    let variant = create_variant(&state, product.id, "M", "Negro", 10).await?;
    let admin = admin();

    let err = inventory_service::restock(&state, &admin, variant.id, i32::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "unexpected error: {err:?}");
    assert_eq!(stock_of(&state, variant.id).await?, (10, true));

    inventory_service::set_stock(&state, &admin, variant.id, i32::MAX - 5).await?;
    let full = inventory_service::restock(&state, &admin, variant.id, 5).await?;
    assert_eq!((full.stock, full.in_stock), (i32::MAX, true));
    let over = inventory_service::restock(&state, &admin, variant.id, 1).await;
    assert!(matches!(over, Err(AppError::Validation(_))));
    assert_eq!(stock_of(&state, variant.id).await?, (i32::MAX, true));
    Ok(())
}
