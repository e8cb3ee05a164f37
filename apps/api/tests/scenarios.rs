//! End-to-end sale scenarios, mostly against an in-memory database.

mod common;

use std::time::Duration;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use common::{fixed_now, Fixture};
use niaga_api::services::sale_service::{CheckoutItem, CheckoutRequest, ManualInvoiceRequest, ManualItem};
use niaga_api::ErrorCode;
use niaga_core::pricing::PriceInput;
use niaga_core::{RequestContext, SaleStatus};

fn manual_request(items: Vec<ManualItem>, customer_name: &str) -> ManualInvoiceRequest {
    ManualInvoiceRequest {
        items,
        customer_name: Some(customer_name.to_string()),
        ..Default::default()
    }
}

fn manual_item(product_id: i64, qty: i64, price: Option<PriceInput>) -> ManualItem {
    ManualItem {
        product_id,
        qty,
        price,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn scenario_a_checkout_uses_catalog_price_and_default_due_date() {
    let fx = Fixture::new().await;
    let ctx = fx.alice_ctx();

    let created = fx
        .state
        .sales
        .create_checkout(
            &ctx,
            vec![CheckoutItem {
                product_id: fx.beras.id,
                qty: 2,
            }],
        )
        .await
        .unwrap();
    assert_eq!(created.msg, "Transaksi Berhasil!");

    let detail = fx.state.sales.get_sale(&ctx, &created.sale_id).await.unwrap();
    let sale = &detail.sale;

    assert_eq!(sale.uuid, created.sale_id);
    assert_eq!(sale.total_price, 100_000);
    assert_eq!(sale.status, SaleStatus::Pending);
    assert_eq!(sale.user_id, Some(fx.alice.id));
    assert_eq!(sale.transaction_date, fixed_now());
    assert_eq!(sale.due_date, fixed_now() + ChronoDuration::days(7));
    assert!(sale.invoice_number.starts_with("INV/0125/"), "{}", sale.invoice_number);
    assert_eq!(sale.invoice_number.len(), "INV/0125/0000".len());
    assert!(sale.manual_details().is_none());

    assert_eq!(detail.items.len(), 1);
    let item = &detail.items[0];
    assert_eq!(item.product_id, fx.beras.id);
    assert_eq!(item.product_name, "Beras");
    assert_eq!(item.qty, 2);
    assert_eq!(item.price_at_purchase, 50_000);
    assert_eq!(item.subtotal, 100_000);
    assert_eq!(detail.items_total(), sale.total_price);

    let owner = detail.owner.unwrap();
    assert_eq!(owner.email, "alice@example.com");
    assert_eq!(owner.address.as_deref(), Some("Jl. Mawar 1"));
}

#[tokio::test]
async fn scenario_b_manual_invoice_with_price_override() {
    let fx = Fixture::new().await;
    let ctx = fx.admin_ctx();

    let created = fx
        .state
        .sales
        .create_manual_invoice(
            &ctx,
            manual_request(
                vec![manual_item(fx.beras.id, 1, Some(PriceInput::Amount(40_000)))],
                "Budi",
            ),
        )
        .await
        .unwrap();
    assert_eq!(created.msg, "Invoice Manual Berhasil Dibuat!");

    let detail = fx.state.sales.get_sale(&ctx, &created.sale_id).await.unwrap();
    let sale = &detail.sale;

    assert!(sale.invoice_number.starts_with("INV/M/0125/"), "{}", sale.invoice_number);
    assert_eq!(sale.total_price, 40_000);
    assert_eq!(sale.user_id, Some(fx.admin.id));
    assert_eq!(sale.customer_name.as_deref(), Some("Budi"));
    assert_eq!(sale.due_date, sale.transaction_date + ChronoDuration::days(7));
    assert_eq!(detail.items[0].price_at_purchase, 40_000);
    assert_eq!(detail.items[0].subtotal, 40_000);
}

#[tokio::test]
async fn scenario_c_concurrent_duplicate_invoice_number() {
    let fx = Fixture::new().await;
    let ctx = fx.admin_ctx();

    let request = ManualInvoiceRequest {
        invoice_number: Some("INV-001".to_string()),
        ..manual_request(vec![manual_item(fx.gula.id, 1, None)], "Budi")
    };

    let (first, second) = tokio::join!(
        fx.state.sales.create_manual_invoice(&ctx, request.clone()),
        fx.state.sales.create_manual_invoice(&ctx, request.clone()),
    );

    let results = [first, second];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.code == ErrorCode::Conflict))
        .count();

    assert_eq!(ok, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(fx.sale_count().await, 1);
    assert_eq!(fx.item_count().await, 1);

    let stored = fx
        .state
        .db
        .sales()
        .get_by_invoice_number("INV-001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_price, 18_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scenario_c_on_a_pooled_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let fx = Fixture::on_disk(dir.path(), 4).await;
    let ctx = fx.admin_ctx();

    let request = ManualInvoiceRequest {
        invoice_number: Some("INV-001".to_string()),
        ..manual_request(vec![manual_item(fx.beras.id, 2, None)], "Budi")
    };

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sales = fx.state.sales.clone();
            let ctx = ctx.clone();
            let request = request.clone();
            tokio::spawn(async move { sales.create_manual_invoice(&ctx, request).await })
        })
        .collect();

    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) if e.code == ErrorCode::Conflict => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(fx.sale_count().await, 1);
    assert_eq!(fx.item_count().await, 1);

    fx.state.db.close().await;
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn totals_equal_sum_of_subtotals() {
    let fx = Fixture::new().await;
    let ctx = fx.alice_ctx();

    let created = fx
        .state
        .sales
        .create_checkout(
            &ctx,
            vec![
                CheckoutItem {
                    product_id: fx.beras.id,
                    qty: 3,
                },
                CheckoutItem {
                    product_id: fx.gula.id,
                    qty: 2,
                },
                CheckoutItem {
                    product_id: fx.beras.id,
                    qty: 1,
                },
            ],
        )
        .await
        .unwrap();

    let detail = fx.state.sales.get_sale(&ctx, &created.sale_id).await.unwrap();
    assert_eq!(detail.items.len(), 3);
    for item in &detail.items {
        assert_eq!(item.subtotal, item.qty * item.price_at_purchase);
    }
    assert_eq!(detail.sale.total_price, 3 * 50_000 + 2 * 18_000 + 50_000);
    assert_eq!(detail.items_total(), detail.sale.total_price);
}

#[tokio::test]
async fn unknown_product_is_not_found_and_writes_nothing() {
    let fx = Fixture::new().await;
    let ctx = fx.alice_ctx();

    let err = fx
        .state
        .sales
        .create_checkout(
            &ctx,
            vec![
                CheckoutItem {
                    product_id: fx.beras.id,
                    qty: 1,
                },
                CheckoutItem {
                    product_id: 9_999,
                    qty: 1,
                },
                CheckoutItem {
                    product_id: 8_888,
                    qty: 1,
                },
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(err.message.contains("9999"), "{}", err.message);
    assert_eq!(fx.sale_count().await, 0);
    assert_eq!(fx.item_count().await, 0);
    assert!(fx.state.sales.list_sales(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_ignores_client_price_and_freezes_catalog_price() {
    let fx = Fixture::new().await;
    let ctx = fx.alice_ctx();

    let body = format!(r#"{{"items":[{{"productId":{},"qty":2,"price":1}}]}}"#, fx.beras.id);
    let req: CheckoutRequest = serde_json::from_str(&body).unwrap();

    let created = fx.state.sales.create_checkout(&ctx, req.items).await.unwrap();

    fx.state
        .db
        .products()
        .update_price(fx.beras.id, 60_000)
        .await
        .unwrap();

    let detail = fx.state.sales.get_sale(&ctx, &created.sale_id).await.unwrap();
    assert_eq!(detail.items[0].price_at_purchase, 50_000);
    assert_eq!(detail.sale.total_price, 100_000);
}

#[tokio::test]
async fn empty_and_non_positive_lines_are_rejected() {
    let fx = Fixture::new().await;
    let ctx = fx.alice_ctx();

    let err = fx.state.sales.create_checkout(&ctx, vec![]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    for qty in [0, -3] {
        let err = fx
            .state
            .sales
            .create_checkout(
                &ctx,
                vec![CheckoutItem {
                    product_id: fx.beras.id,
                    qty,
                }],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    assert_eq!(fx.sale_count().await, 0);
}

#[tokio::test]
async fn reused_invoice_number_conflicts_without_new_rows() {
    let fx = Fixture::new().await;
    let ctx = fx.admin_ctx();

    let request = ManualInvoiceRequest {
        invoice_number: Some("  INV-777  ".to_string()),
        ..manual_request(vec![manual_item(fx.beras.id, 2, None)], "Budi")
    };
    let created = fx
        .state
        .sales
        .create_manual_invoice(&ctx, request.clone())
        .await
        .unwrap();

    let detail = fx.state.sales.get_sale(&ctx, &created.sale_id).await.unwrap();
    assert_eq!(detail.sale.invoice_number, "INV-777");

    let (sales_before, items_before) = (fx.sale_count().await, fx.item_count().await);

    let err = fx
        .state
        .sales
        .create_manual_invoice(&ctx, request)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    assert!(err.message.contains("INV-777"));

    assert_eq!(fx.sale_count().await, sales_before);
    assert_eq!(fx.item_count().await, items_before);
}

#[tokio::test]
async fn customers_cannot_read_each_others_sales() {
    let fx = Fixture::new().await;

    let created = fx
        .state
        .sales
        .create_checkout(
            &fx.alice_ctx(),
            vec![CheckoutItem {
                product_id: fx.gula.id,
                qty: 1,
            }],
        )
        .await
        .unwrap();

    let err = fx
        .state
        .sales
        .get_sale(&fx.bob_ctx(), &created.sale_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let detail = fx
        .state
        .sales
        .get_sale(&fx.admin_ctx(), &created.sale_id)
        .await
        .unwrap();
    assert_eq!(detail.sale.user_id, Some(fx.alice.id));
}

#[tokio::test]
async fn ownerless_sale_is_admin_only() {
    let fx = Fixture::new().await;

    // A second admin issues the invoice and is later removed.
    let clerk = fx
        .state
        .db
        .users()
        .insert("Kasir", "kasir@example.com", niaga_core::Role::Admin, None, None)
        .await
        .unwrap();

    let created = fx
        .state
        .sales
        .create_manual_invoice(
            &RequestContext::admin(clerk.id),
            manual_request(vec![manual_item(fx.gula.id, 1, None)], "Walk-in"),
        )
        .await
        .unwrap();

    fx.state.db.users().delete(clerk.id).await.unwrap();

    let err = fx
        .state
        .sales
        .get_sale(&fx.alice_ctx(), &created.sale_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let detail = fx
        .state
        .sales
        .get_sale(&fx.admin_ctx(), &created.sale_id)
        .await
        .unwrap();
    assert_eq!(detail.sale.user_id, None);
    assert!(detail.owner.is_none());
    assert_eq!(detail.sale.customer_name.as_deref(), Some("Walk-in"));
}

#[tokio::test]
async fn unknown_sale_is_not_found() {
    let fx = Fixture::new().await;
    let ctx = fx.admin_ctx();

    let err = fx
        .state
        .sales
        .get_sale(&ctx, "00000000-0000-4000-8000-000000000000")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = fx.state.sales.get_sale(&ctx, "not-a-uuid").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn list_is_scoped_by_role() {
    let fx = Fixture::new().await;

    for (ctx, product_id) in [(fx.alice_ctx(), fx.beras.id), (fx.bob_ctx(), fx.gula.id)] {
        fx.state
            .sales
            .create_checkout(&ctx, vec![CheckoutItem { product_id, qty: 1 }])
            .await
            .unwrap();
    }

    let all = fx.state.sales.list_sales(&fx.admin_ctx()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|s| s.owner_email.is_some()));

    let own = fx.state.sales.list_sales(&fx.alice_ctx()).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].total_price, 50_000);
    assert!(own[0].owner_name.is_none());
}

// =============================================================================
// Manual invoice rules
// =============================================================================

#[tokio::test]
async fn manual_invoice_is_admin_only_before_anything_else() {
    let fx = Fixture::new().await;

    // Invalid in every other way too; the role check wins.
    let err = fx
        .state
        .sales
        .create_manual_invoice(&fx.alice_ctx(), ManualInvoiceRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
    assert_eq!(fx.sale_count().await, 0);
}

#[tokio::test]
async fn manual_invoice_requires_customer_name() {
    let fx = Fixture::new().await;

    for name in [None, Some("   ".to_string())] {
        let req = ManualInvoiceRequest {
            items: vec![manual_item(fx.beras.id, 1, None)],
            customer_name: name,
            ..Default::default()
        };
        let err = fx
            .state
            .sales
            .create_manual_invoice(&fx.admin_ctx(), req)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
    assert_eq!(fx.sale_count().await, 0);
}

#[tokio::test]
async fn manual_price_inputs() {
    let fx = Fixture::new().await;
    let ctx = fx.admin_ctx();

    let created = fx
        .state
        .sales
        .create_manual_invoice(
            &ctx,
            manual_request(
                vec![
                    manual_item(fx.beras.id, 1, Some(PriceInput::Text("".into()))),
                    manual_item(fx.gula.id, 2, Some(PriceInput::Text("15000".into()))),
                    manual_item(fx.gula.id, 1, Some(PriceInput::Amount(0))),
                ],
                "Budi",
            ),
        )
        .await
        .unwrap();

    let detail = fx.state.sales.get_sale(&ctx, &created.sale_id).await.unwrap();
    let prices: Vec<i64> = detail.items.iter().map(|i| i.price_at_purchase).collect();
    assert_eq!(prices, vec![50_000, 15_000, 0]);
    assert_eq!(detail.sale.total_price, 80_000);

    for bad in [PriceInput::Amount(-1), PriceInput::Text("abc".into())] {
        let err = fx
            .state
            .sales
            .create_manual_invoice(
                &ctx,
                manual_request(vec![manual_item(fx.beras.id, 1, Some(bad))], "Budi"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}

#[tokio::test]
async fn manual_dates_and_invoice_month() {
    let fx = Fixture::new().await;
    let ctx = fx.admin_ctx();

    let req = ManualInvoiceRequest {
        transaction_date: Some("2024-12-05".to_string()),
        ..manual_request(vec![manual_item(fx.gula.id, 1, None)], "Budi")
    };
    let created = fx.state.sales.create_manual_invoice(&ctx, req).await.unwrap();
    let sale = fx.state.sales.get_sale(&ctx, &created.sale_id).await.unwrap().sale;

    // Midnight at +08:00.
    let expected_tx = Utc.with_ymd_and_hms(2024, 12, 4, 16, 0, 0).unwrap();
    assert_eq!(sale.transaction_date, expected_tx);
    assert_eq!(sale.due_date, expected_tx + ChronoDuration::days(7));
    assert!(sale.invoice_number.starts_with("INV/M/1224/"), "{}", sale.invoice_number);

    // A due date before the transaction date is stored as given.
    let req = ManualInvoiceRequest {
        transaction_date: Some("2025-01-20T09:00:00+08:00".to_string()),
        due_date: Some("2025-01-10".to_string()),
        ..manual_request(vec![manual_item(fx.gula.id, 1, None)], "Budi")
    };
    let created = fx.state.sales.create_manual_invoice(&ctx, req).await.unwrap();
    let sale = fx.state.sales.get_sale(&ctx, &created.sale_id).await.unwrap().sale;
    assert!(sale.due_date < sale.transaction_date);

    let req = ManualInvoiceRequest {
        due_date: Some("31/01/2025".to_string()),
        ..manual_request(vec![manual_item(fx.gula.id, 1, None)], "Budi")
    };
    let err = fx
        .state
        .sales
        .create_manual_invoice(&ctx, req)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

// =============================================================================
// Timeouts
// =============================================================================

#[tokio::test]
async fn expired_request_writes_nothing_and_frees_the_connection() {
    let fx = Fixture::new().await;

    // The in-memory pool has one connection; hold it so the request stalls.
    let blocker = fx.state.db.sales().begin().await.unwrap();

    let ctx = fx.alice_ctx().with_timeout(Duration::from_millis(50));
    let err = fx
        .state
        .sales
        .create_checkout(
            &ctx,
            vec![CheckoutItem {
                product_id: fx.beras.id,
                qty: 1,
            }],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Internal);

    blocker.rollback().await.unwrap();
    assert_eq!(fx.sale_count().await, 0);

    fx.state
        .sales
        .create_checkout(
            &fx.alice_ctx(),
            vec![CheckoutItem {
                product_id: fx.beras.id,
                qty: 1,
            }],
        )
        .await
        .unwrap();
    assert_eq!(fx.sale_count().await, 1);
}
