//! Simulate command implementation.
//!
//! Builds a store node and a central node in one process, wires them
//! through the loopback transport, and runs mutate-then-push cycles so
//! the whole sync path can be observed without any network setup.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use stockmesh_core::{
    ReservationLedger, ReservationRequest, StockLedger, StockStore, SystemClock,
};
use stockmesh_sync_engine::{
    HttpTransport, LoopbackClient, LoopbackServer, PushScheduler, SyncConfig, SyncPusher,
};
use stockmesh_sync_protocol::SyncReport;
use stockmesh_sync_server::{CentralServer, ServerConfig};
use tracing::info;

/// Routes the pusher's requests into the in-process central server.
struct CentralLoopback {
    server: Arc<CentralServer>,
}

impl LoopbackServer for CentralLoopback {
    fn handle_post(&self, path: &str, body: &str) -> Result<String, String> {
        self.server.handle_post(path, body).map_err(|e| e.to_string())
    }
}

/// Summary of one simulation run.
#[derive(Debug, Serialize)]
struct SimulationResult {
    /// Merge report per push cycle.
    cycles: Vec<SyncReport>,
    /// Final per-product state on both nodes.
    products: Vec<ProductSummary>,
}

/// Final state of one product on both nodes.
#[derive(Debug, Serialize)]
struct ProductSummary {
    product_id: String,
    store_on_hand: i64,
    store_allocated: i64,
    central_quantity: Option<i64>,
}

/// Runs the simulate command.
pub fn run(
    products: u32,
    mutations: u32,
    cycles: u32,
    watch_ms: u64,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let central = Arc::new(CentralServer::new(ServerConfig::default()));
    let store = Arc::new(StockStore::new());
    let clock = Arc::new(SystemClock);

    let ledger = StockLedger::new(Arc::clone(&store), clock.clone());
    let reservations = ReservationLedger::new(Arc::clone(&store), clock.clone());

    let transport = Arc::new(HttpTransport::new(
        "http://central:8081",
        LoopbackClient::new(CentralLoopback {
            server: Arc::clone(&central),
        }),
    ));
    let config = SyncConfig::new("http://central:8081")
        .with_push_interval(Duration::from_millis(watch_ms.max(1)));
    let pusher = Arc::new(SyncPusher::new(Arc::clone(&store), transport, config));

    let product_ids: Vec<String> = (1..=products).map(|i| format!("SKU-{i:03}")).collect();
    for product_id in &product_ids {
        store.provision(product_id.clone(), 100, 0);
    }
    info!(products, "store provisioned");

    let mut result = SimulationResult {
        cycles: Vec::new(),
        products: Vec::new(),
    };

    for cycle in 1..=cycles {
        for step in 0..mutations {
            let product_id = &product_ids[(step as usize) % product_ids.len()];
            // Alternate restocks and sales, with a reservation that is
            // committed or released on the spot.
            match step % 3 {
                0 => {
                    ledger.adjust(product_id, 5)?;
                }
                1 => {
                    ledger.adjust(product_id, -2)?;
                }
                _ => {
                    let order = ReservationRequest::new(
                        format!("ORD-{cycle}-{step}"),
                        product_id.clone(),
                        1,
                    );
                    reservations.allocate(&order, None)?;
                    if step % 2 == 0 {
                        reservations.commit(&order)?;
                    } else {
                        reservations.release(&order)?;
                    }
                }
            }
        }

        let report = pusher.push_now()?;
        info!(
            cycle,
            received = report.received,
            applied = report.applied,
            skipped = report.skipped,
            "cycle pushed"
        );
        result.cycles.push(report);
    }

    if watch_ms > 0 {
        // Leave the scheduler running briefly so late mutations drain on
        // the periodic path.
        let scheduler = PushScheduler::start(Arc::clone(&pusher));
        ledger.adjust(&product_ids[0], 1)?;
        std::thread::sleep(Duration::from_millis(watch_ms * 3));
        scheduler.stop();
    }

    for product_id in &product_ids {
        if let Some(record) = store.get(product_id) {
            result.products.push(ProductSummary {
                product_id: product_id.clone(),
                store_on_hand: record.on_hand,
                store_allocated: record.allocated,
                central_quantity: central.handle_stock(product_id).ok().map(|r| r.quantity),
            });
        }
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &SimulationResult) {
    println!("Push cycles:");
    for (i, report) in result.cycles.iter().enumerate() {
        println!(
            "  #{}: received={} applied={} skipped={}",
            i + 1,
            report.received,
            report.applied,
            report.skipped
        );
    }
    println!("Final state:");
    for product in &result.products {
        let central = product
            .central_quantity
            .map(|q| q.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "  {}: store on-hand={} allocated={} central={}",
            product.product_id, product.store_on_hand, product.store_allocated, central
        );
    }
}
