//! Concurrency stress tests — concurrent `AssignTicket` calls against a
//! shared routing service.
//!
//! Tests verify:
//! - No lost updates: N concurrent assignments to one desk of capacity N
//!   end at load N
//! - Select-then-reserve is atomic: no desk is pushed past the
//!   availability threshold while another desk still had room
//! - Every queued ticket appears exactly once in the waiting queue

use routing::{
    AssignTicketRequest, Complexity, DeskConfig, RegistryConfig, RoutingService, Tier,
};
use std::collections::HashSet;
use std::sync::Arc;

fn single_desk_config(capacity: u32) -> RegistryConfig {
    RegistryConfig {
        desks: vec![DeskConfig::new(
            "Service Desk 1",
            "soporte_general",
            Tier::General,
            capacity,
        )],
        escalation_order: vec![Tier::General],
        product_rules: Vec::new(),
        ..RegistryConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_assignments_are_not_lost() {
    const N: u32 = 200;
    let service = Arc::new(RoutingService::from_config(&single_desk_config(N)).unwrap());

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .assign_ticket(&AssignTicketRequest::new(format!("C-{}", i)))
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let status = service.desk_status().unwrap();
    assert_eq!(status["Service Desk 1"].current_load, N);
    assert_eq!(service.stats().processed, N as u64);
}

#[test]
fn concurrent_threads_respect_threshold() {
    let service = Arc::new(RoutingService::from_config(&RegistryConfig::default()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                (0..20)
                    .map(|i| {
                        let request = AssignTicketRequest::new(format!("W{}-{}", worker, i))
                            .with_complexity(Complexity::Medium, 50.0, Tier::General);
                        service.assign_ticket(&request).unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(results.len(), 160);

    // 5 General desks x 18 slots below the 90% threshold
    let placed = results.iter().filter(|r| !r.queued).count();
    assert_eq!(placed, 90);

    let queue = service.list_queue().unwrap();
    assert_eq!(queue.count, 70);
    let queued_ids: HashSet<_> = queue.entries.iter().map(|e| e.ticket_id.clone()).collect();
    assert_eq!(queued_ids.len(), 70);
    for result in results.iter().filter(|r| r.queued) {
        assert!(queued_ids.contains(&result.ticket_id));
    }

    for status in service.desk_status().unwrap().values() {
        assert!(status.current_load <= status.max_capacity);
    }
}
