//! Simulated profile fetches: unbounded threads vs. a bounded ordered map.
//!
//! Run with `RUST_LOG=debug` to see admission decisions.

use gather_rs::prelude::*;
use std::thread;
use std::time::{Duration, Instant};

fn fetch_user_profile(id: u32) -> String {
    thread::sleep(Duration::from_millis(250));
    let name = thread::current().name().unwrap_or("unnamed").to_string();
    format!("Processed UserProfile: {} by {}", id, name)
}

fn main() -> Result<()> {
    env_logger::init();

    let user_ids: Vec<u32> = (1..=10).collect();

    println!("=== One thread per fetch ===\n");
    let start = Instant::now();
    let handles: Vec<_> = user_ids
        .iter()
        .map(|&id| thread::spawn(move || fetch_user_profile(id)))
        .collect();
    for handle in handles {
        match handle.join() {
            Ok(profile) => println!("{}", profile),
            Err(_) => println!("fetch thread panicked"),
        }
    }
    println!("took {:?}", start.elapsed());

    println!("\n=== map_concurrent, limit 3 ===\n");
    let start = Instant::now();
    for profile in user_ids.iter().copied().map_concurrent(3, fetch_user_profile)? {
        println!("{}", profile);
    }
    println!("took {:?}", start.elapsed());

    println!("\n=== Failing fetch, fail-fast ===\n");
    let result = try_map_concurrent(user_ids, 3, |id: u32| {
        if id == 4 {
            Err(format!("user {} is unavailable", id))
        } else {
            Ok(fetch_user_profile(id))
        }
    });
    match result {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("error: {}", e),
    }

    #[cfg(feature = "telemetry")]
    {
        let snap = gather_rs::runtime::current()?.metrics();
        println!(
            "\nadmitted {} completed {} failed {} peak in flight {}",
            snap.tasks_admitted, snap.tasks_completed, snap.tasks_failed, snap.peak_in_flight
        );
    }

    gather_rs::shutdown();
    Ok(())
}
