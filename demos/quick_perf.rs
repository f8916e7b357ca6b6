//! Quick throughput run over the usual producer/consumer shapes.
//!
//! `cargo run --release --example quick_perf -- [capacity]`

use lfqueue::Queue;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const MESSAGES: usize = 1_000_000;
const DEFAULT_CAPACITY: usize = 1024;

fn main() {
    let capacity = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_CAPACITY);

    println!("lfqueue Performance Test (capacity {capacity})");
    println!("==============================\n");

    for (producers, consumers) in [(1, 1), (4, 1), (1, 4), (4, 4)] {
        println!("{producers} Producer(s), {consumers} Consumer(s) ({MESSAGES} messages):");
        let start = Instant::now();
        run(capacity, producers, consumers);
        let elapsed = start.elapsed();
        let throughput = MESSAGES as f64 / elapsed.as_secs_f64();
        println!("  Time: {:?}", elapsed);
        println!("  Throughput: {:.2} msgs/sec", throughput);
        println!("  Latency: {:.0} ns/op\n", elapsed.as_nanos() as f64 / MESSAGES as f64);
    }
}

fn run(capacity: usize, producers: usize, consumers: usize) {
    let queue = Arc::new(Queue::<usize>::new(capacity));
    let per_producer = MESSAGES / producers;
    let per_consumer = MESSAGES / consumers;
    let mut handles = vec![];

    for p in 0..producers {
        let q = queue.clone();
        handles.push(thread::spawn(move || {
            for i in 0..per_producer {
                while q.push(p * per_producer + i).is_err() {
                    std::hint::spin_loop();
                }
            }
        }));
    }

    for _ in 0..consumers {
        let q = queue.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..per_consumer {
                while q.pop().is_none() {
                    std::hint::spin_loop();
                }
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }
}
