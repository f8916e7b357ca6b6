//! Telemetry pipeline: sensor threads push samples, workers aggregate them.
//!
//! Samples that find the queue full are dropped and counted, which is the
//! usual policy for telemetry where fresh data beats complete data.
//!
//! `RUST_LOG=debug cargo run --example work_queue`

use lfqueue::Queue;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SENSORS: usize = 3;
const WORKERS: usize = 2;
const SAMPLES_PER_SENSOR: u64 = 500;

#[derive(Debug)]
struct Sample {
    sensor: usize,
    reading: u64,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let samples = Arc::new(Queue::<Sample>::new(64));
    let dropped = Arc::new(AtomicU64::new(0));
    let done = Arc::new(AtomicBool::new(false));

    let sensors: Vec<_> = (0..SENSORS)
        .map(|sensor| {
            let samples = samples.clone();
            let dropped = dropped.clone();
            thread::spawn(move || {
                for reading in 0..SAMPLES_PER_SENSOR {
                    if samples.push(Sample { sensor, reading }).is_err() {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    if reading % 50 == 0 {
                        thread::sleep(Duration::from_millis(1));
                    }
                }
                info!(sensor, "sensor finished");
            })
        })
        .collect();

    let workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let samples = samples.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut count = 0u64;
                let mut sum = 0u64;
                let mut last_pass = false;
                loop {
                    match samples.pop() {
                        Some(sample) => {
                            count += 1;
                            sum += sample.reading;
                            if sample.reading == SAMPLES_PER_SENSOR - 1 {
                                info!(worker, sensor = sample.sensor, "saw final sample");
                            }
                        }
                        None if last_pass => break,
                        None => {
                            // one more pass once the sensors are done
                            last_pass = done.load(Ordering::Acquire);
                            thread::yield_now();
                        }
                    }
                }
                info!(worker, count, sum, "worker finished");
                count
            })
        })
        .collect();

    for sensor in sensors {
        sensor.join().unwrap();
    }
    done.store(true, Ordering::Release);

    let processed: u64 = workers.into_iter().map(|w| w.join().unwrap()).sum();
    let dropped = dropped.load(Ordering::Relaxed);
    if dropped > 0 {
        warn!(dropped, "samples dropped on a full queue");
    }

    assert_eq!(processed + dropped, SENSORS as u64 * SAMPLES_PER_SENSOR);
    info!(processed, dropped, "pipeline drained");
}
