#![cfg(loom)]

//! Run with `RUSTFLAGS="--cfg loom" cargo test --test loom_tests --release`.

use lfqueue::Queue;
use loom::model::Builder;
use loom::sync::Arc;
use loom::thread;

/// Explores interleavings with at most three preemptions per execution.
fn model<F>(f: F)
where
    F: Fn() + Sync + Send + 'static,
{
    let mut builder = Builder::new();
    builder.preemption_bound = Some(3);
    builder.check(f);
}

#[test]
fn loom_spsc() {
    model(|| {
        let queue = Arc::new(Queue::new(2));
        let q_push = queue.clone();
        let q_pop = queue.clone();

        let producer = thread::spawn(move || {
            for i in 0..2 {
                while q_push.push(i).is_err() {
                    thread::yield_now();
                }
            }
        });

        let consumer = thread::spawn(move || {
            let mut received = vec![];
            for _ in 0..2 {
                loop {
                    if let Some(val) = q_pop.pop() {
                        received.push(val);
                        break;
                    }
                    thread::yield_now();
                }
            }
            received
        });

        producer.join().unwrap();
        let received = consumer.join().unwrap();
        assert_eq!(received, vec![0, 1]);
    });
}

#[test]
fn loom_mpsc() {
    model(|| {
        let queue = Arc::new(Queue::new(2));
        let mut producers = vec![];

        for i in 0..2 {
            let q = queue.clone();
            producers.push(thread::spawn(move || {
                while q.push(i).is_err() {
                    thread::yield_now();
                }
            }));
        }

        let q = queue.clone();
        let consumer = thread::spawn(move || {
            let mut received = vec![];
            while received.len() < 2 {
                match q.pop() {
                    Some(val) => received.push(val),
                    None => thread::yield_now(),
                }
            }
            received
        });

        for h in producers {
            h.join().unwrap();
        }
        let mut received = consumer.join().unwrap();
        received.sort_unstable();
        assert_eq!(received, vec![0, 1]);
    });
}

#[test]
fn loom_spmc() {
    model(|| {
        let queue = Arc::new(Queue::new(2));

        let q = queue.clone();
        let producer = thread::spawn(move || {
            for i in 0..2 {
                // two vacant slots, so neither push can fail
                assert!(q.push(i).is_ok());
            }
        });

        let consumers: Vec<_> = (0..2)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || q.pop())
            })
            .collect();

        producer.join().unwrap();
        let mut received: Vec<i32> = consumers.into_iter().filter_map(|h| h.join().unwrap()).collect();
        while let Some(rest) = queue.pop() {
            received.push(rest);
        }
        received.sort_unstable();
        assert_eq!(received, vec![0, 1]);
    });
}

#[test]
fn loom_mpmc_no_duplicates() {
    model(|| {
        let queue = Arc::new(Queue::new(2));

        let producers: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|tag| {
                let q = queue.clone();
                thread::spawn(move || assert!(q.push(String::from(tag)).is_ok()))
            })
            .collect();

        let consumers: Vec<_> = (0..2)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || q.pop())
            })
            .collect();

        for h in producers {
            h.join().unwrap();
        }
        let mut received: Vec<String> = consumers.into_iter().filter_map(|h| h.join().unwrap()).collect();
        while let Some(rest) = queue.pop() {
            received.push(rest);
        }
        received.sort();
        assert_eq!(received, vec!["a", "b"]);
    });
}

#[test]
fn loom_full_queue() {
    model(|| {
        let queue = Arc::new(Queue::new(1));
        let q1 = queue.clone();
        let q2 = queue.clone();

        let t1 = thread::spawn(move || q1.push(1).is_ok());
        let t2 = thread::spawn(move || q2.push(2).is_ok());

        let ok1 = t1.join().unwrap();
        let ok2 = t2.join().unwrap();

        // a single slot accepts exactly one of the racing pushes
        assert!(ok1 ^ ok2);
        let value = queue.pop().unwrap();
        assert_eq!(value, if ok1 { 1 } else { 2 });
        assert_eq!(queue.pop(), None);
    });
}

#[test]
fn loom_single_slot_handoff() {
    model(|| {
        let queue = Arc::new(Queue::new(1));
        let q = queue.clone();

        let producer = thread::spawn(move || {
            for i in 0..2 {
                while q.push(i).is_err() {
                    thread::yield_now();
                }
            }
        });

        let mut received = vec![];
        while received.len() < 2 {
            match queue.pop() {
                Some(val) => received.push(val),
                None => thread::yield_now(),
            }
        }

        producer.join().unwrap();
        assert_eq!(received, vec![0, 1]);
    });
}

#[test]
fn loom_concurrent_push_pop() {
    model(|| {
        let queue = Arc::new(Queue::new(2));

        let q1 = queue.clone();
        let q2 = queue.clone();
        let q3 = queue.clone();

        let h1 = thread::spawn(move || q1.push(1).is_ok());
        let h2 = thread::spawn(move || q2.pop());
        let h3 = thread::spawn(move || q3.push(2).is_ok());

        assert!(h1.join().unwrap());
        let popped = h2.join().unwrap();
        assert!(h3.join().unwrap());

        let mut all: Vec<usize> = popped.into_iter().collect();
        while let Some(v) = queue.pop() {
            all.push(v);
        }
        all.sort_unstable();
        assert_eq!(all, vec![1, 2]);
    });
}

#[test]
fn loom_drop_leftovers() {
    model(|| {
        let tracker = std::sync::Arc::new(());
        let queue = Arc::new(Queue::new(2));

        let q = queue.clone();
        let t = tracker.clone();
        thread::spawn(move || {
            q.push(t).ok();
        })
        .join()
        .unwrap();

        drop(queue);
        assert_eq!(std::sync::Arc::strong_count(&tracker), 1);
    });
}
