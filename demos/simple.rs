//! Simple usage example

use lfqueue::Queue;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    println!("lfqueue - Simple Example\n");

    // Create a queue with room for 4 messages
    let queue = Arc::new(Queue::<String>::new(4));

    let producer_queue = queue.clone();
    let consumer_queue = queue.clone();

    let producer = thread::spawn(move || {
        for i in 0..10 {
            let mut message = format!("Message {}", i);
            println!("Sending: {}", message);

            // Queue is full: take the message back and retry
            while let Err(err) = producer_queue.push(message) {
                message = err.into_inner();
                std::hint::spin_loop();
            }

            thread::sleep(Duration::from_millis(100));
        }
        println!("Producer finished!");
    });

    let consumer = thread::spawn(move || {
        for _ in 0..10 {
            loop {
                match consumer_queue.pop() {
                    Some(message) => {
                        println!("Received: {}", message);
                        break;
                    }
                    // Queue is empty, spin and retry
                    None => std::hint::spin_loop(),
                }
            }
        }
        println!("Consumer finished!");
    });

    producer.join().unwrap();
    consumer.join().unwrap();

    println!("\nExample completed successfully! ({:?})", queue);
}
