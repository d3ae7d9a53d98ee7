use ring_buffer::BoundedBlockingQueue;
use std::thread;
extern crate core_affinity;
use core_affinity::CoreId;
use std::sync::OnceLock;

const N: usize = 4096; // Number of slots in the ring

const NUM_ITEMS: usize = 500_000_000;

static PROFILE_CORES: OnceLock<Vec<CoreId>> = OnceLock::new();

fn get_cores() -> &'static [CoreId] {
    PROFILE_CORES.get_or_init(|| core_affinity::get_core_ids().unwrap_or_default())
}

fn pin_to(index: usize) {
    if let Some(core) = get_cores().get(index) {
        let _ = core_affinity::set_for_current(*core);
    }
}

fn produce(queue: &BoundedBlockingQueue<usize>, start: usize, count: usize) {
    for i in 0..count {
        queue.push(start + i);
    }
}

fn consume(queue: &BoundedBlockingQueue<usize>, total_count: usize) {
    let mut expected: usize = 0;

    for _ in 0..total_count {
        let item = queue.pop();
        assert_eq!(item, expected);
        expected += 1;
    }
}

fn profile_blocking_queue(queue: &BoundedBlockingQueue<usize>) {
    println!("Starting bounded blocking queue profile...");

    thread::scope(|s| {
        let prod = s.spawn(|| {
            pin_to(0);
            produce(queue, 0, NUM_ITEMS);
        });

        pin_to(1);
        consume(queue, NUM_ITEMS);

        prod.join().unwrap();
    });
}

fn main() {
    let queue = BoundedBlockingQueue::<usize>::new(N).unwrap();

    profile_blocking_queue(&queue);

    println!("Bounded blocking queue profile completed.");
}
