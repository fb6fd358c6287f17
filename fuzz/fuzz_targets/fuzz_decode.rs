// fuzz/fuzz_targets/fuzz_decode.rs
#![no_main]

use hist_listener::histogram::aggregate::aggregate;
use hist_listener::histogram::decode::decode;
use hist_listener::histogram::store::ChannelStore;
use libfuzzer_sys::fuzz_target;

// Cap the number of messages per case to keep runs short.
const MAX_MESSAGES_PER_FUZZ_CASE: usize = 64;

fuzz_target!(|data: &[u8]| {
    // Lines are messages, NUL bytes separate parts.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut store = ChannelStore::new();
    for line in text.lines().take(MAX_MESSAGES_PER_FUZZ_CASE) {
        let parts: Vec<&str> = line.split('\0').collect();
        if let Ok(update) = decode(&parts) {
            // Decoded snapshots must satisfy the bin invariant.
            assert_eq!(
                update.snapshot.counts.len() + 1,
                update.snapshot.bin_edges.len()
            );
            store.update(update.channel, update.snapshot);
        }
    }
    // Aggregation must never panic, whatever mix of geometries was stored.
    let _ = aggregate(&store.snapshot_all());
});
