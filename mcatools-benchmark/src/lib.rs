use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct RegionMetrics {
    // Decode Stats
    pub total_chunks_decoded: AtomicUsize,
    pub total_decode_time_us: AtomicU64,
    pub max_decode_time_us: AtomicU64,
    pub total_decode_failures: AtomicUsize,

    // Encode Stats
    pub total_chunks_encoded: AtomicUsize,
    pub total_encode_time_us: AtomicU64,
    pub max_encode_time_us: AtomicU64,

    // Sizes
    pub total_raw_bytes: AtomicU64,
    pub total_compressed_bytes: AtomicU64,
    pub total_padding_bytes: AtomicU64,

    // Session
    pub start_time: Option<Instant>,
}

impl RegionMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_decode(&self, duration: Duration) {
        self.total_chunks_decoded.fetch_add(1, Ordering::Relaxed);
        let us = duration.as_micros() as u64;
        self.total_decode_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_decode_time_us.fetch_max(us, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.total_decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_encode(&self, duration: Duration) {
        self.total_chunks_encoded.fetch_add(1, Ordering::Relaxed);
        let us = duration.as_micros() as u64;
        self.total_encode_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_encode_time_us.fetch_max(us, Ordering::Relaxed);
    }

    /// Sizes of one chunk blob before and after compression.
    pub fn record_chunk_sizes(&self, raw: usize, compressed: usize) {
        self.total_raw_bytes.fetch_add(raw as u64, Ordering::Relaxed);
        self.total_compressed_bytes.fetch_add(compressed as u64, Ordering::Relaxed);
    }

    pub fn record_padding(&self, bytes: usize) {
        self.total_padding_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();

        let decoded = self.total_chunks_decoded.load(Ordering::Relaxed);
        let decode_total = self.total_decode_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let decode_max = self.max_decode_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let decode_avg = if decoded > 0 { decode_total / decoded as f64 } else { 0.0 };
        let failures = self.total_decode_failures.load(Ordering::Relaxed);

        let encoded = self.total_chunks_encoded.load(Ordering::Relaxed);
        let encode_total = self.total_encode_time_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let encode_max = self.max_encode_time_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let encode_avg = if encoded > 0 { encode_total / encoded as f64 } else { 0.0 };

        let raw = self.total_raw_bytes.load(Ordering::Relaxed);
        let compressed = self.total_compressed_bytes.load(Ordering::Relaxed);
        let padding = self.total_padding_bytes.load(Ordering::Relaxed);
        let ratio = if compressed > 0 { raw as f64 / compressed as f64 } else { 0.0 };

        format!(
            "mcatools Benchmark Report\n\
             =========================\n\
             Session Duration: {:.2?}\n\n\
             [Decode]\n\
             Chunks Decoded: {}\n\
             Failures: {}\n\
             Total Time: {:.2} ms\n\
             Avg Time: {:.2} ms/chunk\n\
             Max Time: {:.2} ms\n\n\
             [Encode]\n\
             Chunks Encoded: {}\n\
             Total Time: {:.2} ms\n\
             Avg Time: {:.2} ms/chunk\n\
             Max Time: {:.2} ms\n\n\
             [Sizes]\n\
             Raw: {} bytes\n\
             Compressed: {} bytes\n\
             Ratio: {:.2}x\n\
             Sector Padding: {} bytes\n",
            uptime,
            decoded, failures, decode_total, decode_avg, decode_max,
            encoded, encode_total, encode_avg, encode_max,
            raw, compressed, ratio, padding
        )
    }
}
