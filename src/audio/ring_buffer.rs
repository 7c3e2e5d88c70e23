//! Growable ring buffer for playback samples.
//!
//! Holds decoded f32 samples between the orchestration side and the render
//! context. The render callback pulls one quantum at a time; pushes never
//! block and never drop data. Capacity doubles when a push would overflow,
//! so bursty network delivery is absorbed without fixing a large buffer up
//! front. The buffer never shrinks.

/// Circular FIFO of f32 samples with grow-on-demand capacity.
///
/// Invariants: `0 <= available <= capacity` and
/// `write_index == (read_index + available) % capacity`.
pub struct SampleRing {
    storage: Vec<f32>,
    read_index: usize,
    write_index: usize,
    available: usize,
}

impl SampleRing {
    /// Creates a ring with the given initial capacity in samples.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            storage: vec![0.0; initial_capacity.max(1)],
            read_index: 0,
            write_index: 0,
            available: 0,
        }
    }

    /// Appends a block of samples, growing capacity as needed.
    ///
    /// Growth doubles capacity until the block fits, preserving unread
    /// content in FIFO order. Amortized O(1) per sample.
    pub fn push(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let needed = self.available + samples.len();
        if needed > self.storage.len() {
            let mut new_capacity = self.storage.len().max(1);
            while new_capacity < needed {
                new_capacity *= 2;
            }
            self.grow(new_capacity);
        }

        for &sample in samples {
            self.storage[self.write_index] = sample;
            self.write_index = (self.write_index + 1) % self.storage.len();
        }
        self.available += samples.len();
    }

    /// Fills `output` with up to `available()` real samples, zero-padding
    /// the remainder. Returns true if any real sample was written.
    pub fn pull(&mut self, output: &mut [f32]) -> bool {
        let real = output.len().min(self.available);
        for slot in output.iter_mut().take(real) {
            *slot = self.storage[self.read_index];
            self.read_index = (self.read_index + 1) % self.storage.len();
        }
        for slot in output.iter_mut().skip(real) {
            *slot = 0.0;
        }
        self.available -= real;
        real > 0
    }

    /// Number of unread samples.
    pub fn available(&self) -> usize {
        self.available
    }

    /// Current storage capacity in samples.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Discards all unread content in O(1) without reallocating.
    pub fn clear(&mut self) {
        self.read_index = 0;
        self.write_index = 0;
        self.available = 0;
    }

    /// Reallocates to `new_capacity`, compacting unread samples to the
    /// front so `read_index` restarts at 0.
    fn grow(&mut self, new_capacity: usize) {
        let mut new_storage = vec![0.0; new_capacity];
        for slot in new_storage.iter_mut().take(self.available) {
            *slot = self.storage[self.read_index];
            self.read_index = (self.read_index + 1) % self.storage.len();
        }
        self.storage = new_storage;
        self.read_index = 0;
        self.write_index = self.available;
    }
}
