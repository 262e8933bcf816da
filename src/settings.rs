/// Deflate level used for every entry. Not user-tunable.
pub const DEFLATE_LEVEL: i64 = 6;

const CHUNK_SIZE: usize = 64 * 1024;
const PROGRESS_STEP: f32 = 0.01;

#[derive(Clone, Debug)]
pub struct CompressionSettings {
    /// Bytes read from the source per write call; also the progress granularity.
    pub chunk_size: usize,
    /// Smallest fraction increase forwarded to the progress reporter.
    pub progress_step: f32,
    pub dark_mode: bool,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            progress_step: PROGRESS_STEP,
            dark_mode: true,
        }
    }
}

impl CompressionSettings {
    #[cfg(test)]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[cfg(test)]
    pub fn with_progress_step(mut self, progress_step: f32) -> Self {
        self.progress_step = progress_step.clamp(0.0, 1.0);
        self
    }
}
