/// Receives progress fractions (0.0..=1.0) while an archive is written.
pub trait ProgressReporter {
    fn report(&mut self, fraction: f32);
}

impl<F: FnMut(f32)> ProgressReporter for F {
    fn report(&mut self, fraction: f32) {
        self(fraction)
    }
}

/// Discards every update.
#[cfg(test)]
pub struct NoopProgress;

#[cfg(test)]
impl ProgressReporter for NoopProgress {
    fn report(&mut self, _fraction: f32) {}
}

/// Drops updates that advance less than `min_step` past the last forwarded one,
/// so a large file does not flood the UI with repaints.
pub struct Throttle {
    min_step: f32,
    last: Option<f32>,
}

impl Throttle {
    pub fn new(min_step: f32) -> Self {
        Self {
            min_step,
            last: None,
        }
    }

    pub fn should_report(&mut self, fraction: f32) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => (fraction >= 1.0 && last < 1.0) || fraction - last >= self.min_step,
        };
        if due {
            self.last = Some(fraction);
        }
        due
    }
}
