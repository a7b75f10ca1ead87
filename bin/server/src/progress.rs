use relay::ProgressSink;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::debug;

/// Logs relay progress of one upload in 10% steps
pub struct LogProgress {
    file_name: String,
    last_step: AtomicU8,
}

impl LogProgress {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            last_step: AtomicU8::new(0),
        }
    }

    fn step(fraction: f64) -> u8 {
        (fraction.clamp(0.0, 1.0) * 10.0).floor() as u8
    }
}

impl ProgressSink for LogProgress {
    fn report(&self, fraction: f64) {
        let step = Self::step(fraction);
        if self.last_step.fetch_max(step, Ordering::Relaxed) < step {
            debug!(
                file_name = ?self.file_name,
                percent = u32::from(step) * 10,
                "Relaying upload to file host"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps() {
        assert_eq!(LogProgress::step(0.0), 0);
        assert_eq!(LogProgress::step(0.19), 1);
        assert_eq!(LogProgress::step(0.999), 9);
        assert_eq!(LogProgress::step(1.0), 10);
        assert_eq!(LogProgress::step(1.5), 10);
    }

    #[test]
    fn test_last_step_only_moves_forward() {
        let progress = LogProgress::new("a.txt");
        progress.report(0.55);
        progress.report(0.31);
        assert_eq!(progress.last_step.load(Ordering::Relaxed), 5);
        progress.report(1.0);
        assert_eq!(progress.last_step.load(Ordering::Relaxed), 10);
    }
}
