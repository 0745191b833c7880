//! Receive-rate reporting for the window title.

use std::time::Instant;

/// Ticks between title refreshes (one second at the 30 Hz tick rate).
pub const REPORT_TICKS: u32 = 30;

/// Rolling frames-per-second / bitrate window.
pub struct StatsWindow {
    started: Instant,
}

impl StatsWindow {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Compute `(fps, kbps)` for the counters accumulated since the
    /// window started, then restart it.
    pub fn report(&mut self, frames: u64, bytes: u64) -> (f64, u64) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let (fps, kbps) = if elapsed > 0.0 {
            (
                frames as f64 / elapsed,
                ((bytes * 8) as f64 / (elapsed * 1024.0)) as u64,
            )
        } else {
            (0.0, 0)
        };
        self.started = Instant::now();
        (fps, kbps)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rates_are_per_second() {
        let mut window = StatsWindow::start();
        std::thread::sleep(Duration::from_millis(100));
        let (fps, kbps) = window.report(30, 128 * 1024);

        // 30 frames over ~0.1 s ≈ 300 fps; 1 Mbit over ~0.1 s ≈ 10 Mbps.
        assert!(fps > 150.0, "fps was {fps}");
        assert!(kbps > 4_000, "kbps was {kbps}");
    }

    #[test]
    fn empty_window_reports_zero_frames() {
        let mut window = StatsWindow::start();
        std::thread::sleep(Duration::from_millis(10));
        let (fps, kbps) = window.report(0, 0);
        assert_eq!(fps, 0.0);
        assert_eq!(kbps, 0);
    }
}
