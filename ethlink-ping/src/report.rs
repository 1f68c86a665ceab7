use core::fmt;
use std::time::Duration;

/// Round-trip statistics of one ping run.
pub struct Report {
    samples_ms: Vec<f32>,
    total: Duration,
}

impl Report {
    /// An empty report expecting `count` round trips.
    pub fn with_capacity(count: usize) -> Report {
        Report {
            samples_ms: Vec::with_capacity(count),
            total: Duration::ZERO,
        }
    }

    /// Record one completed round trip.
    pub fn record(&mut self, rtt: Duration) {
        self.samples_ms.push(rtt.as_secs_f32() * 1000.0);
        self.total += rtt;
    }

    /// Number of recorded round trips.
    pub fn count(&self) -> usize {
        self.samples_ms.len()
    }

    /// The raw series in record order, in milliseconds.
    pub fn samples_ms(&self) -> &[f32] {
        &self.samples_ms
    }

    /// The raw series as one comma-separated line, for a stats file.
    pub fn to_csv(&self) -> String {
        self.samples_ms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Emulate the classic ping summary:
        //
        // ```text
        // RTT min/avg/med/max: 0.182/0.203/0.197/0.311 ms (100 round trips)
        // ```
        if self.samples_ms.is_empty() {
            return f.write_str("no round trips completed");
        }

        let mut sorted = self.samples_ms.clone();
        sorted.sort_unstable_by(f32::total_cmp);

        let avg = self.total.as_secs_f32() * 1000.0 / self.samples_ms.len() as f32;
        write!(
            f,
            "RTT min/avg/med/max: {:.3}/{:.3}/{:.3}/{:.3} ms ({} round trips)",
            sorted[0],
            avg,
            sorted[sorted.len() / 2],
            sorted[sorted.len() - 1],
            self.samples_ms.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_orders_the_series() {
        let mut report = Report::with_capacity(3);
        report.record(Duration::from_millis(3));
        report.record(Duration::from_millis(1));
        report.record(Duration::from_millis(2));

        assert_eq!(report.count(), 3);
        assert_eq!(
            report.to_string(),
            "RTT min/avg/med/max: 1.000/2.000/2.000/3.000 ms (3 round trips)"
        );
    }

    #[test]
    fn csv_keeps_record_order() {
        let mut report = Report::with_capacity(2);
        report.record(Duration::from_millis(2));
        report.record(Duration::from_millis(1));

        let series: Vec<f32> = report
            .to_csv()
            .split(',')
            .map(|sample| sample.parse().unwrap())
            .collect();
        assert_eq!(series.len(), 2);
        assert!(series[0] > series[1]);
    }

    #[test]
    fn empty_report_says_so() {
        let report = Report::with_capacity(0);
        assert_eq!(report.to_string(), "no round trips completed");
    }
}
