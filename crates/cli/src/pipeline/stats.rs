//! Pipeline statistics and metrics.

use std::time::Duration;

use dispatcher::PublisherStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Samples delivered by the state source
    pub samples_received: u64,

    /// Samples displaced by the depth-1 inbound queue
    pub samples_dropped: u64,

    /// Samples rejected for carrying the wrong orientation representation
    pub representation_mismatches: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Whether the run ended because the timeout elapsed
    pub timed_out: bool,

    /// Publisher totals and per-sink counters
    pub publisher: PublisherStats,
}

impl PipelineStats {
    /// Publications emitted
    pub fn publications(&self) -> u64 {
        self.publisher.publications
    }

    /// Publications per second
    pub fn rate_hz(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.publications() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of received samples displaced before conversion, in percent
    pub fn drop_rate(&self) -> f64 {
        if self.samples_received > 0 {
            (self.samples_dropped as f64 / self.samples_received as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Bridge Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Samples received: {}", self.samples_received);
        println!(
            "   ├─ Samples dropped: {} ({:.2}%)",
            self.samples_dropped,
            self.drop_rate()
        );
        println!(
            "   ├─ Representation mismatches: {}",
            self.representation_mismatches
        );
        println!("   ├─ Publications: {}", self.publications());
        println!("   └─ Rate: {:.2} Hz", self.rate_hz());

        println!("\n{}", self.publisher.summary);

        if !self.publisher.sinks.is_empty() {
            println!("📤 Sinks");
            let last = self.publisher.sinks.len() - 1;
            for (i, (name, m)) in self.publisher.sinks.iter().enumerate() {
                let prefix = if i == last { "└─" } else { "├─" };
                println!(
                    "   {} {}: written {}, failed {}, dropped {}",
                    prefix, name, m.write_count, m.failure_count, m.dropped_count
                );
            }
        }

        println!();
    }
}
