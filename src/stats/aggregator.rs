// src/stats/aggregator.rs
use crate::miner::work::RateSample;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Per-worker hash rates folded into a running total
///
/// Holds one slot per worker, zero until that worker first reports. A new
/// sample replaces whatever its worker reported before.
#[derive(Debug, Clone, PartialEq)]
pub struct RateAggregator {
    /// Latest MH/s per worker ID
    rates: Vec<f64>,
}

impl RateAggregator {
    /// Creates an aggregator for `device_count` workers
    pub fn new(device_count: usize) -> Self {
        RateAggregator {
            rates: vec![0.0; device_count],
        }
    }

    /// Records a sample (last write wins)
    ///
    /// Samples from an unknown worker ID are logged and ignored.
    pub fn update(&mut self, sample: RateSample) {
        match self.rates.get_mut(sample.worker_id) {
            Some(rate) => *rate = sample.hash_rate,
            None => log::warn!(
                "Ignoring rate sample from unknown worker {}",
                sample.worker_id
            ),
        }
    }

    /// Latest rate per worker, indexed by worker ID
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Sum of the latest rate of every worker
    pub fn total(&self) -> f64 {
        self.rates.iter().sum()
    }

    /// Current status line
    pub fn snapshot(&self) -> String {
        render(&self.rates)
    }

    /// Folds samples from `receiver`, redrawing the status line on `out` after each
    ///
    /// Each redraw starts with a carriage return so the terminal overwrites the
    /// previous line. Returns once every sample sender is gone; in normal
    /// operation that never happens.
    pub fn run<W: Write>(&mut self, receiver: &Receiver<RateSample>, out: &mut W) -> io::Result<()> {
        for sample in receiver.iter() {
            self.redraw(sample, out)?;
        }
        Ok(())
    }

    /// Like [`run`](Self::run), but stops once `duration` has passed
    pub fn run_for<W: Write>(
        &mut self,
        receiver: &Receiver<RateSample>,
        out: &mut W,
        duration: Duration,
    ) -> io::Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            match receiver.recv_deadline(deadline) {
                Ok(sample) => self.redraw(sample, out)?,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
    }

    fn redraw<W: Write>(&mut self, sample: RateSample, out: &mut W) -> io::Result<()> {
        self.update(sample);
        write!(out, "\r{}", self.snapshot())?;
        out.flush()
    }
}

/// Renders per-worker rates followed by their total
///
/// `0 - Mining at 1.500 MH/s | 1 - Mining at 2.500 MH/s | Total: 4.000 MH/s`
pub fn render(rates: &[f64]) -> String {
    let mut line = String::new();
    let mut total = 0.0;
    for (worker_id, rate) in rates.iter().enumerate() {
        let _ = write!(line, "{} - Mining at {:.3} MH/s | ", worker_id, rate);
        total += rate;
    }
    let _ = write!(line, "Total: {:.3} MH/s", total);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn sample(worker_id: usize, hash_rate: f64) -> RateSample {
        RateSample {
            worker_id,
            hash_rate,
        }
    }

    #[test]
    fn starts_at_zero() {
        let aggregator = RateAggregator::new(3);
        assert_eq!(aggregator.rates(), &[0.0, 0.0, 0.0]);
        assert_eq!(aggregator.total(), 0.0);
    }

    #[test]
    fn total_tracks_latest_sample_per_worker() {
        let mut aggregator = RateAggregator::new(3);
        let samples = [
            sample(0, 1.0),
            sample(2, 4.0),
            sample(0, 3.0),
            sample(1, 0.5),
            sample(2, 2.0),
        ];

        for s in samples {
            aggregator.update(s);
            let expected: f64 = aggregator.rates().iter().sum();
            assert_eq!(aggregator.total(), expected);
        }
        assert_eq!(aggregator.rates(), &[3.0, 0.5, 2.0]);
        assert_eq!(aggregator.total(), 5.5);
    }

    #[test]
    fn repeated_sample_is_idempotent() {
        let mut aggregator = RateAggregator::new(2);
        aggregator.update(sample(1, 2.5));
        let before = aggregator.total();
        aggregator.update(sample(1, 2.5));
        assert_eq!(aggregator.total(), before);
    }

    #[test]
    fn unknown_worker_is_ignored() {
        let mut aggregator = RateAggregator::new(1);
        aggregator.update(sample(5, 100.0));
        assert_eq!(aggregator.total(), 0.0);
    }

    #[test]
    fn render_lists_workers_then_total() {
        assert_eq!(
            render(&[1.5, 2.5]),
            "0 - Mining at 1.500 MH/s | 1 - Mining at 2.500 MH/s | Total: 4.000 MH/s"
        );
        assert_eq!(render(&[]), "Total: 0.000 MH/s");
    }

    #[test]
    fn run_redraws_after_every_sample() {
        let (tx, rx) = bounded(4);
        tx.send(sample(0, 1.5)).unwrap();
        tx.send(sample(1, 2.5)).unwrap();
        drop(tx);

        let mut aggregator = RateAggregator::new(2);
        let mut out = Vec::new();
        aggregator.run(&rx, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let frames: Vec<&str> = text.split('\r').filter(|f| !f.is_empty()).collect();
        assert_eq!(frames.len(), 2);
        assert!(frames[1].ends_with("Total: 4.000 MH/s"));
        assert_eq!(aggregator.total(), 4.0);
    }

    #[test]
    fn run_for_returns_at_the_deadline() {
        let (tx, rx) = bounded(1);
        tx.send(sample(0, 7.0)).unwrap();

        let mut aggregator = RateAggregator::new(1);
        let started = Instant::now();
        aggregator
            .run_for(&rx, &mut io::sink(), Duration::from_millis(50))
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(aggregator.total(), 7.0);
        drop(tx);
    }
}
