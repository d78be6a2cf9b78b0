//! Bounded rolling history feeding the chart datasets.

use std::collections::VecDeque;

/// Points kept per chart series before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub label: String,
    pub value: f64,
}

/// Fixed-capacity FIFO of chart points. Single producer, single consumer,
/// both on the same reactive turn; the buffer does no value validation.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one point, evicting the oldest first when full, so
    /// `len() <= capacity` holds after every call.
    pub fn push(&mut self, point: HistoryPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

/// One chart's paired series: live readings plus the constant target line,
/// always pushed together so the two stay the same length.
#[derive(Debug, Clone, Default)]
pub struct ChartHistory {
    readings: RollingHistory,
    target: RollingHistory,
}

impl ChartHistory {
    pub fn record(&mut self, label: String, reading: f64, target: f64) {
        self.target.push(HistoryPoint {
            label: label.clone(),
            value: target,
        });
        self.readings.push(HistoryPoint {
            label,
            value: reading,
        });
    }

    pub fn labels(&self) -> Vec<String> {
        self.readings.labels()
    }

    pub fn readings(&self) -> Vec<f64> {
        self.readings.values()
    }

    pub fn target(&self) -> Vec<f64> {
        self.target.values()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
