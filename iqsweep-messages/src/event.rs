use crate::Hertz;

/// Progress events sent from the sweep executor to an observer.
///
/// Nothing in the sweep depends on these being received.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Sent once, before the device is first tuned.
    SweepStarted { total_steps: usize },
    /// One plan entry has been tuned, acquired and estimated.
    StepCompleted {
        /// Zero-based position in the plan
        index: usize,
        total: usize,
        center_frequency: Hertz,
    },
    /// Every plan entry completed successfully.
    SweepFinished { steps: usize },
}
