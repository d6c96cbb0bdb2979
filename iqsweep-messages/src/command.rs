/// Commands sent from the caller to a running sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Abort the sweep at the next plan entry. Results gathered so far are
    /// handed back with the cancellation error.
    Stop,
}
