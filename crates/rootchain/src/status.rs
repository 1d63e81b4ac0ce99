//! Health of the root-chain connection.

use plasma_primitives::buf::Buf32;
use tokio::sync::watch;

/// Connection status published by the synchronizer tasks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootChainStatus {
    /// Whether the last RPC succeeded.
    pub connected: bool,

    pub last_error: Option<String>,

    /// Latest root-chain block seen.
    pub tip: Option<u64>,

    /// Highest root-chain block whose events are applied.
    pub scanned: Option<u64>,

    /// UNIX millis of the last reader poll.
    pub last_update: Option<u64>,

    /// Last plasma block included in a header submission.
    pub last_submitted_block: Option<u64>,

    pub last_submission_tx: Option<Buf32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum StatusUpdate {
    Connected(bool),
    RpcError(String),
    Tip(u64),
    Scanned(u64),
    LastUpdate(u64),
    Submitted { last_block: u64, tx: Buf32 },
}

pub(crate) fn apply_status_updates(updates: &[StatusUpdate], tx: &watch::Sender<RootChainStatus>) {
    if updates.is_empty() {
        return;
    }

    tx.send_modify(|status| {
        for update in updates {
            match update {
                StatusUpdate::Connected(c) => {
                    status.connected = *c;
                    if *c {
                        status.last_error = None;
                    }
                }
                StatusUpdate::RpcError(err) => status.last_error = Some(err.clone()),
                StatusUpdate::Tip(tip) => status.tip = Some(*tip),
                StatusUpdate::Scanned(h) => status.scanned = Some(*h),
                StatusUpdate::LastUpdate(ts) => status.last_update = Some(*ts),
                StatusUpdate::Submitted { last_block, tx } => {
                    status.last_submitted_block = Some(*last_block);
                    status.last_submission_tx = Some(*tx);
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_updates_apply_in_order() {
        let (tx, rx) = watch::channel(RootChainStatus::default());

        apply_status_updates(
            &[
                StatusUpdate::RpcError("refused".into()),
                StatusUpdate::Connected(false),
            ],
            &tx,
        );
        assert!(!rx.borrow().connected);
        assert_eq!(rx.borrow().last_error.as_deref(), Some("refused"));

        apply_status_updates(
            &[
                StatusUpdate::Connected(true),
                StatusUpdate::Tip(120),
                StatusUpdate::Scanned(104),
                StatusUpdate::Submitted {
                    last_block: 7,
                    tx: Buf32([1; 32]),
                },
            ],
            &tx,
        );

        let status = rx.borrow().clone();
        assert!(status.connected);
        assert_eq!(status.last_error, None);
        assert_eq!(status.tip, Some(120));
        assert_eq!(status.scanned, Some(104));
        assert_eq!(status.last_submitted_block, Some(7));
    }
}
