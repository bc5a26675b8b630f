//! Pose sources.
//!
//! World tracking runs as a continuous background loop; consumers only ever read its latest
//! snapshot and never wait on it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::trace;

use crate::geometry::Pose;

/// Supplies the current camera-to-world pose on demand.
///
/// Returns `None` while tracking has not produced a usable frame. Implementations must not
/// block.
pub trait PoseSource: Send + Sync {
    fn current_pose(&self) -> Option<Pose>;
}

impl<T: PoseSource + ?Sized> PoseSource for &T {
    fn current_pose(&self) -> Option<Pose> {
        (**self).current_pose()
    }
}

impl<T: PoseSource + ?Sized> PoseSource for Arc<T> {
    fn current_pose(&self) -> Option<Pose> {
        (**self).current_pose()
    }
}

/// A pose source that always reports the same snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedPoseSource(pub Option<Pose>);

impl PoseSource for FixedPoseSource {
    fn current_pose(&self) -> Option<Pose> {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct PoseSample {
    pose: Pose,
    captured_at: Instant,
}

/// Publishing half of a tracked pose channel, owned by the tracking loop.
#[derive(Debug)]
pub struct PoseFeed {
    tx: watch::Sender<Option<PoseSample>>,
}

impl PoseFeed {
    /// Replaces the latest pose, stamping it with the current instant.
    pub fn publish(&self, pose: Pose) {
        self.tx.send_replace(Some(PoseSample {
            pose,
            captured_at: Instant::now(),
        }));
    }

    /// Marks tracking as lost; readers see no pose until the next [`PoseFeed::publish`].
    pub fn lose_tracking(&self) {
        self.tx.send_replace(None);
    }
}

/// Reading half of a tracked pose channel.
///
/// Cheap to clone; every clone observes the same latest sample.
#[derive(Debug, Clone)]
pub struct TrackedPoseSource {
    rx: watch::Receiver<Option<PoseSample>>,
    max_age: Option<Duration>,
}

impl TrackedPoseSource {
    /// Creates a connected feed/source pair. Samples older than `max_age` are reported as
    /// absent; `None` accepts samples of any age.
    pub fn channel(max_age: Option<Duration>) -> (PoseFeed, Self) {
        let (tx, rx) = watch::channel(None);
        (PoseFeed { tx }, Self { rx, max_age })
    }

    /// Waits until tracking has published at least one pose.
    ///
    /// Returns `None` if the feed is dropped first. Intended for start-up; placement itself
    /// goes through [`PoseSource::current_pose`] and never waits.
    pub async fn wait_for_pose(&self) -> Option<Pose> {
        let mut rx = self.rx.clone();
        let sample = *rx.wait_for(Option::is_some).await.ok()?;
        sample.map(|s| s.pose)
    }
}

impl PoseSource for TrackedPoseSource {
    fn current_pose(&self) -> Option<Pose> {
        let sample = (*self.rx.borrow())?;

        if let Some(max_age) = self.max_age {
            let age = sample.captured_at.elapsed();
            if age > max_age {
                trace!(?age, ?max_age, "ignoring stale pose");
                return None;
            }
        }

        Some(sample.pose)
    }
}
