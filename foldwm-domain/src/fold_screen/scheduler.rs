//! Single-threaded worker for screen-power sequencing.
//!
//! Tasks are plain [`FoldTask`] values executed in post order on one named
//! thread. Every envelope carries the scheduler epoch at post time and a weak
//! handle to its handler: tasks from before [`FoldTaskScheduler::clear`] and
//! tasks whose handler is gone are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::errors::{FoldScreenError, Result};
use super::types::{ScreenId, ScreenPowerStatus};

/// One collaborator call inside a power task.
#[derive(Debug, Clone, PartialEq)]
pub enum PowerStep {
    /// Records which panel is being driven.
    ActiveScreen(ScreenId),
    KeyguardDrawnDone(bool),
    ScreenPower { screen: ScreenId, status: ScreenPowerStatus },
    WakeupDevice,
    RefreshActivity,
    TpFeature { tp_type: i32, value: &'static str },
    RefreshRateVote(bool),
    /// Marks one tracked sub-task of the transition as finished.
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FoldTask {
    Power {
        name: &'static str,
        /// Transition the steps belong to; completions for an older
        /// transition are ignored.
        transition: u64,
        steps: Vec<PowerStep>,
    },
    /// Re-examines a hall sample once the posture has had time to settle.
    HallPostureCheck { angle: f32, hall: u16, sample_generation: u64 },
}

impl FoldTask {
    pub fn name(&self) -> &'static str {
        match self {
            FoldTask::Power { name, .. } => name,
            FoldTask::HallPostureCheck { .. } => "hall-posture-check",
        }
    }
}

pub trait FoldTaskHandler: Send + Sync {
    fn handle_fold_task(&self, task: FoldTask);
}

struct TaskEnvelope {
    epoch: u64,
    handler: Weak<dyn FoldTaskHandler>,
    task: FoldTask,
    not_before: Option<Instant>,
}

enum Message {
    Task(TaskEnvelope),
    Barrier(oneshot::Sender<()>),
}

#[derive(Debug)]
pub struct FoldTaskScheduler {
    name: String,
    sender: mpsc::UnboundedSender<Message>,
    epoch: Arc<AtomicU64>,
    worker: ThreadId,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Task(envelope) => write!(f, "Task({})", envelope.task.name()),
            Message::Barrier(_) => f.write_str("Barrier"),
        }
    }
}

impl FoldTaskScheduler {
    /// Spawns the worker thread.
    pub fn new(name: &str) -> Result<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let epoch = Arc::new(AtomicU64::new(0));
        let worker_epoch = Arc::clone(&epoch);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_worker(receiver, worker_epoch))
            .map_err(|e| FoldScreenError::SchedulerSpawn(e.to_string()))?;
        debug!("Started fold task worker '{}'", name);
        Ok(Self {
            name: name.to_string(),
            sender,
            epoch,
            worker: handle.thread().id(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn post(&self, handler: Weak<dyn FoldTaskHandler>, task: FoldTask) {
        self.enqueue(handler, task, None);
    }

    /// Runs `task` no earlier than `delay` from now. Later tasks wait behind it.
    pub fn post_delayed(&self, handler: Weak<dyn FoldTaskHandler>, task: FoldTask, delay: Duration) {
        self.enqueue(handler, task, Some(Instant::now() + delay));
    }

    /// Invalidates every task posted so far.
    pub fn clear(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Fold task worker '{}' moved to epoch {}", self.name, epoch);
    }

    /// Blocks until every task posted before this call has run or been
    /// dropped. Returns immediately when called from the worker itself.
    pub fn flush(&self) {
        if thread::current().id() == self.worker {
            warn!("flush() called from fold task worker '{}'", self.name);
            return;
        }
        let (done, wait) = oneshot::channel();
        if self.sender.send(Message::Barrier(done)).is_err() {
            return;
        }
        let _ = wait.blocking_recv();
    }

    fn enqueue(&self, handler: Weak<dyn FoldTaskHandler>, task: FoldTask, not_before: Option<Instant>) {
        debug!("Posting fold task '{}'", task.name());
        let envelope = TaskEnvelope { epoch: self.epoch(), handler, task, not_before };
        if self.sender.send(Message::Task(envelope)).is_err() {
            warn!("Fold task worker '{}' has stopped, task dropped", self.name);
        }
    }
}

fn run_worker(mut receiver: mpsc::UnboundedReceiver<Message>, epoch: Arc<AtomicU64>) {
    while let Some(message) = receiver.blocking_recv() {
        match message {
            Message::Barrier(done) => {
                let _ = done.send(());
            }
            Message::Task(envelope) => {
                if let Some(deadline) = envelope.not_before {
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    }
                }
                if envelope.epoch != epoch.load(Ordering::Acquire) {
                    debug!("Dropping stale fold task '{}'", envelope.task.name());
                    continue;
                }
                let Some(handler) = envelope.handler.upgrade() else {
                    debug!("Dropping fold task '{}' for a released handler", envelope.task.name());
                    continue;
                };
                handler.handle_fold_task(envelope.task);
            }
        }
    }
    debug!("Fold task worker exiting");
}
