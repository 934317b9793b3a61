use crate::display::{TextDisplay, normalize};
use crate::feed::{Feed, FeedSource, FeedStatus, FetchError, FetchOutcome, Fetcher, sealed};
use std::sync::Arc;
use std::time::Duration;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Feed that renders fetched text into a [`TextDisplay`].
///
/// Every [`load`](Feed::load) is tagged with a generation. Completions are
/// applied through [`complete`](TextFeed::complete), which drops any
/// completion older than one already applied.
pub struct TextFeed {
    source: FeedSource,
    timeout: Duration,
    display: TextDisplay,
    fetcher: Arc<dyn Fetcher>,
    tasks: TaskTracker,
    cancel: CancellationToken,
    outcome_tx: flume::Sender<FetchOutcome>,
    outcome_rx: flume::Receiver<FetchOutcome>,
    issued: u64,
    applied: u64,
    status: FeedStatus,
    failures: u64,
}

impl TextFeed {
    /// Creates a feed. Fetches are spawned on `tasks` and give up after
    /// `timeout`, or silently once `cancel` fires.
    #[must_use]
    pub fn new(
        source: FeedSource,
        display: TextDisplay,
        timeout: Duration,
        fetcher: Arc<dyn Fetcher>,
        tasks: TaskTracker,
        cancel: CancellationToken,
    ) -> Self {
        let (outcome_tx, outcome_rx) = flume::unbounded();
        Self {
            source,
            timeout,
            display,
            fetcher,
            tasks,
            cancel,
            outcome_tx,
            outcome_rx,
            issued: 0,
            applied: 0,
            status: FeedStatus::Idle,
            failures: 0,
        }
    }

    /// Receiving end for completed fetches. Pass each one to
    /// [`complete`](Self::complete).
    #[must_use]
    pub fn outcomes(&self) -> flume::Receiver<FetchOutcome> {
        self.outcome_rx.clone()
    }

    /// Applies a completed fetch unless a newer one was already applied.
    /// Returns whether the outcome was applied.
    pub fn complete(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation <= self.applied {
            debug!(
                feed = %self.source.name,
                generation = outcome.generation,
                applied = self.applied,
                "dropping stale fetch result"
            );
            return false;
        }
        self.applied = outcome.generation;

        match outcome.result {
            Ok(payload) => self.onload(Some(&payload)),
            Err(err) => {
                warn!(feed = %self.source.name, url = %self.url(), "{err}");
                self.onerror();
            }
        }
        true
    }

    /// Feed name and address.
    #[must_use]
    pub const fn source(&self) -> &FeedSource {
        &self.source
    }

    /// The rendered display.
    #[must_use]
    pub const fn display(&self) -> &TextDisplay {
        &self.display
    }

    /// Mutable access for drawing and scrolling.
    pub const fn display_mut(&mut self) -> &mut TextDisplay {
        &mut self.display
    }

    /// State of the last applied fetch.
    #[must_use]
    pub const fn status(&self) -> FeedStatus {
        self.status
    }

    /// Number of failed fetches applied so far.
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }
}

impl sealed::Sealed for TextFeed {}

impl Feed for TextFeed {
    fn url(&self) -> String {
        self.source.url()
    }

    fn load(&mut self) {
        self.issued += 1;
        let generation = self.issued;
        let url = self.url();
        let timeout = self.timeout;
        let fetcher = Arc::clone(&self.fetcher);
        let outcome_tx = self.outcome_tx.clone();
        let cancel = self.cancel.clone();

        debug!(feed = %self.source.name, %url, generation, "loading");
        self.tasks.spawn(async move {
            let result = select! {
                () = cancel.cancelled() => return,
                result = time::timeout(timeout, fetcher.fetch(&url)) => {
                    result.unwrap_or(Err(FetchError::Timeout))
                }
            };
            // The feed may already be gone during shutdown.
            let _ = outcome_tx.send(FetchOutcome { generation, result });
        });
        self.status = FeedStatus::Loading;

        let height = self.display.config().height;
        if height > 0 {
            self.display.set_target_height(height);
        }
    }

    fn onload(&mut self, payload: Option<&str>) {
        self.display.append(&normalize(payload));
        self.status = FeedStatus::Ready;
    }

    fn onerror(&mut self) {
        self.failures += 1;
        self.status = FeedStatus::Failed;
    }
}
