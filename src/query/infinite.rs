use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::{PageStore, QueryKey};
use crate::paging::{Decision, FetchState, LoadTrigger, Page, PageCollection, PageParamSequencer};

type PageFetcherFn<T> = Box<dyn Fn(u64) -> BoxFuture<'static, Result<Page<T>, String>> + Send + Sync>;

struct Pending<T> {
  offset: u64,
  generation: u64,
  receiver: mpsc::UnboundedReceiver<Result<Page<T>, String>>,
}

/// A view's handle on an incrementally loaded list.
///
/// Pages and the load guard live in the [`PageStore`] entry for the query
/// key, so every handle registered on the same key sees the same pages and
/// respects the same in-flight/exhausted state. The handle keeps a read-only
/// snapshot of the pages for rendering.
pub struct InfiniteQuery<T> {
  key: String,
  label: String,
  store: PageStore<T>,
  sequencer: PageParamSequencer,
  fetcher: PageFetcherFn<T>,
  pending: Option<Pending<T>>,
  snapshot: PageCollection<T>,
  snapshot_generation: u64,
  /// Set once [`start`](Self::start) has run; `poll` keeps the first page coming
  started: bool,
}

impl<T: Clone + Send + 'static> InfiniteQuery<T> {
  /// Register against `store` under `key`. Nothing is fetched until
  /// [`start`](Self::start).
  pub fn new<K, F, Fut>(
    key: &K,
    store: PageStore<T>,
    sequencer: PageParamSequencer,
    fetcher: F,
  ) -> Self
  where
    K: QueryKey,
    F: Fn(u64) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T>, String>> + Send + 'static,
  {
    let mut query = Self {
      key: key.cache_hash(),
      label: key.description(),
      store,
      sequencer,
      fetcher: Box::new(move |offset| Box::pin(fetcher(offset))),
      pending: None,
      snapshot: PageCollection::new(),
      snapshot_generation: 0,
      started: false,
    };
    query.sync();
    query
  }

  /// Load the first page unless the cache already holds pages for this key.
  pub fn start(&mut self) -> Option<Decision> {
    self.started = true;
    if !self.snapshot.is_empty() {
      debug!(query = %self.label, pages = self.snapshot.len(), "serving cached pages");
      return None;
    }
    Some(self.dispatch(|trigger, next| trigger.request(next)))
  }

  /// Explicit "load more".
  pub fn fetch_next(&mut self) -> Decision {
    self.dispatch(|trigger, next| trigger.request(next))
  }

  /// Retry after a failure. Same offset as the failed request.
  pub fn retry(&mut self) -> Decision {
    self.fetch_next()
  }

  /// Feed the sentinel's visibility to the automatic trigger.
  pub fn observe_visibility(&mut self, visible: bool) -> Decision {
    self.dispatch(|trigger, next| trigger.observe(visible, next))
  }

  /// Throw away all pages for this key and load from the start.
  pub fn refresh(&mut self) -> Option<Decision> {
    info!(query = %self.label, "refreshing");
    self.pending = None;
    self.store.reset(&self.key);
    self.sync();
    self.start()
  }

  /// Offset the next request would use, or `None` when exhausted.
  pub fn next_offset(&self) -> Option<u64> {
    self.sequencer.offset_after(&self.snapshot)
  }

  pub fn has_next(&self) -> bool {
    !self.with_trigger(LoadTrigger::is_exhausted) && self.next_offset().is_some()
  }

  pub fn is_fetching(&self) -> bool {
    self.with_trigger(LoadTrigger::is_fetching)
  }

  pub fn error(&self) -> Option<String> {
    self.with_trigger(|t| t.error().map(String::from))
  }

  pub fn fetch_state(&self) -> FetchState {
    let (fetching, exhausted, has_error) = self.with_trigger(|t| {
      (t.is_fetching(), t.is_exhausted(), t.error().is_some())
    });
    FetchState::derive(fetching, exhausted, self.snapshot.len(), has_error)
  }

  pub fn pages(&self) -> &PageCollection<T> {
    &self.snapshot
  }

  pub fn items(&self) -> impl Iterator<Item = &T> {
    self.snapshot.items()
  }

  /// Apply a finished fetch, if any. Returns `true` if anything changed.
  ///
  /// A started handle with no pages and an idle trigger asks for the first
  /// page again. That happens when another handle's first fetch was
  /// cancelled while this one was waiting on it.
  pub fn poll(&mut self) -> bool {
    let Some(pending) = self.pending.as_mut() else {
      let changed = self.sync();
      return self.resume_first_page() || changed;
    };
    let offset = pending.offset;
    let generation = pending.generation;
    let received = pending.receiver.try_recv();

    let result = match received {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return self.sync(),
      Err(mpsc::error::TryRecvError::Disconnected) => Err("Fetch was cancelled".to_string()),
    };
    self.pending = None;

    let sequencer = self.sequencer;
    let label = &self.label;
    self.store.with_entry(&self.key, |entry| {
      if entry.generation != generation {
        debug!(query = %label, offset, "discarding result from before reset");
        return;
      }
      match result {
        Ok(page) => {
          let received = page.items.len();
          entry.pages.push(page);
          let next = sequencer.offset_after(&entry.pages);
          entry.trigger.complete(next);
          info!(query = %label, offset, received, ?next, "page appended");
        }
        Err(error) => {
          warn!(query = %label, offset, %error, "page fetch failed");
          entry.trigger.fail(error);
        }
      }
    });

    self.sync();
    true
  }

  fn dispatch(&mut self, decide: impl FnOnce(&mut LoadTrigger, Option<u64>) -> Decision) -> Decision {
    let sequencer = self.sequencer;
    let (decision, generation) = self.store.with_entry(&self.key, |entry| {
      let next = sequencer.offset_after(&entry.pages);
      (decide(&mut entry.trigger, next), entry.generation)
    });

    match decision {
      Decision::Fetch(offset) => {
        debug!(query = %self.label, offset, "requesting page");
        let (tx, rx) = mpsc::unbounded_channel();
        self.pending = Some(Pending {
          offset,
          generation,
          receiver: rx,
        });

        let future = (self.fetcher)(offset);
        tokio::spawn(async move {
          // Receiver gone means the view was torn down; nothing to apply
          let _ = tx.send(future.await);
        });
      }
      Decision::Ignore(reason) => {
        debug!(query = %self.label, ?reason, "load trigger ignored");
      }
    }
    decision
  }

  fn resume_first_page(&mut self) -> bool {
    if !self.started || !self.snapshot.is_empty() {
      return false;
    }
    let idle = self.with_trigger(|t| !t.is_fetching() && !t.is_exhausted() && t.error().is_none());
    if !idle {
      return false;
    }
    debug!(query = %self.label, "first page was abandoned, requesting again");
    matches!(self.dispatch(|trigger, next| trigger.request(next)), Decision::Fetch(_))
  }

  fn with_trigger<R>(&self, f: impl FnOnce(&LoadTrigger) -> R) -> R {
    self.store.with_entry(&self.key, |entry| f(&entry.trigger))
  }

  /// Refresh the local snapshot from the shared entry. Returns `true` if it
  /// changed.
  fn sync(&mut self) -> bool {
    let snapshot = &mut self.snapshot;
    let snapshot_generation = &mut self.snapshot_generation;
    self.store.with_entry(&self.key, |entry| {
      if entry.generation == *snapshot_generation && entry.pages.len() == snapshot.len() {
        return false;
      }
      *snapshot = entry.pages.clone();
      *snapshot_generation = entry.generation;
      true
    })
  }
}

impl<T> Drop for InfiniteQuery<T> {
  fn drop(&mut self) {
    let pending = self.pending.take();
    self.store.with_entry(&self.key, |entry| {
      if let Some(pending) = pending {
        if entry.generation == pending.generation
          && entry.trigger.in_flight_offset() == Some(pending.offset)
        {
          entry.trigger.cancel();
        }
      }
      entry.trigger.hide();
    });
  }
}
