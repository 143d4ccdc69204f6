use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum MutationState<T> {
  Idle,
  Pending,
  Success(T),
  Error(String),
}

type MutatorFn<I, T> = Box<dyn Fn(I) -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// A write operation with pending/success/error tracking.
pub struct Mutation<I, T> {
  state: MutationState<T>,
  mutator: MutatorFn<I, T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<I: Send + 'static, T: Send + 'static> Mutation<I, T> {
  pub fn new<F, Fut>(mutator: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: MutationState::Idle,
      mutator: Box::new(move |input| Box::pin(mutator(input))),
      receiver: None,
    }
  }

  pub fn state(&self) -> &MutationState<T> {
    &self.state
  }

  pub fn is_pending(&self) -> bool {
    matches!(self.state, MutationState::Pending)
  }

  pub fn data(&self) -> Option<&T> {
    match &self.state {
      MutationState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match &self.state {
      MutationState::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Submit `input`. Returns `false` (and drops the input) while a previous
  /// submission is still pending.
  pub fn mutate(&mut self, input: I) -> bool {
    if self.is_pending() {
      return false;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = MutationState::Pending;

    let future = (self.mutator)(input);
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });
    true
  }

  /// Record a failure that happened before the request could be sent
  /// (e.g. form validation).
  pub fn fail(&mut self, error: impl Into<String>) {
    self.receiver = None;
    self.state = MutationState::Error(error.into());
  }

  pub fn reset(&mut self) {
    self.receiver = None;
    self.state = MutationState::Idle;
  }

  /// Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = &mut self.receiver else {
      return false;
    };

    let next = match receiver.try_recv() {
      Ok(Ok(data)) => MutationState::Success(data),
      Ok(Err(error)) => MutationState::Error(error),
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        MutationState::Error("Mutation was cancelled".to_string())
      }
    };

    self.state = next;
    self.receiver = None;
    true
  }
}
