use crate::api::CachedProductsClient;
use crate::commands::{self, Command};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::paging::TriggerMode;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{
  AddProductView, InfiniteView, PaginatedView, ProductListView, RegularFetchView,
};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// `:` command prompt
  command_input: CommandInput,

  client: CachedProductsClient,

  /// Name of the command that opened the root view
  active: &'static str,

  /// One-line message for the footer
  status: Option<String>,

  should_quit: bool,
}

impl App {
  pub fn new(config: &Config) -> Result<Self> {
    let client = CachedProductsClient::new(config)?;

    let mut app = Self {
      view_stack: Vec::new(),
      command_input: CommandInput::new(),
      client,
      active: "",
      status: None,
      should_quit: false,
    };
    if let Some(home) = commands::find("home") {
      app.open(home);
    }
    Ok(app)
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        None => break,
      }
    }

    Ok(())
  }

  /// Replace the whole stack with the root view for `cmd`
  fn open(&mut self, cmd: &'static Command) {
    match cmd.name {
      "quit" => {
        self.should_quit = true;
        return;
      }
      "home" | "regular" | "query" | "pagination" | "infinite" | "auto" => {}
      other => {
        warn!(command = other, "command has no view");
        return;
      }
    }

    // The old views go first: their drop cancels in-flight fetches the new
    // view may want to start again
    self.view_stack.clear();

    let client = self.client.clone();
    let view: Box<dyn View> = match cmd.name {
      "regular" => Box::new(RegularFetchView::new(client.raw().clone())),
      "query" => Box::new(ProductListView::new(client)),
      "pagination" => Box::new(PaginatedView::new(client)),
      "infinite" => Box::new(InfiniteView::new(client, TriggerMode::Button)),
      "auto" => Box::new(InfiniteView::new(client, TriggerMode::Automatic)),
      _ => Box::new(AddProductView::new(client)),
    };

    info!(view = cmd.name, "opening view");
    self.active = cmd.name;
    self.view_stack.push(view);
  }

  fn tick(&mut self) {
    for view in &mut self.view_stack {
      view.tick();
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let capturing = self.current_view().is_some_and(|v| v.captures_input());
    if !capturing && self.handle_global_key(key) {
      return;
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        }
      }
    }
  }

  /// Command prompt, view shortcuts and back/quit. Returns `true` if the key
  /// was consumed.
  fn handle_global_key(&mut self, key: KeyEvent) -> bool {
    match self.command_input.handle_key(key) {
      KeyResult::Handled => return true,
      KeyResult::Event(CommandEvent::Submitted(cmd)) => {
        self.status = None;
        self.open(cmd);
        return true;
      }
      KeyResult::Event(CommandEvent::Unknown(input)) => {
        self.status = Some(format!("Unknown command: {}", input));
        return true;
      }
      KeyResult::Event(CommandEvent::Cancelled) => return true,
      KeyResult::NotHandled => {}
    }
    if self.command_input.is_active() {
      return true;
    }

    let KeyCode::Char(c) = key.code else {
      return false;
    };
    if let Some(cmd) = commands::by_key(c) {
      self.status = None;
      self.open(cmd);
      return true;
    }
    if c == 'q' {
      if self.view_stack.len() > 1 {
        self.view_stack.pop();
      } else {
        self.should_quit = true;
      }
      return true;
    }
    false
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn base_url(&self) -> &str {
    self.client.raw().base_url().as_str()
  }

  pub fn active_command(&self) -> &str {
    self.active
  }

  pub fn status(&self) -> Option<&str> {
    self.status.as_deref()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::cache::ProductQueryKey;
  use crate::cache::QueryKey;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app() -> App {
    let mut config = Config::default();
    // Nothing listens here; views that fetch on open just fail
    config.api.base_url = "http://127.0.0.1:9".to_string();
    App::new(&config).unwrap()
  }

  #[tokio::test]
  async fn test_starts_on_home() {
    let app = app();
    assert_eq!(app.active_command(), "home");
    assert_eq!(app.view_breadcrumb(), vec!["Home".to_string()]);
  }

  #[tokio::test]
  async fn test_number_keys_switch_root_view() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('4')));
    assert_eq!(app.active_command(), "pagination");

    app.handle_key(key(KeyCode::Char('6')));
    assert_eq!(app.active_command(), "auto");
    assert_eq!(app.view_breadcrumb(), vec!["Infinite (auto)".to_string()]);
  }

  #[tokio::test]
  async fn test_command_prompt_opens_view() {
    let mut app = app();
    for c in ":pag".chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    assert!(app.command_input().is_active());
    app.handle_key(key(KeyCode::Enter));

    assert!(!app.command_input().is_active());
    assert_eq!(app.active_command(), "pagination");
  }

  #[tokio::test]
  async fn test_unknown_command_sets_status() {
    let mut app = app();
    for c in ":zzz".chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.status(), Some("Unknown command: zzz"));
  }

  #[tokio::test]
  async fn test_form_input_is_not_treated_as_navigation() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('i')));
    app.handle_key(key(KeyCode::Char('3')));
    app.handle_key(key(KeyCode::Char('q')));

    assert_eq!(app.active_command(), "home");
    assert!(!app.should_quit);
  }

  /// Serves a one-item products page to every connection after a short delay.
  async fn slow_products_server() -> String {
    const BODY: &str = r#"{"products":[{"id":1,"title":"Lamp","description":"Bright","price":12.5}],"total":1,"skip":0,"limit":10}"#;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      while let Ok((mut socket, _)) = listener.accept().await {
        tokio::spawn(async move {
          let mut buf = vec![0u8; 4096];
          let _ = socket.read(&mut buf).await;
          tokio::time::sleep(Duration::from_millis(30)).await;
          let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            BODY.len(),
            BODY
          );
          let _ = socket.write_all(response.as_bytes()).await;
          let _ = socket.shutdown().await;
        });
      }
    });

    format!("http://{}", addr)
  }

  #[tokio::test]
  async fn test_switching_infinite_views_mid_load_still_loads() {
    let mut config = Config::default();
    config.api.base_url = slow_products_server().await;
    let mut app = App::new(&config).unwrap();

    app.handle_key(key(KeyCode::Char('5')));
    app.handle_key(key(KeyCode::Char('6')));
    assert_eq!(app.active_command(), "auto");

    let store = app.client.page_store();
    let hash = ProductQueryKey::InfiniteProducts.cache_hash();
    for _ in 0..200 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      app.tick();
      if store.with_entry(&hash, |entry| !entry.pages.is_empty()) {
        return;
      }
    }
    panic!("auto view never loaded its first page");
  }

  #[tokio::test]
  async fn test_q_at_root_quits() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }
}
