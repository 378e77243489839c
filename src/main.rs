use clap::Parser;
use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep_until, Instant};

use glassjoy::clock::MonotonicClock;
use glassjoy::config::Config;
use glassjoy::context::{ContextError, ReplayContext, ReplayItem};
use glassjoy::engine::GestureEngine;
use glassjoy::list::{ItemList, ItemStore};
use glassjoy::navigator::{ListNavigator, NavigatorCommand, NavigatorHost};

/// Replays recorded touch and button input against the gesture engine and
/// navigates the item list with the result.
#[derive(Parser)]
#[command(version, about)]
struct Args {
  /// Configuration file [default: $XDG_CONFIG_HOME/glassjoy/config.yml]
  #[arg(short, long)]
  config: Option<PathBuf>,
  /// Item file [default: $XDG_DATA_HOME/glassjoy/items.txt]
  #[arg(short, long)]
  items: Option<PathBuf>,
  /// JSON-lines input to replay; reads stdin when omitted
  input: Option<PathBuf>,
}

// Logs what a real host would render.
struct ConsoleHost;

impl NavigatorHost for ConsoleHost {
  fn scroll_to(&self, position: usize) {
    log::info!("Selection at row {}", position);
  }

  fn request_text_capture(&self) {
    log::info!("Text capture requested");
  }

  fn exit_armed(&self) {
    println!("Swipe down again to exit");
  }

  fn exit(&self) {
    log::info!("Exit confirmed");
  }

  fn prompt_dismissed(&self) {
    log::info!("Prompt dismissed");
  }
}

enum Outcome {
  Exhausted(Result<(), ContextError>),
  Interrupted,
  Exited(Result<ItemList, tokio::task::JoinError>),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
  let log_level = match env::var("LOG_LEVEL") {
    Ok(value) => value,
    Err(_) => "info".to_string(),
  };
  env::set_var("RUST_LOG", log_level);
  env_logger::init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let store = match args.items {
    Some(path) => ItemStore::new(path),
    None => ItemStore::open_default()?,
  };
  let list = store.load()?;
  log::info!("Loaded {} items from {:?}", list.len(), store.path());

  let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
    Some(path) => Box::new(BufReader::new(File::open(path).await?)),
    None => Box::new(BufReader::new(io::stdin())),
  };
  let context = ReplayContext::new(reader);

  let mut engine = GestureEngine::new(&config);
  let echo_task = tokio::spawn(echo_gestures(engine.subscribe()));
  let (command_tx, command_rx) = mpsc::channel(16);
  let navigator = ListNavigator::new(
    list,
    Some(store),
    Arc::new(ConsoleHost),
    MonotonicClock::new(),
    &config,
  );
  let mut navigator_task = tokio::spawn(navigator.run(engine.subscribe(), command_rx));

  let outcome = tokio::select! {
    result = replay(context, &mut engine, &command_tx) => Outcome::Exhausted(result),
    _ = tokio::signal::ctrl_c() => Outcome::Interrupted,
    result = &mut navigator_task => Outcome::Exited(result),
  };

  // Dropping the engine closes the gesture stream, which tears the navigator down.
  drop(engine);
  let list = match outcome {
    Outcome::Exhausted(result) => {
      result?;
      log::info!("Input exhausted");
      navigator_task.await?
    }
    Outcome::Interrupted => {
      log::info!("Shutting down");
      navigator_task.await?
    }
    Outcome::Exited(result) => result?,
  };
  let _ = echo_task.await;

  for (i, item) in list.items().iter().enumerate() {
    let marker = if list.selected() == Some(i) { ">" } else { " " };
    println!("{} {}", marker, item);
  }
  Ok(())
}

// Feeds replayed input at its recorded pace. Timed outcomes, such as confirming a
// single tap, fire at their own deadlines between events.
async fn replay<R>(
  mut context: ReplayContext<R>,
  engine: &mut GestureEngine,
  commands: &mpsc::Sender<NavigatorCommand>,
) -> Result<(), ContextError>
where
  R: AsyncBufRead + Unpin,
{
  let origin = Instant::now();

  while let Some(item) = context.next().await? {
    let at = item.timestamp();
    settle(engine, origin, at).await;
    sleep_until(origin + at).await;

    match item {
      ReplayItem::Event(event) => {
        engine.handle(&event);
      }
      ReplayItem::Text { text, .. } => {
        if commands.send(NavigatorCommand::Append(text)).await.is_err() {
          log::warn!("Navigator has stopped, ending replay");
          return Ok(());
        }
      }
    }
  }

  settle(engine, origin, Duration::MAX).await;
  Ok(())
}

async fn settle(engine: &mut GestureEngine, origin: Instant, until: Duration) {
  while let Some(deadline) = engine.next_deadline() {
    if deadline > until {
      break;
    }
    sleep_until(origin + deadline).await;
    engine.poll(deadline);
  }
}

async fn echo_gestures(mut gestures: broadcast::Receiver<glassjoy::Gesture>) {
  loop {
    match gestures.recv().await {
      Ok(gesture) => println!("{}", gesture),
      Err(broadcast::error::RecvError::Lagged(skipped)) => {
        log::warn!("Gesture echo lagged, skipped {} gestures", skipped)
      }
      Err(broadcast::error::RecvError::Closed) => break,
    }
  }
}
