use std::io::{IsTerminal, Write};
use std::sync::Arc;

use shared::config::DashboardConfig;
use shared::dashboard::{DashboardState, DashboardUpdate, render_dashboard};
use shared::posts::{HttpPostsClient, Post, PostsClientError, PostsSource};
use shared::retry::ErrorActionKind;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, sleep_until};
use tracing::{error, info, warn};

type FetchOutcome = (u64, Result<Vec<Post>, PostsClientError>);

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dashboard=info,shared=info".to_string()),
        )
        .init();

    let config = match DashboardConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read dashboard config: {err}");
            std::process::exit(1);
        }
    };

    let client = match HttpPostsClient::new(config.posts_api_url.clone(), config.fetch_timeout()) {
        Ok(client) => client,
        Err(err) => {
            error!("failed to build posts client: {err}");
            std::process::exit(1);
        }
    };
    let source: Arc<dyn PostsSource> = Arc::new(client);

    let mut state = match DashboardState::new(config.retry_config(), config.search_debounce()) {
        Ok(state) => state,
        Err(err) => {
            error!("failed to build dashboard state: {err}");
            std::process::exit(1);
        }
    };

    info!(
        url = %config.posts_api_url,
        max_attempts = config.retry_max_attempts,
        retry_delay_seconds = config.retry_delay_seconds,
        "dashboard starting"
    );

    let mut fetch = Some(start_fetch(&mut state, &source));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    draw(&state);

    loop {
        let deadline = state.next_deadline().map(Instant::from_std);

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        let now = Instant::now().into_std();
                        match line.trim() {
                            ":quit" | ":q" => break,
                            ":retry" => match state.retry_button() {
                                Some(kind) => apply(&mut state, &source, &mut fetch, kind, now),
                                None => continue,
                            },
                            ":reload" => {
                                apply(&mut state, &source, &mut fetch, ErrorActionKind::Reload, now)
                            }
                            term => state.set_search_term(term, now),
                        }
                    }
                    Ok(None) => {
                        stdin_open = false;
                        continue;
                    }
                    Err(err) => {
                        warn!("failed to read stdin: {err}");
                        stdin_open = false;
                        continue;
                    }
                }
            }
            joined = join_fetch(&mut fetch) => {
                fetch = None;
                match joined {
                    Ok((generation, result)) => {
                        state.complete_fetch(generation, result, Instant::now().into_std());
                    }
                    Err(err) if err.is_cancelled() => continue,
                    Err(err) => {
                        error!("posts fetch task failed: {err}");
                        continue;
                    }
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let update = state.advance(Instant::now().into_std());
                if !update.changed {
                    continue;
                }
                if update.fetch_requested {
                    restart_fetch(&mut state, &source, &mut fetch);
                }
            }
        }

        draw(&state);
    }

    state.shutdown();
    if let Some(handle) = fetch.take() {
        handle.abort();
    }
    info!("dashboard stopped");
}

fn apply(
    state: &mut DashboardState,
    source: &Arc<dyn PostsSource>,
    fetch: &mut Option<JoinHandle<FetchOutcome>>,
    action: ErrorActionKind,
    now: std::time::Instant,
) {
    let update: DashboardUpdate = state.press(action, now);
    if update.fetch_requested {
        restart_fetch(state, source, fetch);
    }
}

fn restart_fetch(
    state: &mut DashboardState,
    source: &Arc<dyn PostsSource>,
    fetch: &mut Option<JoinHandle<FetchOutcome>>,
) {
    if let Some(previous) = fetch.take() {
        previous.abort();
    }
    *fetch = Some(start_fetch(state, source));
}

fn start_fetch(
    state: &mut DashboardState,
    source: &Arc<dyn PostsSource>,
) -> JoinHandle<FetchOutcome> {
    let generation = state.begin_fetch();
    let source = Arc::clone(source);
    tokio::spawn(async move { (generation, source.fetch_posts().await) })
}

async fn join_fetch(
    fetch: &mut Option<JoinHandle<FetchOutcome>>,
) -> Result<FetchOutcome, JoinError> {
    match fetch.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn draw(state: &DashboardState) {
    let frame = render_dashboard(&state.view());
    let mut stdout = std::io::stdout().lock();
    if stdout.is_terminal() {
        let _ = write!(stdout, "\x1b[2J\x1b[H");
    }
    let _ = write!(stdout, "{frame}");
    let _ = stdout.flush();
}
