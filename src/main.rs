use clap::Parser;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};

use rust_chat_client::common::{SessionAction, User};
use rust_chat_client::config;
use rust_chat_client::session::{SessionController, SessionState};

#[derive(Parser)]
#[command(
    name = "rust_chat_client",
    version,
    about = "Realtime one-to-one chat session client"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Conversation to open
    #[arg(long)]
    conversation: String,
    /// Id of the logged-in user
    #[arg(long)]
    user_id: i64,
    /// Access token (falls back to CHAT_ACCESS_TOKEN from the environment)
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    let Some(token) = cli
        .token
        .or_else(|| std::env::var("CHAT_ACCESS_TOKEN").ok())
    else {
        log::error!("No access token: pass --token or set CHAT_ACCESS_TOKEN");
        return;
    };

    let (controller, handle) =
        SessionController::new(app_config, cli.conversation, cli.user_id, token);
    let session = tokio::spawn(controller.run());

    // Print state transitions as they land.
    let mut state_rx = handle.state.clone();
    tokio::spawn(async move {
        let mut printer = Printer::new();
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow().clone();
            printer.render(&state);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let action = if line == "/quit" {
            let _ = handle.actions.send(SessionAction::Close).await;
            break;
        } else if let Some(id) = line.strip_prefix("/delete ") {
            match id.trim().parse() {
                Ok(id) => SessionAction::DeleteMessage(id),
                Err(_) => {
                    log::warn!("Usage: /delete <message-id>");
                    continue;
                }
            }
        } else {
            SessionAction::SendMessage(line)
        };

        if let Err(err) = handle.actions.send(action).await {
            log::warn!("Failed to send action to session: {err}");
            break;
        }
    }

    if let Err(err) = session.await {
        log::error!("Session task terminated: {err}");
    }
}

/// Prints whatever changed between consecutive state snapshots.
struct Printer {
    printed: usize,
    online: Vec<User>,
}

impl Printer {
    fn new() -> Self {
        Self {
            printed: 0,
            online: Vec::new(),
        }
    }

    fn render(&mut self, state: &SessionState) {
        if state.loading {
            println!("Loading messages...");
            return;
        }

        let messages = state.messages.messages();
        if messages.len() < self.printed {
            // A delete shrank the log; fall back to the new end.
            self.printed = messages.len();
        }
        for message in &messages[self.printed..] {
            println!(
                "[{}] {}: {}",
                message.timestamp.format("%H:%M:%S"),
                message.sender.username,
                message.content
            );
        }
        self.printed = messages.len();

        for line in presence_changes(&self.online, state.presence.online_users()) {
            println!("{line}");
        }
        self.online = state.presence.online_users().to_vec();

        if let Some(user) = &state.typing_user {
            println!("{} is typing...", user.username);
        }
    }
}

/// One line per user whose presence flipped between two snapshots. The
/// presence set can hold duplicate entries; a flip prints once regardless.
fn presence_changes(previous: &[User], current: &[User]) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, user) in current.iter().enumerate() {
        if previous.iter().any(|u| u.id == user.id)
            || current[..index].iter().any(|u| u.id == user.id)
        {
            continue;
        }
        lines.push(format!("{} is online", user.username));
    }
    for (index, user) in previous.iter().enumerate() {
        if current.iter().any(|u| u.id == user.id)
            || previous[..index].iter().any(|u| u.id == user.id)
        {
            continue;
        }
        lines.push(format!("{} is offline", user.username));
    }
    lines
}
