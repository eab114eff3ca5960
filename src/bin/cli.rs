use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use hena_auth::client::{AuthClient, ClientError, DEFAULT_BASE_URL};
use hena_auth::models::HealthResponse;
use hena_auth::game::{Event, Frame, Key, MenuScreen, ScreenManager};

const TOKEN_FILE: &str = ".hena_token";

#[derive(Parser)]
#[command(name = "hena-cli")]
#[command(about = "Client for the HenaGame auth server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = DEFAULT_BASE_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show who the saved token belongs to
    Me,
    DeleteProfile {
        #[arg(short, long)]
        username: String,
    },
    Health,
    Logout,
    /// Drive the game screens from stdin: type text and press enter,
    /// or enter `tab`, `esc`, `back`, `quit`
    Play,
}

fn saved_token() -> String {
    fs::read_to_string(TOKEN_FILE).unwrap_or_default().trim().to_string()
}

fn input_events(line: &str) -> Vec<Event> {
    match line {
        "tab" => vec![Event::KeyDown(Key::Tab)],
        "esc" => vec![Event::KeyDown(Key::Escape)],
        "back" => vec![Event::KeyDown(Key::Backspace)],
        "quit" => vec![Event::Quit],
        text => text
            .chars()
            .map(|c| Event::KeyDown(Key::Char(c)))
            .chain(std::iter::once(Event::KeyDown(Key::Enter)))
            .collect(),
    }
}

fn describe_health(result: Result<HealthResponse, ClientError>) -> String {
    match result {
        Ok(health) => format!("status: {}, database_url_set: {}", health.status, health.database_url_set),
        Err(e) => format!("Health check failed: {e}"),
    }
}

fn play(client: AuthClient) -> Result<(), Box<dyn std::error::Error>> {
    let mut manager = ScreenManager::new();
    manager.push(Box::new(MenuScreen::new(Arc::new(client))));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last = Instant::now();

    while manager.is_running() {
        let mut frame = Frame::new();
        manager.render(&mut frame);
        print!("\n{frame}> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        for event in input_events(line.trim_end_matches(['\r', '\n'])) {
            manager.handle_event(&event);
        }

        let now = Instant::now();
        manager.update(now.duration_since(last).as_secs_f32());
        last = now;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = AuthClient::new(cli.url);

    match cli.command {
        Commands::Register { username, password } => match client.register(&username, &password) {
            Ok(body) => {
                fs::write(TOKEN_FILE, body.access_token)?;
                println!("Registered {username}. Token saved to {TOKEN_FILE}");
            }
            Err(e) => println!("Registration failed: {e}"),
        },
        Commands::Login { username, password } => match client.login(&username, &password) {
            Ok(body) => {
                // Save token
                fs::write(TOKEN_FILE, body.access_token)?;
                println!("Logged in. Token saved to {TOKEN_FILE}");
            }
            Err(e) => println!("Login failed: {e}"),
        },
        Commands::Me => match client.me(&saved_token()) {
            Ok(me) => println!("Logged in as {}", me.username),
            Err(e) => println!("Not logged in: {e}"),
        },
        Commands::DeleteProfile { username } => match client.delete_profile(&saved_token(), &username) {
            Ok(body) => {
                let _ = fs::remove_file(TOKEN_FILE);
                println!("{}", body.message);
            }
            Err(e) => println!("Delete failed: {e}"),
        },
        Commands::Health => println!("{}", describe_health(client.health())),
        Commands::Logout => {
            let _ = fs::remove_file(TOKEN_FILE);
            println!("Logged out (token removed).");
        }
        Commands::Play => play(client)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_health() {
        let ok = describe_health(Ok(HealthResponse {
            status: "ok".into(),
            database_url_set: true,
        }));
        assert_eq!(ok, "status: ok, database_url_set: true");

        let failed = describe_health(Err(ClientError::Rejected {
            status: 503,
            detail: "unavailable".into(),
        }));
        assert_eq!(failed, "Health check failed: server answered 503: unavailable");
    }

    #[test]
    fn test_input_events() {
        assert_eq!(input_events("tab"), vec![Event::KeyDown(Key::Tab)]);
        assert_eq!(
            input_events("hi"),
            vec![
                Event::KeyDown(Key::Char('h')),
                Event::KeyDown(Key::Char('i')),
                Event::KeyDown(Key::Enter)
            ]
        );
    }
}
