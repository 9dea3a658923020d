//! Terminal front end for an Unolan session.
//!
//! ```text
//! unolan-console host --players 3 --nickname Ann
//! unolan-console join --code 8080 --nickname Bob
//! ```
//!
//! Commands at the prompt: `start` (host only), `hand`, `play <n> [color]`,
//! `draw`, `quit`.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use rand::seq::IndexedRandom;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use unolan::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "unolan-console", about = "Play an Unolan session from the terminal")]
struct Cli {
    /// Nickname list used when `--nickname` is omitted.
    #[arg(long, global = true, default_value = NICKNAMES_PATH)]
    nicknames: PathBuf,

    #[command(subcommand)]
    role: Role,
}

#[derive(Debug, Subcommand)]
enum Role {
    /// Host a new session.
    Host {
        /// Address to listen on. Its port becomes the session code.
        #[arg(long, default_value = unolan::DEFAULT_BIND)]
        bind: String,

        /// Seats at the table, yours included.
        #[arg(long, default_value_t = 2)]
        players: usize,

        #[arg(long)]
        nickname: Option<String>,
    },
    /// Join a session by its code.
    Join {
        #[arg(long)]
        code: SessionCode,

        #[arg(long)]
        nickname: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let names = load_nicknames(&cli.nicknames);
    let pick = |given: Option<String>| -> String {
        given
            .or_else(|| names.choose(&mut rand::rng()).cloned())
            .unwrap_or_else(|| "Player".to_string())
    };

    match cli.role {
        Role::Host {
            bind,
            players,
            nickname,
        } => {
            let nickname = pick(nickname);
            let session = Host::builder()
                .bind(&bind)
                .capacity(players)
                .nickname(&nickname)
                .start()
                .await
                .context("failed to host session")?;
            println!("hosting as {nickname}; session code {}", session.code);
            let host = session.commands.clone();
            play(session, Some(host)).await
        }
        Role::Join { code, nickname } => {
            let nickname = pick(nickname);
            println!("searching for session {code}...");
            let session = join_session(code, &nickname, &BeaconConfig::default())
                .await
                .with_context(|| format!("failed to join session {code}"))?;
            println!("joined as {nickname}; waiting for the host to deal");
            play(session, None).await
        }
    }
}

/// Reads commands from stdin and prints the table after every change.
async fn play<C: GameCommands>(
    mut session: Session<C>,
    host: Option<HostHandle>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            change = session.changes.recv() => {
                let Some(change) = change else { break };
                info!(tag = change.tag(), "state changed");
                print_change(&change);
                let view = session.commands.view().await?;
                if change == StateChange::Lobby {
                    println!("  seated: {}", view.seating.join(", "));
                } else {
                    print_view(&view);
                }
                if change.is_terminal() {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match run_command(&session.commands, host.as_ref(), line.trim()).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("! {e}"),
                }
            }
        }
    }

    session.commands.close_game().await?;
    Ok(())
}

/// Returns `Ok(false)` when the user quits.
async fn run_command<C: GameCommands>(
    commands: &C,
    host: Option<&HostHandle>,
    line: &str,
) -> anyhow::Result<bool> {
    let mut words = line.split_whitespace();
    match words.next() {
        None => {}
        Some("start") => match host {
            Some(host) => host.start_game().await?,
            None => bail!("only the host can deal"),
        },
        Some("hand") => print_view(&commands.view().await?),
        Some("draw") => {
            let card = commands.draw_one().await?;
            println!("you drew {card}");
        }
        Some("play") => {
            let index: usize = words
                .next()
                .context("usage: play <n> [color]")?
                .parse()
                .context("card number must be a number")?;
            let view = commands.view().await?;
            let mut card = *view.hand.get(index).context("no such card")?;
            if card.needs_color() {
                let name = words.next().context("choose a color: play <n> <color>")?;
                let color = Color::parse(name)
                    .filter(|c| Color::PLAYABLE.contains(c))
                    .with_context(|| format!("unknown color {name:?}"))?;
                card = card.with_color(color);
            }
            commands.play(card).await?;
        }
        Some("quit") => return Ok(false),
        Some(other) => bail!("unknown command {other:?}"),
    }
    Ok(true)
}

fn print_change(change: &StateChange) {
    match change {
        StateChange::Lobby => println!("* the lobby changed"),
        StateChange::StartGame => println!("* cards dealt"),
        StateChange::Step { player } => println!("* {player} played"),
        StateChange::Action { player, action } => println!("* {player} played {action}"),
        StateChange::TakeCard { player } => println!("* {player} drew a card"),
        StateChange::EndGame { winner } => println!("* {winner} wins!"),
        StateChange::Error { departed: Some(who) } => println!("* {who} left; game over"),
        StateChange::Error { departed: None } => println!("* lost the host; game over"),
    }
}

fn print_view(view: &TableView) {
    if let Some(top) = view.top_card {
        match view.active_color() {
            Some(color) if top.is_wild() => println!("top: {top} (color {color})"),
            _ => println!("top: {top}"),
        }
    }
    for opponent in &view.opponents {
        println!("  {}: {} cards", opponent.nickname, opponent.cards);
    }
    println!("deck: {}", view.deck_size);

    let playable = view.playable();
    for (i, card) in view.hand.iter().enumerate() {
        let mark = if view.is_my_turn() && playable.contains(&i) { '*' } else { ' ' };
        println!("{mark}{i:>2}  {card}");
    }
    match &view.current_player {
        Some(current) if view.is_my_turn() => println!("your turn ({current})"),
        Some(current) => println!("waiting for {current}"),
        None => {}
    }
}
