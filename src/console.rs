use std::io::{self, BufRead};
use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use shakmaty::{Color, Move, Square};

use crate::error::{ParlorError, Result};
use crate::render::{render, render_clock};
use crate::room::{RoomEvent, RoomTransport, SimulatedRoom};
use crate::rules::{move_to_uci, parse_square};
use crate::selection::ClickOutcome;
use crate::session::{GameMode, GameSession, color_name};
use crate::types::{BotKind, EngineConfig, MAX_DEPTH, ROOM_JOIN_WAIT_MS};

const HELP: &str = "\
commands:
  new bot [white|black]   play the bot (you take the given color, white by default)
  new local               two players at one keyboard
  create | join <code>    open or enter a room
  <square> | click <sq>   select a piece, then click its destination
  move <uci>              play a move such as e2e4 or e7e8q
  undo | reset | menu
  board                   show the position, clocks and status
  status | clock          show only the status line or the clocks
  setoption name <Depth|Bot|Clock|Delay|Seed> value <v>
  quit";

/// Parsed console command.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    NewBot(Color),
    NewLocal,
    Create,
    Join(String),
    Click(Square),
    Move(String),
    Undo,
    Reset,
    Menu,
    Board,
    Status,
    Clock,
    SetOption,
    Help,
    Quit,
}

fn parse_command(tokens: &[&str]) -> Option<Command> {
    let cmd = match tokens.first()?.to_ascii_lowercase().as_str() {
        "new" => match tokens.get(1).map(|t| t.to_ascii_lowercase()).as_deref() {
            Some("local") => Command::NewLocal,
            Some("bot") => match tokens.get(2).map(|t| t.to_ascii_lowercase()).as_deref() {
                None | Some("white") | Some("w") => Command::NewBot(Color::White),
                Some("black") | Some("b") => Command::NewBot(Color::Black),
                Some(_) => return None,
            },
            _ => return None,
        },
        "create" => Command::Create,
        "join" => Command::Join(tokens[1..].join(" ")),
        "click" => Command::Click(parse_square(tokens.get(1)?).ok()?),
        "move" => Command::Move(tokens.get(1)?.to_string()),
        "undo" => Command::Undo,
        "reset" => Command::Reset,
        "menu" => Command::Menu,
        "board" | "d" => Command::Board,
        "status" => Command::Status,
        "clock" => Command::Clock,
        "setoption" => Command::SetOption,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Click(parse_square(other).ok()?),
    };
    Some(cmd)
}

/// Worker result: the session handed back, the bot's move and when the worker finished.
type BotHandle = thread::JoinHandle<(GameSession, Option<Move>, Instant)>;

/// The running game, or `NoGame` before one is started.
fn active(session: &mut Option<GameSession>) -> Result<&mut GameSession> {
    session.as_mut().ok_or(ParlorError::NoGame)
}

pub fn run(config: EngineConfig) {
    let stdin = io::stdin();

    let mut config = config;
    let mut session: Option<GameSession> = None;
    let mut bot_thread: Option<BotHandle> = None;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut room = SimulatedRoom::new(rng, Duration::from_millis(ROOM_JOIN_WAIT_MS));
    let mut last_input = Instant::now();

    println!("{}", HELP);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        // The bot's delay and search were charged on the worker
        if let Some(finished) = wait_for_bot(&mut bot_thread, &mut session) {
            last_input = finished;
        }

        // Thinking time on the wall clock belongs to whoever is to move.
        let now = Instant::now();
        if let Some(ref mut s) = session
            && let Some(flagged) = s.tick(now.saturating_duration_since(last_input))
        {
            println!("{} ran out of time", color_name(flagged));
        }
        last_input = now;

        let Some(command) = parse_command(&tokens) else {
            log::warn!("unrecognized command: {}", line);
            println!("unknown command, type `help`");
            continue;
        };

        match command {
            Command::NewBot(human) => {
                session = Some(GameSession::start(GameMode::Bot { human }, config.clone()));
            }
            Command::NewLocal => {
                session = Some(GameSession::start(GameMode::Local, config.clone()));
            }
            Command::Create => match room.create_room() {
                Ok(code) => {
                    println!("Room {} created. Waiting for opponent...", code);
                    session = await_opponent(&mut room, &config);
                }
                Err(e) => println!("{}", e),
            },
            Command::Join(code) => match room.join_room(&code) {
                Ok(_) => {
                    println!("Joining room...");
                    session = await_opponent(&mut room, &config);
                }
                Err(e) => println!("{}", e),
            },
            Command::Click(square) => match active(&mut session).and_then(|s| s.click(square)) {
                Ok(ClickOutcome::Moved(mv)) => println!("played {}", move_to_uci(&mv)),
                Ok(ClickOutcome::Selected(sq)) => println!("selected {}", sq),
                Ok(ClickOutcome::Deselected) => println!("selection cleared"),
                Ok(ClickOutcome::Ignored) => {}
                Err(e) => println!("{}", e),
            },
            Command::Move(text) => match active(&mut session).and_then(|s| s.play_uci(&text)) {
                Ok(mv) => println!("played {}", move_to_uci(&mv)),
                Err(e) => println!("{}", e),
            },
            Command::Undo => {
                if let Err(e) = active(&mut session).and_then(|s| s.undo()) {
                    println!("{}", e);
                }
            }
            Command::Reset => match active(&mut session) {
                Ok(s) => s.reset(),
                Err(e) => println!("{}", e),
            },
            Command::Menu => {
                session = None;
            }
            Command::Board => {
                if let Err(e) = active(&mut session) {
                    println!("{}", e);
                }
            }
            Command::Status => {
                match active(&mut session) {
                    Ok(s) => println!("{}", s.status()),
                    Err(e) => println!("{}", e),
                }
                continue;
            }
            Command::Clock => {
                match active(&mut session) {
                    Ok(s) => println!("{}", render_clock(s.clock())),
                    Err(e) => println!("{}", e),
                }
                continue;
            }
            Command::SetOption => {
                if parse_setoption(&tokens, &mut config) {
                    if let Some(ref mut s) = session {
                        s.configure(config.clone());
                    }
                } else {
                    println!("unknown option");
                }
            }
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Quit => break,
        }

        if let Some(s) = session.take() {
            print!("{}", render(&s));
            session = spawn_bot_if_due(s, &mut bot_thread, config.bot_delay);
        }
        last_input = Instant::now();
    }

    wait_for_bot(&mut bot_thread, &mut session);
}

/// Blocks until the room reports the opponent, then starts the online game.
fn await_opponent<T: RoomTransport>(room: &mut T, config: &EngineConfig) -> Option<GameSession> {
    loop {
        match room.poll() {
            Some(RoomEvent::OpponentJoined) => break,
            None => thread::sleep(Duration::from_millis(50)),
        }
    }
    let code = room.room()?.clone();
    let color = room.color()?;
    println!("Opponent joined! Starting game...");
    Some(GameSession::start(
        GameMode::Online { room: code, color },
        config.clone(),
    ))
}

/// Hands the session to a worker thread when the bot is to move. The worker waits the
/// configured delay on the bot's clock, plays, prints the new position and hands the
/// session back. The console keeps reading input meanwhile.
fn spawn_bot_if_due(
    session: GameSession,
    handle: &mut Option<BotHandle>,
    delay: Duration,
) -> Option<GameSession> {
    if !session.bot_to_move() {
        return Some(session);
    }
    let mut session = session;
    *handle = Some(thread::spawn(move || {
        thread::sleep(delay);
        let mv = match session.tick(delay) {
            Some(flagged) => {
                println!("{} ran out of time", color_name(flagged));
                None
            }
            None => session.play_bot_move(),
        };
        if let Some(ref mv) = mv {
            println!("bot plays {}", move_to_uci(mv));
        }
        print!("{}", render(&session));
        (session, mv, Instant::now())
    }));
    None
}

/// Wait for a running bot thread to finish and recover the session. Returns when the
/// worker finished, if there was one.
fn wait_for_bot(
    handle: &mut Option<BotHandle>,
    session: &mut Option<GameSession>,
) -> Option<Instant> {
    let h = handle.take()?;
    match h.join() {
        Ok((s, _, finished)) => {
            *session = Some(s);
            Some(finished)
        }
        Err(_) => {
            log::error!("bot thread panicked, game abandoned");
            *session = None;
            None
        }
    }
}

fn parse_setoption(tokens: &[&str], config: &mut EngineConfig) -> bool {
    let name_idx = tokens.iter().position(|&t| t == "name");
    let value_idx = tokens.iter().position(|&t| t == "value");

    let (Some(ni), Some(vi)) = (name_idx, value_idx) else {
        return false;
    };
    if vi <= ni {
        return false;
    }
    let name: String = tokens[ni + 1..vi].join(" ");
    let value: String = tokens[vi + 1..].join(" ");

    match name.to_lowercase().as_str() {
        "depth" => match value.parse::<u8>() {
            Ok(d) => config.depth = d.clamp(1, MAX_DEPTH),
            Err(_) => return false,
        },
        "bot" => match BotKind::parse(&value) {
            Some(kind) => config.bot = kind,
            None => return false,
        },
        "clock" => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => config.clock = Duration::from_secs(secs),
            _ => return false,
        },
        "delay" => match value.parse::<u64>() {
            Ok(ms) => config.bot_delay = Duration::from_millis(ms),
            Err(_) => return false,
        },
        "seed" => match value.parse::<u64>() {
            Ok(seed) => config.seed = Some(seed),
            Err(_) => return false,
        },
        _ => return false,
    }
    log::info!("option {} set to {}", name, value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RulesEngine;

    #[test]
    fn test_parse_new_game_commands() {
        assert_eq!(parse_command(&["new", "bot"]), Some(Command::NewBot(Color::White)));
        assert_eq!(
            parse_command(&["new", "bot", "black"]),
            Some(Command::NewBot(Color::Black))
        );
        assert_eq!(parse_command(&["NEW", "local"]), Some(Command::NewLocal));
        assert_eq!(parse_command(&["new", "bot", "green"]), None);
        assert_eq!(parse_command(&["new"]), None);
    }

    #[test]
    fn test_parse_click_forms() {
        assert_eq!(parse_command(&["e2"]), Some(Command::Click(Square::E2)));
        assert_eq!(parse_command(&["click", "G8"]), Some(Command::Click(Square::G8)));
        assert_eq!(parse_command(&["click"]), None);
        assert_eq!(parse_command(&["x9"]), None);
    }

    #[test]
    fn test_parse_room_commands() {
        assert_eq!(parse_command(&["create"]), Some(Command::Create));
        assert_eq!(parse_command(&["join", "AB12C"]), Some(Command::Join("AB12C".into())));
        assert_eq!(parse_command(&["join"]), Some(Command::Join(String::new())));
    }

    #[test]
    fn test_parse_misc_commands() {
        assert_eq!(parse_command(&["move", "e2e4"]), Some(Command::Move("e2e4".into())));
        assert_eq!(parse_command(&["d"]), Some(Command::Board));
        assert_eq!(parse_command(&["quit"]), Some(Command::Quit));
        assert_eq!(parse_command(&["undo"]), Some(Command::Undo));
    }

    #[test]
    fn test_parse_setoption_depth() {
        let mut config = EngineConfig::default();
        let tokens = vec!["setoption", "name", "Depth", "value", "5"];
        assert!(parse_setoption(&tokens, &mut config));
        assert_eq!(config.depth, 5);

        let tokens = vec!["setoption", "name", "Depth", "value", "99"];
        assert!(parse_setoption(&tokens, &mut config));
        assert_eq!(config.depth, MAX_DEPTH);
    }

    #[test]
    fn test_parse_setoption_bot_and_clock() {
        let mut config = EngineConfig::default();
        assert!(parse_setoption(&["setoption", "name", "Bot", "value", "random"], &mut config));
        assert_eq!(config.bot, BotKind::Random);
        assert!(parse_setoption(&["setoption", "name", "Clock", "value", "300"], &mut config));
        assert_eq!(config.clock, Duration::from_secs(300));
        assert!(parse_setoption(&["setoption", "name", "Delay", "value", "0"], &mut config));
        assert_eq!(config.bot_delay, Duration::ZERO);
    }

    #[test]
    fn test_parse_setoption_rejects_bad_input() {
        let mut config = EngineConfig::default();
        assert!(!parse_setoption(&["setoption", "name", "Bot", "value", "genius"], &mut config));
        assert!(!parse_setoption(&["setoption", "name", "Clock", "value", "0"], &mut config));
        assert!(!parse_setoption(&["setoption", "name", "Hash", "value", "64"], &mut config));
        assert!(!parse_setoption(&["setoption", "Depth", "3"], &mut config));
        assert_eq!(config.depth, EngineConfig::default().depth);
    }

    #[test]
    fn test_bot_thread_round_trip() {
        let config = EngineConfig {
            depth: 1,
            bot_delay: Duration::ZERO,
            seed: Some(9),
            ..EngineConfig::default()
        };
        let mut session = GameSession::start(GameMode::Bot { human: Color::White }, config);
        session.play_uci("e2e4").unwrap();

        let mut handle = None;
        let mut slot = spawn_bot_if_due(session, &mut handle, Duration::ZERO);
        assert!(slot.is_none(), "session handed to the worker");
        assert!(handle.is_some());
        assert!(wait_for_bot(&mut handle, &mut slot).is_some());
        assert!(handle.is_none());
        let session = slot.expect("session returned");
        assert_eq!(session.rules().ply_count(), 2);
        assert!(session.local_to_move());
    }

    #[test]
    fn test_wait_without_worker_keeps_session() {
        let mut handle = None;
        let mut slot = Some(GameSession::start(GameMode::Local, EngineConfig::default()));
        assert!(wait_for_bot(&mut handle, &mut slot).is_none());
        assert!(slot.is_some());
    }

    #[test]
    fn test_commands_without_game_report_no_game() {
        let mut session = None;
        assert!(matches!(active(&mut session), Err(ParlorError::NoGame)));
        assert_eq!(ParlorError::NoGame.to_string(), "no game in progress");

        let mut session = Some(GameSession::start(GameMode::Local, EngineConfig::default()));
        assert!(active(&mut session).is_ok());
    }

    #[test]
    fn test_no_bot_thread_on_human_turn() {
        let session = GameSession::start(GameMode::Local, EngineConfig::default());
        let mut handle = None;
        assert!(spawn_bot_if_due(session, &mut handle, Duration::ZERO).is_some());
        assert!(handle.is_none());
    }
}
