mod board;
mod engine;
mod game;
mod rules;

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{error, info};
use serde_json::{json, Value};
use std::io::{Error, ErrorKind};
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::board::{Move, Side};
use crate::engine::Engine;
use crate::game::{reduce, Action, GameState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "localhost")]
    host: String,
    #[arg(long, default_value_t = 999)]
    port: u16,
    /// Search depth in plies; the only latency/strength control.
    #[arg(long, default_value_t = engine::DEFAULT_DEPTH)]
    depth: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    simple_logger::init_with_level(log::Level::Info).unwrap();

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);

    // Bind the server to a local port
    let listener = TcpListener::bind(address.clone()).await.expect("Failed to bind");
    info!("Listening on: {}", address);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, args.depth));
    }

    Ok(())
}

struct Session {
    started: bool,
    player_side: Side,
    state: GameState,
}

impl Session {
    fn new() -> Self {
        Self {
            started: false,
            player_side: Side::Red,
            state: GameState::new(),
        }
    }
}

async fn accept_connection(stream: TcpStream, depth: u32) -> Result<(), Error> {
    let addr = stream.peer_addr()?;
    info!("Peer address: {}", addr);

    let ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .expect("Error during the websocket handshake occurred");
    info!("New WebSocket connection: {}", addr);

    let (mut write, mut read) = ws_stream.split();

    let session_mutex = Arc::new(Mutex::new(Session::new()));
    let engine = Engine::new(depth);

    while let Some(raw_message) = read.next().await {
        match raw_message {
            Ok(text_message) => {
                if !text_message.is_text() && !text_message.is_binary() { continue; }
                match serde_json::from_slice::<Value>(&text_message.into_data()) {
                    Ok(data) => {
                        info!("Received: {}", data);
                        let result = handle_message(&session_mutex, &engine, data);
                        let response = match result {
                            Ok(resp) => resp,
                            Err(e) => {
                                error!("Error handling message: {:?}", e);
                                json!({"error": format!("{:?}", e)})
                            }
                        };
                        let response_str = response.to_string();
                        write.send(Message::text(response_str.clone())).await
                                    .expect(&format!("Failed to send message: {}", response_str));
                        info!("Sent: {}", response_str);
                    },
                    Err(e) => { error!("Error parsing JSON: {:?}", e); }
                }
            }
            Err(e) => { error!("Error reading websocket message: {:?}", e); }
        }
    }

    Ok(())
}

fn handle_message(session_mutex: &Arc<Mutex<Session>>, engine: &Engine, data: Value) -> Result<Value, Error> {
    let mut session = session_mutex.lock().unwrap();

    let map = data.as_object()
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Expected a dict"))?;

    // client message protocol: "start", "move", "undo"
    // server message protocol: "move", "legal_moves", "board", "in_check", "error", "end"
    if map.contains_key("start") {
        let player_is_red = data["start"].as_bool().ok_or_else(
            || Error::new(ErrorKind::InvalidInput, "Expected boolean field: start")
        )?;
        handle_start(&mut session, engine, player_is_red)
    } else if map.contains_key("move") {
        if !session.started {
            return Err(Error::new(ErrorKind::InvalidInput, "Game has not started yet"));
        }
        let move_: Move = serde_json::from_value(data["move"].clone())?;
        handle_move(&mut session, engine, move_)
    } else if map.contains_key("undo") {
        if !session.started {
            return Err(Error::new(ErrorKind::InvalidInput, "Game has not started yet"));
        }
        handle_undo(&mut session)
    } else {
        Err(Error::new(ErrorKind::InvalidInput, format!("Invalid message: {}", data)))
    }
}

fn handle_start(session: &mut Session, engine: &Engine, player_is_red: bool) -> Result<Value, Error> {
    session.started = true;
    session.player_side = if player_is_red { Side::Red } else { Side::Black };
    session.state = GameState::new();
    if player_is_red {
        Ok(state_response(&session.state))
    } else {
        make_engine_move(session, engine)
    }
}

fn handle_move(session: &mut Session, engine: &Engine, move_: Move) -> Result<Value, Error> {
    session.state = reduce(&session.state, Action::Play(move_))?;
    match check_game_over(session) {
        Some(game_over) => Ok(game_over),
        None => make_engine_move(session, engine)
    }
}

// Take back the last full turn: the engine's reply and the player's move.
fn handle_undo(session: &mut Session) -> Result<Value, Error> {
    let mut state = reduce(&session.state, Action::Undo)?;
    if state.turn != session.player_side {
        state = reduce(&state, Action::Undo)?;
    }
    session.state = state;
    Ok(state_response(&session.state))
}

fn make_engine_move(session: &mut Session, engine: &Engine) -> Result<Value, Error> {
    let (selected_move, score) = engine.best_move(&session.state.board, session.state.turn)
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "No legal move for the engine"))?;
    session.state = reduce(&session.state, Action::Play(selected_move))?;
    info!("Engine plays {:?} (score {})", selected_move, score);
    match check_game_over(session) {
        Some(game_over) => Ok(game_over),
        None => {
            let mut response = state_response(&session.state);
            response["move"] = json!(selected_move);
            response["score"] = json!(score);
            Ok(response)
        }
    }
}

fn state_response(state: &GameState) -> Value {
    json!({
        "legal_moves": rules::all_legal_moves(&state.board, state.turn),
        "board": state.board.to_grid(),
        "in_check": state.in_check,
    })
}

fn check_game_over(session: &Session) -> Option<Value> {
    session.state.winner.map(|winner| json!({
        "end": winner,
        "move": session.state.last_move,
        "board": session.state.board.to_grid(),
    }))
}
