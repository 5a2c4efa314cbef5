use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{CLIENT_CONTEXT_LIMIT, ChatMessage, Sender};
use crate::client::ApiClient;

const HELP: &str = "/new, /list, /open <id>, /history, /quit. Anything else is sent as a message.";

fn print_messages(messages: &[ChatMessage]) {
    for msg in messages {
        let who = match msg.sender {
            Sender::User => "you",
            Sender::Ai => "hestia",
        };
        println!("{}: {}", who, msg.text);
    }
}

/// Show only the tail of a thread
fn print_recent(messages: &[ChatMessage]) {
    let start = messages.len().saturating_sub(CLIENT_CONTEXT_LIMIT);
    print_messages(&messages[start..]);
}

pub async fn run(url: &str, uid: &str, session: Option<String>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let client = ApiClient::new(url, uid);
    let mut active_session = session;

    if let Some(id) = &active_session {
        print_recent(&client.chat_messages(id).await?);
    }
    println!("{}", HELP);

    loop {
        let prompt = format!("{}> ", active_session.as_deref().unwrap_or("new"));
        let readline = rl.readline(&prompt);
        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        // Errors are printed and the loop keeps going
        let result: Result<()> = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/help", _) => {
                println!("{}", HELP);
                Ok(())
            }
            ("/new", _) => client.new_chat().await.map(|session| {
                println!("Started {}", session.title.as_deref().unwrap_or("Untitled"));
                active_session = Some(session.id);
            }),
            ("/list", _) => client.list_chats().await.map(|sessions| {
                for s in sessions {
                    println!(
                        "{}  {}  {}",
                        s.id,
                        s.title.as_deref().unwrap_or("Untitled"),
                        s.created_at
                    );
                }
            }),
            ("/open", id) if !id.trim().is_empty() => {
                let id = id.trim().to_string();
                client.chat_messages(&id).await.map(|messages| {
                    print_recent(&messages);
                    active_session = Some(id);
                })
            }
            ("/history", _) => match &active_session {
                Some(id) => client
                    .chat_messages(id)
                    .await
                    .map(|messages| print_messages(&messages)),
                None => {
                    println!("No session open");
                    Ok(())
                }
            },
            _ => {
                let resp = client.send(active_session.as_deref(), line).await;
                resp.map(|resp| {
                    println!("hestia: {}", resp.reply);
                    active_session = Some(resp.did);
                })
            }
        };

        if let Err(err) = result {
            println!("Error: {}", err);
        }
    }

    Ok(())
}
