//! Interactive terminal surface for a chat session.
//!
//! The shell is deliberately thin: it collects the credential, renders
//! turns, and delegates every transcript mutation to [`ChatSession`]. All
//! failures are surfaced as visible lines and the loop continues; nothing
//! here terminates the session.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tracing::warn;

use crate::config::Config;
use crate::credential::ApiCredential;
use crate::llm::HttpCompletionClient;
use crate::persona::PERSONA;
use crate::session::{ChatSession, SessionError, Turn};

/// Run one interactive session over stdin/stdout.
///
/// The session (and its transcript) lives exactly as long as this call.
pub async fn run(config: Config) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let credential = read_credential(&mut lines, &mut stdout).await?;
    let client = HttpCompletionClient::new(config.endpoint.base_url, credential);
    let mut session = ChatSession::new(config.endpoint.model, config.generation, PERSONA);

    // Seed round-trip: the assistant opens the conversation before any
    // user input is accepted.
    write(&mut stdout, "(connecting...)\n").await?;
    loop {
        match session.seed(&client).await {
            Ok(reply) => {
                write(&mut stdout, &format!("sentinel> {}\n\n", reply.content)).await?;
                break;
            }
            Err(e) => {
                write(
                    &mut stdout,
                    &format!("! could not start the session: {e}\n  press Enter to retry, or type /quit\n"),
                )
                .await?;
                match lines.next_line().await? {
                    Some(line) if line.trim() == "/quit" => return Ok(()),
                    Some(_) => continue,
                    None => return Ok(()),
                }
            }
        }
    }

    loop {
        write(&mut stdout, "you> ").await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" => break,
            "/retry" => {
                write(&mut stdout, "(thinking...)\n").await?;
                match session.retry(&client).await {
                    Ok(Turn::Reply(reply)) => {
                        write(&mut stdout, &format!("sentinel> {}\n\n", reply.content)).await?;
                    }
                    Ok(Turn::Ignored) => {}
                    Err(SessionError::NothingToRetry) => {
                        write(&mut stdout, "! nothing to retry\n").await?;
                    }
                    Err(e) => {
                        write(&mut stdout, &format!("! reply failed: {e}\n")).await?;
                    }
                }
            }
            input => {
                if !input.is_empty() {
                    write(&mut stdout, "(thinking...)\n").await?;
                }
                match session.submit(input, &client).await {
                    Ok(Turn::Reply(reply)) => {
                        write(&mut stdout, &format!("sentinel> {}\n\n", reply.content)).await?;
                    }
                    // Blank input: nothing was sent, prompt again.
                    Ok(Turn::Ignored) => {}
                    Err(e) => {
                        write(
                            &mut stdout,
                            &format!("! reply failed: {e}\n  your message is kept; /retry re-attempts it\n"),
                        )
                        .await?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Prompt until a well-formed credential is entered.
///
/// Invalid input warns and re-prompts; no completion call can happen before
/// this returns.
async fn read_credential(
    lines: &mut Lines<BufReader<Stdin>>,
    stdout: &mut Stdout,
) -> Result<ApiCredential> {
    loop {
        write(stdout, "api credential> ").await?;
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("input closed before a credential was provided");
        };
        match ApiCredential::parse(&line) {
            Ok(credential) => return Ok(credential),
            Err(e) => {
                warn!("credential validation failed");
                write(stdout, &format!("! {e}; please re-enter\n")).await?;
            }
        }
    }
}

async fn write(stdout: &mut Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}
