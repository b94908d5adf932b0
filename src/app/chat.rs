use crate::core::orchestrator::{Orchestrator, TurnInput};
use anyhow::{Context, Result};
use std::io::Write;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One turn, printed with its response time.
pub(super) async fn run_single(
    orchestrator: &Orchestrator,
    message: Option<&str>,
    image: Option<&str>,
) -> Result<()> {
    let started = Instant::now();
    let reply = orchestrator.respond(TurnInput::new(message, image)).await;
    println!("{}", reply.text);
    println!("({:.1}s)", started.elapsed().as_secs_f64());
    Ok(())
}

/// Interactive loop until `exit`, `quit` or end of input.
pub(super) async fn run_interactive(orchestrator: &Orchestrator) -> Result<()> {
    let persona = orchestrator.session().persona();
    println!("Chatting with {}. Type `exit` to leave.", persona.name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you > ");
        std::io::stdout().flush().context("flush stdout")?;

        let Some(line) = lines.next_line().await.context("read stdin")? else {
            break;
        };
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let started = Instant::now();
        let reply = orchestrator.respond(TurnInput::text(line)).await;
        println!(
            "{} > {} ({:.1}s)",
            persona.name,
            reply.text,
            started.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
