//! Attributer Desk — client relay.
//! The user's own provider key is kept in a local credential store and the model is
//! called directly from this process. Every command sits behind the session gate.
//!
//! Usage:
//!   attributer-desk key set sk-ant-...
//!   attributer-desk ask "What's your roadmap for 2026?"
//!   attributer-desk batch --file questions.txt

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use attributer_core::{
    run_batch, split_questions, AnsweredQuestion, AnthropicMessages, BatchError, RelayConfig,
    Responder, SessionState,
};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "attributer-desk", version, about = "Draft on-voice answers to journalist questions")]
struct Cli {
    /// Gate password. Prompted on stdin when omitted.
    #[arg(long, env = "ATTRIBUTER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// TOML config file (defaults to ATTRIBUTER_CONFIG or config/attributer.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the locally stored provider key.
    #[command(subcommand)]
    Key(KeyCommand),
    /// Answer one question.
    Ask { question: String },
    /// Answer one question per line, in order; stops at the first failure.
    Batch {
        /// Read questions from a file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Store a key (must start with sk-ant-).
    Set { key: String },
    /// Forget the stored key.
    Remove,
    /// Show whether a key is stored.
    Status,
}

const VERSION_TITLES: [&str; 3] = [
    "Version 1 (1 paragraph)",
    "Version 2 (2 paragraphs)",
    "Version 3 (3+ paragraphs)",
];

/// One text card: question, three versions, recommendation banner.
fn render_card(answer: &AnsweredQuestion) -> String {
    let r = &answer.response;
    let mut out = String::new();
    out.push_str("════════════════════════════════════════\n");
    out.push_str("JOURNALIST QUESTION\n");
    out.push_str(&answer.question);
    out.push_str("\n\n");
    out.push_str(&format!(">> Recommendation: {}\n\n", r.recommendation));
    for (title, body) in VERSION_TITLES
        .iter()
        .zip([&r.version1, &r.version2, &r.version3])
    {
        out.push_str(&format!("── {} ──\n{}\n\n", title, body));
    }
    out
}

fn prompt_password(stdin: &mut impl BufRead) -> io::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match &cli.config {
        Some(path) => RelayConfig::load_from(Some(path))?,
        None => RelayConfig::load()?,
    };

    let stdin = io::stdin();
    let mut stdin = stdin.lock();

    let mut session = SessionState::new();
    let attempt = match cli.password {
        Some(p) => p,
        None => prompt_password(&mut stdin)?,
    };
    session.unlock(&cfg.gate(), &attempt)?;

    let store = cfg.credential_store();
    match cli.command {
        Command::Key(KeyCommand::Set { key }) => {
            store.save(&key)?;
            println!("Key saved to {}", store.path().display());
            Ok(())
        }
        Command::Key(KeyCommand::Remove) => {
            if store.remove()? {
                session.clear_credential();
                println!("Key removed.");
            } else {
                println!("No key stored.");
            }
            Ok(())
        }
        Command::Key(KeyCommand::Status) => {
            match store.load()? {
                Some(_) => println!("Key stored in {}", store.path().display()),
                None => println!("No key stored. Run `attributer-desk key set <KEY>`."),
            }
            Ok(())
        }
        Command::Ask { question } => {
            session.set_credential(store.load()?);
            let responder = responder_for(&cfg, &session)?;
            let response = responder.respond(question.trim()).await.map_err(|e| {
                tracing::debug!(error = %e, "ask failed");
                e.public_message()
            })?;
            session.record(vec![AnsweredQuestion {
                question: question.trim().to_string(),
                response,
            }]);
            print_answers(&session);
            Ok(())
        }
        Command::Batch { file } => {
            let input = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    stdin.read_to_string(&mut buf)?;
                    buf
                }
            };
            session.set_credential(store.load()?);
            let responder = responder_for(&cfg, &session)?;

            let cancel = CancellationToken::new();
            let watcher = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("Cancelling after the current question...");
                    watcher.cancel();
                }
            });

            let answered = run_batch(&responder, &split_questions(&input), &cancel)
                .await
                .map_err(describe_batch_error)?;
            session.record(answered);
            print_answers(&session);
            Ok(())
        }
    }
}

fn responder_for(
    cfg: &RelayConfig,
    session: &SessionState,
) -> Result<Responder, Box<dyn std::error::Error>> {
    let key = session
        .credential()
        .ok_or("No key stored. Run `attributer-desk key set <KEY>` first.")?;
    let provider =
        AnthropicMessages::new(key, cfg.request_timeout()).with_base_url(&cfg.api_base_url);
    Ok(Responder::new(Arc::new(provider), cfg.style_profile()?)
        .with_model(&cfg.model)
        .with_max_tokens(cfg.max_tokens))
}

fn describe_batch_error(err: BatchError) -> String {
    match err {
        BatchError::Question {
            index,
            question,
            source,
        } => format!(
            "Question {} (\"{}\") failed: {}",
            index + 1,
            question,
            source.public_message()
        ),
        other => other.to_string(),
    }
}

fn print_answers(session: &SessionState) {
    for answer in session.answers() {
        print!("{}", render_card(answer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attributer_core::{ResponderError, ResponseSet};

    #[test]
    fn card_shows_question_versions_and_recommendation() {
        let answer = AnsweredQuestion {
            question: "What's your roadmap for 2026?".into(),
            response: ResponseSet {
                version1: "Short.".into(),
                version2: "Medium.".into(),
                version3: "Long.".into(),
                recommendation: "Version 2 is recommended for a conceptual question.".into(),
            },
        };
        let card = render_card(&answer);
        assert!(card.contains("What's your roadmap for 2026?"));
        assert!(card.contains(">> Recommendation: Version 2 is recommended"));
        assert!(card.contains("── Version 1 (1 paragraph) ──\nShort."));
        assert!(card.contains("── Version 2 (2 paragraphs) ──\nMedium."));
        assert!(card.contains("── Version 3 (3+ paragraphs) ──\nLong."));
    }

    #[test]
    fn password_prompt_strips_newline() {
        let mut input = io::Cursor::new(b"hokku123\r\nQ1\n".to_vec());
        assert_eq!(prompt_password(&mut input).unwrap(), "hokku123");
    }

    #[test]
    fn batch_error_names_failing_question() {
        let msg = describe_batch_error(BatchError::Question {
            index: 0,
            question: "Q1".into(),
            source: ResponderError::Upstream("Overloaded".into()),
        });
        assert_eq!(msg, "Question 1 (\"Q1\") failed: Overloaded");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["attributer-desk", "--password", "x", "ask", "Q?"]).unwrap();
        assert!(matches!(cli.command, Command::Ask { ref question } if question == "Q?"));
        let cli = Cli::try_parse_from(["attributer-desk", "key", "set", "sk-ant-1"]).unwrap();
        assert!(matches!(cli.command, Command::Key(KeyCommand::Set { .. })));
    }
}
