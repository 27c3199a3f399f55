use std::io::Write;

use case_tutor::adapters::ReqwestHttpClient;
use case_tutor::api::{Credentials, TutorApi};
use case_tutor::cli::{output, parse_args, version_line, CliCommand, USAGE};
use case_tutor::config::TutorConfig;
use case_tutor::error::{StreamError, TutorError};
use case_tutor::session::CaseSession;
use case_tutor::transcript::{Applied, Conversation, EntryId, Role};

use color_eyre::eyre::{Result, WrapErr};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const ENV_ACCESS_TOKEN: &str = "CASE_TUTOR_ACCESS_TOKEN";
const ENV_REFRESH_TOKEN: &str = "CASE_TUTOR_REFRESH_TOKEN";

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("case_tutor=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn credentials_from_env() -> Result<Credentials> {
    let access = std::env::var(ENV_ACCESS_TOKEN)
        .wrap_err_with(|| format!("{} is not set", ENV_ACCESS_TOKEN))?;
    let refresh = std::env::var(ENV_REFRESH_TOKEN)
        .wrap_err_with(|| format!("{} is not set", ENV_REFRESH_TOKEN))?;
    Ok(Credentials::new(access, refresh))
}

/// Prints streamed text as it arrives.
fn live_printer() -> impl FnMut(&Conversation, Applied) + Send + 'static {
    let mut current: Option<EntryId> = None;
    let mut printed = 0usize;

    move |conversation, applied| {
        let mut stdout = std::io::stdout();
        match applied {
            Applied::Updated(id) => {
                if current != Some(id) {
                    current = Some(id);
                    printed = 0;
                    print!("\nTutor: ");
                }
                if let Some(entry) = conversation.transcript().get(id) {
                    print!("{}", &entry.content[printed..]);
                    printed = entry.content.len();
                }
            }
            Applied::Appended(id) => {
                current = None;
                if let Some(entry) = conversation.transcript().get(id) {
                    print!("\n{}", output::entry(entry));
                }
            }
            Applied::TurnComplete => {
                current = None;
                println!();
            }
            Applied::CaseComplete => current = None,
        }
        stdout.flush().ok();
    }
}

/// Aborts the session's next request on Ctrl-C while alive.
struct InterruptGuard(JoinHandle<()>);

impl InterruptGuard {
    fn arm(session: &mut CaseSession<ReqwestHttpClient>) -> Self {
        let handle = session.abort_handle();
        Self(tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.abort();
            }
        }))
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn is_abort(err: &TutorError) -> bool {
    matches!(err, TutorError::Stream(StreamError::Aborted))
}

/// Print the last system entry left by a failed request.
fn report_failure(session: &CaseSession<ReqwestHttpClient>, err: &TutorError) {
    if let Some(entry) = session.conversation().transcript().last() {
        if entry.role == Role::System {
            println!("\n{}", output::entry(entry));
        }
    }
    if is_abort(err) {
        println!("(interrupted)");
    } else {
        eprintln!("{}", err.user_message());
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush().ok();
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

async fn play(
    session: &mut CaseSession<ReqwestHttpClient>,
    condition: &str,
    focus: Option<&str>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", output::header(condition));
    let guard = InterruptGuard::arm(session);
    let started = session.start_case(condition, focus).await;
    drop(guard);
    if let Err(e) = started {
        report_failure(session, &e);
        // Ctrl-C while the case opens means the user is leaving.
        return if is_abort(&e) { Ok(()) } else { Err(e.into()) };
    }

    loop {
        while !session.conversation().is_case_complete() {
            let Some(input) = prompt(&mut lines, "\n> ").await? else {
                return Ok(());
            };
            match input.as_str() {
                "" => continue,
                "/quit" => return Ok(()),
                _ => {}
            }
            let guard = InterruptGuard::arm(session);
            let sent = session.continue_case(&input).await;
            drop(guard);
            if let Err(e) = sent {
                report_failure(session, &e);
            }
        }

        if let Some(completion) = session.conversation().completion() {
            println!("\n{}", output::completion(completion));
        }

        loop {
            let Some(choice) = prompt(&mut lines, "[s]ave, [n]ew case, [q]uit: ").await? else {
                return Ok(());
            };
            match choice.as_str() {
                "s" | "save" => match session.save_performance().await {
                    Ok(()) => println!("Saved."),
                    Err(e) => eprintln!("{}", e.user_message()),
                },
                "n" | "new" => {
                    let guard = InterruptGuard::arm(session);
                    let restarted = session.restart().await;
                    drop(guard);
                    if let Err(e) = restarted {
                        report_failure(session, &e);
                        return if is_abort(&e) { Ok(()) } else { Err(e.into()) };
                    }
                    break;
                }
                "q" | "quit" => return Ok(()),
                _ => {}
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let command = parse_args(std::env::args());
    match command {
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    setup_logging();

    let config = TutorConfig::from_env()?;
    let http = match config.request_timeout {
        Some(timeout) => ReqwestHttpClient::with_connect_timeout(timeout)?,
        None => ReqwestHttpClient::new(),
    };
    let api = TutorApi::new(http, config, credentials_from_env()?);

    match command {
        CliCommand::Wards => {
            let catalog = api.wards().await?;
            println!("{}", output::wards(&catalog));
        }
        CliCommand::Progress => {
            let progress = api.progress().await?;
            println!("{}", output::progress(&progress));
        }
        CliCommand::Play { condition, focus } => {
            let mut session = CaseSession::new(api).on_update(live_printer());
            play(&mut session, &condition, focus.as_deref()).await?;
        }
        CliCommand::Version | CliCommand::Help => {}
    }

    Ok(())
}
