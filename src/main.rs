//! askdb - ask a MySQL database questions in plain language.

mod ui;

use askdb::assistant::SqlAssistant;
use askdb::cli::Cli;
use askdb::config::{Config, Credentials};
use askdb::db::MySqlConnector;
use askdb::error::Result;
use askdb::llm::create_client;
use askdb::logging;
use askdb::render::{render_error, render_outcome};
use askdb::session::Session;
use tracing::{error, info};
use ui::Action;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();

    if cli.log_stderr {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}", render_error(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let gateway_config = config.llm.resolve(cli.llm.as_deref())?;
    info!(?gateway_config, "LLM gateway configured");
    let gateway = create_client(&gateway_config)?;

    let assistant = SqlAssistant::new(Box::new(MySqlConnector), gateway);

    let initial = resolve_credentials(&cli, &config)?;
    let has_password = !initial.password.is_empty();

    println!("🧠 Text to SQL");
    let credentials = ui::prompt_credentials(&initial, !has_password)?;
    let mut session = Session::new(credentials);

    interactive_loop(&assistant, &mut session).await
}

/// Pre-fills the form: command line over config file, then `MYSQL_*`
/// environment defaults, then localhost:3306.
fn resolve_credentials(cli: &Cli, config: &Config) -> Result<Credentials> {
    let mut credentials = config.form.credentials();
    credentials.merge(&cli.to_credentials()?);
    credentials.apply_env_defaults();
    Ok(credentials.with_builtin_defaults())
}

async fn interactive_loop(assistant: &SqlAssistant, session: &mut Session) -> Result<()> {
    loop {
        let action = ui::choose_action(session.sql().is_some())?;

        let result = match action {
            Action::Generate => generate(assistant, session).await,
            Action::Edit => edit(session),
            Action::Run => run_query(assistant, session).await,
            Action::ChangeCredentials => {
                ui::prompt_credentials(&session.credentials, true).map(|credentials| {
                    info!("Credentials changed: {}", credentials.display_string());
                    session.credentials = credentials;
                })
            }
            Action::Quit => return Ok(()),
        };

        if let Err(e) = result {
            error!("{}: {}", e.category(), e);
            session.mark_failed();
            println!("{}\n", render_error(&e));
        }
    }
}

async fn generate(assistant: &SqlAssistant, session: &mut Session) -> Result<()> {
    session.question = ui::prompt_question(&session.question)?;
    let sql = assistant.generate_sql(session).await?;
    ui::show_sql(&sql, false);
    Ok(())
}

fn edit(session: &mut Session) -> Result<()> {
    let current = session.sql().unwrap_or_default().to_string();
    let edited = ui::edit_sql(&current)?;
    session.edit(edited)?;
    if let Some(sql) = session.sql() {
        ui::show_sql(sql, session.is_edited());
    }
    Ok(())
}

async fn run_query(assistant: &SqlAssistant, session: &mut Session) -> Result<()> {
    let outcome = assistant.run_query(session).await?;
    println!("\n📊 Query Result\n{}\n", render_outcome(&outcome));
    session.mark_displayed();
    Ok(())
}
