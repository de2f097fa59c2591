use buildforge::{
    config::Config,
    models::{LoginCredentials, RegisterData, ResetPasswordData, Role},
    storage::FileStore,
    App, AppError,
};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "buildforge", about = "BuildForge construction-management client")]
struct Cli {
    /// Overrides `API_BASE_URL`.
    #[arg(long)]
    api_base_url: Option<String>,

    /// Overrides `SESSION_FILE`.
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BUILDFORGE_PASSWORD")]
        password: String,
        #[arg(long)]
        remember_me: bool,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BUILDFORGE_PASSWORD")]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, value_parser = parse_role)]
        role: Role,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        company: String,
    },
    Logout,
    /// Shows the signed-in user after validating the stored session.
    Whoami,
    /// Navigates to a path through the guard and prints where it lands.
    Open { path: String },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(long, env = "BUILDFORGE_PASSWORD")]
        password: String,
        #[arg(long)]
        password_confirmation: String,
    },
    /// Lists the projects visible to the signed-in user.
    Projects,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    match serde_json::from_value(serde_json::Value::String(raw.to_string())) {
        Ok(Role::Unknown) | Err(_) => Err(format!(
            "unknown role `{}` (expected admin, client, site_engineer or contractor)",
            raw
        )),
        Ok(role) => Ok(role),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the action ran but failed with a message already shown.
async fn run(cli: Cli) -> Result<bool, AppError> {
    if let Some(url) = cli.api_base_url {
        std::env::set_var("API_BASE_URL", url);
    }
    let mut config = Config::from_env()?;
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }

    let storage = Arc::new(FileStore::open(&config.session_file)?);
    info!("using session file {}", storage.path().display());
    let app = App::new(config, storage)?;

    let outcome = execute(&app, cli.command).await;
    for toast in app.toasts().toasts() {
        println!("[{:?}] {}", toast.kind, toast.message);
    }
    app.shutdown();
    outcome
}

/// Turns the session's error or success message into a toast. `false` on error.
fn session_outcome(app: &App) -> bool {
    let session = app.session().snapshot();
    if let Some(message) = session.error {
        app.toasts().error(message, None);
        return false;
    }
    if let Some(message) = session.success_message {
        app.toasts().success(message, None);
    }
    true
}

fn report_navigation(app: &App) -> Result<(), AppError> {
    if let Some(location) = app.process_navigation()? {
        println!("-> {}", location.href());
    }
    Ok(())
}

async fn execute(app: &App, command: Command) -> Result<bool, AppError> {
    match command {
        Command::Login {
            email,
            password,
            remember_me,
        } => {
            let credentials = LoginCredentials {
                email,
                password,
                remember_me: remember_me.then_some(true),
            };
            app.session().login(&credentials).await;
            if !session_outcome(app) {
                return Ok(false);
            }
            report_navigation(app)?;
        }
        Command::Register {
            email,
            password,
            first_name,
            last_name,
            role,
            phone,
            company,
        } => {
            let data = RegisterData {
                email,
                password,
                first_name,
                last_name,
                role,
                phone,
                company,
            };
            app.session().register(&data).await;
            if !session_outcome(app) {
                return Ok(false);
            }
            report_navigation(app)?;
        }
        Command::Logout => {
            app.session().logout();
            app.toasts().info("Signed out", None);
            report_navigation(app)?;
        }
        Command::Whoami => {
            if app.restore_session().await {
                if let Some(user) = app.session().snapshot().user {
                    println!("{} <{}> ({})", user.full_name(), user.email, user.role);
                }
            } else {
                println!("not signed in");
                return Ok(false);
            }
        }
        Command::Open { path } => {
            app.restore_session().await;
            let location = app.navigate(&path)?;
            println!("{}", location.href());
        }
        Command::ForgotPassword { email } => {
            app.session().forgot_password(&email).await;
            return Ok(session_outcome(app));
        }
        Command::VerifyOtp { email, otp } => {
            app.session().verify_otp(&email, &otp).await;
            return Ok(session_outcome(app));
        }
        Command::ResetPassword {
            email,
            otp,
            password,
            password_confirmation,
        } => {
            let data = ResetPasswordData {
                email,
                otp,
                password,
                password_confirmation,
            };
            app.session().reset_password(&data).await;
            if !session_outcome(app) {
                return Ok(false);
            }
            // Let the scheduled redirect to the login view fire.
            let delay = app.config().reset_redirect_delay + Duration::from_millis(50);
            tokio::time::sleep(delay).await;
            report_navigation(app)?;
        }
        Command::Projects => {
            if !app.restore_session().await {
                app.toasts().warning("Not signed in", None);
                return Ok(false);
            }
            let projects = match app.session().user_role() {
                Some(Role::Admin) => app.api().projects().list().await?,
                _ => app.api().projects().mine().await?,
            };
            for project in projects {
                let status = project
                    .status
                    .map(|s| format!("{:?}", s))
                    .unwrap_or_else(|| "-".into());
                println!("{:>6}  {:<12}  {}", project.id, status, project.name);
            }
        }
    }
    Ok(true)
}
