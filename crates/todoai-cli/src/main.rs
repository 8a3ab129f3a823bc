use anyhow::Result;
use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use log::LevelFilter;
use todoai_term::Config;

mod commands;

#[derive(Parser, Debug)]
#[clap(name = "todoai", author, version, about = "Manage your tasks by chatting with an assistant")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(
        long = "config-file",
        id = "config-file",
        env = "TODOAI_CONFIG_FILE",
        global = true,
        help = "Path to the config file [default: <config dir>/todoai/config.toml]"
    )]
    config_file: Option<String>,

    #[clap(
        long = "api-url",
        id = "api-url",
        env = "TODOAI_API_URL",
        global = true,
        help = "Base URL of the Todo AI backend [default: http://localhost:8000]"
    )]
    api_url: Option<String>,

    #[clap(
        long = "token-file",
        id = "token-file",
        env = "TODOAI_TOKEN_FILE",
        global = true,
        help = "Where the login token is kept [default: <config dir>/todoai/token.json]"
    )]
    token_file: Option<String>,

    #[clap(
        long = "history-policy",
        id = "history-policy",
        env = "TODOAI_HISTORY_POLICY",
        global = true,
        value_parser = ["reset", "reload"],
        help = "What the chat does with earlier messages each time it opens [default: reset]"
    )]
    history_policy: Option<String>,

    #[clap(
        long = "history-limit",
        id = "history-limit",
        env = "TODOAI_HISTORY_LIMIT",
        global = true,
        help = "How many messages to fetch when the history policy is reload [default: 20]"
    )]
    history_limit: Option<String>,

    #[clap(
        long = "voice-command",
        id = "voice-command",
        env = "TODOAI_VOICE_COMMAND",
        global = true,
        help = "Shell command that listens once and prints the transcript. Voice input is disabled when empty"
    )]
    voice_command: Option<String>,

    #[clap(
        long = "voice-locale",
        id = "voice-locale",
        env = "TODOAI_VOICE_LOCALE",
        global = true,
        help = "Locale handed to the voice command [default: en-US]"
    )]
    voice_locale: Option<String>,

    #[clap(
        long = "request-timeout",
        id = "request-timeout",
        env = "TODOAI_REQUEST_TIMEOUT",
        global = true,
        help = "Per-request timeout in milliseconds [default: 30000]"
    )]
    request_timeout: Option<String>,

    #[clap(long, short, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[clap(long, short)]
        email: String,

        #[clap(long, env = "TODOAI_PASSWORD", hide_env_values = true, help = "Prompted for when omitted")]
        password: Option<String>,
    },
    /// Create an account and log in
    Register {
        #[clap(long, short)]
        email: String,

        #[clap(long, env = "TODOAI_PASSWORD", hide_env_values = true, help = "Prompted for when omitted")]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show where the CLI points and whether you are logged in
    Status,
    /// Work with the task list directly
    Tasks {
        #[clap(subcommand)]
        action: TaskCommands,
    },
    /// Chat with the assistant
    Chat,
    /// Inspect configuration
    Config {
        #[clap(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommands {
    /// List your tasks
    List,
    /// Add a task
    Add {
        title: String,

        #[clap(long, short, default_value = "")]
        description: String,
    },
    /// Change a task's title or description
    Edit {
        id: i64,

        #[clap(long, short)]
        title: Option<String>,

        #[clap(long, short)]
        description: Option<String>,
    },
    /// Flip a task between complete and incomplete
    Toggle { id: i64 },
    /// Delete a task
    Delete {
        id: i64,

        #[clap(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print a config.toml with every default filled in
    Default,
}

fn init_logger(log_level: &str, chat_mode: bool) -> Result<()> {
    let log_level_filter = log_level.parse().unwrap_or(LevelFilter::Warn);

    if chat_mode {
        // Keep the conversation readable.
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("todoai.log")?;

        env_logger::Builder::new()
            .filter_level(log_level_filter)
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .init();
        return Ok(());
    }

    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    init_logger(&cli.log_level, matches!(cli.command, Commands::Chat))?;

    let mut all_matches = vec![&matches];
    if let Some((_, sub_matches)) = matches.subcommand() {
        all_matches.push(sub_matches);
    }
    Config::load(Cli::command(), all_matches).await?;

    match cli.command {
        Commands::Login { email, password } => commands::login(email, password, false).await,
        Commands::Register { email, password } => commands::login(email, password, true).await,
        Commands::Logout => commands::logout().await,
        Commands::Status => commands::status().await,
        Commands::Tasks { action } => match action {
            TaskCommands::List => commands::list_tasks().await,
            TaskCommands::Add { title, description } => {
                commands::add_task(&title, &description).await
            }
            TaskCommands::Edit {
                id,
                title,
                description,
            } => commands::edit_task(id, title, description).await,
            TaskCommands::Toggle { id } => commands::toggle_task(id).await,
            TaskCommands::Delete { id, yes } => commands::delete_task(id, yes).await,
        },
        Commands::Chat => commands::chat().await,
        Commands::Config { action } => match action {
            ConfigCommands::Default => {
                println!("{}", Config::serialize_default(Cli::command()));
                Ok(())
            }
        },
    }
}
