mod display;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use gestdoc_ai::config::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use gestdoc_ai::{GenerationConfig, GenerationGateway, analyze};
use gestdoc_core::UserRef;
use gestdoc_engine::{CONTEXTUAL_LIMIT, ChatEngine, EngineSettings, contextual_suggestions};
use gestdoc_store::{DomainSource, DuckStore, seed_demo};
use tracing_subscriber::EnvFilter;

const EXIT_COMMAND: &str = "/salir";

#[derive(Parser)]
#[command(name = "gestdoc", version, about = "Conversational queries over a law office's cases and documents")]
struct Cli {
    /// DuckDB database file.
    #[arg(long, global = true, env = "GESTDOC_DB", default_value = "gestdoc.duckdb")]
    db: PathBuf,

    /// Use a throwaway in-memory database seeded with demo data.
    #[arg(long, global = true)]
    memory: bool,

    #[command(flatten)]
    generation: GenerationArgs,

    /// Prior turns sent with each generated answer (even).
    #[arg(long, global = true, env = "GESTDOC_HISTORY_WINDOW", default_value_t = 6)]
    history_window: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GenerationArgs {
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, global = true, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, global = true, env = "OPENAI_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    #[arg(long, global = true, env = "OPENAI_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,
}

impl From<GenerationArgs> for GenerationConfig {
    fn from(args: GenerationArgs) -> Self {
        Self {
            api_key: args.api_key,
            model: args.model,
            base_url: args.base_url,
            temperature: args.temperature,
            max_tokens: args.max_tokens,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create the database tables.
    Init,
    /// Load the demo dataset (skipped when users already exist).
    Seed,
    /// Ask a single question.
    Ask {
        #[arg(long)]
        user: String,
        /// Continue an existing conversation.
        #[arg(long)]
        conversation: Option<i64>,
        text: String,
    },
    /// Interactive chat on stdin. `/salir` exits.
    Chat {
        #[arg(long)]
        user: String,
        #[arg(long)]
        conversation: Option<i64>,
    },
    /// List a user's active conversations.
    Conversations {
        #[arg(long)]
        user: String,
    },
    /// Print a conversation transcript.
    History {
        #[arg(long)]
        user: String,
        id: i64,
    },
    /// Soft-delete a conversation.
    Forget {
        #[arg(long)]
        user: String,
        id: i64,
    },
    /// Example questions built from the current data.
    Suggest {
        #[arg(long)]
        user: String,
    },
    /// Show how a question is classified, without touching the database.
    Classify { text: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        db = %cli.db.display(),
        memory = cli.memory,
        "gestdoc starting"
    );

    let settings = EngineSettings {
        history_window: cli.history_window,
        ..Default::default()
    };
    settings.validate().context("invalid engine settings")?;

    match &cli.command {
        Command::Classify { text } => {
            display::print_classification(&analyze(text));
            return Ok(());
        }
        Command::Init => {
            let store = open_store(&cli)?;
            store.init_schema().context("creating tables")?;
            println!("Schema ready");
            return Ok(());
        }
        Command::Seed => {
            let store = open_store(&cli)?;
            store.init_schema().context("creating tables")?;
            let summary = seed_demo(&store).context("loading demo data")?;
            display::print_seed_summary(&summary);
            return Ok(());
        }
        _ => {}
    }

    let store = open_store(&cli)?;
    if !store.has_tables() {
        bail!(
            "database {} has no GestDoc tables; run `gestdoc init` and `gestdoc seed` first",
            cli.db.display()
        );
    }
    let gateway = GenerationGateway::openai(cli.generation.into());
    let engine = ChatEngine::new(&store, &store, &gateway, settings);

    match cli.command {
        Command::Ask {
            user,
            conversation,
            text,
        } => {
            let user = resolve_user(&store, &user)?;
            let answer = engine
                .submit_query(&text, conversation, &user)
                .await
                .context("answering question")?;
            display::print_answer(&answer);
        }
        Command::Chat { user, conversation } => {
            let user = resolve_user(&store, &user)?;
            run_chat(&engine, &user, conversation).await?;
        }
        Command::Conversations { user } => {
            let user = resolve_user(&store, &user)?;
            let conversations = engine.conversations(&user)?;
            display::print_conversations(&conversations);
        }
        Command::History { user, id } => {
            let user = resolve_user(&store, &user)?;
            let (conversation, turns) = engine.transcript(id, &user)?;
            display::print_transcript(&conversation, &turns);
        }
        Command::Forget { user, id } => {
            let user = resolve_user(&store, &user)?;
            engine.forget(id, &user)?;
            println!("Conversation {id} deleted");
        }
        Command::Suggest { user } => {
            let user = resolve_user(&store, &user)?;
            let suggestions = contextual_suggestions(&store, &user, CONTEXTUAL_LIMIT);
            display::print_suggestions(&suggestions);
        }
        Command::Init | Command::Seed | Command::Classify { .. } => {}
    }

    Ok(())
}

// ── Helpers ──

fn open_store(cli: &Cli) -> anyhow::Result<DuckStore> {
    if cli.memory {
        let store = DuckStore::open().context("opening in-memory database")?;
        store.init_schema().context("creating tables")?;
        seed_demo(&store).context("loading demo data")?;
        return Ok(store);
    }
    DuckStore::open_persistent(&cli.db)
        .with_context(|| format!("opening database {}", cli.db.display()))
}

fn resolve_user(source: &dyn DomainSource, username: &str) -> anyhow::Result<UserRef> {
    let user = source
        .user_by_username(username)
        .with_context(|| format!("looking up user {username}"))?
        .with_context(|| format!("unknown user {username}"))?;
    if !user.is_active {
        bail!("user {username} is inactive");
    }
    Ok(UserRef::from(&user))
}

async fn run_chat(
    engine: &ChatEngine<'_>,
    user: &UserRef,
    mut conversation: Option<i64>,
) -> anyhow::Result<()> {
    eprintln!("Chat as {} ({EXIT_COMMAND} to quit)", user.username);
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("> ");
        std::io::stderr().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading stdin")?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == EXIT_COMMAND {
            break;
        }
        let answer = engine
            .submit_query(text, conversation, user)
            .await
            .context("answering question")?;
        conversation = Some(answer.conversation_id);
        display::print_answer(&answer);
    }
    Ok(())
}
