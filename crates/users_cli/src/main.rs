//! Startup routine and command-line front end for the users store.
//!
//! # Responsibility
//! - Resolve config, start logging, compose `UsersModule`.
//! - Run exactly one repository operation per invocation and print JSON.

use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use users_core::{
    core_version, init_logging, AppConfig, CreateUserArgs, DeleteUserArgs, GetUserArgs,
    GetUsersArgs, RepoResult, SortOrder, StringFilter, UpdateUserArgs, UserCreateInput,
    UserOrderByInput, UserOrderField, UserUpdateInput, UserWhereInput, UserWhereUniqueInput,
    UsersModule,
};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "users", about = "Create, list, read, update and delete user records")]
struct Cli {
    /// SQLite file to use; overrides USERS_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert a user.
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// List users.
    List(ListArgs),
    /// Show one user.
    Get(KeyArgs),
    /// Change fields of one user.
    Update {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        set_email: Option<String>,
        #[arg(long, conflicts_with = "clear_name")]
        set_name: Option<String>,
        #[arg(long)]
        clear_name: bool,
    },
    /// Delete one user and print it.
    Delete(KeyArgs),
    /// Print the core library version.
    Version,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct KeyArgs {
    #[arg(long)]
    id: Option<Uuid>,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    email_contains: Option<String>,
    #[arg(long)]
    name_contains: Option<String>,
    /// Ordering term `field[:asc|desc]`; repeat for secondary terms.
    #[arg(long = "order-by", value_parser = parse_order_term)]
    order_by: Vec<UserOrderByInput>,
    /// Resume after the user with this id.
    #[arg(long)]
    cursor_id: Option<Uuid>,
    #[arg(long)]
    skip: Option<u32>,
    #[arg(long)]
    take: Option<u32>,
}

impl KeyArgs {
    fn into_unique(self) -> Result<UserWhereUniqueInput, String> {
        match (self.id, self.email) {
            (Some(id), None) => Ok(UserWhereUniqueInput::Id(id)),
            (None, Some(email)) => Ok(UserWhereUniqueInput::Email(email)),
            _ => Err("exactly one of --id or --email is required".to_string()),
        }
    }
}

impl ListArgs {
    fn into_args(self) -> GetUsersArgs {
        let filter = UserWhereInput {
            email: self.email_contains.map(StringFilter::Contains),
            name: self.name_contains.map(StringFilter::Contains),
            ..UserWhereInput::default()
        };
        GetUsersArgs {
            cursor: self.cursor_id.map(UserWhereUniqueInput::Id),
            filter: (filter != UserWhereInput::default()).then_some(filter),
            order_by: self.order_by,
            skip: self.skip,
            take: self.take,
        }
    }
}

fn parse_order_term(raw: &str) -> Result<UserOrderByInput, String> {
    let (field, direction) = raw.split_once(':').unwrap_or((raw, "asc"));
    let field = match field.trim() {
        "id" => UserOrderField::Id,
        "email" => UserOrderField::Email,
        "name" => UserOrderField::Name,
        "created_at" => UserOrderField::CreatedAt,
        "updated_at" => UserOrderField::UpdatedAt,
        other => return Err(format!("unknown order field `{other}`")),
    };
    let direction = match direction.trim().to_ascii_lowercase().as_str() {
        "asc" => SortOrder::Asc,
        "desc" => SortOrder::Desc,
        other => return Err(format!("unknown sort direction `{other}`")),
    };
    Ok(UserOrderByInput { field, direction })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("users: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, String> {
    if matches!(cli.command, Command::Version) {
        return Ok(core_version().to_string());
    }

    let mut config = AppConfig::from_env();
    if let Some(path) = cli.db {
        config = config.with_db_path(path);
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok persistent_db={}",
        config.db_path.is_some()
    );
    if config.db_path.is_none() {
        warn!("event=cli_start module=cli status=warn reason=in_memory_db");
        eprintln!("users: no --db or USERS_DB_PATH set; changes are not persisted");
    }

    let module = UsersModule::open(&config).map_err(|err| err.to_string())?;
    let repo = module.users_repository().map_err(|err| err.to_string())?;

    match cli.command {
        Command::Create { email, name } => {
            let data = UserCreateInput { email, name };
            to_json(&repo.create_user(CreateUserArgs { data }))
        }
        Command::List(args) => to_json(&repo.get_users(args.into_args())),
        Command::Get(key) => {
            let filter = key.into_unique()?;
            to_json(&repo.get_user(GetUserArgs { filter }))
        }
        Command::Update {
            key,
            set_email,
            set_name,
            clear_name,
        } => {
            let filter = key.into_unique()?;
            let name = if clear_name {
                Some(None)
            } else {
                set_name.map(Some)
            };
            let data = UserUpdateInput {
                email: set_email,
                name,
            };
            to_json(&repo.update_user(UpdateUserArgs { filter, data }))
        }
        Command::Delete(key) => {
            let filter = key.into_unique()?;
            to_json(&repo.delete_user(DeleteUserArgs { filter }))
        }
        Command::Version => Ok(core_version().to_string()),
    }
}

fn to_json<T: Serialize>(result: &RepoResult<T>) -> Result<String, String> {
    match result {
        Ok(value) => serde_json::to_string_pretty(value).map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    }
}
