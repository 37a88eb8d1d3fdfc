use clap::{Parser as ClapParser, Subcommand};
use docql::{
    Value,
    cli::{self, CliError, CommandOptions},
    output::{to_json, to_json_pretty},
};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "docql")]
#[command(about = "docql - Build document-store queries over polymorphic entity models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Model file describing entity types (JSON)
    #[arg(short, long)]
    model: PathBuf,

    /// Query file describing the entity and filters (JSON)
    #[arg(short, long)]
    query: PathBuf,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generated query text and its bound parameters
    Sql {
        #[command(flatten)]
        args: QueryArgs,
    },

    /// Filter JSON documents with the query
    Run {
        #[command(flatten)]
        args: QueryArgs,

        /// Documents to filter, as a JSON array (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sql { args } => run_sql(args),
        Commands::Run { args, input } => run_documents(args, input),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn options(args: &QueryArgs, input: Option<String>) -> Result<CommandOptions, CliError> {
    Ok(CommandOptions {
        model: fs::read_to_string(&args.model)?,
        query: fs::read_to_string(&args.query)?,
        input,
        pretty: args.pretty,
    })
}

fn print_value(value: &Value, pretty: bool) {
    if pretty {
        println!("{}", to_json_pretty(value));
    } else {
        println!("{}", to_json(value));
    }
}

fn run_sql(args: QueryArgs) -> Result<(), CliError> {
    let options = options(&args, None)?;
    let sql = cli::execute_sql(&options)?;

    println!("{}", sql.query);
    if !sql.parameters.is_empty() {
        print_value(&cli::parameters_value(&sql), options.pretty);
    }
    Ok(())
}

fn run_documents(args: QueryArgs, input: Option<PathBuf>) -> Result<(), CliError> {
    let input = match input {
        Some(path) => Some(fs::read_to_string(path)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = options(&args, input)?;
    let matched = cli::execute_run(&options)?;
    print_value(&Value::Array(matched), options.pretty);
    Ok(())
}
