use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pk_tracker_core::{
    detect_milestones, to_molar, DatasetStats, Database, DrugLookup, DrugRecord, MilestoneEvent,
    PkError, PkField, RecordStore, ScoredRecord,
};
use pk_tracker_research::{
    render_prompt, render_request, CommandSink, ImproveOutcome, RecordingSink, ResearchDispatch,
    ResearchError, ResearchSink, Researcher,
};

mod config;
mod error;
mod input;
mod output;

use config::{ConfigLoader, ResolvedConfig};
use error::CliError;

#[derive(Parser)]
#[command(name = "pk-tracker")]
#[command(about = "Track pharmacokinetic dataset completeness and pick what to research next")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./pk-tracker.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show dataset coverage and milestones in band")]
    Status(JsonArgs),
    #[command(about = "Show the record the next research pass would pick")]
    Next(JsonArgs),
    #[command(about = "List research candidates, best first")]
    Queue(QueueArgs),
    #[command(about = "Show one record with its score and missing fields")]
    Show(ShowArgs),
    #[command(about = "Request research on the best candidate or a named record")]
    Research(ResearchArgs),
    #[command(about = "Apply curated PK values to a record")]
    Update(UpdateArgs),
    #[command(about = "List records with no value for a field")]
    Missing(MissingArgs),
    #[command(about = "Insert or merge records from a JSON array")]
    Import(ImportArgs),
    #[command(about = "Report and record newly crossed milestones")]
    Milestones(JsonArgs),
    #[command(about = "Convert mg/L to mol/L")]
    Convert(ConvertArgs),
}

#[derive(Args)]
struct JsonArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct QueueArgs {
    #[arg(long, default_value_t = 10)]
    limit: usize,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ShowArgs {
    /// Drug name or numeric id
    drug: String,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ResearchArgs {
    /// Drug name or numeric id; omit to pick the best candidate
    drug: Option<String>,

    /// Print the prompt and request without sending it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct UpdateArgs {
    /// Drug name or numeric id
    drug: String,

    /// JSON object of column → value
    #[arg(long)]
    file: Option<PathBuf>,

    /// Single assignment, repeatable (`field=null` clears)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,
}

#[derive(Args)]
struct MissingArgs {
    /// Column name, or `cmax` for records lacking oral or IV Cmax
    field: String,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ImportArgs {
    file: PathBuf,
}

#[derive(Args)]
struct ConvertArgs {
    mg_per_l: f64,
    molecular_weight: f64,
}

#[derive(Serialize)]
struct StatusView<'a> {
    stats: &'a DatasetStats,
    milestones: &'a [MilestoneEvent],
}

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        return ExitCode::from(map_exit_code(&err));
    }
    ExitCode::SUCCESS
}

fn map_exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ResearchError>() {
            return match e {
                ResearchError::Store(pk) => pk_exit_code(pk),
                ResearchError::SinkUnavailable(_) => 3,
            };
        }
        if let Some(pk) = cause.downcast_ref::<PkError>() {
            return pk_exit_code(pk);
        }
        if let Some(CliError::MissingResearchCommand) = cause.downcast_ref::<CliError>() {
            return 3;
        }
    }
    1
}

fn pk_exit_code(err: &PkError) -> u8 {
    match err {
        PkError::RecordNotFound(_) => 2,
        PkError::StoreUnavailable(_) => 3,
        PkError::InvalidInput(_) | PkError::Serialization(_) => 1,
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Convert(args) = &cli.command {
        return convert(args);
    }

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    tracing::debug!(
        schema_version = config.schema_version,
        database = %config.database_path.display(),
        "resolved config"
    );

    let db = Database::open(&config.database_path)
        .map_err(PkError::from)
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    match cli.command {
        Commands::Status(args) => status(&db, args.json),
        Commands::Next(args) => next(db, args.json),
        Commands::Queue(args) => queue(db, &args),
        Commands::Show(args) => show(&db, &args),
        Commands::Research(args) => research(db, &config, &args),
        Commands::Update(args) => update(db, &args),
        Commands::Missing(args) => missing(&db, &args),
        Commands::Import(args) => import(&db, &args),
        Commands::Milestones(args) => milestones(db, args.json),
        Commands::Convert(_) => Ok(()),
    }
}

/// Researcher for commands that never send a request.
fn local_researcher(db: Database) -> Researcher<Database, RecordingSink> {
    Researcher::new(db, RecordingSink::new())
}

fn status(db: &Database, json: bool) -> anyhow::Result<()> {
    let stats = DatasetStats::compute(&db.all_drugs()?);
    let milestones = detect_milestones(&stats);

    if json {
        output::print_json(&StatusView {
            stats: &stats,
            milestones: &milestones,
        })?;
    } else {
        print!("{}", output::format_status(&stats, &milestones));
    }
    Ok(())
}

fn next(db: Database, json: bool) -> anyhow::Result<()> {
    let candidate = local_researcher(db).next_candidate()?;
    match (candidate, json) {
        (Some(candidate), true) => output::print_json(&candidate)?,
        (None, true) => output::print_json(&Option::<ScoredRecord>::None)?,
        (Some(candidate), false) => {
            println!("{}", output::format_candidate(&candidate));
            println!("Missing: {}", candidate.missing_fields.join(", "));
        }
        (None, false) => println!("Dataset adequately complete; nothing to research."),
    }
    Ok(())
}

fn queue(db: Database, args: &QueueArgs) -> anyhow::Result<()> {
    let mut queue = local_researcher(db).queue()?;
    queue.truncate(args.limit);

    if args.json {
        output::print_json(&queue)?;
    } else if queue.is_empty() {
        println!("No research candidates.");
    } else {
        print!("{}", output::format_queue(&queue));
    }
    Ok(())
}

fn show(db: &Database, args: &ShowArgs) -> anyhow::Result<()> {
    let lookup = parse_lookup(&args.drug)?;
    let record = find_or_suggest(db, &lookup)?;
    let scored = ScoredRecord::new(record);

    if args.json {
        output::print_json(&scored)?;
    } else {
        print!("{}", output::format_record(&scored));
    }
    Ok(())
}

fn research(db: Database, config: &ResolvedConfig, args: &ResearchArgs) -> anyhow::Result<()> {
    let sink: Box<dyn ResearchSink> = if args.dry_run {
        Box::new(RecordingSink::new())
    } else {
        Box::new(
            CommandSink::from_argv(&config.research_command)
                .ok_or(CliError::MissingResearchCommand)?,
        )
    };

    let researcher = Researcher::new(db, sink);
    let dispatch = match &args.drug {
        Some(drug) => {
            let lookup = parse_lookup(drug)?;
            find_or_suggest(researcher.store(), &lookup)?;
            researcher.research(&lookup)?
        }
        None => match researcher.improve()? {
            ImproveOutcome::Requested(dispatch) => dispatch,
            ImproveOutcome::NothingToDo => {
                println!("Dataset adequately complete; nothing to research.");
                return Ok(());
            }
        },
    };

    print_dispatch(&dispatch, args.dry_run);
    Ok(())
}

fn print_dispatch(dispatch: &ResearchDispatch, dry_run: bool) {
    println!("{}", output::format_candidate(&dispatch.candidate));
    if dry_run {
        println!();
        println!("{}", render_prompt(&dispatch.candidate));
        println!();
        print!("{}", render_request(&dispatch.request));
    } else {
        println!("Research requested ({})", dispatch.request.request_id);
    }
}

fn update(db: Database, args: &UpdateArgs) -> anyhow::Result<()> {
    if args.file.is_none() && args.set.is_empty() {
        return Err(CliError::InvalidArgument("pass --file or at least one --set".into()).into());
    }

    let lookup = parse_lookup(&args.drug)?;
    let record = find_or_suggest(&db, &lookup)?;
    let update = input::build_update(args.file.as_deref(), &args.set)?;

    let outcome = local_researcher(db).apply_update(record.id, update)?;
    print!("{}", output::format_update(&outcome));
    Ok(())
}

/// Which gap `missing` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingFilter {
    Field(PkField),
    /// Oral or IV Cmax absent
    Cmax,
}

impl MissingFilter {
    fn parse(raw: &str) -> Result<Self, CliError> {
        if raw.trim().eq_ignore_ascii_case("cmax") {
            return Ok(MissingFilter::Cmax);
        }
        raw.parse()
            .map(MissingFilter::Field)
            .map_err(CliError::InvalidArgument)
    }

    fn query(self, db: &Database) -> Result<Vec<DrugRecord>, PkError> {
        let drugs = match self {
            MissingFilter::Field(field) => db.drugs_missing(field)?,
            MissingFilter::Cmax => db.drugs_missing_cmax()?,
        };
        Ok(drugs)
    }
}

fn missing(db: &Database, args: &MissingArgs) -> anyhow::Result<()> {
    let drugs = MissingFilter::parse(&args.field)?.query(db)?;

    if args.json {
        output::print_json(&drugs)?;
    } else if drugs.is_empty() {
        println!("No records missing {}.", args.field);
    } else {
        print!("{}", output::format_missing(&drugs));
    }
    Ok(())
}

fn import(db: &Database, args: &ImportArgs) -> anyhow::Result<()> {
    let drugs = input::read_import_file(&args.file)?;
    let summary = db.import_drugs(&drugs).map_err(PkError::from)?;
    println!(
        "Imported {} records ({} new, {} merged)",
        drugs.len(),
        summary.inserted,
        summary.updated
    );
    Ok(())
}

fn milestones(db: Database, json: bool) -> anyhow::Result<()> {
    let report = local_researcher(db).progress_report()?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text());
        if report.new_milestones.is_empty() {
            println!("No new milestones.");
        }
    }
    Ok(())
}

fn convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let molar = to_molar(Some(args.mg_per_l), Some(args.molecular_weight)).ok_or_else(|| {
        CliError::InvalidArgument("concentration and molecular weight must be positive".into())
    })?;
    println!("{:e} mol/L", molar);
    Ok(())
}

fn parse_lookup(raw: &str) -> Result<DrugLookup, CliError> {
    raw.parse().map_err(CliError::InvalidArgument)
}

/// Fetch a record; a failed name lookup lists close matches.
fn find_or_suggest(db: &Database, lookup: &DrugLookup) -> Result<DrugRecord, PkError> {
    if let Some(record) = db.find(lookup)? {
        return Ok(record);
    }

    let mut message = lookup.to_string();
    if let DrugLookup::Name(name) = lookup {
        let suggestions = db.suggest_names(name, 3)?;
        if !suggestions.is_empty() {
            message.push_str(&format!("; did you mean {}?", suggestions.join(", ")));
        }
    }
    Err(PkError::RecordNotFound(message))
}
