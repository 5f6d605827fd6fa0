use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use pocket_decoder::client::{HttpPredictionClient, StructureInput, predict_and_decode};
use pocket_decoder::config::{ConfigLoader, ResolvedConfig};
use pocket_decoder::decoder::Decoder;
use pocket_decoder::domain::{DecodedResponse, Method, PocketSelection};
use pocket_decoder::error::PocketError;
use pocket_decoder::export::{default_filename, write_csv};
use pocket_decoder::output::JsonOutput;

#[derive(Parser)]
#[command(name = "pocket-decoder")]
#[command(about = "Predict and decode protein binding pockets (GrASP + P2Rank)")]
#[command(version)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Send a structure to the prediction service and decode the result")]
    Predict(PredictArgs),
    #[command(about = "Decode a saved prediction service response")]
    Decode(DecodeArgs),
}

#[derive(Args)]
struct PredictArgs {
    #[arg(long, conflicts_with = "pdb_file")]
    pdb_id: Option<String>,

    #[arg(long)]
    pdb_file: Option<Utf8PathBuf>,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Args)]
struct DecodeArgs {
    #[arg(long)]
    content_type: String,

    #[arg(long)]
    body: Utf8PathBuf,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Args)]
struct ViewArgs {
    #[arg(long, help = "Write grasp_pockets.csv and p2rank_pockets.csv here")]
    export_dir: Option<Utf8PathBuf>,

    #[arg(long, help = "Print only the pocket map, e.g. \"All Pockets\" or \"Pocket 2\"")]
    pocket: Option<PocketSelection>,

    #[arg(long, value_enum)]
    method: Option<Method>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<PocketError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PocketError) -> u8 {
    match error {
        PocketError::InvalidProteinId(_)
        | PocketError::InvalidInput(_)
        | PocketError::InvalidSelection(_)
        | PocketError::ConfigRead(_)
        | PocketError::ConfigParse(_) => 2,
        PocketError::UpstreamHttp(_)
        | PocketError::UpstreamStatus { .. }
        | PocketError::MissingBoundary
        | PocketError::UnexpectedFormat(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolved = ConfigLoader::resolve(cli.config.as_deref())?;
    let decoder = Decoder::new(resolved.decoder.clone());

    match cli.command {
        Commands::Predict(args) => run_predict(args, &resolved, &decoder),
        Commands::Decode(args) => run_decode(args, &decoder),
    }
}

fn run_predict(args: PredictArgs, config: &ResolvedConfig, decoder: &Decoder) -> miette::Result<()> {
    let input = StructureInput::from_args(
        args.pdb_id.as_deref(),
        args.pdb_file.as_ref().map(|path| path.as_std_path()),
    )?;
    let client = HttpPredictionClient::new(&config.client)?;
    let decoded = predict_and_decode(&client, &input, decoder)?;
    present(&decoded, &args.view)
}

fn run_decode(args: DecodeArgs, decoder: &Decoder) -> miette::Result<()> {
    let body = std::fs::read(args.body.as_std_path())
        .map_err(|err| PocketError::Filesystem(format!("read {}: {err}", args.body)))?;
    let decoded = decoder.decode(&args.content_type, &body)?;
    present(&decoded, &args.view)
}

fn present(decoded: &DecodedResponse, view: &ViewArgs) -> miette::Result<()> {
    if let Some(dir) = &view.export_dir {
        for method in [Method::Grasp, Method::P2rank] {
            let path = dir.join(default_filename(method));
            write_csv(path.as_std_path(), decoded.records(method))?;
        }
    }

    match view.pocket {
        Some(selection) => {
            let Some(method) = view.method.or_else(|| decoded.default_method()) else {
                return Err(miette::Report::msg("no pockets were predicted"));
            };
            JsonOutput::print_pockets(&decoded.pockets(method).select(selection)).into_diagnostic()
        }
        None => JsonOutput::print_decoded(decoded).into_diagnostic(),
    }
}
