use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use report_assembler::commands::{
    fill_command, generate_command, init_command, prompt_command, status_command, FillSource,
    GenerateOptions, ReportInputs,
};
use report_core::config::OutputFormat;

/// Chart-analysis report assembler.
///
/// This CLI is a thin wrapper around `report-core` (exposed in code as `report_core`).
/// It renders a report skeleton with metric data, merges analysis fills, and
/// exports the document.
#[derive(Parser, Debug)]
#[command(
    name = "report-assembler",
    version,
    about = "Assemble chart-analysis reports from a skeleton and metric data",
    long_about = None
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `REPORT_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Files every rendering command reads.
#[derive(Args, Debug)]
struct InputArgs {
    /// Metrics file (YAML or JSON).
    #[arg(long)]
    input: String,

    /// Report skeleton file (YAML or JSON).
    #[arg(long)]
    template: String,

    /// Optional report config (YAML or JSON).
    #[arg(long)]
    config: Option<String>,
}

impl InputArgs {
    fn into_inputs(self, fills: Option<String>) -> ReportInputs {
        ReportInputs::new(self.input, self.template).with_config(self.config).with_fills(fills)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Markdown,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the report, apply fills, and export it.
    Generate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Destination file; replaced atomically.
        #[arg(long)]
        out: String,

        /// Refuse to export while any placeholder is pending.
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Fills file with analysis texts keyed by placeholder id.
        #[arg(long)]
        fills: Option<String>,

        /// Output format (overrides the config).
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Fixed generation time (RFC 3339) for reproducible output.
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Show which placeholders are filled and which are pending.
    Status {
        #[command(flatten)]
        inputs: InputArgs,

        /// Fills file with analysis texts keyed by placeholder id.
        #[arg(long)]
        fills: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Exit non-zero while any placeholder is pending.
        #[arg(long, default_value_t = false)]
        check: bool,
    },

    /// Print the rendered prompt of one placeholder.
    Prompt {
        #[command(flatten)]
        inputs: InputArgs,

        /// Placeholder id (chart id or chapter conclusion id).
        #[arg(long)]
        id: String,
    },

    /// Record analysis text for one placeholder in a fills file.
    Fill {
        #[command(flatten)]
        inputs: InputArgs,

        /// Fills file to update (created if missing).
        #[arg(long)]
        fills: String,

        /// Placeholder id (chart id or chapter conclusion id).
        #[arg(long)]
        id: String,

        /// Analysis text.
        #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
        text: Option<String>,

        /// File containing the analysis text.
        #[arg(long)]
        text_file: Option<String>,
    },

    /// Scaffold a starter report project.
    ///
    /// This will create `report.yaml`, `templates/skeleton.yaml`,
    /// `data/metrics.yaml`, `fills/fills.yaml`, and the `out/` and `figs/`
    /// directories. Existing files are kept unless `--force` is given.
    Init {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Overwrite existing starter files.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(env_logger::Env::default().filter_or("REPORT_LOG", default))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Generate { inputs, out, strict, fills, format, timestamp } => {
            let opts = GenerateOptions { out, strict, format: format.map(Into::into), timestamp };
            generate_command(&inputs.into_inputs(fills), &opts)?
        }
        Command::Status { inputs, fills, json, check } => {
            status_command(&inputs.into_inputs(fills), json, check)?
        }
        Command::Prompt { inputs, id } => prompt_command(&inputs.into_inputs(None), &id)?,
        Command::Fill { inputs, fills, id, text, text_file } => {
            let source = match (text, text_file) {
                (Some(text), _) => FillSource::Text(text),
                (None, Some(path)) => FillSource::File(path),
                (None, None) => anyhow::bail!("Either --text or --text-file is required"),
            };
            fill_command(&inputs.into_inputs(None), &fills, &id, &source)?
        }
        Command::Init { root, force } => init_command(&root, force)?,
    }

    Ok(())
}
