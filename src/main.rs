use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use delivery_note::generate;
use delivery_note::model::CustomerInfo;
use delivery_note::template::DeliveryNoteTemplate;
use delivery_note::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
            _ => {
                eprintln!("{error}");
                return ExitCode::FAILURE;
            }
        },
    };

    if let Err(error) = init_logging() {
        eprintln!("warning: {error}");
    }

    match run(&cli) {
        Ok(output) => {
            println!("✅ Successfully created '{}'", output.display());
            ExitCode::SUCCESS
        }
        Err(ToolError::ProductionFileNotFound(_)) => {
            eprintln!("❌ Error: 生产单 not found in folder");
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("❌ PROCESSING ERROR: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let template = match &cli.template {
        Some(path) => DeliveryNoteTemplate::from_json_file(path)?,
        None => DeliveryNoteTemplate::default(),
    };
    generate::generate_delivery_note(&cli.folder, &cli.customer_info(), &template)
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    name = "generate_delivery_note",
    author,
    version,
    about = "Render a delivery note from the production order in a folder."
)]
struct Cli {
    /// Folder holding the production order and the item pictures.
    folder: PathBuf,

    /// Customer name shown in the header.
    customer: Option<String>,

    /// Contact person shown in the header.
    contact: Option<String>,

    /// Customer material number.
    material: Option<String>,

    /// Name of the person preparing the note.
    prepared_by: Option<String>,

    /// Optional JSON file overriding the visual template.
    #[arg(long)]
    template: Option<PathBuf>,
}

impl Cli {
    fn customer_info(&self) -> CustomerInfo {
        CustomerInfo {
            customer_name: self.customer.clone().unwrap_or_default(),
            contact_person: self.contact.clone().unwrap_or_default(),
            material_number: self.material.clone().filter(|value| !value.is_empty()),
            prepared_by: self.prepared_by.clone().unwrap_or_default(),
        }
    }
}
