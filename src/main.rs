// prescription-pdf: Render pharmacy prescriptions as printable PDF documents

mod backend;
mod error;
mod layout;
mod model;

use clap::Parser;
use uuid::Uuid;

use backend::PdfBackend;
use error::AppError;
use layout::render_document;
use model::{format_date_display, id_suffix, Medicine, Prescription};

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Render pharmacy prescriptions as printable PDF documents")]
struct Args {
    /// Prescription file (JSON)
    #[arg(short, long)]
    prescription: String,

    /// Medicine catalog file (JSON array). Without it every medicine renders
    /// through the unknown-medicine fallback.
    #[arg(short, long)]
    catalog: Option<String>,

    /// Output filename (defaults to prescription-{id suffix}.pdf)
    #[arg(short, long)]
    output: Option<String>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    let mut prescription = load_prescription(&args.prescription)?;
    if prescription.id.is_empty() {
        prescription.id = generate_short_id();
    }

    let catalog = load_catalog(&args.catalog)?;
    let resolved = prescription.resolve(&catalog);

    // Determine output filename
    let output_file = args
        .output
        .unwrap_or_else(|| format!("prescription-{}.pdf", id_suffix(&resolved.id).to_lowercase()));

    // Render and save
    let pdf_backend = PdfBackend::new("Medical Prescription")?;
    let artifact = render_document(&resolved, pdf_backend)?;
    std::fs::write(&output_file, &artifact)?;

    println!("✓ Generated: {}", output_file);
    println!("  Date: {}", format_date_display(&resolved.created_at));
    println!("  Prescription ID: {}", resolved.id);
    println!("  Medicines: {}", resolved.entries.len());

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn generate_short_id() -> String {
    let uuid = Uuid::new_v4();
    let hex = format!("{:x}", uuid);
    hex[..8].to_uppercase()
}

fn load_prescription(path: &str) -> Result<Prescription, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::PrescriptionError(format!("{}: {}", path, e)))?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::PrescriptionError(format!("Invalid JSON: {}", e)))
}

fn load_catalog(path: &Option<String>) -> Result<Vec<Medicine>, AppError> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .map_err(|e| AppError::CatalogError(format!("{}: {}", p, e)))?;
            serde_json::from_str(&content)
                .map_err(|e| AppError::CatalogError(format!("Invalid JSON: {}", e)))
        }
        None => Ok(Vec::new()),
    }
}
