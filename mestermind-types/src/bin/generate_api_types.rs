use mestermind_types::{generate_typescript_definitions, API_TYPES};
use std::fs;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("web/api-types"));
    fs::create_dir_all(&output_dir)?;

    let output = generate_typescript_definitions(API_TYPES)?;
    let output_path = output_dir.join("types.ts");
    fs::write(&output_path, format!("{output}\n"))?;

    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}
