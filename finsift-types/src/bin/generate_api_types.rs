use finsift_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for the host surface
    let mut types = Vec::new();

    // Document input types
    types.push(clean_type(DocumentInput::export_to_string()?));
    types.push(clean_type(AttachmentMeta::export_to_string()?));

    // Candidate types
    types.push(clean_type(CandidateSource::export_to_string()?));
    types.push(clean_type(FieldCandidate::<String>::export_to_string()?));

    // Classification types
    types.push(clean_type(EmailType::export_to_string()?));
    types.push(clean_type(ClassificationResult::export_to_string()?));

    // Extraction result types
    types.push(clean_type(AmountValue::export_to_string()?));
    types.push(clean_type(StatementRow::export_to_string()?));
    types.push(clean_type(ExtractedFinancialData::export_to_string()?));
    types.push(clean_type(VendorInsights::export_to_string()?));

    // Match types
    types.push(clean_type(DataQuality::export_to_string()?));
    types.push(clean_type(MatchedTransaction::export_to_string()?));
    types.push(clean_type(MatchResult::export_to_string()?));
    types.push(clean_type(MatchFields::export_to_string()?));
    types.push(clean_type(ExceptionDecision::export_to_string()?));

    let output_dir = Path::new("../gui/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let lines: Vec<&str> = type_def.lines().collect();
    let has_import = lines
        .iter()
        .any(|line| line.trim().starts_with("import type"));

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            // Keep import lines only when the declaration actually references
            // another exported type
            if trimmed.starts_with("import type") {
                return has_import;
            }
            !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .cloned()
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
