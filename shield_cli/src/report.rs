use console::style;

use crate::session::AnalysisResult;

pub fn render_json(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Terminal rendering of the results card. Benign verdicts are green, the
/// other two red.
pub fn render_text(result: &AnalysisResult) -> String {
    let classification = if result.classification.is_benign() {
        style(result.classification.as_str()).green().bold()
    } else {
        style(result.classification.as_str()).red().bold()
    };

    let label_width = result
        .metadata
        .iter()
        .map(|row| row.label.len())
        .max()
        .unwrap_or(0)
        .max("Property".len());

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", style("Analysis Results").bold().underlined()));
    out.push_str(&format!("File Name: {}\n", result.file_name));
    out.push_str(&format!("File Size: {}\n", result.file_size));
    out.push_str(&format!("File Type: {}\n", result.file_type));
    out.push_str(&format!("Preview:   {}\n\n", style(&result.image_preview_url).dim()));

    out.push_str(&format!("{}\n", style("Steganography Assessment").bold()));
    out.push_str(&format!("  Shannon Entropy: {:.2}\n", result.entropy));
    out.push_str(&format!("  Classification:  {classification}\n"));
    out.push_str(&format!("  Explanation:     {}\n\n", result.explanation));

    out.push_str(&format!("{}\n", style("Image Metadata").bold()));
    out.push_str(&format!("  {:<label_width$}  Value\n", "Property"));
    for row in &result.metadata {
        out.push_str(&format!("  {:<label_width$}  {}\n", row.label, row.value));
    }
    out.push_str(&format!(
        "\nAnalyzed at {}\n",
        result.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}
