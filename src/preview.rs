use crate::models::{Preview, PreviewRow, UploadedFile};

/// Extensions that get a structured preview.
pub const DELIMITED_EXTENSIONS: &[&str] = &["csv"];

pub const PLACEHOLDER_HEADER: &str = "Info";
pub const PLACEHOLDER_MESSAGE: &str = "📂 Preview available for CSV files only.";

/// Build the preview for an uploaded file. Never fails: files that are not
/// delimited text, or cannot be decoded, get a single placeholder row.
pub fn build_preview(file: &UploadedFile) -> Preview {
    let recognized = file
        .extension()
        .map(|ext| DELIMITED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);

    if !recognized {
        tracing::debug!(file = %file.name, "no structured preview for this format");
        return vec![placeholder_row()];
    }

    match std::str::from_utf8(&file.bytes) {
        Ok(text) => parse_delimited(text),
        Err(e) => {
            tracing::warn!(file = %file.name, error = %e, "preview decode failed");
            vec![placeholder_row()]
        }
    }
}

/// Parse comma-delimited text into rows keyed by the header line.
///
/// The header is the first non-blank line. Lines whose cells are all blank
/// are dropped. Short lines leave trailing headers as `None`; surplus cells
/// are ignored.
pub fn parse_delimited(text: &str) -> Preview {
    let mut lines = text.split('\n').skip_while(|line| line.trim().is_empty());

    let headers: Vec<String> = match lines.next() {
        Some(line) => line.split(',').map(|h| h.trim().to_string()).collect(),
        None => return Vec::new(),
    };

    lines
        .filter_map(|line| {
            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            if cells.iter().all(|c| c.is_empty()) {
                return None;
            }

            let mut row = PreviewRow::default();
            for (i, header) in headers.iter().enumerate() {
                row.insert(header.clone(), cells.get(i).map(|c| c.to_string()));
            }
            Some(row)
        })
        .collect()
}

fn placeholder_row() -> PreviewRow {
    PreviewRow {
        cells: vec![(
            PLACEHOLDER_HEADER.to_string(),
            Some(PLACEHOLDER_MESSAGE.to_string()),
        )],
    }
}
