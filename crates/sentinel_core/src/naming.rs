use crate::state::DEMO_FILE_NAME;

/// Derive the editor tab name after the content's extension was re-detected.
///
/// A renamed file keeps its stem and swaps the extension; the untouched demo
/// file becomes `script.<ext>` once the content stops looking like TSX.
pub fn suggest_file_name(current: &str, extension: &str) -> String {
    if current != DEMO_FILE_NAME && !current.ends_with(extension) {
        let stem = current.split('.').next().unwrap_or(current);
        format!("{stem}.{extension}")
    } else if current == DEMO_FILE_NAME && extension != "tsx" {
        format!("script.{extension}")
    } else {
        current.to_string()
    }
}
