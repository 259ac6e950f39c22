//! User-facing message text.

use grab_models::{WriteMode, WriteTarget};

pub const SAVED_PREFIX: &str = "Article saved! You can find it posted at: ";
pub const APPENDED_PREFIX: &str = "Article updated! You can find it at: ";
pub const CONFIRMED_PREFIX: &str = "Article updated! You can find it posted at: ";
pub const CANCELLED: &str = "Grab request cancelled.";
pub const SUMMARIZE_UNAVAILABLE: &str =
    "Summarization isn't available yet. Run the command without `summarize` or `-s` to save the whole thread.";

/// Reply after a direct write.
pub fn published(target: &WriteTarget, url: &str) -> String {
    match target.mode {
        WriteMode::Append => format!("{}{}", APPENDED_PREFIX, url),
        WriteMode::Replace => format!("{}{}", SAVED_PREFIX, url),
    }
}

/// In-place edit after a confirmed overwrite.
pub fn confirmed(url: &str) -> String {
    format!("{}{}", CONFIRMED_PREFIX, url)
}

/// Warning shown above the CONFIRM and CANCEL buttons.
pub fn overwrite_warning(existing_url: &str, target: &WriteTarget) -> String {
    match &target.section {
        Some(section) => format!(
            "The section \"{}\" of this wiki article already exists! ({}) Are you sure you want to *OVERWRITE IT?*",
            section, existing_url
        ),
        None => format!(
            "A wiki article with this title already exists! ({}) Are you sure you want to *COMPLETELY OVERWRITE IT?*",
            existing_url
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_wording_follows_mode() {
        let url = "https://wiki/Hi";
        assert_eq!(
            published(&WriteTarget::page("Hi"), url),
            "Article saved! You can find it posted at: https://wiki/Hi"
        );
        assert_eq!(
            published(&WriteTarget::page("Hi").appending(), url),
            "Article updated! You can find it at: https://wiki/Hi"
        );
    }

    #[test]
    fn test_overwrite_warning() {
        let warning = overwrite_warning("https://wiki/Hi", &WriteTarget::page("Hi"));
        assert_eq!(
            warning,
            "A wiki article with this title already exists! (https://wiki/Hi) Are you sure you want to *COMPLETELY OVERWRITE IT?*"
        );
        let warning = overwrite_warning("https://wiki/Hi", &WriteTarget::section("Hi", "Notes"));
        assert!(warning.contains("\"Notes\""));
    }
}
