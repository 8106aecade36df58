use crate::editor::{EditorSurface, VirtualEditor};

pub const UNKNOWN_PROBLEM: &str = "Unknown problem";
pub const UNKNOWN_LANGUAGE: &str = "Unknown language";

/// Read-only view of the coding-practice page the assistant is attached to.
pub trait HostPage: Send + Sync {
    fn problem_statement(&self) -> Option<String>;
    fn language_label(&self) -> Option<String>;
    fn editor(&self) -> Option<&dyn EditorSurface>;
}

/// Source of the backend credential, read before every request.
pub trait CredentialStore: Send + Sync {
    fn get_credential(&self) -> Option<String>;
}

/// Context gathered from the page for one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub problem_statement: String,
    pub language: String,
}

impl PageContext {
    pub fn read(page: &dyn HostPage) -> Self {
        Self {
            problem_statement: non_blank(page.problem_statement())
                .unwrap_or_else(|| UNKNOWN_PROBLEM.to_string()),
            language: non_blank(page.language_label())
                .map(|label| label.trim().to_string())
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A page assembled from local files, used by the command-line host.
#[derive(Debug)]
pub struct StaticPage {
    pub problem_statement: Option<String>,
    pub language: Option<String>,
    pub editor: Option<VirtualEditor>,
}

impl HostPage for StaticPage {
    fn problem_statement(&self) -> Option<String> {
        self.problem_statement.clone()
    }

    fn language_label(&self) -> Option<String> {
        self.language.clone()
    }

    fn editor(&self) -> Option<&dyn EditorSurface> {
        self.editor.as_ref().map(|editor| editor as &dyn EditorSurface)
    }
}

impl CredentialStore for Option<String> {
    fn get_credential(&self) -> Option<String> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_page_fields_use_placeholders() {
        let page = StaticPage {
            problem_statement: None,
            language: Some("  ".into()),
            editor: None,
        };
        let ctx = PageContext::read(&page);
        assert_eq!(ctx.problem_statement, UNKNOWN_PROBLEM);
        assert_eq!(ctx.language, UNKNOWN_LANGUAGE);
    }

    #[test]
    fn language_label_is_trimmed() {
        let page = StaticPage {
            problem_statement: Some("Two Sum".into()),
            language: Some(" Rust\n".into()),
            editor: None,
        };
        let ctx = PageContext::read(&page);
        assert_eq!(ctx.language, "Rust");
        assert_eq!(ctx.problem_statement, "Two Sum");
    }
}
