//! Grounding instruction sent ahead of every user message.
//!
//! The layout is fixed: preamble, guidelines naming the language, the
//! problem statement, then the user's current solution when there is one.
//! Nothing is escaped or truncated.

pub const SOLUTION_LABEL: &str = "User's Current Solution:";

const PREAMBLE: &str =
    "You are an AI assistant helping users solve LeetCode problems step by step.";

/// Build the instruction block for one user turn.
pub fn compose(problem_statement: &str, language: &str, editor_content: Option<&str>) -> String {
    let solution_section = match editor_content {
        Some(content) if !content.is_empty() => format!("{SOLUTION_LABEL}\n{content}"),
        _ => String::new(),
    };

    format!(
        "
{PREAMBLE}

Guidelines:
- Provide hints gradually instead of giving full solutions immediately.
- Help the user understand the problem clearly before suggesting approaches.
- Adapt your guidance to the user's preferred language: {language}.
- If a partial solution is provided, review it and give constructive hints.

Problem Statement:
{problem_statement}

{solution_section}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn layout_is_stable() {
        let prompt = compose("Reverse a list.", "Rust", Some("fn rev() {}"));
        let expected = "\nYou are an AI assistant helping users solve LeetCode problems step by step.\n\n\
Guidelines:\n\
- Provide hints gradually instead of giving full solutions immediately.\n\
- Help the user understand the problem clearly before suggesting approaches.\n\
- Adapt your guidance to the user's preferred language: Rust.\n\
- If a partial solution is provided, review it and give constructive hints.\n\n\
Problem Statement:\nReverse a list.\n\n\
User's Current Solution:\nfn rev() {}\n";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn solution_section_only_when_present() {
        for content in [None, Some("")] {
            let prompt = compose("P", "Go", content);
            assert!(!prompt.contains(SOLUTION_LABEL));
            assert!(prompt.ends_with("Problem Statement:\nP\n\n\n"));
        }
    }

    #[test]
    fn solution_follows_problem_exactly_once() {
        let prompt = compose("Find the max.", "C++", Some("int main() {\n  return 0;\n}"));
        assert_eq!(prompt.matches(SOLUTION_LABEL).count(), 1);
        let problem_at = prompt.find("Find the max.").unwrap();
        let solution_at = prompt.find(SOLUTION_LABEL).unwrap();
        assert!(problem_at < solution_at);
        assert!(prompt.contains("User's Current Solution:\nint main() {\n  return 0;\n}\n"));
    }
}
