/// Interactive input supplied by the host (terminal, web request, test).
///
/// `None` from `input`/`select` and `false` from `confirm` mean the user
/// dismissed the prompt; the running command then aborts without writing.
pub trait Prompter {
    fn input(&mut self, prompt: &str) -> Option<String>;

    /// Pick one of `options`; returns its index.
    fn select(&mut self, prompt: &str, options: &[String]) -> Option<usize>;

    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Dismisses every prompt. Used where nobody can answer, such as web
/// requests and non-terminal runs: commands succeed only if the caller
/// supplied every required value up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn input(&mut self, prompt: &str) -> Option<String> {
        tracing::debug!(prompt, "no prompter available, dismissing input");
        None
    }

    fn select(&mut self, prompt: &str, _options: &[String]) -> Option<usize> {
        tracing::debug!(prompt, "no prompter available, dismissing selection");
        None
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        tracing::debug!(prompt, "no prompter available, declining confirmation");
        false
    }
}

/// Returns the trimmed answer, or `None` when empty.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_prompt_dismisses_everything() {
        let mut p = NoPrompt;
        assert!(p.input("title").is_none());
        assert!(p.select("category", &["Ideas".to_string()]).is_none());
        assert!(!p.confirm("delete?"));
    }

    #[test]
    fn blank_answers_count_as_dismissed() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" x ".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
