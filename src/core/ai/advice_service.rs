// Advice built on top of the chat provider chain.
//
// Every public call returns text for the user. Missing providers and remote
// failures become a readable message here instead of an error, so the
// Discord layer never has to handle advice errors itself.

use super::ai_service::{AiError, AiService};
use super::models::{AiConfig, AiMessage};
use crate::core::planning::{columns, SheetRecord};

pub const NOT_CONFIGURED_ADVICE: &str =
    "Add OPENAI_API_KEY or OPENROUTER_API_KEY to .env to get smart advice.";
pub const NOT_CONFIGURED_ANALYSIS: &str =
    "Add OPENAI_API_KEY or OPENROUTER_API_KEY to .env to get an analytical comment.";
pub const NOT_CONFIGURED_CONTINUE: &str =
    "Add OPENAI_API_KEY or OPENROUTER_API_KEY to .env to continue answers.";
pub const NO_TASKS: &str =
    "There are no active tasks right now. Do a short planning session or recover some energy.";
pub const NO_KPI: &str = "There is no KPI data to analyze yet.";
pub const NO_CONTEXT: &str = "Nothing to continue. Run /status again.";

const CONTINUE_INSTRUCTION: &str =
    "Continue exactly where you stopped. Do not repeat what you already said.";

pub struct AdviceService {
    ai: AiService,
}

impl AdviceService {
    pub fn new(ai: AiService) -> Self {
        Self { ai }
    }

    /// Suggests the best first step for the next hour.
    pub async fn summarize_tasks(&self, tasks: &[SheetRecord], effectiveness: &[SheetRecord]) -> String {
        if !self.ai.is_configured() {
            return NOT_CONFIGURED_ADVICE.to_string();
        }
        if tasks.is_empty() {
            return NO_TASKS.to_string();
        }

        let prompt = tasks_prompt(tasks, effectiveness);
        let config = AiConfig {
            temperature: 0.6,
            max_tokens: Some(220),
        };

        match self.ai.chat(&[AiMessage::user(prompt)], &config).await {
            Ok(answer) => answer,
            Err(e) => describe_error("Could not get AI advice", &e),
        }
    }

    /// Short report on the latest KPI row. Returns `(text, prompt)`; the
    /// prompt is kept by the caller so the answer can be continued later.
    pub async fn analyze_kpi(&self, kpi: Option<&SheetRecord>) -> (String, String) {
        if !self.ai.is_configured() {
            return (NOT_CONFIGURED_ANALYSIS.to_string(), String::new());
        }
        let kpi = match kpi {
            Some(kpi) if !kpi.is_empty() => kpi,
            _ => return (NO_KPI.to_string(), String::new()),
        };

        let prompt = kpi_prompt(kpi);
        let config = AiConfig {
            temperature: 0.5,
            max_tokens: Some(250),
        };

        let text = match self.ai.chat(&[AiMessage::user(prompt.clone())], &config).await {
            Ok(answer) => answer,
            Err(e) => describe_error("KPI analysis failed", &e),
        };
        (text, prompt)
    }

    /// Continues a previous analysis without repeating it.
    pub async fn continue_analysis(&self, original_prompt: &str, so_far: &str) -> String {
        if !self.ai.is_configured() {
            return NOT_CONFIGURED_CONTINUE.to_string();
        }
        if original_prompt.trim().is_empty() || so_far.trim().is_empty() {
            return NO_CONTEXT.to_string();
        }

        let messages = [
            AiMessage::user(original_prompt),
            AiMessage::assistant(so_far),
            AiMessage::user(CONTINUE_INSTRUCTION),
        ];
        let config = AiConfig {
            temperature: 0.5,
            max_tokens: Some(220),
        };

        match self.ai.chat(&messages, &config).await {
            Ok(answer) => answer,
            Err(e) => describe_error("Could not continue", &e),
        }
    }
}

fn describe_error(prefix: &str, error: &AiError) -> String {
    format!("{}: {}", prefix, error)
}

fn or_placeholder(value: &str, placeholder: &'static str) -> String {
    let value = value.trim();
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn tasks_prompt(tasks: &[SheetRecord], effectiveness: &[SheetRecord]) -> String {
    let task_lines: Vec<String> = tasks
        .iter()
        .map(|t| {
            format!(
                "- {}: {} (deadline {}, progress {}%)",
                or_placeholder(t.get(columns::CATEGORY), "?"),
                or_placeholder(t.get(columns::TASK), "?"),
                or_placeholder(t.get(columns::DEADLINE), "none"),
                or_placeholder(t.get(columns::PROGRESS), "0"),
            )
        })
        .collect();

    let mut prompt = String::from(
        "Context: I run a bar. Analyze the tasks below and suggest the best first step for the next hour. \
         Take into account deadlines, effect on revenue and peak-date sales, progress, and how easy it is to start. \
         Give 1-2 concrete actions.\n\n",
    );
    prompt.push_str(&task_lines.join("\n"));

    let effect_lines: Vec<String> = effectiveness
        .iter()
        .filter(|e| !e.get(columns::DIRECTION).trim().is_empty())
        .map(|e| {
            format!(
                "- {}: {}",
                e.get(columns::DIRECTION).trim(),
                or_placeholder(e.get(columns::UPLIFT), "?")
            )
        })
        .collect();
    if !effect_lines.is_empty() {
        prompt.push_str("\n\nExpected uplift by direction:\n");
        prompt.push_str(&effect_lines.join("\n"));
    }

    prompt
}

fn kpi_prompt(kpi: &SheetRecord) -> String {
    format!(
        "You are a bar manager's assistant. Give a short report: what is going well, what is at risk, what to focus on today.\n\
         KPI: revenue plan {}, actual {}, average check {}, peak dates sold {}.\n\
         Answer structure: 1) What is good 2) Risks 3) Concrete steps for today. Be concise.",
        or_placeholder(kpi.get(columns::REVENUE_PLAN), "?"),
        or_placeholder(kpi.get(columns::REVENUE_FACT), "?"),
        or_placeholder(kpi.get(columns::AVERAGE_CHECK), "?"),
        or_placeholder(kpi.get(columns::PEAK_DATES_SOLD), "?"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::ai_service::tests::ScriptedProvider;
    use crate::core::ai::AiProvider;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn advice_with(providers: Vec<Box<dyn AiProvider>>) -> AdviceService {
        AdviceService::new(AiService::new(providers))
    }

    fn kpi() -> SheetRecord {
        SheetRecord::default()
            .with(columns::REVENUE_PLAN, "1000000")
            .with(columns::REVENUE_FACT, "640000")
    }

    fn task(name: &str) -> SheetRecord {
        SheetRecord::default()
            .with(columns::TASK, name)
            .with(columns::CATEGORY, "Ops")
    }

    #[tokio::test]
    async fn test_unconfigured_messages() {
        let advice = advice_with(vec![]);
        assert_eq!(
            advice.summarize_tasks(&[task("a")], &[]).await,
            NOT_CONFIGURED_ADVICE
        );
        assert_eq!(
            advice.analyze_kpi(Some(&kpi())).await,
            (NOT_CONFIGURED_ANALYSIS.to_string(), String::new())
        );
        assert_eq!(
            advice.continue_analysis("p", "s").await,
            NOT_CONFIGURED_CONTINUE
        );
    }

    #[tokio::test]
    async fn test_empty_inputs_skip_the_provider() {
        let provider = ScriptedProvider::new("openai", Ok("never"));
        let calls = Arc::clone(&provider.calls);
        let advice = advice_with(vec![Box::new(provider)]);

        assert_eq!(advice.summarize_tasks(&[], &[]).await, NO_TASKS);
        assert_eq!(advice.analyze_kpi(None).await.0, NO_KPI);
        assert_eq!(
            advice.analyze_kpi(Some(&SheetRecord::default())).await.0,
            NO_KPI
        );
        assert_eq!(advice.continue_analysis("", "so far").await, NO_CONTEXT);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_kpi_returns_prompt() {
        let advice = advice_with(vec![Box::new(ScriptedProvider::new("openai", Ok("All good.")))]);
        let (text, prompt) = advice.analyze_kpi(Some(&kpi())).await;

        assert_eq!(text, "All good.");
        assert!(prompt.contains("revenue plan 1000000, actual 640000"));
        assert!(prompt.contains("average check ?"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_described() {
        let advice = advice_with(vec![Box::new(ScriptedProvider::new("openai", Err("timeout")))]);
        let (text, prompt) = advice.analyze_kpi(Some(&kpi())).await;

        assert_eq!(text, "KPI analysis failed: openai: timeout");
        assert!(!prompt.is_empty());
        assert_eq!(
            advice.summarize_tasks(&[task("a")], &[]).await,
            "Could not get AI advice: openai: timeout"
        );
    }

    #[tokio::test]
    async fn test_continue_sends_history() {
        let provider = ScriptedProvider::new("openai", Ok("More steps."));
        let seen = Arc::clone(&provider.seen);
        let advice = advice_with(vec![Box::new(provider)]);

        let text = advice.continue_analysis("prompt", "first part").await;
        assert_eq!(text, "More steps.");

        let seen = seen.lock().unwrap();
        let roles: Vec<&str> = seen[0].iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
        assert_eq!(seen[0][1].content, "first part");
    }

    #[test]
    fn test_tasks_prompt_lists_tasks_and_uplift() {
        let tasks = vec![task("Order kegs").with(columns::DEADLINE, "2026-10-20")];
        let eff = vec![SheetRecord::default()
            .with(columns::DIRECTION, "Ops")
            .with(columns::UPLIFT, "+15%")];

        let prompt = tasks_prompt(&tasks, &eff);
        assert!(prompt.contains("- Ops: Order kegs (deadline 2026-10-20, progress 0%)"));
        assert!(prompt.contains("- Ops: +15%"));
    }
}
