pub mod actions;

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AgentName {
    #[default]
    Codex,
    Claude,
}

impl AgentName {
    pub fn label(self) -> &'static str {
        match self {
            AgentName::Codex => "codex",
            AgentName::Claude => "claude",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            AgentName::Codex => AgentName::Claude,
            AgentName::Claude => AgentName::Codex,
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{0} command is not configured")]
    NotConfigured(AgentName),
    #[error("agent command failed: {0}")]
    Spawn(String),
    #[error("agent command failed: {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("agent command failed: {0}")]
    ExitSilent(String),
}

/// Something that can answer a prompt on behalf of an agent.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn ask(&self, agent: AgentName, context: &str, prompt: &str) -> Result<String, AgentError>;
}

/// Runs the configured external program for each agent.
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    codex: Vec<String>,
    claude: Vec<String>,
}

impl CommandInvoker {
    pub fn new(codex: Vec<String>, claude: Vec<String>) -> Self {
        Self { codex, claude }
    }

    fn command_for(&self, agent: AgentName) -> Result<&[String], AgentError> {
        let argv = match agent {
            AgentName::Codex => &self.codex,
            AgentName::Claude => &self.claude,
        };
        if argv.is_empty() {
            return Err(AgentError::NotConfigured(agent));
        }
        Ok(argv)
    }
}

/// Substitute `{prompt}` and `{context}` in the arguments. The flag reports
/// whether any argument changed, in which case stdin is left empty.
fn expand_args(args: &[String], prompt: &str, context: &str) -> (Vec<String>, bool) {
    let mut substituted = false;
    let expanded = args
        .iter()
        .map(|arg| {
            let replaced = arg.replace("{prompt}", prompt).replace("{context}", context);
            if replaced != *arg {
                substituted = true;
            }
            replaced
        })
        .collect();
    (expanded, substituted)
}

#[async_trait]
impl AgentInvoker for CommandInvoker {
    async fn ask(&self, agent: AgentName, context: &str, prompt: &str) -> Result<String, AgentError> {
        let full_prompt = build_prompt(context, prompt);
        let argv = self.command_for(agent)?;
        let (args, substituted) = expand_args(&argv[1..], &full_prompt, context);

        let mut child = Command::new(&argv[0])
            .args(&args)
            .stdin(if substituted { Stdio::null() } else { Stdio::piped() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AgentError::Spawn(format!("{}: {e}", argv[0])))?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A child that exits without reading stdin is not an error here.
                if let Err(e) = stdin.write_all(full_prompt.as_bytes()).await {
                    tracing::debug!(error = %e, "agent stdin write stopped early");
                }
            }
        };
        let (_, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| AgentError::Spawn(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            if stderr.is_empty() {
                return Err(AgentError::ExitSilent(output.status.to_string()));
            }
            return Err(AgentError::Exit {
                status: output.status.to_string(),
                stderr,
            });
        }

        if !stdout.is_empty() {
            Ok(stdout)
        } else if !stderr.is_empty() {
            Ok(stderr)
        } else {
            Ok("(no output)".to_string())
        }
    }
}

const INSTRUCTIONS: &[&str] = &[
    "You are a Trello board assistant. You can perform actions by including <action>{...}</action> blocks in your response.",
    "",
    "Available actions:",
    r#"  <action>{"type":"move_card","card_id":"...","list_id":"..."}</action>"#,
    r#"  <action>{"type":"update_card","card_id":"...","name":"...","desc":"..."}</action>"#,
    r#"  <action>{"type":"add_comment","card_id":"...","text":"..."}</action>"#,
    r#"  <action>{"type":"archive_card","card_id":"..."}</action>"#,
    r#"  <action>{"type":"create_card","list_id":"...","name":"..."}</action>"#,
    r#"  <action>{"type":"create_list","name":"..."}</action>"#,
    r#"  <action>{"type":"archive_list","list_id":"..."}</action>"#,
];

/// The full text handed to the agent: action grammar, board context, request.
pub fn build_prompt(context: &str, user_prompt: &str) -> String {
    let mut lines: Vec<&str> = INSTRUCTIONS.to_vec();
    lines.extend(["", "Board context:", context, "", "User request:", user_prompt]);
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_agent_toggle_and_label() {
        assert_eq!(AgentName::Codex.toggle(), AgentName::Claude);
        assert_eq!(AgentName::Claude.toggle(), AgentName::Codex);
        assert_eq!(AgentName::Claude.to_string(), "claude");
    }

    #[test]
    fn test_build_prompt_sections() {
        let p = build_prompt("Board: X (id: 1)", "tidy up");
        assert!(p.starts_with("You are a Trello board assistant."));
        assert!(p.contains("\nBoard context:\nBoard: X (id: 1)\n"));
        assert!(p.ends_with("User request:\ntidy up"));
        assert!(p.contains(r#""type":"archive_list""#));
    }

    #[test]
    fn test_expand_args_reports_substitution() {
        let (args, sub) = expand_args(&argv(&["-p", "{prompt}"]), "P", "C");
        assert_eq!(args, argv(&["-p", "P"]));
        assert!(sub);

        let (args, sub) = expand_args(&argv(&["--ctx={context}"]), "P", "C");
        assert_eq!(args, argv(&["--ctx=C"]));
        assert!(sub);

        let (_, sub) = expand_args(&argv(&["exec", "-"]), "P", "C");
        assert!(!sub);
    }

    #[tokio::test]
    async fn test_unconfigured_agent() {
        let inv = CommandInvoker::new(argv(&["true"]), vec![]);
        let err = inv.ask(AgentName::Claude, "ctx", "hi").await.unwrap_err();
        assert_eq!(err.to_string(), "claude command is not configured");
    }

    #[tokio::test]
    async fn test_prompt_goes_to_stdin_without_placeholder() {
        let inv = CommandInvoker::new(argv(&["cat"]), vec![]);
        let out = inv.ask(AgentName::Codex, "ctx line", "do it").await.unwrap();
        assert!(out.starts_with("You are a Trello board assistant."));
        assert!(out.ends_with("User request:\ndo it"));
    }

    #[tokio::test]
    async fn test_context_placeholder_in_args() {
        let inv = CommandInvoker::new(argv(&["echo", "{context}"]), vec![]);
        let out = inv.ask(AgentName::Codex, "  just context ", "p").await.unwrap();
        assert_eq!(out, "just context");
    }

    #[tokio::test]
    async fn test_stderr_fallback_and_no_output() {
        let inv = CommandInvoker::new(
            argv(&["sh", "-c", "echo from-stderr >&2"]),
            argv(&["true"]),
        );
        assert_eq!(inv.ask(AgentName::Codex, "", "").await.unwrap(), "from-stderr");
        assert_eq!(inv.ask(AgentName::Claude, "", "").await.unwrap(), "(no output)");
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr() {
        let inv = CommandInvoker::new(argv(&["sh", "-c", "echo boom >&2; exit 3"]), vec![]);
        let err = inv.ask(AgentName::Codex, "", "").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("agent command failed: "), "{msg}");
        assert!(msg.ends_with(": boom"), "{msg}");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let inv = CommandInvoker::new(argv(&["boardhand-no-such-binary"]), vec![]);
        let err = inv.ask(AgentName::Codex, "", "").await.unwrap_err();
        assert!(matches!(err, AgentError::Spawn(_)));
    }
}
