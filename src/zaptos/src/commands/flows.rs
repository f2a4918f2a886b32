use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Subcommand;
use serde::Deserialize;
use serde_json::{json, Value};
use zaptos_core::{ZaptosError, ZaptosResult};

use super::{read_yaml_file, with_name};
use crate::context::Context;

/// Guards against flows whose buttons loop back forever.
const MAX_SIMULATED_STEPS: usize = 100;

#[derive(Subcommand, Debug)]
pub enum FlowsCommand {
    /// List flows
    List,

    /// Get flow details
    Get { name: String },

    /// Create a flow from a YAML file
    Create {
        /// Flow name, used when the file does not set one
        #[arg(long)]
        name: String,

        /// Flow YAML file
        #[arg(long)]
        file: PathBuf,
    },

    /// Replace a flow from a YAML file
    Update {
        name: String,

        /// Flow YAML file
        #[arg(long)]
        file: PathBuf,
    },

    /// Enable a flow
    Enable { name: String },

    /// Disable a flow
    Disable { name: String },

    /// Test a flow server-side, or walk it locally with --simulate
    Test {
        name: String,

        /// Simulate locally in the terminal
        #[arg(long, default_value_t = false)]
        simulate: bool,
    },
}

pub async fn run(cmd: FlowsCommand, ctx: &Context) -> ZaptosResult<Value> {
    let client = ctx.whatsapp()?;
    match cmd {
        FlowsCommand::List => client.get("/flows", &[]).await,
        FlowsCommand::Get { name } => client.get(&format!("/flows/{name}"), &[]).await,
        FlowsCommand::Create { name, file } => {
            let body = with_name(read_yaml_file(&file)?, &name, false)?;
            client.post("/flows", &body).await
        }
        FlowsCommand::Update { name, file } => {
            let body = read_yaml_file(&file)?;
            client.put(&format!("/flows/{name}"), &body).await
        }
        FlowsCommand::Enable { name } => {
            client.post(&format!("/flows/{name}/enable"), &json!({})).await
        }
        FlowsCommand::Disable { name } => {
            client.post(&format!("/flows/{name}/disable"), &json!({})).await
        }
        FlowsCommand::Test { name, simulate: false } => {
            client.post(&format!("/flows/{name}/test"), &json!({})).await
        }
        FlowsCommand::Test { name, simulate: true } => {
            let flow = client.get(&format!("/flows/{name}"), &[]).await?;
            let stdin = std::io::stdin();
            // The transcript is interactive; stdout keeps the summary document.
            simulate(&flow, &mut stdin.lock(), &mut std::io::stderr().lock())
        }
    }
}

// ---------------------------------------------------------------------------
// Local simulation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Flow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    trigger: Option<Value>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    id: String,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Button {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    next: Option<String>,
}

fn describe(message: Option<&Value>) -> String {
    let Some(message) = message else {
        return "(No message)".into();
    };
    match message.get("type").and_then(Value::as_str) {
        Some("text") => message
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some("buttons") => format!(
            "{} (Buttons)",
            message.get("title").and_then(Value::as_str).unwrap_or_default()
        ),
        Some("carousel") => "Carousel".into(),
        _ => message.to_string(),
    }
}

/// Walk a flow definition from its first step, printing bot messages to `out`
/// and reading button choices from `input`. Returns a summary of the walk.
pub fn simulate<R: BufRead, W: Write>(
    flow: &Value,
    input: &mut R,
    out: &mut W,
) -> ZaptosResult<Value> {
    let flow: Flow = serde_json::from_value(flow.clone())
        .map_err(|e| ZaptosError::Validation(format!("invalid flow definition: {e}")))?;
    let name = flow.name.clone().unwrap_or_default();
    let trigger = flow
        .trigger
        .as_ref()
        .and_then(|t| t.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("none");

    writeln!(out, "--- Simulating Flow: {name} ---")?;
    writeln!(out, "Trigger: {trigger}")?;

    let Some(first) = flow.steps.first() else {
        writeln!(out, "No steps found.")?;
        return Ok(json!({"flow": name, "visited": [], "outcome": "no_steps"}));
    };
    let steps: HashMap<&str, &Step> = flow.steps.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut visited: Vec<String> = Vec::new();
    let mut current = first.id.clone();
    let outcome = loop {
        if visited.len() >= MAX_SIMULATED_STEPS {
            writeln!(out, "--- Step limit reached ---")?;
            break "step_limit";
        }
        let Some(step) = steps.get(current.as_str()) else {
            writeln!(out, "Error: Step {current} not found.")?;
            break "unknown_step";
        };
        visited.push(step.id.clone());

        writeln!(out, "\n[Bot]: {}", describe(step.message.as_ref()))?;

        let kind = step
            .message
            .as_ref()
            .and_then(|m| m.get("type"))
            .and_then(Value::as_str);
        let mut next = step.next.clone();

        match kind {
            Some("buttons") => {
                let buttons: Vec<Button> = step
                    .message
                    .as_ref()
                    .and_then(|m| m.get("buttons"))
                    .map(|b| serde_json::from_value::<Vec<Button>>(b.clone()))
                    .transpose()
                    .map_err(|e| ZaptosError::Validation(format!("invalid buttons in step {}: {e}", step.id)))?
                    .unwrap_or_default();

                writeln!(out, "Options:")?;
                for (i, button) in buttons.iter().enumerate() {
                    let id = button.id.as_deref().unwrap_or("-");
                    writeln!(out, "{}. {} (ID: {id})", i + 1, button.text)?;
                }
                write!(out, "Choose an option [1]: ")?;
                out.flush()?;

                let mut line = String::new();
                input.read_line(&mut line)?;
                let line = line.trim();
                let choice = if line.is_empty() { Ok(1) } else { line.parse::<usize>() };
                match choice {
                    Ok(n) if n >= 1 && n <= buttons.len() => {
                        if let Some(button_next) = &buttons[n - 1].next {
                            next = Some(button_next.clone());
                        }
                    }
                    _ => {
                        writeln!(out, "Invalid choice.")?;
                        break "invalid_choice";
                    }
                }
            }
            Some("carousel") => writeln!(out, "(Carousel displayed)")?,
            _ => {}
        }

        if let Some(action) = &step.action {
            writeln!(out, "[Action]: {action}")?;
        }

        match next {
            Some(id) => current = id,
            None => {
                writeln!(out, "--- End of Flow ---")?;
                break "end";
            }
        }
    };

    Ok(json!({"flow": name, "visited": visited, "outcome": outcome}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn welcome_flow() -> Value {
        let yaml = r#"
name: welcome
trigger:
  type: keyword
steps:
  - id: start
    message:
      type: buttons
      title: How can we help?
      buttons:
        - id: sales
          text: Sales
          next: sales
        - id: support
          text: Support
    next: support
  - id: sales
    message:
      type: text
      text: A sales rep will reach out.
    action: assign_conversation
  - id: support
    message:
      type: text
      text: Describe your issue.
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    fn run_sim(flow: &Value, input: &str) -> (Value, String) {
        let mut out = Vec::new();
        let summary = simulate(flow, &mut Cursor::new(input.as_bytes()), &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_button_next_overrides_step_next() {
        let (summary, transcript) = run_sim(&welcome_flow(), "1\n");
        assert_eq!(summary["visited"], json!(["start", "sales"]));
        assert_eq!(summary["outcome"], "end");
        assert!(transcript.contains("[Bot]: How can we help? (Buttons)"));
        assert!(transcript.contains("1. Sales (ID: sales)"));
        assert!(transcript.contains("[Action]: assign_conversation"));
        assert!(transcript.contains("--- End of Flow ---"));
    }

    #[test]
    fn test_button_without_next_falls_back_to_step_next() {
        let (summary, transcript) = run_sim(&welcome_flow(), "2\n");
        assert_eq!(summary["visited"], json!(["start", "support"]));
        assert!(transcript.contains("[Bot]: Describe your issue."));
    }

    #[test]
    fn test_empty_input_picks_first_option() {
        let (summary, _) = run_sim(&welcome_flow(), "\n");
        assert_eq!(summary["visited"], json!(["start", "sales"]));
    }

    #[test]
    fn test_out_of_range_choice_stops() {
        let (summary, transcript) = run_sim(&welcome_flow(), "7\n");
        assert_eq!(summary["outcome"], "invalid_choice");
        assert!(transcript.contains("Invalid choice."));
    }

    #[test]
    fn test_unknown_step_stops() {
        let flow = json!({
            "name": "broken",
            "steps": [{"id": "a", "message": {"type": "text", "text": "hi"}, "next": "ghost"}]
        });
        let (summary, transcript) = run_sim(&flow, "");
        assert_eq!(summary["visited"], json!(["a"]));
        assert_eq!(summary["outcome"], "unknown_step");
        assert!(transcript.contains("Error: Step ghost not found."));
    }

    #[test]
    fn test_no_steps() {
        let (summary, transcript) = run_sim(&json!({"name": "empty"}), "");
        assert_eq!(summary["outcome"], "no_steps");
        assert!(transcript.contains("No steps found."));
    }

    #[test]
    fn test_looping_flow_hits_step_limit() {
        let flow = json!({
            "steps": [
                {"id": "a", "next": "b"},
                {"id": "b", "message": {"type": "carousel"}, "next": "a"}
            ]
        });
        let (summary, transcript) = run_sim(&flow, "");
        assert_eq!(summary["outcome"], "step_limit");
        assert_eq!(summary["visited"].as_array().unwrap().len(), MAX_SIMULATED_STEPS);
        assert!(transcript.contains("(No message)"));
        assert!(transcript.contains("(Carousel displayed)"));
    }
}
