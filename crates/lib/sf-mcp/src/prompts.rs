//! MCP prompt surface: reusable analysis templates served alongside the
//! tools. Prompts only render text; they never call upstream.

use rmcp::ErrorData;
use rmcp::model::{
    ErrorCode,
    GetPromptResult,
    Prompt,
    PromptArgument,
    PromptMessage,
    PromptMessageRole,
};
use serde_json::Value;

use crate::helpers;

pub(crate) const ANALYSE_TELEGRAM_CHANNEL: &str = "analyse_telegram_channel_content";

const ANALYSE_TELEGRAM_CHANNEL_DESCRIPTION: &str = "Analyse a set of Telegram messages from a particular channel and derive the main traits of the channel according to a fixed template.";

const SEARCH_RESULTS_ARG: &str = "search_results";

pub(crate) fn all() -> Vec<Prompt> {
    vec![Prompt::new(
        ANALYSE_TELEGRAM_CHANNEL,
        Some(ANALYSE_TELEGRAM_CHANNEL_DESCRIPTION),
        Some(vec![PromptArgument {
            name: SEARCH_RESULTS_ARG.to_string(),
            title: None,
            description: Some(
                "Search results containing the messages from the Telegram channel".to_string(),
            ),
            required: Some(true),
        }]),
    )]
}

pub(crate) fn get(
    name: &str,
    arguments: Option<&serde_json::Map<String, Value>>,
) -> Result<GetPromptResult, ErrorData> {
    if name != ANALYSE_TELEGRAM_CHANNEL {
        return Err(helpers::mcp_err(
            ErrorCode::INVALID_PARAMS,
            format!("unknown prompt: {name}"),
        ));
    }
    let target = arguments
        .and_then(|args| args.get(SEARCH_RESULTS_ARG))
        .ok_or_else(|| {
            helpers::mcp_err(
                ErrorCode::INVALID_PARAMS,
                format!("{SEARCH_RESULTS_ARG} argument is required"),
            )
        })?;
    // Structured arguments are embedded as their JSON encoding.
    let target = match target {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Ok(GetPromptResult {
        description: Some(ANALYSE_TELEGRAM_CHANNEL_DESCRIPTION.to_string()),
        messages: vec![PromptMessage::new_text(
            PromptMessageRole::User,
            analysis_instructions(&target),
        )],
    })
}

fn analysis_instructions(target: &str) -> String {
    format!(
        "You are provided with a list of Telegram messages from one channel.\n\
         Analyse all messages and describe the main properties of the channel using this template:\n\
         \n\
         **Theme:** ...\n\
         **Style of presentation:** ...\n\
         **Tone:** ...\n\
         **Key topics:** ...\n\
         **Commercial activity:** yes/no\n\
         **About the channel:** ...\n\
         **Political views:** ...\n\
         **Political views reasoning:** ...\n\
         \n\
         Target telegram messages:\n\
         {target}\n"
    )
}
