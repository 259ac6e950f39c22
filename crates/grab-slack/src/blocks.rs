//! Block Kit rendering for ephemeral replies.

use grab_core::{Notice, CANCEL_ACTION_ID, CONFIRM_ACTION_ID};
use serde_json::{json, Value};

/// Blocks for a notice, or `None` for plain text.
pub fn notice_blocks(notice: &Notice) -> Option<Value> {
    match notice {
        Notice::Text(_) => None,
        Notice::ConfirmOverwrite { warning, prompt_id } => {
            Some(confirm_overwrite(warning, prompt_id))
        }
    }
}

/// Warning section followed by CONFIRM (danger) and CANCEL buttons.
///
/// Both buttons carry `prompt_id` as their value so a click resolves the
/// prompt it was made on.
pub fn confirm_overwrite(warning: &str, prompt_id: &str) -> Value {
    json!([
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": warning }
        },
        {
            "type": "actions",
            "elements": [
                button(CONFIRM_ACTION_ID, "CONFIRM", prompt_id, Some("danger")),
                button(CANCEL_ACTION_ID, "CANCEL", prompt_id, None),
            ]
        }
    ])
}

fn button(action_id: &str, label: &str, value: &str, style: Option<&str>) -> Value {
    let mut button = json!({
        "type": "button",
        "action_id": action_id,
        "text": { "type": "plain_text", "text": label },
        "value": value,
    });
    if let Some(style) = style {
        button["style"] = json!(style);
    }
    button
}
