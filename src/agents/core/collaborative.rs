//! Collaborative agent execution
//!
//! A collaborative agent loops over the shared message channel: collect
//! inbound messages, prompt the model with the accumulated exchange, route
//! whatever directives the response carries, and stop on `<DONE/>`.

use std::time::Duration;

use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::Runner;
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::memory::channel::{
    ChannelMessage, Inbox, MessageChannel, TryRecvError,
};
use crate::agents::protocol::{
    contains_done_signal, extract_final_output, parse_outgoing_messages, strip_message_tags,
};
use crate::config::AgentSpec;

/// Turn cap when neither the agent nor the workflow sets one. High on
/// purpose: agents are expected to stop via `<DONE/>`, not the cap.
pub const DEFAULT_MAX_TURNS: u32 = 100;

/// How long a turn waits for at least one inbound message
const COLLECT_WINDOW: Duration = Duration::from_millis(500);
/// Poll interval while the inbox is empty
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Yield between turns so peers get a chance to run
const TURN_YIELD: Duration = Duration::from_millis(50);

/// Previous responses are truncated to this many characters in prompts
const RESPONSE_PREVIEW_LEN: usize = 500;

impl Runner {
    /// Run an agent in collaborative mode against a shared channel.
    ///
    /// The agent's turn cap is its own `max_turns` when set, otherwise
    /// `global_max_turns`, otherwise [`DEFAULT_MAX_TURNS`]. The agent is
    /// always unsubscribed from the channel on exit, and its final output is
    /// published under each of its `outputs` keys in shared memory.
    pub async fn run_collaborative(
        &self,
        agent: &AgentSpec,
        channel: &MessageChannel,
        global_max_turns: u32,
    ) -> AgentResult<String> {
        let max_turns = effective_max_turns(agent.max_turns, global_max_turns);
        let inbox = channel.subscribe(&agent.id).await;

        info!(agent = %agent.id, max_turns, "Starting collaborative agent");

        let mut conversation: Vec<String> = Vec::new();
        let result = self
            .collaborative_turns(agent, channel, &inbox, max_turns, &mut conversation)
            .await;

        channel.unsubscribe(&agent.id).await;
        result?;

        let final_output = extract_final_output(&conversation);

        for key in &agent.outputs {
            self.shared_memory()
                .set(key, Value::String(final_output.clone()))
                .await;
            debug!(agent = %agent.id, key = %key, "Published output to shared memory");
        }

        Ok(final_output)
    }

    async fn collaborative_turns(
        &self,
        agent: &AgentSpec,
        channel: &MessageChannel,
        inbox: &Inbox,
        max_turns: u32,
        conversation: &mut Vec<String>,
    ) -> AgentResult<()> {
        let client = self.client_for(agent)?;
        let mut received: Vec<ChannelMessage> = Vec::new();

        for turn in 0..max_turns {
            // 1. Collect new messages, bounded wait
            let (new_messages, inbox_closed) = collect_messages(inbox, &agent.listens_to).await;
            for msg in &new_messages {
                debug!(agent = %agent.id, from = %msg.from, "Received message");
            }
            received.extend(new_messages);

            if inbox_closed {
                // The run is ending; exit the loop.
                debug!(agent = %agent.id, "Inbox closed, stopping");
                break;
            }

            // 2. Compose the turn prompt
            let prompt = self
                .build_collaborative_prompt(agent, &received, conversation, turn)
                .await;

            // 3. Generate
            debug!(agent = %agent.id, turn = turn + 1, max_turns, "Generating response");
            let response =
                client
                    .generate(&prompt)
                    .await
                    .map_err(|source| AgentError::Turn {
                        agent: agent.id.clone(),
                        turn: turn + 1,
                        source,
                    })?;
            conversation.push(response.clone());

            // 4. Route outgoing directives
            let mut channel_closed = false;
            for msg in parse_outgoing_messages(&response) {
                if msg.to == "*" && !agent.can_broadcast {
                    warn!(agent = %agent.id, "Broadcast skipped (can_broadcast is false)");
                    continue;
                }

                if channel.send(&agent.id, &msg.to, &msg.content).await.is_err() {
                    // Channel closed: the run is ending, stop emitting.
                    channel_closed = true;
                    break;
                }
                debug!(agent = %agent.id, to = %msg.to, "Sent message");
            }
            if channel_closed {
                break;
            }

            // 5. Check termination
            if contains_done_signal(&response) {
                info!(agent = %agent.id, turn = turn + 1, "Agent signaled done");
                break;
            }

            sleep(TURN_YIELD).await;
        }

        Ok(())
    }

    async fn build_collaborative_prompt(
        &self,
        agent: &AgentSpec,
        received: &[ChannelMessage],
        conversation: &[String],
        turn: u32,
    ) -> String {
        let mut prompt = agent.prompt().to_string();

        prompt.push_str(&format!(
            r#"

## Collaborative Mode Instructions

You are in a collaborative workflow with other agents. You can communicate using these XML tags:

1. Send a message to a specific agent:
   <message to="agent_id">Your message here</message>

2. Broadcast to all agents:
   <broadcast>Your message here</broadcast>

3. Signal that you're done:
   <DONE/>

This is turn {}. Communicate with other agents as needed, then provide your analysis.
"#,
            turn + 1
        ));

        if !received.is_empty() {
            prompt.push_str("\n## Messages from Other Agents:\n");
            for msg in received {
                prompt.push_str(&format!("\n[From {}]:\n{}\n", msg.from, msg.content));
            }
        }

        if !conversation.is_empty() {
            prompt.push_str("\n## Your Previous Responses:\n");
            for (i, resp) in conversation.iter().enumerate() {
                let stripped = strip_message_tags(resp);
                if !stripped.is_empty() {
                    prompt.push_str(&format!(
                        "\n[Turn {}]:\n{}\n",
                        i + 1,
                        truncate(&stripped, RESPONSE_PREVIEW_LEN)
                    ));
                }
            }
        }

        for key in &agent.requires {
            if let Some(val) = self.shared_memory().get_text(key).await {
                prompt.push_str(&format!("\n## Context - {}:\n{}\n", key, val));
            }
        }

        prompt
    }
}

fn effective_max_turns(agent_max: u32, global_max: u32) -> u32 {
    if agent_max > 0 {
        agent_max
    } else if global_max > 0 {
        global_max
    } else {
        DEFAULT_MAX_TURNS
    }
}

/// Drains the inbox with a bounded wait.
///
/// Waits up to [`COLLECT_WINDOW`] for at least one message, polling every
/// [`POLL_INTERVAL`] while the inbox is empty. Once a message arrives the
/// inbox is drained and the batch returned. Messages are filtered to senders
/// in `listens_to` when that list is non-empty. The second element reports
/// whether the inbox was observed closed.
async fn collect_messages(inbox: &Inbox, listens_to: &[String]) -> (Vec<ChannelMessage>, bool) {
    let deadline = Instant::now() + COLLECT_WINDOW;
    let mut messages = Vec::new();

    loop {
        loop {
            match inbox.try_recv().await {
                Ok(msg) => {
                    if listens_to.is_empty() || listens_to.contains(&msg.from) {
                        messages.push(msg);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return (messages, true),
            }
        }

        if !messages.is_empty() {
            return (messages, false);
        }

        let now = Instant::now();
        if now >= deadline {
            return (messages, false);
        }
        sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
}
