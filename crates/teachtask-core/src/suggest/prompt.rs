//! Chat prompts sent to suggestion providers.

use super::SuggestionRequest;
use super::provider::ChatMessage;
use crate::model::Variant;
use serde::Serialize;

const TASK_SYSTEM_PROMPT: &str = "You are a helpful task management assistant that helps teachers organize their teaching tasks.
Analyze both the user's current tasks and their teaching goals (todos) to suggest complementary tasks.

When suggesting tasks:
1. Wrap the main task in ** markers to indicate it should be bold
2. Include a suggested priority level (High, Medium, Low)
3. Consider the teaching goals from the todos as your primary focus
4. Suggest tasks that will help achieve these teaching goals
5. Include estimated time to complete
6. Explain how this task supports the teaching goals

Format your response like this:
**Task Title** (Priority Level, Est. Time: X minutes)

This task supports your teaching goals by:
- [How it relates to teaching goal 1]
- [How it relates to teaching goal 2]
- [Additional benefits]

Suggested priority because:
- [Reason 1]
- [Reason 2]";

const TODO_SYSTEM_PROMPT: &str = "You are a helpful teaching assistant that helps create learning objectives.
Analyze the current teaching goals and suggest new ones that would enhance the learning experience.

When suggesting teaching goals:
1. Wrap the main goal in ** markers to indicate it should be bold
2. Consider the existing teaching goals and tasks
3. Suggest goals that build upon or complement existing ones
4. Include why this goal is important

Format your response like this:
**Teaching Goal** (Category)

This goal is important because:
- [Reason 1]
- [Reason 2]

Related to existing goals:
- [Connection 1]
- [Connection 2]";

#[derive(Serialize)]
struct TaskContext<'a> {
    text: &'a str,
    status: crate::model::Status,
    priority: crate::model::Priority,
}

#[derive(Serialize)]
struct TodoContext<'a> {
    text: &'a str,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// Default system prompt for a context.
#[must_use]
pub const fn system_prompt(context: Variant) -> &'static str {
    match context {
        Variant::Task => TASK_SYSTEM_PROMPT,
        Variant::Todo => TODO_SYSTEM_PROMPT,
    }
}

/// System + user messages for a request. A custom prompt replaces the system prompt.
///
/// # Errors
///
/// Returns an error if the item context cannot be serialized.
pub fn build_messages(request: &SuggestionRequest) -> serde_json::Result<Vec<ChatMessage>> {
    let tasks: Vec<TaskContext<'_>> = request
        .tasks
        .iter()
        .map(|item| TaskContext {
            text: &item.text,
            status: item.status,
            priority: item.priority,
        })
        .collect();
    let todos: Vec<TodoContext<'_>> = request
        .todos
        .iter()
        .map(|item| TodoContext {
            text: &item.text,
            created_at: item.created_at,
        })
        .collect();

    let system = request
        .custom_prompt
        .as_deref()
        .filter(|prompt| !prompt.trim().is_empty())
        .unwrap_or_else(|| system_prompt(request.context));

    let wanted = match request.context {
        Variant::Task => "task",
        Variant::Todo => "teaching goal",
    };
    let user = format!(
        "Current Tasks: {}\nTeaching Goals (from TodoTeach): {}\n\n\
         Please analyze my teaching goals and current tasks to suggest a new {wanted} \
         that will help me achieve my teaching objectives.",
        serde_json::to_string(&tasks)?,
        serde_json::to_string(&todos)?,
    );

    Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
}
