//! Batch driver: newline-delimited questions answered one at a time, in order.

use tokio_util::sync::CancellationToken;

use crate::error::BatchError;
use crate::responder::Responder;
use crate::response::AnsweredQuestion;

/// One question per line; lines trimmed, blank lines dropped.
pub fn split_questions(input: &str) -> Vec<String> {
    input
        .split('\n')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

/// Answer `questions` sequentially. Fail-fast: the first error aborts the batch and no
/// partial results are returned. `cancel` is checked before each call.
pub async fn run_batch(
    responder: &Responder,
    questions: &[String],
    cancel: &CancellationToken,
) -> Result<Vec<AnsweredQuestion>, BatchError> {
    if questions.is_empty() {
        return Err(BatchError::Empty);
    }

    let total = questions.len();
    let mut answered = Vec::with_capacity(total);

    for (index, question) in questions.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(completed = index, total, "batch cancelled");
            return Err(BatchError::Cancelled {
                completed: index,
                total,
            });
        }

        let response = responder.respond(question).await.map_err(|source| {
            tracing::warn!(index, total, kind = ?source.kind(), "batch aborted");
            BatchError::Question {
                index,
                question: question.clone(),
                source,
            }
        })?;

        answered.push(AnsweredQuestion {
            question: question.clone(),
            response,
        });
    }

    tracing::info!(total, "batch complete");
    Ok(answered)
}
