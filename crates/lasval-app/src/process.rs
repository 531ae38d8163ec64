//! Message processing
//!
//! Runs a message through the TEA update function, dispatches the resulting
//! action and keeps going while handlers return follow-up messages.

use lasval_client::ValidationService;

use crate::actions::{handle_action, ActionContext};
use crate::handler;
use crate::message::Message;
use crate::state::AppState;

/// Process a message through the TEA update function
pub fn process_message<S>(state: &mut AppState, message: Message, ctx: &ActionContext<S>)
where
    S: ValidationService + Sync + 'static,
{
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        if let Some(action) = result.action {
            handle_action(action, ctx);
        }

        // Continue with follow-up message
        msg = result.message;
    }
}
