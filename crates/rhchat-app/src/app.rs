// Session event loop.
//
// Owns the `Session` and multiplexes its two inputs: user commands from the
// view and completions of spawned backend calls. After every applied input
// the loop pushes a fresh snapshot to the view.

use tokio::sync::mpsc;
use tracing::{debug, info};

use rhchat_core::protocol::{ApiEvent, UiUpdate, UserCommand};

use crate::session::Session;

/// Run the session loop until the user quits or the command channel closes.
pub async fn run(
    mut api_rx: mpsc::Receiver<ApiEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut session: Session,
) -> anyhow::Result<()> {
    info!("Session loop started");

    // The session keeps a sender alive, so this only closes if the session
    // is torn down; stop polling rather than spin on `None`.
    let mut api_open = true;

    push_snapshot(&session, &ui_tx).await;

    loop {
        tokio::select! {
            // --- Backend completions ---
            event = api_rx.recv(), if api_open => {
                match event {
                    Some(event) => {
                        debug!("API completion received (gen: {})", event.generation());
                        if session.handle_api_event(event) {
                            push_snapshot(&session, &ui_tx).await;
                        }
                    }
                    None => {
                        info!("API channel closed");
                        api_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut session, cmd);
                        push_snapshot(&session, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    info!("Session loop exiting");
    Ok(())
}

/// Dispatch a user command to the session. Validation failures are already
/// recorded in the session's error slot, so they are only logged here.
fn handle_user_command(session: &mut Session, cmd: UserCommand) {
    let result = match cmd {
        UserCommand::Edit { field, edit } => {
            session.apply_edit(field, edit);
            Ok(())
        }
        UserCommand::SubmitJobDescription => session.submit_job_description(),
        UserCommand::ToggleLock => {
            session.toggle_lock();
            Ok(())
        }
        UserCommand::SubmitSubquestions => {
            session.submit_edited_subquestions();
            Ok(())
        }
        UserCommand::RetrieveResumes => session.retrieve_resumes(),
        UserCommand::SendInput => session.submit_input(),
        UserCommand::ClearError => {
            session.clear_error();
            Ok(())
        }
        UserCommand::Retry => session.retry(),
        UserCommand::ClearChat => {
            session.clear_chat();
            Ok(())
        }
        // Handled by the loop before dispatch.
        UserCommand::Quit => Ok(()),
    };

    if let Err(e) = result {
        debug!("Command rejected: {}", e);
    }
}

async fn push_snapshot(session: &Session, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = session.snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
