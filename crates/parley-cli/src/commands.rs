//! Command execution against a restored engine.

use std::io::Write;

use parley_app::{Engine, LiveUpdate};
use parley_core::{ChannelId, Credentials, Registration};
use parley_remote::{PushSource, RemoteClient};
use parley_store::SlotStore;
use tracing::info;

use crate::{CliError, Command, channel_label, message_line};

/// Run `command` against `engine`, writing results to `out`.
///
/// `engine` must already be restored. `Watch` returns when the live
/// connection closes.
pub async fn run<R, S, P, W>(
    engine: &mut Engine<R, S, P>,
    command: Command,
    out: &mut W,
) -> Result<(), CliError>
where
    R: RemoteClient,
    S: SlotStore,
    P: PushSource,
    W: Write,
{
    match command {
        Command::Signin { email, password } => {
            let user = engine.sign_in(&Credentials::new(email, password)).await?;
            writeln!(out, "signed in as {} ({})", user.display_name, user.email)?;
        },
        Command::Signup { workspace, name, email, password } => {
            let registration = Registration { workspace, full_name: name, email, password };
            let user = engine.sign_up(&registration).await?;
            writeln!(out, "signed up as {} ({})", user.display_name, user.email)?;
        },
        Command::Whoami => match (engine.current_user(), engine.workspace()) {
            (Some(user), workspace) => {
                let workspace = workspace.map_or("?", |w| w.name.as_str());
                writeln!(out, "{} <{}> in {workspace}", user.display_name, user.email)?;
            },
            (None, _) => writeln!(out, "not signed in")?,
        },
        Command::Channels => list_channels(engine, out)?,
        Command::Users => {
            for user in engine.mirror().directory().users().values() {
                writeln!(out, "{:>6}  {}  <{}>", user.id, user.display_name, user.email)?;
            }
        },
        Command::Refresh => {
            engine.pull_all().await?;
            list_channels(engine, out)?;
        },
        Command::History { channel } => {
            engine.fetch_history(channel).await?;
            print_history(engine, channel, out)?;
        },
        Command::Send { channel, text } => {
            let message = engine.send_message(channel, text.join(" ")).await?;
            writeln!(out, "sent message {}", message.id)?;
        },
        Command::Watch { channel } => watch(engine, channel, out).await?,
        Command::Signout => {
            let was_signed_in = engine.is_authenticated();
            engine.sign_out()?;
            if was_signed_in {
                writeln!(out, "signed out")?;
            }
        },
    }
    Ok(())
}

fn list_channels<R, S, P, W>(engine: &Engine<R, S, P>, out: &mut W) -> Result<(), CliError>
where
    R: RemoteClient,
    S: SlotStore,
    P: PushSource,
    W: Write,
{
    for channel in engine.group_channels() {
        writeln!(out, "{:>6}  {}", channel.id, channel_label(channel, None))?;
    }
    for direct in engine.direct_channels() {
        let label = channel_label(direct.channel, direct.recipient);
        writeln!(out, "{:>6}  {label}", direct.channel.id)?;
    }
    Ok(())
}

fn print_history<R, S, P, W>(
    engine: &Engine<R, S, P>,
    channel_id: ChannelId,
    out: &mut W,
) -> Result<(), CliError>
where
    R: RemoteClient,
    S: SlotStore,
    P: PushSource,
    W: Write,
{
    for message in engine.messages_for(channel_id) {
        let sender = engine.directory_user(message.sender_id);
        writeln!(out, "{}", message_line(message, sender))?;
    }
    Ok(())
}

async fn watch<R, S, P, W>(
    engine: &mut Engine<R, S, P>,
    channel: Option<ChannelId>,
    out: &mut W,
) -> Result<(), CliError>
where
    R: RemoteClient,
    S: SlotStore,
    P: PushSource,
    W: Write,
{
    if let Some(channel_id) = channel {
        engine.fetch_history(channel_id).await?;
        print_history(engine, channel_id, out)?;
    }
    engine.connect_live()?;

    while let Some(update) = engine.next_live_update().await {
        match update {
            LiveUpdate::Opened => info!("watching for new messages"),
            LiveUpdate::Message(message) => {
                if channel.is_some_and(|id| id != message.channel_id) {
                    continue;
                }
                let sender = engine.directory_user(message.sender_id);
                writeln!(out, "{}", message_line(&message, sender))?;
                out.flush()?;
            },
            LiveUpdate::Closed { reason } => {
                writeln!(out, "connection closed: {reason}")?;
            },
        }
    }
    Ok(())
}
