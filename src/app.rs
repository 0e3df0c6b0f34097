//! Command dispatch
//!
//! Loads config, opens the stores and runs one command against the backend.

use anyhow::{bail, Context};
use tokio::sync::broadcast::error::RecvError;

use chitti_core::commands::{self, LaunchRoute};
use chitti_core::config::load_config;
use chitti_core::{init_app, init_logging, AppState};

use crate::view;
use crate::{Args, Commands};

pub async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(&args.data_dir)
        .with_context(|| format!("loading config from {}", args.data_dir.display()))?;
    if let Some(base) = args.share_base_url {
        config.share_base_url = base;
    }
    init_logging(&config);

    let state = if args.ephemeral {
        AppState::in_memory(config)
    } else {
        init_app(config).await?
    };

    if let Some(name) = args.name.as_deref() {
        commands::set_user_name(&state, name).await?;
    }

    match args.command {
        Commands::Name { name } => name_command(&state, name).await,
        Commands::Open { url } => {
            let outcome = commands::open_bowl_link(&state, &url).await?;
            println!("{}", view::link_outcome(&outcome));
            Ok(())
        }
        Commands::Logs { lines } => {
            print_logs(lines);
            Ok(())
        }
        command => {
            if commands::launch_route(&state).await? == LaunchRoute::Username {
                bail!("Please set your name first: chitti-udi name <NAME>");
            }
            bowl_command(&state, command).await
        }
    }
}

async fn name_command(state: &AppState, name: Option<String>) -> anyhow::Result<()> {
    let Some(name) = name else {
        match commands::user_name(state).await? {
            Some(name) => println!("{}", name),
            None => println!("No name set"),
        }
        return Ok(());
    };

    let name = commands::set_user_name(state, &name).await?;
    println!("Hello, {}!", name);

    if let Some(outcome) = commands::resume_pending_join(state).await? {
        println!("{}", view::link_outcome(&outcome));
    }
    Ok(())
}

async fn bowl_command(state: &AppState, command: Commands) -> anyhow::Result<()> {
    let me = commands::device_id(state).await?;

    match command {
        Commands::Create {
            name,
            description,
            member_limit,
            input_count,
            bowl_type,
        } => {
            let bowl = commands::create_bowl(
                state,
                &name,
                &description,
                &member_limit,
                &input_count,
                bowl_type,
            )
            .await?;
            println!("{}", view::bowl_card(&bowl, &me));
        }
        Commands::List => {
            let bowls = commands::list_my_bowls(state).await?;
            println!("{}", view::bowl_list(&bowls, &me));
        }
        Commands::Show { bowl_id } => {
            let bowl = commands::get_bowl(state, &bowl_id).await?;
            println!("{}", view::bowl_detail(&bowl, &me));
        }
        Commands::Add { bowl_id, text } => {
            let bowl = commands::add_entry(state, &bowl_id, &text).await?;
            println!("Added. \"{}\" now has {} entries.", bowl.name, bowl.list_entries.len());
        }
        Commands::Juggle { bowl_id } => {
            let bowl = commands::juggle(state, &bowl_id).await?;
            println!("{}", bowl.output.unwrap_or_default());
        }
        Commands::RemoveEntry { bowl_id, entry_id } => {
            let bowl = commands::delete_entry(state, &bowl_id, &entry_id).await?;
            println!("\"{}\" now has {} entries.", bowl.name, bowl.list_entries.len());
        }
        Commands::Clear { bowl_id } => {
            let bowl = commands::clear_entries(state, &bowl_id).await?;
            println!("Cleared \"{}\".", bowl.name);
        }
        Commands::Delete { bowl_id } => {
            commands::delete_bowl(state, &bowl_id).await?;
            println!("Bowl deleted.");
        }
        Commands::Share { bowl_id } => {
            let message = commands::share_bowl(state, &bowl_id).await?;
            println!("{}", view::share(&message));
        }
        Commands::Watch => watch(state, &me).await?,
        Commands::Name { .. } | Commands::Open { .. } | Commands::Logs { .. } => {
            bail!("handled before the name check")
        }
    }
    Ok(())
}

async fn watch(state: &AppState, me: &str) -> anyhow::Result<()> {
    let mut changes = commands::watch_bowls(state);
    println!("{}", view::bowl_list(&commands::list_my_bowls(state).await?, me));

    loop {
        tokio::select! {
            change = changes.recv() => match change {
                Ok(snapshot) => {
                    let ids = commands::my_bowl_ids(state).await?;
                    println!("\n{}", view::bowl_list(&commands::visible_bowls(&snapshot, &ids), me));
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("watch skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn print_logs(lines: usize) {
    let Some(path) = rolling_logger::log_file_path() else {
        println!("Logging is not active");
        return;
    };
    let recent = rolling_logger::recent_lines(lines);
    if recent.is_empty() {
        println!("Nothing logged yet in {}", path.display());
    }
    for line in recent {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(data_dir: &std::path::Path, rest: &[&str]) -> Args {
        let data_dir = data_dir.to_string_lossy().to_string();
        let mut argv = vec!["chitti-udi", "--data-dir", data_dir.as_str()];
        argv.extend_from_slice(rest);
        Args::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_ephemeral_run_with_name() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(args(dir.path(), &["--ephemeral", "--name", "Asha", "create", "Trip"])).await;
        assert!(result.is_ok(), "{result:?}");
        assert!(!dir.path().join("chitti_udi.db").exists());
    }

    #[tokio::test]
    async fn test_bowl_command_needs_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(args(dir.path(), &["--ephemeral", "list"])).await.unwrap_err();
        assert!(err.to_string().contains("set your name"));
    }

    #[tokio::test]
    async fn test_name_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        run(args(dir.path(), &["name", "Asha"])).await.unwrap();
        run(args(dir.path(), &["create", "Trip", "-t", "SECRET_SANTA"])).await.unwrap();
        run(args(dir.path(), &["list"])).await.unwrap();
    }
}
