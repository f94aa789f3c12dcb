//! Player profile lookup for the comparison view.

use crate::output::{log_destination, open_output, write_json};
use anyhow::{bail, Context};
use apm_core::players::{Player, PlayerDirectory};
use serde::Serialize;
use std::path::Path;

/// A player together with everyone they can be compared against.
#[derive(Debug, Serialize)]
pub struct PlayerProfile<'a> {
    pub player: &'a Player,
    pub comparison_candidates: Vec<&'a Player>,
}

pub fn run_players(players_path: &Path, id: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let directory = PlayerDirectory::load(players_path)
        .with_context(|| format!("Failed to load players {}", players_path.display()))?;
    let Some(player) = directory.get(id) else {
        bail!("No player with id {} in {}", id, players_path.display());
    };
    let profile = PlayerProfile {
        player,
        comparison_candidates: directory.comparison_candidates(id),
    };
    log::info!(
        "players: {} has {} comparison candidates",
        player.name,
        profile.comparison_candidates.len()
    );
    write_json(open_output(output)?, &profile)?;
    log_destination(1, output);
    Ok(())
}
